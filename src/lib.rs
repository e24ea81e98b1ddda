//! Library crate for fhirdesk.
//!
//! View-models for creating and listing FHIR Patient and Practitioner resources, plus the
//! HTTP client they talk through. The `fhirdesk` binary is one host for them.

pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod form;
pub mod library;
pub mod list;
pub mod page;
pub mod table;

#[cfg(test)]
pub(crate) mod test_support;

pub use library::*;
