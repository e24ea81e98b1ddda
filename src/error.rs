use serde_json::Value;

use crate::client::ResourceKind;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No response was obtained (DNS, connect, reset, body read).
    #[error("transport error: {0}")]
    Transport(String),
    /// The server answered with a non-2xx status.
    #[error("server returned HTTP {status}: {body}")]
    Api { status: u16, body: Value },
    #[error("failed to decode server response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("unknown {kind} field: {name}")]
    UnknownField { kind: ResourceKind, name: String },
    #[error("missing required fields: {}", .0.join(", "))]
    MissingRequired(Vec<&'static str>),
    #[error("{0} forms have no practitioner selector")]
    PractitionerNotSupported(ResourceKind),
    #[error("practitioner {0} is not in the loaded practitioner list")]
    UnknownPractitioner(String),
    #[error(transparent)]
    Submit(#[from] ClientError),
}

pub type FormResult<T> = std::result::Result<T, FormError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid FHIR base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("invalid poll interval {0:?}: expected a positive number of seconds")]
    InvalidPollInterval(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
