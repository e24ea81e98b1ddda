mod http;
mod types;

use async_trait::async_trait;

pub use http::HttpResourceClient;
pub use types::{
    Address, Bundle, BundleEntry, ContactPoint, HumanName, Reference, ResourceKind, ResourceRecord,
};

use crate::error::ClientResult;

/// FHIR REST operations the desk needs from a server.
///
/// Mapping a `Bundle` to a list of records is left to the caller.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// `GET {base}/{kind}`
    async fn get(&self, kind: ResourceKind) -> ClientResult<Bundle>;

    /// `POST {base}/{kind}`
    async fn create(&self, kind: ResourceKind, body: &ResourceRecord)
    -> ClientResult<ResourceRecord>;

    /// `GET {base}/{kind}/{id}`
    async fn read(&self, kind: ResourceKind, id: &str) -> ClientResult<ResourceRecord>;

    /// `PUT {base}/{kind}/{id}`
    async fn update(
        &self,
        kind: ResourceKind,
        id: &str,
        body: &ResourceRecord,
    ) -> ClientResult<ResourceRecord>;

    /// `DELETE {base}/{kind}/{id}`
    async fn delete(&self, kind: ResourceKind, id: &str) -> ClientResult<ResourceRecord>;

    /// `GET {base}/{kind}?name=value&...`
    async fn search(
        &self,
        kind: ResourceKind,
        params: &[(String, String)],
    ) -> ClientResult<Bundle>;
}
