//! Library-style entry points for fhirdesk.
//!
//! Re-exports the view-models and the HTTP client so hosts other than the CLI can mount them.

use std::sync::Arc;

pub use crate::client::{
    Address, Bundle, BundleEntry, ContactPoint, HttpResourceClient, HumanName, Reference,
    ResourceClient, ResourceKind, ResourceRecord,
};
pub use crate::config::DeskConfig;
pub use crate::error::{
    ClientError, ClientResult, ConfigError, ConfigResult, FormError, FormResult,
};
pub use crate::form::{FieldSpec, FormMessage, FormState, MessageStatus, ResourceForm};
pub use crate::list::{
    ListPoller, ListState, RefreshHandle, RefreshSignal, ResourceList, project_records,
    refresh_channel,
};
pub use crate::page::ResourcePage;

/// Build the HTTP client for `config`, shared behind an `Arc` as the view-models expect.
pub fn connect(config: &DeskConfig) -> ClientResult<Arc<HttpResourceClient>> {
    Ok(Arc::new(HttpResourceClient::new(config)?))
}

/// Mount a page for `kind` against the server in `config`.
pub async fn mount_page(
    config: &DeskConfig,
    kind: ResourceKind,
) -> ClientResult<ResourcePage<HttpResourceClient>> {
    let client = connect(config)?;
    Ok(ResourcePage::mount(kind, client, config.poll_interval()).await)
}
