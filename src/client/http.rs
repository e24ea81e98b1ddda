use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::{Bundle, ResourceClient, ResourceKind, ResourceRecord};
use crate::config::DeskConfig;
use crate::error::{ClientError, ClientResult};

const FHIR_JSON: &str = "application/fhir+json";

/// `ResourceClient` speaking FHIR REST over reqwest.
#[derive(Clone, Debug)]
pub struct HttpResourceClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpResourceClient {
    pub fn new(config: &DeskConfig) -> ClientResult<Self> {
        let base_url = Url::parse(config.base_url())
            .map_err(|err| ClientError::InvalidUrl(format!("{}: {err}", config.base_url())))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(config.base_url().to_string()));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn url(&self, kind: ResourceKind, id: Option<&str>) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty().push(kind.as_str());
            if let Some(id) = id {
                if id.trim().is_empty() {
                    return Err(ClientError::InvalidUrl(format!(
                        "empty {kind} id for {}",
                        self.base_url
                    )));
                }
                segments.push(id);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http.request(method, url).header("Accept", FHIR_JSON)
    }

    fn with_body(request: RequestBuilder, body: &ResourceRecord) -> ClientResult<RequestBuilder> {
        let raw = serde_json::to_vec(body)?;
        Ok(request.header("Content-Type", FHIR_JSON).body(raw))
    }

    /// Send the request and return the body text of a 2xx response.
    async fn send(&self, request: RequestBuilder) -> ClientResult<String> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().to_string();
        let body_text = response.text().await?;

        tracing::debug!(%url, status = status.as_u16(), "FHIR response");

        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                body: parse_error_body(&body_text),
            });
        }

        Ok(body_text)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let body_text = self.send(request).await?;
        Ok(serde_json::from_str(&body_text)?)
    }
}

/// Keep the server's error payload structured when it is JSON (usually an OperationOutcome).
fn parse_error_body(body_text: &str) -> Value {
    if body_text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body_text).unwrap_or_else(|_| Value::String(body_text.to_string()))
}

#[async_trait]
impl ResourceClient for HttpResourceClient {
    async fn get(&self, kind: ResourceKind) -> ClientResult<Bundle> {
        let url = self.url(kind, None)?;
        tracing::debug!(%url, "GET");
        self.send_json(self.request(Method::GET, url)).await
    }

    async fn create(
        &self,
        kind: ResourceKind,
        body: &ResourceRecord,
    ) -> ClientResult<ResourceRecord> {
        let url = self.url(kind, None)?;
        tracing::debug!(%url, "POST");
        let request = Self::with_body(self.request(Method::POST, url), body)?;
        self.send_json(request).await
    }

    async fn read(&self, kind: ResourceKind, id: &str) -> ClientResult<ResourceRecord> {
        let url = self.url(kind, Some(id))?;
        tracing::debug!(%url, "GET");
        self.send_json(self.request(Method::GET, url)).await
    }

    async fn update(
        &self,
        kind: ResourceKind,
        id: &str,
        body: &ResourceRecord,
    ) -> ClientResult<ResourceRecord> {
        let url = self.url(kind, Some(id))?;
        tracing::debug!(%url, "PUT");
        let request = Self::with_body(self.request(Method::PUT, url), body)?;
        self.send_json(request).await
    }

    async fn delete(&self, kind: ResourceKind, id: &str) -> ClientResult<ResourceRecord> {
        let url = self.url(kind, Some(id))?;
        tracing::debug!(%url, "DELETE");
        let body_text = self.send(self.request(Method::DELETE, url)).await?;

        // Servers commonly answer 204 No Content.
        if body_text.trim().is_empty() {
            return Ok(ResourceRecord {
                resource_type: kind.as_str().to_string(),
                id: Some(id.to_string()),
                ..Default::default()
            });
        }
        Ok(serde_json::from_str(&body_text)?)
    }

    async fn search(
        &self,
        kind: ResourceKind,
        params: &[(String, String)],
    ) -> ClientResult<Bundle> {
        let url = self.url(kind, None)?;
        tracing::debug!(%url, params = params.len(), "GET search");
        self.send_json(self.request(Method::GET, url).query(params))
            .await
    }
}
