//! In-memory `ResourceClient` for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::client::{
    Bundle, ContactPoint, HumanName, ResourceClient, ResourceKind, ResourceRecord,
};
use crate::error::{ClientError, ClientResult};

/// A scripted `get` answer, optionally delayed (use with a paused tokio clock).
pub struct ScriptedGet {
    pub delay: Duration,
    pub result: ClientResult<Bundle>,
}

#[derive(Default)]
pub struct MockClient {
    gets: Mutex<VecDeque<ScriptedGet>>,
    fallback_bundle: Mutex<Bundle>,
    creates: Mutex<VecDeque<ClientResult<ResourceRecord>>>,
    created: Mutex<Vec<ResourceRecord>>,
    get_calls: AtomicUsize,
    create_calls: AtomicUsize,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bundle returned by `get` once the scripted answers run out.
    pub fn with_bundle(self, bundle: Bundle) -> Self {
        *self.fallback_bundle.lock().unwrap() = bundle;
        self
    }

    pub fn push_get(&self, delay: Duration, result: ClientResult<Bundle>) {
        self.gets
            .lock()
            .unwrap()
            .push_back(ScriptedGet { delay, result });
    }

    pub fn push_create(&self, result: ClientResult<ResourceRecord>) {
        self.creates.lock().unwrap().push_back(result);
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn created(&self) -> Vec<ResourceRecord> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResourceClient for MockClient {
    async fn get(&self, _kind: ResourceKind) -> ClientResult<Bundle> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.gets.lock().unwrap().pop_front();
        match scripted {
            Some(ScriptedGet { delay, result }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                result
            }
            None => Ok(self.fallback_bundle.lock().unwrap().clone()),
        }
    }

    async fn create(
        &self,
        kind: ResourceKind,
        body: &ResourceRecord,
    ) -> ClientResult<ResourceRecord> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.created.lock().unwrap().push(body.clone());
        let scripted = self.creates.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| {
            let mut created = body.clone();
            created.id = Some(format!("{}-1", kind.as_str().to_lowercase()));
            Ok(created)
        })
    }

    async fn read(&self, kind: ResourceKind, id: &str) -> ClientResult<ResourceRecord> {
        Ok(ResourceRecord {
            resource_type: kind.as_str().to_string(),
            id: Some(id.to_string()),
            ..Default::default()
        })
    }

    async fn update(
        &self,
        _kind: ResourceKind,
        id: &str,
        body: &ResourceRecord,
    ) -> ClientResult<ResourceRecord> {
        let mut updated = body.clone();
        updated.id = Some(id.to_string());
        Ok(updated)
    }

    async fn delete(&self, kind: ResourceKind, id: &str) -> ClientResult<ResourceRecord> {
        self.read(kind, id).await
    }

    async fn search(
        &self,
        kind: ResourceKind,
        _params: &[(String, String)],
    ) -> ClientResult<Bundle> {
        self.get(kind).await
    }
}

pub fn person(kind: ResourceKind, id: &str, given: &str, family: &str) -> ResourceRecord {
    ResourceRecord {
        resource_type: kind.as_str().to_string(),
        id: Some(id.to_string()),
        name: vec![HumanName {
            family: Some(family.to_string()),
            given: vec![given.to_string()],
        }],
        telecom: vec![
            ContactPoint::new("phone", "555-0100"),
            ContactPoint::new("email", &format!("{}@example.org", given.to_lowercase())),
        ],
        ..Default::default()
    }
}

pub fn operation_outcome_error(status: u16, diagnostics: &str) -> ClientError {
    ClientError::Api {
        status,
        body: json!({
            "resourceType": "OperationOutcome",
            "issue": [{"severity": "error", "code": "invalid", "diagnostics": diagnostics}]
        }),
    }
}

/// Let spawned tasks run without advancing a paused clock.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
