//! Polling resource list view-model.
//!
//! A [`ResourceList`] holds the latest [`ListState`] for one resource type. A [`ListPoller`]
//! drives it: one fetch on spawn, one per poll interval, and one per [`RefreshHandle::trigger`].
//! Dropping the poller stops the task and any fetch still in flight.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{MissedTickBehavior, interval};

use crate::client::{Bundle, ResourceClient, ResourceKind, ResourceRecord};
use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ListState {
    #[default]
    Loading,
    Populated(Vec<ResourceRecord>),
    Errored(String),
}

impl ListState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ListState::Loading)
    }

    pub fn records(&self) -> &[ResourceRecord] {
        match self {
            ListState::Populated(records) => records.as_slice(),
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ListState::Errored(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

/// Pull the embedded resources out of a bundle, in server order. Entries without one are skipped.
pub fn project_records(bundle: Bundle) -> Vec<ResourceRecord> {
    bundle
        .entry
        .into_iter()
        .filter_map(|entry| entry.resource)
        .collect()
}

fn fetch_error_text(kind: ResourceKind, err: &ClientError) -> String {
    match err {
        ClientError::Api { body, .. } => format!("Error fetching {}: {body}", kind.plural()),
        ClientError::Transport(description) => format!("Connection error: {description}"),
        other => format!("Error fetching {}: {other}", kind.plural()),
    }
}

pub struct ResourceList<C: ResourceClient + ?Sized> {
    kind: ResourceKind,
    client: Arc<C>,
    state: watch::Sender<ListState>,
    issued: AtomicU64,
}

impl<C: ResourceClient + ?Sized> ResourceList<C> {
    pub fn new(kind: ResourceKind, client: Arc<C>) -> Self {
        let (state, _) = watch::channel(ListState::Loading);
        Self {
            kind,
            client,
            state,
            issued: AtomicU64::new(0),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn snapshot(&self) -> ListState {
        self.state.borrow().clone()
    }

    /// Observe every state change, `Loading` included.
    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.state.subscribe()
    }

    /// Fetch every resource of this type and publish the outcome.
    ///
    /// Returns `false` when a newer fetch started before this one finished; its result is then
    /// dropped so a slow response never overwrites a fresher one.
    pub async fn fetch(&self) -> bool {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(ListState::Loading);

        let next = match self.client.get(self.kind).await {
            Ok(bundle) => ListState::Populated(project_records(bundle)),
            Err(err) => {
                tracing::warn!(kind = %self.kind, error = %err, "list fetch failed");
                ListState::Errored(fetch_error_text(self.kind, &err))
            }
        };

        let applied = self.state.send_if_modified(|state| {
            if self.issued.load(Ordering::SeqCst) != seq {
                return false;
            }
            *state = next;
            true
        });

        if !applied {
            tracing::debug!(kind = %self.kind, seq, "discarding superseded list fetch");
        }
        applied
    }
}

/// Write side of the refresh counter. Cloned freely; each `trigger` bumps the counter.
#[derive(Clone, Debug)]
pub struct RefreshHandle {
    counter: Arc<watch::Sender<u64>>,
}

impl RefreshHandle {
    pub fn trigger(&self) {
        self.counter.send_modify(|count| *count = count.wrapping_add(1));
    }

    pub fn count(&self) -> u64 {
        *self.counter.borrow()
    }
}

/// Read side of the refresh counter, consumed by a [`ListPoller`].
#[derive(Debug)]
pub struct RefreshSignal {
    changes: watch::Receiver<u64>,
}

pub fn refresh_channel() -> (RefreshHandle, RefreshSignal) {
    let (tx, rx) = watch::channel(0);
    (
        RefreshHandle {
            counter: Arc::new(tx),
        },
        RefreshSignal { changes: rx },
    )
}

/// Owns the polling task for one [`ResourceList`]. Dropping it cancels polling.
#[derive(Debug)]
pub struct ListPoller {
    task: Option<JoinHandle<()>>,
}

impl ListPoller {
    pub fn spawn<C>(list: Arc<ResourceList<C>>, signal: RefreshSignal, period: Duration) -> Self
    where
        C: ResourceClient + ?Sized + 'static,
    {
        let task = tokio::spawn(poll_loop(list, signal, period));
        Self { task: Some(task) }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop polling and wait for the task to unwind.
    pub async fn shutdown(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
    }
}

impl Drop for ListPoller {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn poll_loop<C>(list: Arc<ResourceList<C>>, mut signal: RefreshSignal, period: Duration)
where
    C: ResourceClient + ?Sized + 'static,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Fetch tasks live here so aborting the poller aborts them too.
    let mut in_flight = JoinSet::new();
    let mut refresh_open = true;

    tracing::debug!(
        kind = %list.kind(),
        period_secs = period.as_secs_f64(),
        "list polling started"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            changed = signal.changes.changed(), if refresh_open => {
                if changed.is_err() {
                    refresh_open = false;
                    continue;
                }
                ticker.reset();
            }
            Some(_) = in_flight.join_next(), if !in_flight.is_empty() => continue,
        }

        let list = list.clone();
        in_flight.spawn(async move {
            list.fetch().await;
        });
    }
}
