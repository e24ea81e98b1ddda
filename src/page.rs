//! One resource page: a create form and a polling list, wired together.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::client::{ResourceClient, ResourceKind};
use crate::form::ResourceForm;
use crate::list::{ListPoller, ListState, RefreshHandle, ResourceList, refresh_channel};

pub struct ResourcePage<C: ResourceClient + ?Sized + 'static> {
    pub form: ResourceForm<C>,
    list: Arc<ResourceList<C>>,
    refresh: RefreshHandle,
    poller: ListPoller,
}

impl<C: ResourceClient + ?Sized + 'static> ResourcePage<C> {
    /// Start polling the list and, for patients, load the practitioner selector.
    ///
    /// A successful form submit triggers a list refresh.
    pub async fn mount(kind: ResourceKind, client: Arc<C>, poll_interval: Duration) -> Self {
        let list = Arc::new(ResourceList::new(kind, client.clone()));
        let (refresh, signal) = refresh_channel();
        let poller = ListPoller::spawn(list.clone(), signal, poll_interval);

        let on_created = refresh.clone();
        let mut form = ResourceForm::new(kind, client).on_created(move |_| on_created.trigger());
        form.load_practitioners().await;

        tracing::debug!(%kind, "resource page mounted");

        Self {
            form,
            list,
            refresh,
            poller,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.list.kind()
    }

    /// The host's "refresh" action.
    pub fn refresh(&self) {
        self.refresh.trigger();
    }

    pub fn list_state(&self) -> ListState {
        self.list.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.list.subscribe()
    }

    /// Stop polling. Dropping the page has the same effect.
    pub async fn unmount(self) {
        self.poller.shutdown().await;
        tracing::debug!(kind = %self.list.kind(), "resource page unmounted");
    }
}
