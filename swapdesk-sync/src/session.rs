//! One process lifetime of the sync engine: hub first, then bootstrap.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use swapdesk_core::config::Config;
use swapdesk_daemon::{subscribe, DaemonClient, RawEvent, SocketTransport};

use crate::actions::Actions;
use crate::bootstrap::{BootstrapOutcome, Bootstrapper};
use crate::error::SyncError;
use crate::hub::{self, Projector};
use crate::probe::{DaemonProber, Prober};
use crate::store::StatusStore;

pub struct Session {
    store: StatusStore,
    actions: Actions,
    bootstrapper: Arc<Bootstrapper>,
    hub: JoinHandle<()>,
    bootstrap: Option<JoinHandle<BootstrapOutcome>>,
}

impl Session {
    /// Connect to the daemon at `socket`, subscribe to its events and start.
    pub async fn connect(socket: &Path, config: Config) -> Result<Self, SyncError> {
        let client = DaemonClient::new(Arc::new(SocketTransport::new(socket)));
        let events = subscribe(socket).await?;
        let prober: Arc<dyn Prober> = Arc::new(DaemonProber::new(client.clone()));
        Ok(Self::start(client, prober, events, config, StatusStore::new()))
    }

    /// Start the hub on `events`, then bootstrap the context.
    ///
    /// `store` may outlive an earlier session (a reload). Its context status
    /// is reset because no event is replayed; the bootstrap readiness check
    /// restores it. Other projections keep their possibly stale values until
    /// the next event or explicit fetch.
    pub fn start(
        client: DaemonClient,
        prober: Arc<dyn Prober>,
        events: mpsc::Receiver<RawEvent>,
        config: Config,
        store: StatusStore,
    ) -> Self {
        store.reset_context();
        let actions = Actions::new(client.clone(), store.clone());
        let hub = hub::spawn(
            Projector::new(actions.clone(), config.settle_delay()),
            events,
        );
        let bootstrapper = Arc::new(Bootstrapper::new(client, prober, store.clone(), config));

        let mut session = Self {
            store,
            actions,
            bootstrapper,
            hub,
            bootstrap: None,
        };
        session.rebootstrap();
        session
    }

    pub fn store(&self) -> &StatusStore {
        &self.store
    }

    pub fn actions(&self) -> &Actions {
        &self.actions
    }

    /// Start another bootstrap run, e.g. after the status reached `Failed`.
    /// A run still in flight is left alone.
    pub fn rebootstrap(&mut self) {
        if self
            .bootstrap
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
        {
            tracing::debug!("bootstrap already running");
            return;
        }
        let bootstrapper = Arc::clone(&self.bootstrapper);
        self.bootstrap = Some(tokio::spawn(async move { bootstrapper.run().await }));
    }

    /// Wait for the current bootstrap run to finish.
    pub async fn bootstrap_outcome(&mut self) -> Option<BootstrapOutcome> {
        let handle = self.bootstrap.take()?;
        match handle.await {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                tracing::error!(error = %err, "bootstrap task join failure");
                None
            }
        }
    }

    /// Wait until the daemon closes the event subscription.
    pub async fn closed(self) {
        if let Err(err) = self.hub.await {
            tracing::error!(error = %err, "event hub join failure");
        }
    }
}
