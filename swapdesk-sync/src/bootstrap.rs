//! Context bootstrap.
//!
//! Attempt sequence (each attempt):
//! 1. `is_context_available`: if the daemon already owns a context (e.g. it
//!    outlived a reload of this process), mark `Available` and stop. The
//!    daemon rejects a second `initialize_context`, so this check precedes
//!    every initialization call.
//! 2. Race candidate endpoints per backend kind, kinds in parallel.
//! 3. `initialize_context` with whatever was resolved.
//!
//! Local phases are written only while no daemon status is present. If the
//! daemon reports `Available` or component progress mid-attempt, the attempt
//! stops without issuing `initialize_context`.
//!
//! A failed attempt is retried exactly once after the retry delay. A second
//! failure leaves the status at `Failed`; only an explicit new [`run`] call
//! tries again. A successful initialization call does not mark `Available`:
//! the daemon's context-status event does.
//!
//! [`run`]: Bootstrapper::run

use std::sync::Arc;
use std::time::Duration;

use swapdesk_core::config::Config;
use swapdesk_core::types::{ContextStatus, InitPhase};
use swapdesk_daemon::{DaemonClient, DaemonError};

use crate::probe::Prober;
use crate::selector::select_all;
use crate::store::StatusStore;

/// Attempts per [`Bootstrapper::run`]: the first one plus a single retry.
pub const MAX_ATTEMPTS: u32 = 2;

/// How a bootstrap run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// The daemon already had a context; no initialization was issued.
    AlreadyAvailable,
    /// Initialization was accepted; readiness will arrive as an event.
    Requested { attempts: u32 },
    /// The daemon reported its own initialization progress before this run
    /// issued a request; readiness will arrive as an event.
    DaemonInitializing,
    /// Every attempt failed; the status is now `Failed(reason)`.
    Failed { attempts: u32, reason: String },
}

enum Attempt {
    Ready,
    DaemonInitializing,
    Requested,
}

pub struct Bootstrapper {
    client: DaemonClient,
    prober: Arc<dyn Prober>,
    store: StatusStore,
    config: Config,
}

impl Bootstrapper {
    pub fn new(
        client: DaemonClient,
        prober: Arc<dyn Prober>,
        store: StatusStore,
        config: Config,
    ) -> Self {
        Self {
            client,
            prober,
            store,
            config,
        }
    }

    pub fn retry_delay(&self) -> Duration {
        self.config.retry_delay()
    }

    /// Drive the context to `Available` or `Failed`. Never panics and never
    /// returns an error: failure is reported through the store and the
    /// returned outcome.
    pub async fn run(&self) -> BootstrapOutcome {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.attempt().await {
                Ok(Attempt::Ready) => {
                    tracing::info!(attempts, "daemon context already available");
                    self.store.set_context_status(ContextStatus::Available);
                    return BootstrapOutcome::AlreadyAvailable;
                }
                Ok(Attempt::DaemonInitializing) => {
                    tracing::info!(attempts, "daemon is already initializing its context");
                    return BootstrapOutcome::DaemonInitializing;
                }
                Ok(Attempt::Requested) => {
                    tracing::info!(attempts, "context initialization requested");
                    return BootstrapOutcome::Requested { attempts };
                }
                Err(err) if attempts < MAX_ATTEMPTS => {
                    tracing::warn!(
                        attempts,
                        error = %err,
                        retry_in_ms = self.retry_delay().as_millis() as u64,
                        "context initialization failed, retrying",
                    );
                    tokio::time::sleep(self.retry_delay()).await;
                }
                Err(err) => {
                    let reason = err.to_string();
                    tracing::error!(attempts, error = %reason, "context initialization failed");
                    self.store.mark_bootstrap_failed(reason.clone());
                    return BootstrapOutcome::Failed { attempts, reason };
                }
            }
        }
    }

    async fn attempt(&self) -> Result<Attempt, DaemonError> {
        if self.client.is_context_available().await? {
            return Ok(Attempt::Ready);
        }

        if !self.store.mark_bootstrap_phase(InitPhase::SelectingNodes) {
            return Ok(self.daemon_reported());
        }
        let resolved = select_all(&self.prober, &self.config).await;
        tracing::info!(
            electrum = resolved.electrum.as_ref().map(|e| e.url.as_str()),
            monero = resolved.monero.as_ref().map(|e| e.url.as_str()),
            "resolved endpoints",
        );

        if !self.store.mark_bootstrap_phase(InitPhase::Requested) {
            return Ok(self.daemon_reported());
        }
        let settings = resolved.into_settings(self.config.use_tor);
        self.client
            .initialize_context(&settings, self.config.network.is_testnet())
            .await?;
        Ok(Attempt::Requested)
    }

    fn daemon_reported(&self) -> Attempt {
        if self.store.context().is_available() {
            Attempt::Ready
        } else {
            Attempt::DaemonInitializing
        }
    }
}
