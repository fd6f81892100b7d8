//! Endpoint health probing.

use async_trait::async_trait;

use swapdesk_core::types::{BackendKind, Endpoint};
use swapdesk_daemon::DaemonClient;

/// Checks one candidate endpoint.
///
/// A probe never fails: anything short of a positive answer is `false`.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, endpoint: &Endpoint) -> bool;
}

/// Probes through the daemon's node-check commands, so the check runs from
/// the daemon's network position rather than the UI's.
#[derive(Debug, Clone)]
pub struct DaemonProber {
    client: DaemonClient,
}

impl DaemonProber {
    pub fn new(client: DaemonClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Prober for DaemonProber {
    async fn probe(&self, endpoint: &Endpoint) -> bool {
        let result = match endpoint.backend_kind {
            BackendKind::Electrum => self.client.check_electrum_node(&endpoint.url).await,
            BackendKind::Monero => {
                self.client
                    .check_monero_node(&endpoint.url, endpoint.network)
                    .await
            }
        };

        match result {
            Ok(check) => check.available,
            Err(err) => {
                tracing::debug!(endpoint = %endpoint, error = %err, "probe failed");
                false
            }
        }
    }
}
