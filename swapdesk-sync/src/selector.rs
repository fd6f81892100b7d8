//! Endpoint selection: race every candidate, keep the first healthy one.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};

use swapdesk_core::config::Config;
use swapdesk_core::types::{BackendKind, ContextSettings, Endpoint, Network, ProbeResult};

use crate::probe::Prober;

/// Result of one selection pass over both backend kinds.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedEndpoints {
    pub electrum: Option<Endpoint>,
    pub monero: Option<Endpoint>,
}

impl ResolvedEndpoints {
    /// Settings for `initialize_context`. Unresolved kinds are left empty and
    /// the daemon falls back to its own defaults.
    pub fn into_settings(self, use_tor: bool) -> ContextSettings {
        ContextSettings {
            electrum_rpc_url: self.electrum.map(|e| e.url),
            monero_node_url: self.monero.map(|e| e.url),
            use_tor,
        }
    }
}

/// Probe all `candidates` of `kind` on `network` concurrently and return the
/// first one whose probe succeeds.
///
/// Order in `candidates` has no bearing once the probes are launched. Losing
/// probes are detached, not cancelled: they finish in the background and
/// their answers are dropped. Returns `None` for an empty list or when every
/// probe fails.
pub async fn select(
    prober: &Arc<dyn Prober>,
    candidates: &[Endpoint],
    kind: BackendKind,
    network: Network,
) -> Option<Endpoint> {
    let mut racing = FuturesUnordered::new();
    for endpoint in candidates
        .iter()
        .filter(|e| e.backend_kind == kind && e.network == network)
        .cloned()
    {
        let prober = Arc::clone(prober);
        racing.push(tokio::spawn(async move {
            let available = prober.probe(&endpoint).await;
            ProbeResult {
                endpoint,
                available,
            }
        }));
    }

    let launched = racing.len();
    while let Some(joined) = racing.next().await {
        match joined {
            Ok(ProbeResult {
                endpoint,
                available: true,
            }) => {
                tracing::info!(%kind, %network, url = %endpoint.url, "selected endpoint");
                return Some(endpoint);
            }
            Ok(ProbeResult { endpoint, .. }) => {
                tracing::debug!(%kind, url = %endpoint.url, "endpoint unavailable");
            }
            Err(err) => {
                tracing::warn!(%kind, error = %err, "probe task failed");
            }
        }
    }

    tracing::warn!(%kind, %network, candidates = launched, "no reachable endpoint");
    None
}

/// Probe every candidate and wait for all answers. Results keep the order of
/// `candidates`.
pub async fn probe_all(prober: &Arc<dyn Prober>, candidates: &[Endpoint]) -> Vec<ProbeResult> {
    let handles: Vec<_> = candidates
        .iter()
        .cloned()
        .map(|endpoint| {
            let prober = Arc::clone(prober);
            tokio::spawn(async move { prober.probe(&endpoint).await })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (endpoint, handle) in candidates.iter().cloned().zip(handles) {
        let available = match handle.await {
            Ok(available) => available,
            Err(err) => {
                tracing::warn!(url = %endpoint.url, error = %err, "probe task failed");
                false
            }
        };
        results.push(ProbeResult {
            endpoint,
            available,
        });
    }
    results
}

/// Resolve one endpoint per backend kind, both kinds in parallel.
pub async fn select_all(prober: &Arc<dyn Prober>, config: &Config) -> ResolvedEndpoints {
    let network = config.network;
    let electrum_candidates = config.candidates(network, BackendKind::Electrum);
    let monero_candidates = config.candidates(network, BackendKind::Monero);

    let (electrum, monero) = tokio::join!(
        select(prober, &electrum_candidates, BackendKind::Electrum, network),
        select(prober, &monero_candidates, BackendKind::Monero, network),
    );

    ResolvedEndpoints { electrum, monero }
}
