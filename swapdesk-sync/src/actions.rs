//! On-demand fetch paths.
//!
//! Events can be missed across a reload; every entity they touch can also be
//! pulled explicitly from here. Failures go back to the caller only.

use swapdesk_core::config::DEFAULT_RENDEZVOUS_POINT;
use swapdesk_core::types::{Seller, SwapId, SwapInfo};
use swapdesk_daemon::{DaemonClient, DaemonError};

use crate::store::StatusStore;

/// Remote calls whose answers are projected into the store.
#[derive(Debug, Clone)]
pub struct Actions {
    client: DaemonClient,
    store: StatusStore,
}

impl Actions {
    pub fn new(client: DaemonClient, store: StatusStore) -> Self {
        Self { client, store }
    }

    pub fn client(&self) -> &DaemonClient {
        &self.client
    }

    pub fn store(&self) -> &StatusStore {
        &self.store
    }

    pub async fn refresh_balance(&self, force_refresh: bool) -> Result<u64, DaemonError> {
        let balance = self.client.get_balance(force_refresh).await?.balance;
        self.store.set_balance(balance);
        Ok(balance)
    }

    pub async fn refresh_swap(&self, swap_id: SwapId) -> Result<SwapInfo, DaemonError> {
        let info = self.client.get_swap_info(swap_id).await?;
        self.store.upsert_swap(info.clone());
        Ok(info)
    }

    /// Fetch every swap record; returns how many were upserted.
    pub async fn refresh_all_swaps(&self) -> Result<usize, DaemonError> {
        let infos = self.client.get_swap_infos_all().await?;
        let count = infos.len();
        self.store.upsert_swaps(infos);
        Ok(count)
    }

    /// List sellers at `rendezvous_point`, or at the built-in one.
    pub async fn discover_sellers(
        &self,
        rendezvous_point: Option<&str>,
    ) -> Result<Vec<Seller>, DaemonError> {
        let point = rendezvous_point.unwrap_or(DEFAULT_RENDEZVOUS_POINT);
        let sellers = self.client.list_sellers(point).await?.sellers;
        tracing::info!(rendezvous_point = point, count = sellers.len(), "discovered sellers");
        self.store.set_sellers(sellers.clone());
        Ok(sellers)
    }

    /// Pull the state that depends on a ready context. Failures are logged;
    /// there is nobody to hand them to.
    pub async fn refresh_after_context_ready(&self) {
        let (balance, swaps) = tokio::join!(self.refresh_balance(false), self.refresh_all_swaps());
        if let Err(err) = balance {
            tracing::warn!(error = %err, "balance refresh after context ready failed");
        }
        if let Err(err) = swaps {
            tracing::warn!(error = %err, "swap list refresh after context ready failed");
        }
    }
}
