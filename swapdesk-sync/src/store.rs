//! The status projection store.
//!
//! One [`AppState`] per process. Writers go through the named projection
//! methods on [`StatusStore`]; each one is a single synchronous step, so two
//! projections never interleave partially even with many producers. Readers
//! take snapshots or subscribe to change notifications.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use swapdesk_core::types::{
    BackgroundRefundState, ContextStatus, ExpiredTimelocks, InitPhase, LogEntry, Seller, SwapId,
    SwapInfo, SwapProgress,
};

/// Everything the UI renders from.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AppState {
    pub context: ContextStatus,
    /// Bitcoin wallet balance in satoshi, once known.
    pub balance: Option<u64>,
    pub swaps: BTreeMap<SwapId, SwapInfo>,
    pub progress: HashMap<SwapId, Vec<SwapProgress>>,
    /// Swap the daemon is currently driving, if any.
    pub running_swap: Option<SwapId>,
    pub logs: Vec<LogEntry>,
    pub background_refunds: HashMap<SwapId, BackgroundRefundState>,
    pub sellers: Vec<Seller>,
}

/// Shared handle to the single [`AppState`]. Clones share the same state.
#[derive(Debug, Clone)]
pub struct StatusStore {
    state: Arc<watch::Sender<AppState>>,
}

impl Default for StatusStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AppState::default());
        Self {
            state: Arc::new(tx),
        }
    }

    // -- reads -------------------------------------------------------------

    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }

    /// Change notifications; the receiver always sees the latest state.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    pub fn context(&self) -> ContextStatus {
        self.state.borrow().context.clone()
    }

    pub fn balance(&self) -> Option<u64> {
        self.state.borrow().balance
    }

    pub fn swap(&self, swap_id: &SwapId) -> Option<SwapInfo> {
        self.state.borrow().swaps.get(swap_id).cloned()
    }

    pub fn progress(&self, swap_id: &SwapId) -> Vec<SwapProgress> {
        self.state
            .borrow()
            .progress
            .get(swap_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn logs(&self) -> Vec<LogEntry> {
        self.state.borrow().logs.clone()
    }

    // -- projections -------------------------------------------------------

    /// Overwrite the context status.
    pub fn set_context_status(&self, status: ContextStatus) {
        self.state.send_if_modified(|state| {
            if state.context == status {
                return false;
            }
            tracing::debug!(from = state.context.label(), to = status.label(), "context status");
            state.context = status;
            true
        });
    }

    /// Record a local bootstrap phase. Returns `false` when the daemon already
    /// reported its own status, which is left in place.
    pub fn mark_bootstrap_phase(&self, phase: InitPhase) -> bool {
        let mut owned = true;
        self.state.send_if_modified(|state| {
            if state.context.is_daemon_owned() {
                owned = false;
                return false;
            }
            let status = ContextStatus::Initializing(phase);
            if state.context == status {
                return false;
            }
            tracing::debug!(from = state.context.label(), to = status.label(), "context status");
            state.context = status;
            true
        });
        owned
    }

    /// Record a local bootstrap failure. A daemon-reported status is
    /// authoritative and is left in place; returns whether the status changed.
    pub fn mark_bootstrap_failed(&self, reason: impl Into<String>) -> bool {
        let reason = reason.into();
        self.state.send_if_modified(|state| {
            if state.context.is_daemon_owned() {
                return false;
            }
            state.context = ContextStatus::Failed(reason);
            true
        })
    }

    /// Forget the context status, as after a reload.
    pub fn reset_context(&self) {
        self.set_context_status(ContextStatus::Uninitialized);
    }

    /// Merge one progress step into a swap's log. A step identical to the
    /// last recorded one is not appended twice.
    pub fn merge_swap_progress(&self, swap_id: SwapId, progress: SwapProgress) {
        self.state.send_if_modified(|state| {
            let released = progress.is_released();
            let log = state.progress.entry(swap_id).or_default();
            let changed = if log.last() == Some(&progress) {
                false
            } else {
                log.push(progress);
                true
            };

            let running = if released { None } else { Some(swap_id) };
            if released && state.running_swap != Some(swap_id) {
                return changed;
            }
            let running_changed = state.running_swap != running;
            state.running_swap = running;
            changed || running_changed
        });
    }

    pub fn append_log(&self, entry: LogEntry) {
        self.state.send_modify(|state| state.logs.push(entry));
    }

    pub fn set_balance(&self, balance: u64) {
        self.state.send_if_modified(|state| {
            let changed = state.balance != Some(balance);
            state.balance = Some(balance);
            changed
        });
    }

    /// Insert or replace one swap record; last writer wins.
    pub fn upsert_swap(&self, info: SwapInfo) {
        self.state.send_modify(|state| {
            state.swaps.insert(info.swap_id, info);
        });
    }

    pub fn upsert_swaps(&self, infos: Vec<SwapInfo>) {
        self.state.send_modify(|state| {
            for info in infos {
                state.swaps.insert(info.swap_id, info);
            }
        });
    }

    /// Overwrite the timelock of a known swap. Returns `false` when the swap
    /// has not been fetched yet.
    pub fn set_timelock(&self, swap_id: SwapId, timelock: Option<ExpiredTimelocks>) -> bool {
        let mut known = false;
        self.state.send_if_modified(|state| match state.swaps.get_mut(&swap_id) {
            Some(info) => {
                known = true;
                info.timelock = timelock;
                true
            }
            None => false,
        });
        known
    }

    pub fn set_background_refund(&self, swap_id: SwapId, refund: BackgroundRefundState) {
        self.state.send_modify(|state| {
            state.background_refunds.insert(swap_id, refund);
        });
    }

    pub fn set_sellers(&self, sellers: Vec<Seller>) {
        self.state.send_modify(|state| state.sellers = sellers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use swapdesk_core::types::SwapSeller;
    use uuid::Uuid;

    fn info(swap_id: SwapId, state_name: &str) -> SwapInfo {
        SwapInfo {
            swap_id,
            seller: SwapSeller {
                peer_id: "12D3KooWseller".to_string(),
                addresses: vec![],
            },
            completed: false,
            start_date: "2024-05-01 10:00:00".to_string(),
            state_name: state_name.to_string(),
            xmr_amount: 1_000,
            btc_amount: 2_000,
            tx_lock_id: None,
            tx_cancel_fee: 0,
            tx_refund_fee: 0,
            tx_lock_fee: 0,
            btc_refund_address: None,
            cancel_timelock: 72,
            punish_timelock: 144,
            timelock: None,
        }
    }

    fn step(kind: &str) -> SwapProgress {
        SwapProgress {
            kind: kind.to_string(),
            content: json!(null),
        }
    }

    #[test]
    fn upsert_is_last_writer_wins() {
        let store = StatusStore::new();
        let id = Uuid::new_v4();
        store.upsert_swap(info(id, "quote has been requested"));
        store.upsert_swap(info(id, "btc is locked"));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.swaps.len(), 1);
        assert_eq!(snapshot.swaps[&id].state_name, "btc is locked");
    }

    #[test]
    fn timelock_only_applies_to_known_swaps() {
        let store = StatusStore::new();
        let id = Uuid::new_v4();
        assert!(!store.set_timelock(id, Some(ExpiredTimelocks::Punish)));
        assert!(store.snapshot().swaps.is_empty());

        store.upsert_swap(info(id, "btc is locked"));
        assert!(store.set_timelock(id, Some(ExpiredTimelocks::Cancel { blocks_left: 5 })));
        assert_eq!(
            store.swap(&id).expect("swap").timelock,
            Some(ExpiredTimelocks::Cancel { blocks_left: 5 })
        );
    }

    #[test]
    fn progress_merge_tracks_running_swap() {
        let store = StatusStore::new();
        let id = Uuid::new_v4();
        store.merge_swap_progress(id, step("Started"));
        store.merge_swap_progress(id, step("Started"));
        store.merge_swap_progress(id, step("BtcLockTxInMempool"));
        assert_eq!(store.progress(&id).len(), 2);
        assert_eq!(store.snapshot().running_swap, Some(id));

        store.merge_swap_progress(id, step(SwapProgress::RELEASED));
        assert_eq!(store.snapshot().running_swap, None);
    }

    #[test]
    fn release_of_other_swap_keeps_running_swap() {
        let store = StatusStore::new();
        let (running, other) = (Uuid::new_v4(), Uuid::new_v4());
        store.merge_swap_progress(running, step("Started"));
        store.merge_swap_progress(other, step(SwapProgress::RELEASED));
        assert_eq!(store.snapshot().running_swap, Some(running));
    }

    #[test]
    fn bootstrap_failure_never_overrides_available() {
        let store = StatusStore::new();
        store.set_context_status(ContextStatus::Initializing(InitPhase::Requested));
        assert!(store.mark_bootstrap_failed("refused"));
        assert_eq!(store.context(), ContextStatus::Failed("refused".to_string()));

        store.set_context_status(ContextStatus::Available);
        assert!(!store.mark_bootstrap_failed("late failure"));
        assert!(store.context().is_available());

        store.reset_context();
        assert_eq!(store.context(), ContextStatus::Uninitialized);
    }

    #[test]
    fn bootstrap_phase_yields_to_daemon_progress() {
        let store = StatusStore::new();
        assert!(store.mark_bootstrap_phase(InitPhase::SelectingNodes));
        assert!(store.mark_bootstrap_phase(InitPhase::Requested));
        assert_eq!(store.context(), ContextStatus::Initializing(InitPhase::Requested));

        let components = ContextStatus::Initializing(InitPhase::Components(vec![]));
        store.set_context_status(components.clone());
        assert!(!store.mark_bootstrap_phase(InitPhase::Requested));
        assert!(!store.mark_bootstrap_failed("rejected"));
        assert_eq!(store.context(), components);

        store.set_context_status(ContextStatus::Failed("daemon failed".to_string()));
        assert!(store.mark_bootstrap_phase(InitPhase::SelectingNodes));
    }

    #[tokio::test]
    async fn subscribers_are_notified_of_changes() {
        let store = StatusStore::new();
        let mut rx = store.subscribe();
        store.set_balance(12_345);
        rx.changed().await.expect("changed");
        assert_eq!(rx.borrow().balance, Some(12_345));
    }
}
