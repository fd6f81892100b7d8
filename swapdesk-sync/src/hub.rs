//! Event subscription hub.
//!
//! ```text
//!   RawEvent stream ──► dispatch loop ──► per-channel queue ──► channel worker ──► store
//! ```
//!
//! Each channel has its own queue and worker, so events of one channel are
//! projected strictly in arrival order while a slow channel never holds up the
//! others. Nothing is ordered across channels; every projection touches its
//! own fields.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use swapdesk_core::types::{
    BackgroundRefundEvent, BalanceChangeEvent, ContextStatus, ContextStatusEvent,
    DatabaseStateEvent, LogEmittedEvent, LogEntry, SwapId, SwapProgressEvent, TimelockChangeEvent,
};
use swapdesk_daemon::{EventChannel, RawEvent};

use crate::actions::Actions;
use crate::error::SyncError;
use crate::store::StatusStore;

/// Applies decoded events to the store.
#[derive(Debug, Clone)]
pub struct Projector {
    actions: Actions,
    settle_delay: Duration,
}

impl Projector {
    pub fn new(actions: Actions, settle_delay: Duration) -> Self {
        Self {
            actions,
            settle_delay,
        }
    }

    fn store(&self) -> &StatusStore {
        self.actions.store()
    }

    /// Project one payload received on `channel`.
    pub fn apply(&self, channel: EventChannel, payload: Value) -> Result<(), SyncError> {
        match channel {
            EventChannel::SwapProgress => {
                let event: SwapProgressEvent = decode(channel, payload)?;
                self.store().merge_swap_progress(event.swap_id, event.event);
            }
            EventChannel::ContextStatus => {
                let event: ContextStatusEvent = decode(channel, payload)?;
                let status = ContextStatus::from(event);
                let became_available =
                    status.is_available() && !self.store().context().is_available();
                self.store().set_context_status(status);
                if became_available {
                    let actions = self.actions.clone();
                    tokio::spawn(async move { actions.refresh_after_context_ready().await });
                }
            }
            EventChannel::Log => {
                let event: LogEmittedEvent = decode(channel, payload)?;
                self.store()
                    .append_log(LogEntry::parse(&event.buffer, Utc::now()));
            }
            EventChannel::BalanceChange => {
                let event: BalanceChangeEvent = decode(channel, payload)?;
                self.store().set_balance(event.balance);
            }
            EventChannel::DatabaseState => {
                let event: DatabaseStateEvent = decode(channel, payload)?;
                self.schedule_swap_fetches(event.swap_id);
            }
            EventChannel::TimelockChange => {
                let event: TimelockChangeEvent = decode(channel, payload)?;
                if !self.store().set_timelock(event.swap_id, event.timelock) {
                    tracing::debug!(swap_id = %event.swap_id, "timelock change for unknown swap");
                }
            }
            EventChannel::BackgroundRefund => {
                let event: BackgroundRefundEvent = decode(channel, payload)?;
                self.store()
                    .set_background_refund(event.swap_id, event.state);
            }
        }
        Ok(())
    }

    /// The daemon emits the database event slightly before its own reads see
    /// the write, so the record is fetched now and once more after the settle
    /// delay.
    fn schedule_swap_fetches(&self, swap_id: SwapId) {
        let immediate = self.actions.clone();
        tokio::spawn(async move { fetch_swap(&immediate, swap_id, "immediate").await });

        let delayed = self.actions.clone();
        let settle_delay = self.settle_delay;
        tokio::spawn(async move {
            tokio::time::sleep(settle_delay).await;
            fetch_swap(&delayed, swap_id, "settled").await;
        });
    }
}

async fn fetch_swap(actions: &Actions, swap_id: SwapId, pass: &'static str) {
    if let Err(err) = actions.refresh_swap(swap_id).await {
        tracing::warn!(%swap_id, pass, error = %err, "swap re-fetch failed");
    }
}

fn decode<T: DeserializeOwned>(channel: EventChannel, payload: Value) -> Result<T, SyncError> {
    serde_json::from_value(payload).map_err(|source| SyncError::Payload { channel, source })
}

/// Spawn the dispatch loop and one worker per channel.
///
/// The returned handle completes once `events` is closed and every queued
/// event has been projected. Subscriptions are meant to live as long as the
/// process; there is no unsubscribe.
pub fn spawn(projector: Projector, mut events: mpsc::Receiver<RawEvent>) -> JoinHandle<()> {
    let mut queues = HashMap::new();
    let mut workers = Vec::new();
    for channel in EventChannel::ALL {
        let (tx, rx) = mpsc::unbounded_channel::<Value>();
        queues.insert(channel, tx);
        workers.push(tokio::spawn(channel_worker(channel, projector.clone(), rx)));
    }

    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let Some(channel) = EventChannel::from_name(&event.channel) else {
                tracing::debug!(channel = %event.channel, "ignoring event on unknown channel");
                continue;
            };
            if let Some(queue) = queues.get(&channel) {
                if queue.send(event.payload).is_err() {
                    tracing::error!(%channel, "channel worker gone");
                }
            }
        }

        // Closing the queues lets each worker drain and exit.
        drop(queues);
        for worker in workers {
            if let Err(err) = worker.await {
                tracing::error!(error = %err, "channel worker join failure");
            }
        }
        tracing::info!("event hub stopped");
    })
}

async fn channel_worker(
    channel: EventChannel,
    projector: Projector,
    mut queue: mpsc::UnboundedReceiver<Value>,
) {
    while let Some(payload) = queue.recv().await {
        if let Err(err) = projector.apply(channel, payload) {
            tracing::warn!(%channel, error = %err, "dropping event");
        }
    }
}
