//! Error types for swapdesk-sync.

use thiserror::Error;

use swapdesk_daemon::{DaemonError, EventChannel};

/// All errors that can arise inside the sync engine.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A remote command failed.
    #[error("daemon error: {0}")]
    Daemon(#[from] DaemonError),

    /// An event payload did not match its channel's schema.
    #[error("undecodable payload on '{channel}': {source}")]
    Payload {
        channel: EventChannel,
        #[source]
        source: serde_json::Error,
    },
}
