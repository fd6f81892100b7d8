//! Daemon → host event channels.
//!
//! A subscription is a dedicated socket connection: the client sends
//! `{"cmd":"subscribe"}`, the daemon acknowledges with a normal response line
//! and then streams `{"event": <channel>, "payload": ...}` frames until the
//! connection closes. Events are fire-and-forget; nothing is acknowledged and
//! nothing is replayed on reconnect.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::error::{io_err, DaemonError};
use crate::protocol::{connect, write_request, DaemonRequest, DaemonResponse};

/// Named event channels the daemon emits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventChannel {
    SwapProgress,
    ContextStatus,
    Log,
    BalanceChange,
    DatabaseState,
    TimelockChange,
    BackgroundRefund,
}

impl EventChannel {
    pub const ALL: [EventChannel; 7] = [
        EventChannel::SwapProgress,
        EventChannel::ContextStatus,
        EventChannel::Log,
        EventChannel::BalanceChange,
        EventChannel::DatabaseState,
        EventChannel::TimelockChange,
        EventChannel::BackgroundRefund,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventChannel::SwapProgress => "swap-progress-update",
            EventChannel::ContextStatus => "context-init-progress-update",
            EventChannel::Log => "cli-log-emitted",
            EventChannel::BalanceChange => "balance-change",
            EventChannel::DatabaseState => "swap-database-state-update",
            EventChannel::TimelockChange => "timelock-change",
            EventChannel::BackgroundRefund => "background-refund",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|channel| channel.name() == name)
    }
}

impl fmt::Display for EventChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One undecoded event frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(rename = "event")]
    pub channel: String,
    #[serde(default)]
    pub payload: Value,
}

impl RawEvent {
    pub fn new(channel: EventChannel, payload: Value) -> Self {
        Self {
            channel: channel.name().to_string(),
            payload,
        }
    }
}

/// Capacity of the frame queue between the socket reader and the consumer.
pub const EVENT_BUFFER: usize = 256;

/// Open an event subscription on `socket`.
///
/// Frames are forwarded in arrival order. The receiver yields `None` once the
/// daemon closes the connection.
pub async fn subscribe(socket: &Path) -> Result<mpsc::Receiver<RawEvent>, DaemonError> {
    let mut stream = connect(socket).await?;
    write_request(
        &mut stream,
        socket,
        &DaemonRequest::new("subscribe", Value::Null),
    )
    .await?;

    let mut lines = BufReader::new(stream).lines();
    let ack = lines
        .next_line()
        .await
        .map_err(|e| io_err(socket, e))?
        .ok_or_else(|| {
            DaemonError::Protocol("daemon closed connection before acknowledging subscribe".into())
        })?;
    let ack: DaemonResponse = serde_json::from_str(ack.trim_end())?;
    ack.into_data("subscribe")?;

    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let socket: PathBuf = socket.to_path_buf();
    tokio::spawn(async move {
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    tracing::info!(socket = %socket.display(), "daemon closed event subscription");
                    break;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "event subscription read failed");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            let event: RawEvent = match serde_json::from_str(&line) {
                Ok(event) => event,
                Err(err) => {
                    tracing::warn!(error = %err, "dropping malformed event frame");
                    continue;
                }
            };
            if tx.send(event).await.is_err() {
                break;
            }
        }
    });

    Ok(rx)
}
