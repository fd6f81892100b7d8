//! Client side of the swap daemon: command channel and event subscription.

pub mod client;
mod error;
pub mod events;
pub mod paths;
pub mod protocol;

pub use client::DaemonClient;
pub use error::DaemonError;
pub use events::{subscribe, EventChannel, RawEvent};
pub use protocol::{send_request, DaemonRequest, DaemonResponse, SocketTransport, Transport};
