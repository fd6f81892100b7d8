//! swapdesk core library: domain types, wire payloads, configuration.
//!
//! - [`types`]: endpoints, context status, swap records, event payloads
//! - [`config`]: candidate endpoints and timing knobs, load / save
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, NodeLists, DEFAULT_RENDEZVOUS_POINT};
pub use error::ConfigError;
pub use types::{
    BackendKind, BackgroundRefundState, ContextSettings, ContextStatus, Endpoint,
    ExpiredTimelocks, InitPhase, LogEntry, Network, ProbeResult, Seller, SwapId, SwapInfo,
    SwapProgress,
};
