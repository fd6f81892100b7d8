//! Domain types shared by the daemon client, the sync engine and the CLI.
//!
//! Wire payloads are the daemon's contracts: field names and tag layout must
//! match what the daemon serializes, so every enum that crosses the socket
//! uses an explicit `#[serde(tag, content)]` layout.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Swaps are keyed by the daemon-assigned UUID.
pub type SwapId = Uuid;

// ---------------------------------------------------------------------------
// Networks and endpoints
// ---------------------------------------------------------------------------

/// Which chain family the daemon is operating on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    pub fn is_testnet(self) -> bool {
        matches!(self, Network::Testnet)
    }

    /// Network id the daemon expects in `check_monero_node`.
    ///
    /// Bitcoin testnet swaps run against Monero stagenet.
    pub fn monero_network(self) -> &'static str {
        match self {
            Network::Mainnet => "Mainnet",
            Network::Testnet => "Stagenet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
        }
    }
}

/// Network-access mechanism for one of the two supported chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Bitcoin light-client endpoint.
    Electrum,
    /// Monero full node.
    Monero,
}

impl BackendKind {
    pub fn all() -> [BackendKind; 2] {
        [BackendKind::Electrum, BackendKind::Monero]
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Electrum => write!(f, "electrum"),
            BackendKind::Monero => write!(f, "monero"),
        }
    }
}

/// A candidate backend endpoint. Supplied by configuration, never persisted
/// by the sync engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub url: String,
    pub backend_kind: BackendKind,
    pub network: Network,
}

impl Endpoint {
    pub fn new(url: impl Into<String>, backend_kind: BackendKind, network: Network) -> Self {
        Self {
            url: url.into(),
            backend_kind,
            network,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} {})", self.url, self.backend_kind, self.network)
    }
}

/// Outcome of a single health probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub endpoint: Endpoint,
    pub available: bool,
}

/// Settings passed to `initialize_context`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContextSettings {
    pub electrum_rpc_url: Option<String>,
    pub monero_node_url: Option<String>,
    pub use_tor: bool,
}

// ---------------------------------------------------------------------------
// Context status
// ---------------------------------------------------------------------------

/// Readiness of the daemon's runtime context, as seen by this process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum ContextStatus {
    #[default]
    Uninitialized,
    Initializing(InitPhase),
    Available,
    Failed(String),
}

impl ContextStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, ContextStatus::Available)
    }

    /// Whether the daemon itself is driving this status: it is available or
    /// reporting component progress. A local bootstrap never replaces these.
    pub fn is_daemon_owned(&self) -> bool {
        matches!(
            self,
            ContextStatus::Available | ContextStatus::Initializing(InitPhase::Components(_))
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContextStatus::Uninitialized => "uninitialized",
            ContextStatus::Initializing(_) => "initializing",
            ContextStatus::Available => "available",
            ContextStatus::Failed(_) => "failed",
        }
    }
}

/// Where an in-flight initialization currently is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InitPhase {
    /// Probing candidate endpoints.
    SelectingNodes,
    /// `initialize_context` has been issued; waiting for the daemon.
    Requested,
    /// Per-component progress reported by the daemon.
    Components(Vec<ComponentProgress>),
}

/// Progress of one daemon-side initialization component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentProgress {
    pub component_name: String,
    pub progress: ComponentState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content")]
pub enum ComponentState {
    Pending,
    Progress { current: u64, total: u64 },
    Completed,
}

/// Payload of the `context-init-progress-update` channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content")]
pub enum ContextStatusEvent {
    NotInitialized,
    Initializing(Vec<ComponentProgress>),
    Available,
    Failed,
}

impl From<ContextStatusEvent> for ContextStatus {
    fn from(event: ContextStatusEvent) -> Self {
        match event {
            ContextStatusEvent::NotInitialized => ContextStatus::Uninitialized,
            ContextStatusEvent::Initializing(components) => {
                ContextStatus::Initializing(InitPhase::Components(components))
            }
            ContextStatusEvent::Available => ContextStatus::Available,
            ContextStatusEvent::Failed => ContextStatus::Failed(
                "daemon reported context initialization failure".to_string(),
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Swaps
// ---------------------------------------------------------------------------

/// Timelock position of a swap relative to the current block height.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content")]
pub enum ExpiredTimelocks {
    None { blocks_left: u32 },
    Cancel { blocks_left: u32 },
    Punish,
}

impl fmt::Display for ExpiredTimelocks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpiredTimelocks::None { blocks_left } => write!(f, "{blocks_left} blocks to cancel"),
            ExpiredTimelocks::Cancel { blocks_left } => {
                write!(f, "cancel expired, {blocks_left} blocks to punish")
            }
            ExpiredTimelocks::Punish => write!(f, "punish expired"),
        }
    }
}

/// Counterparty of a swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapSeller {
    pub peer_id: String,
    #[serde(default)]
    pub addresses: Vec<String>,
}

/// Full record of one swap as returned by `get_swap_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapInfo {
    pub swap_id: SwapId,
    pub seller: SwapSeller,
    pub completed: bool,
    pub start_date: String,
    pub state_name: String,
    /// Piconero.
    pub xmr_amount: u64,
    /// Satoshi.
    pub btc_amount: u64,
    #[serde(default)]
    pub tx_lock_id: Option<String>,
    #[serde(default)]
    pub tx_cancel_fee: u64,
    #[serde(default)]
    pub tx_refund_fee: u64,
    #[serde(default)]
    pub tx_lock_fee: u64,
    #[serde(default)]
    pub btc_refund_address: Option<String>,
    pub cancel_timelock: u32,
    pub punish_timelock: u32,
    #[serde(default)]
    pub timelock: Option<ExpiredTimelocks>,
}

/// One step of a running swap, as pushed on `swap-progress-update`.
///
/// The daemon's progress vocabulary grows over time, so the kind stays a
/// string and the content stays opaque JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapProgress {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: Value,
}

impl SwapProgress {
    /// The daemon emits this kind when it lets go of the swap.
    pub const RELEASED: &'static str = "Released";

    pub fn is_released(&self) -> bool {
        self.kind == Self::RELEASED
    }
}

/// State of a refund the daemon runs without user interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content")]
pub enum BackgroundRefundState {
    Started,
    Completed,
    Failed { error: String },
}

impl fmt::Display for BackgroundRefundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackgroundRefundState::Started => write!(f, "started"),
            BackgroundRefundState::Completed => write!(f, "completed"),
            BackgroundRefundState::Failed { error } => write!(f, "failed: {error}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sellers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Satoshi per XMR.
    pub price: u64,
    pub min_quantity: u64,
    pub max_quantity: u64,
}

/// A seller discovered at a rendezvous point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seller {
    pub peer_id: String,
    pub multiaddr: String,
    #[serde(default)]
    pub quote: Option<Quote>,
}

// ---------------------------------------------------------------------------
// Event payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapProgressEvent {
    pub swap_id: SwapId,
    pub event: SwapProgress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEmittedEvent {
    pub buffer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceChangeEvent {
    /// Satoshi.
    pub balance: u64,
}

/// Only a reference: the full record must be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseStateEvent {
    pub swap_id: SwapId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelockChangeEvent {
    pub swap_id: SwapId,
    pub timelock: Option<ExpiredTimelocks>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundRefundEvent {
    pub swap_id: SwapId,
    pub state: BackgroundRefundState,
}

// ---------------------------------------------------------------------------
// Logs
// ---------------------------------------------------------------------------

/// One daemon log line, kept verbatim with best-effort parsed fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub received_at: DateTime<Utc>,
    pub timestamp: Option<String>,
    pub level: Option<String>,
    pub target: Option<String>,
    pub message: String,
    pub raw: String,
}

impl LogEntry {
    /// Parse a daemon log buffer. The daemon writes `tracing` JSON lines;
    /// anything else is kept as a plain message.
    pub fn parse(buffer: &str, received_at: DateTime<Utc>) -> Self {
        let raw = buffer.trim_end().to_string();
        let parsed = serde_json::from_str::<Value>(&raw).ok();
        let field = |key: &str| {
            parsed
                .as_ref()
                .and_then(|v| v.get(key))
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        let message = parsed
            .as_ref()
            .and_then(|v| v.pointer("/fields/message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| raw.clone());

        Self {
            received_at,
            timestamp: field("timestamp"),
            level: field("level"),
            target: field("target"),
            message,
            raw,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
