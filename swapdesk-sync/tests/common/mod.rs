//! In-process stand-ins for the daemon and for endpoint probes.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::time::Instant;

use swapdesk_core::types::{
    BackendKind, Endpoint, Network, SwapId, SwapInfo, SwapSeller,
};
use swapdesk_daemon::{DaemonClient, DaemonError, Transport};
use swapdesk_sync::Prober;

#[derive(Debug, Clone)]
pub struct Call {
    pub cmd: String,
    pub args: Value,
    pub at: Instant,
}

/// Scriptable daemon answering the command surface from memory.
#[derive(Default)]
pub struct FakeDaemon {
    pub calls: Mutex<Vec<Call>>,
    pub ready: AtomicBool,
    /// Number of upcoming `initialize_context` calls that are rejected.
    pub init_failures: AtomicU32,
    pub healthy_nodes: Mutex<HashSet<String>>,
    pub swaps: Mutex<HashMap<SwapId, SwapInfo>>,
    pub balance: Mutex<u64>,
}

impl FakeDaemon {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn client(self: &Arc<Self>) -> DaemonClient {
        DaemonClient::new(self.clone())
    }

    pub fn calls_to(&self, cmd: &str) -> Vec<Call> {
        self.calls
            .lock()
            .expect("lock")
            .iter()
            .filter(|call| call.cmd == cmd)
            .cloned()
            .collect()
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls
            .lock()
            .expect("lock")
            .iter()
            .map(|call| call.cmd.clone())
            .collect()
    }

    pub fn put_swap(&self, info: SwapInfo) {
        self.swaps.lock().expect("lock").insert(info.swap_id, info);
    }

    pub fn mark_healthy(&self, url: &str) {
        self.healthy_nodes.lock().expect("lock").insert(url.to_string());
    }

    fn rejected(cmd: &str, message: &str) -> DaemonError {
        DaemonError::Command {
            cmd: cmd.to_string(),
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl Transport for FakeDaemon {
    async fn invoke(&self, cmd: &str, args: Value) -> Result<Value, DaemonError> {
        self.calls.lock().expect("lock").push(Call {
            cmd: cmd.to_string(),
            args: args.clone(),
            at: Instant::now(),
        });

        match cmd {
            "is_context_available" => Ok(json!(self.ready.load(Ordering::SeqCst))),
            "initialize_context" => {
                let remaining = self.init_failures.load(Ordering::SeqCst);
                if remaining > 0 {
                    self.init_failures.store(remaining - 1, Ordering::SeqCst);
                    Err(Self::rejected(cmd, "context initialization refused"))
                } else {
                    Ok(Value::Null)
                }
            }
            "check_electrum_node" | "check_monero_node" => {
                let url = args["url"].as_str().unwrap_or_default();
                let available = self.healthy_nodes.lock().expect("lock").contains(url);
                Ok(json!({ "available": available }))
            }
            "get_swap_info" => {
                let swap_id: SwapId =
                    serde_json::from_value(args["swap_id"].clone()).expect("swap id");
                match self.swaps.lock().expect("lock").get(&swap_id) {
                    Some(info) => Ok(serde_json::to_value(info).expect("encode")),
                    None => Err(Self::rejected(cmd, "swap not found")),
                }
            }
            "get_swap_infos_all" => {
                let swaps: Vec<SwapInfo> =
                    self.swaps.lock().expect("lock").values().cloned().collect();
                Ok(serde_json::to_value(swaps).expect("encode"))
            }
            "get_balance" => Ok(json!({ "balance": *self.balance.lock().expect("lock") })),
            _ => Ok(Value::Null),
        }
    }
}

pub fn swap_info(swap_id: SwapId, state_name: &str) -> SwapInfo {
    SwapInfo {
        swap_id,
        seller: SwapSeller {
            peer_id: "12D3KooWseller".to_string(),
            addresses: vec!["/ip4/10.0.0.1/tcp/9939".to_string()],
        },
        completed: false,
        start_date: "2024-05-01 10:00:00".to_string(),
        state_name: state_name.to_string(),
        xmr_amount: 1_000_000_000_000,
        btc_amount: 150_000,
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

// ---------------------------------------------------------------------------
// Probes
// ---------------------------------------------------------------------------

/// How a scripted endpoint answers its probe.
#[derive(Debug, Clone, Copy)]
pub enum Health {
    Up(Duration),
    Down(Duration),
    /// The probe never resolves.
    Hang,
}

#[derive(Default)]
pub struct ScriptedProber {
    script: HashMap<String, Health>,
    pub finished: AtomicUsize,
}

impl ScriptedProber {
    pub fn new(script: &[(&str, Health)]) -> Arc<Self> {
        Arc::new(Self {
            script: script
                .iter()
                .map(|(url, health)| (url.to_string(), *health))
                .collect(),
            finished: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, endpoint: &Endpoint) -> bool {
        let health = self
            .script
            .get(&endpoint.url)
            .copied()
            .unwrap_or(Health::Down(Duration::ZERO));
        let available = match health {
            Health::Up(delay) => {
                tokio::time::sleep(delay).await;
                true
            }
            Health::Down(delay) => {
                tokio::time::sleep(delay).await;
                false
            }
            Health::Hang => std::future::pending().await,
        };
        self.finished.fetch_add(1, Ordering::SeqCst);
        available
    }
}

pub fn electrum(url: &str) -> Endpoint {
    Endpoint::new(url, BackendKind::Electrum, Network::Mainnet)
}

pub fn monero(url: &str) -> Endpoint {
    Endpoint::new(url, BackendKind::Monero, Network::Mainnet)
}
