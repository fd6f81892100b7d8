//! Typed wrapper over the daemon's remote command surface.
//!
//! Every method is one request/response round trip; none of them retries.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use swapdesk_core::types::{ContextSettings, Network, Seller, SwapId, SwapInfo};

use crate::error::DaemonError;
use crate::protocol::Transport;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceResponse {
    /// Satoshi.
    pub balance: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawResponse {
    pub txid: String,
    #[serde(default)]
    pub amount: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryKeys {
    pub address: String,
    pub spend_key: String,
    pub view_key: String,
    pub restore_height: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogsResponse {
    pub logs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellersResponse {
    pub sellers: Vec<Seller>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletDescriptor {
    pub descriptor: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeCheckResponse {
    pub available: bool,
}

/// Handle to the daemon. Cheap to clone; all clones share one transport.
#[derive(Clone)]
pub struct DaemonClient {
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for DaemonClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DaemonClient").finish_non_exhaustive()
    }
}

impl DaemonClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn call<T: DeserializeOwned>(&self, cmd: &str, args: Value) -> Result<T, DaemonError> {
        let data = self.transport.invoke(cmd, args).await?;
        serde_json::from_value(data).map_err(|err| {
            DaemonError::Protocol(format!("malformed '{cmd}' response: {err}"))
        })
    }

    async fn call_unit(&self, cmd: &str, args: Value) -> Result<(), DaemonError> {
        self.transport.invoke(cmd, args).await.map(|_| ())
    }

    pub async fn get_balance(&self, force_refresh: bool) -> Result<BalanceResponse, DaemonError> {
        self.call("get_balance", json!({ "force_refresh": force_refresh }))
            .await
    }

    pub async fn get_swap_infos_all(&self) -> Result<Vec<SwapInfo>, DaemonError> {
        self.call("get_swap_infos_all", Value::Null).await
    }

    pub async fn get_swap_info(&self, swap_id: SwapId) -> Result<SwapInfo, DaemonError> {
        self.call("get_swap_info", json!({ "swap_id": swap_id }))
            .await
    }

    /// Withdraw to `address`; `None` sweeps the whole balance.
    pub async fn withdraw_btc(
        &self,
        address: &str,
        amount: Option<u64>,
    ) -> Result<WithdrawResponse, DaemonError> {
        self.call(
            "withdraw_btc",
            json!({ "address": address, "amount": amount }),
        )
        .await
    }

    pub async fn buy_xmr(
        &self,
        seller: &str,
        monero_receive_address: &str,
        bitcoin_change_address: Option<&str>,
    ) -> Result<(), DaemonError> {
        self.call_unit(
            "buy_xmr",
            json!({
                "seller": seller,
                "monero_receive_address": monero_receive_address,
                "bitcoin_change_address": bitcoin_change_address,
            }),
        )
        .await
    }

    pub async fn resume_swap(&self, swap_id: SwapId) -> Result<(), DaemonError> {
        self.call_unit("resume_swap", json!({ "swap_id": swap_id }))
            .await
    }

    pub async fn suspend_current_swap(&self) -> Result<(), DaemonError> {
        self.call_unit("suspend_current_swap", Value::Null).await
    }

    pub async fn monero_recovery(&self, swap_id: SwapId) -> Result<RecoveryKeys, DaemonError> {
        self.call("monero_recovery", json!({ "swap_id": swap_id }))
            .await
    }

    pub async fn is_context_available(&self) -> Result<bool, DaemonError> {
        self.call("is_context_available", Value::Null).await
    }

    pub async fn get_logs(&self, swap_id: SwapId, redact: bool) -> Result<LogsResponse, DaemonError> {
        self.call("get_logs", json!({ "swap_id": swap_id, "redact": redact }))
            .await
    }

    pub async fn list_sellers(&self, rendezvous_point: &str) -> Result<SellersResponse, DaemonError> {
        self.call(
            "list_sellers",
            json!({ "rendezvous_point": rendezvous_point }),
        )
        .await
    }

    pub async fn initialize_context(
        &self,
        settings: &ContextSettings,
        testnet: bool,
    ) -> Result<(), DaemonError> {
        self.call_unit(
            "initialize_context",
            json!({ "settings": settings, "testnet": testnet }),
        )
        .await
    }

    pub async fn get_wallet_descriptor(&self) -> Result<WalletDescriptor, DaemonError> {
        self.call("get_wallet_descriptor", Value::Null).await
    }

    pub async fn check_monero_node(
        &self,
        url: &str,
        network: Network,
    ) -> Result<NodeCheckResponse, DaemonError> {
        self.call(
            "check_monero_node",
            json!({ "url": url, "network": network.monero_network() }),
        )
        .await
    }

    pub async fn check_electrum_node(&self, url: &str) -> Result<NodeCheckResponse, DaemonError> {
        self.call("check_electrum_node", json!({ "url": url }))
            .await
    }

    pub async fn get_monero_addresses(&self) -> Result<Vec<String>, DaemonError> {
        self.call("get_monero_addresses", Value::Null).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(String, Value)>>,
    }

    #[async_trait]
    impl Transport for Recorder {
        async fn invoke(&self, cmd: &str, args: Value) -> Result<Value, DaemonError> {
            self.calls
                .lock()
                .expect("lock")
                .push((cmd.to_string(), args));
            match cmd {
                "is_context_available" => Ok(json!(true)),
                "check_monero_node" => Ok(json!({"available": false})),
                "get_balance" => Ok(json!({"balance": "not a number"})),
                _ => Ok(Value::Null),
            }
        }
    }

    #[tokio::test]
    async fn commands_are_sent_by_name_with_args() {
        let recorder = Arc::new(Recorder::default());
        let client = DaemonClient::new(recorder.clone());

        assert!(client.is_context_available().await.expect("ready"));
        let check = client
            .check_monero_node("http://node:38081", Network::Testnet)
            .await
            .expect("check");
        assert!(!check.available);
        client
            .buy_xmr("/ip4/1.2.3.4/tcp/9939/p2p/seller", "5xmr", None)
            .await
            .expect("buy");

        let calls = recorder.calls.lock().expect("lock");
        assert_eq!(calls[0].0, "is_context_available");
        assert_eq!(
            calls[1].1,
            json!({"url": "http://node:38081", "network": "Stagenet"})
        );
        assert_eq!(calls[2].1["bitcoin_change_address"], Value::Null);
    }

    #[tokio::test]
    async fn malformed_response_is_protocol_error() {
        let client = DaemonClient::new(Arc::new(Recorder::default()));
        let err = client.get_balance(false).await.unwrap_err();
        assert!(matches!(err, DaemonError::Protocol(_)), "got: {err}");
        assert!(err.to_string().contains("get_balance"));
    }
}
