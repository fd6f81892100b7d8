//! Decoding tests for daemon event payloads as they appear on the wire.

use rstest::rstest;
use serde_json::json;
use swapdesk_core::types::{
    BackgroundRefundEvent, BackgroundRefundState, BalanceChangeEvent, DatabaseStateEvent,
    ExpiredTimelocks, SwapInfo, SwapProgressEvent, TimelockChangeEvent,
};
use uuid::Uuid;

const SWAP: &str = "2b6b6a8e-8d3c-4c5e-9f3a-1d6f6f0d9a11";

fn swap_id() -> Uuid {
    Uuid::parse_str(SWAP).expect("uuid")
}

#[rstest]
#[case(json!({"type": "None", "content": {"blocks_left": 12}}), ExpiredTimelocks::None { blocks_left: 12 })]
#[case(json!({"type": "Cancel", "content": {"blocks_left": 3}}), ExpiredTimelocks::Cancel { blocks_left: 3 })]
#[case(json!({"type": "Punish"}), ExpiredTimelocks::Punish)]
fn timelock_change_decodes(#[case] timelock: serde_json::Value, #[case] expected: ExpiredTimelocks) {
    let event: TimelockChangeEvent =
        serde_json::from_value(json!({"swap_id": SWAP, "timelock": timelock})).expect("decode");
    assert_eq!(event.swap_id, swap_id());
    assert_eq!(event.timelock, Some(expected));
}

#[rstest]
#[case(json!({"type": "Started"}), BackgroundRefundState::Started)]
#[case(json!({"type": "Completed"}), BackgroundRefundState::Completed)]
#[case(
    json!({"type": "Failed", "content": {"error": "electrum unreachable"}}),
    BackgroundRefundState::Failed { error: "electrum unreachable".to_string() }
)]
fn background_refund_decodes(
    #[case] state: serde_json::Value,
    #[case] expected: BackgroundRefundState,
) {
    let event: BackgroundRefundEvent =
        serde_json::from_value(json!({"swap_id": SWAP, "state": state})).expect("decode");
    assert_eq!(event.state, expected);
}

#[test]
fn database_state_event_carries_only_reference() {
    let event: DatabaseStateEvent =
        serde_json::from_value(json!({"swap_id": SWAP})).expect("decode");
    assert_eq!(event.swap_id, swap_id());
}

#[test]
fn balance_event_decodes() {
    let event: BalanceChangeEvent =
        serde_json::from_value(json!({"balance": 12345})).expect("decode");
    assert_eq!(event.balance, 12345);
}

#[test]
fn progress_event_keeps_opaque_content() {
    let event: SwapProgressEvent = serde_json::from_value(json!({
        "swap_id": SWAP,
        "event": {"type": "BtcLockTxInMempool", "content": {"btc_lock_txid": "ab12", "btc_lock_confirmations": 1}}
    }))
    .expect("decode");
    assert_eq!(event.event.kind, "BtcLockTxInMempool");
    assert_eq!(event.event.content["btc_lock_confirmations"], json!(1));
}

#[test]
fn swap_info_tolerates_missing_optional_fields() {
    let info: SwapInfo = serde_json::from_value(json!({
        "swap_id": SWAP,
        "seller": {"peer_id": "12D3KooWseller"},
        "completed": false,
        "start_date": "2024-05-01 10:00:00",
        "state_name": "btc is locked",
        "xmr_amount": 1_000_000_000_000u64,
        "btc_amount": 150_000,
        "cancel_timelock": 72,
        "punish_timelock": 144
    }))
    .expect("decode");
    assert_eq!(info.swap_id, swap_id());
    assert!(info.timelock.is_none());
    assert!(info.seller.addresses.is_empty());
}
