mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use rstest::rstest;
use tokio::time::Instant;

use swapdesk_core::config::Config;
use swapdesk_core::types::{BackendKind, Network};
use swapdesk_sync::{probe_all, select, select_all, Prober};

use common::{electrum, monero, Health, ScriptedProber};

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn as_prober(prober: &Arc<ScriptedProber>) -> Arc<dyn Prober> {
    prober.clone()
}

#[rstest]
#[case::instant(Duration::ZERO, Duration::ZERO)]
#[case::b_faster(ms(5), ms(40))]
#[case::c_faster(ms(40), ms(5))]
#[tokio::test(start_paused = true)]
async fn down_candidate_is_never_selected(#[case] b_delay: Duration, #[case] c_delay: Duration) {
    let prober = ScriptedProber::new(&[
        ("tcp://a:50001", Health::Down(Duration::ZERO)),
        ("tcp://b:50001", Health::Up(b_delay)),
        ("tcp://c:50001", Health::Up(c_delay)),
    ]);
    let candidates = [electrum("tcp://a:50001"), electrum("tcp://b:50001"), electrum("tcp://c:50001")];

    let selected = select(&as_prober(&prober), &candidates, BackendKind::Electrum, Network::Mainnet)
        .await
        .expect("a reachable candidate exists");

    assert!(
        selected.url == "tcp://b:50001" || selected.url == "tcp://c:50001",
        "selected {selected}",
    );
}

#[tokio::test(start_paused = true)]
async fn empty_candidate_list_selects_nothing() {
    let prober = ScriptedProber::new(&[]);
    let selected = select(&as_prober(&prober), &[], BackendKind::Monero, Network::Mainnet).await;
    assert!(selected.is_none());
}

#[tokio::test(start_paused = true)]
async fn all_down_selects_nothing() {
    let prober = ScriptedProber::new(&[
        ("http://x:18081", Health::Down(ms(10))),
        ("http://y:18081", Health::Down(ms(20))),
    ]);
    let candidates = [monero("http://x:18081"), monero("http://y:18081")];
    let selected =
        select(&as_prober(&prober), &candidates, BackendKind::Monero, Network::Mainnet).await;
    assert!(selected.is_none());
}

#[tokio::test(start_paused = true)]
async fn hanging_probe_does_not_delay_first_success() {
    let prober = ScriptedProber::new(&[
        ("tcp://hang:50001", Health::Hang),
        ("tcp://up:50001", Health::Up(Duration::ZERO)),
    ]);
    let candidates = [electrum("tcp://hang:50001"), electrum("tcp://up:50001")];

    let selected = tokio::time::timeout(
        Duration::from_secs(60),
        select(&as_prober(&prober), &candidates, BackendKind::Electrum, Network::Mainnet),
    )
    .await
    .expect("selection must not wait for the hanging probe");

    assert_eq!(selected.map(|e| e.url).as_deref(), Some("tcp://up:50001"));
}

#[tokio::test(start_paused = true)]
async fn first_success_wins_not_first_response() {
    let prober = ScriptedProber::new(&[
        ("tcp://fast-down:50001", Health::Down(ms(1))),
        ("tcp://slow-up:50001", Health::Up(ms(80))),
        ("tcp://slower-up:50001", Health::Up(ms(120))),
    ]);
    // List order puts the slowest healthy node first; it must not matter.
    let candidates = [
        electrum("tcp://slower-up:50001"),
        electrum("tcp://fast-down:50001"),
        electrum("tcp://slow-up:50001"),
    ];

    let started = Instant::now();
    let selected = select(&as_prober(&prober), &candidates, BackendKind::Electrum, Network::Mainnet)
        .await
        .expect("selected");

    assert_eq!(selected.url, "tcp://slow-up:50001");
    let elapsed = started.elapsed();
    assert!(elapsed >= ms(80) && elapsed < ms(120), "resolved after {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn losing_probes_run_to_completion() {
    let prober = ScriptedProber::new(&[
        ("tcp://winner:50001", Health::Up(ms(10))),
        ("tcp://loser:50001", Health::Up(ms(200))),
    ]);
    let candidates = [electrum("tcp://winner:50001"), electrum("tcp://loser:50001")];

    let selected = select(&as_prober(&prober), &candidates, BackendKind::Electrum, Network::Mainnet)
        .await
        .expect("selected");
    assert_eq!(selected.url, "tcp://winner:50001");
    assert_eq!(prober.finished.load(Ordering::SeqCst), 1);

    tokio::time::sleep(ms(500)).await;
    assert_eq!(
        prober.finished.load(Ordering::SeqCst),
        2,
        "the losing probe is detached, not cancelled"
    );
}

#[tokio::test(start_paused = true)]
async fn candidates_of_other_kinds_are_ignored() {
    let prober = ScriptedProber::new(&[("http://monero:18081", Health::Up(Duration::ZERO))]);
    let candidates = [monero("http://monero:18081")];
    let selected =
        select(&as_prober(&prober), &candidates, BackendKind::Electrum, Network::Mainnet).await;
    assert!(selected.is_none());
}

#[tokio::test(start_paused = true)]
async fn backend_kinds_are_selected_in_parallel() {
    let prober = ScriptedProber::new(&[
        ("tcp://e:50001", Health::Up(ms(100))),
        ("http://m:18081", Health::Up(ms(100))),
    ]);
    let mut config = Config::default();
    config.nodes.electrum.mainnet = vec!["tcp://e:50001".to_string()];
    config.nodes.monero.mainnet = vec!["http://m:18081".to_string()];

    let started = Instant::now();
    let resolved = select_all(&as_prober(&prober), &config).await;

    assert_eq!(resolved.electrum.map(|e| e.url).as_deref(), Some("tcp://e:50001"));
    assert_eq!(resolved.monero.map(|e| e.url).as_deref(), Some("http://m:18081"));
    assert!(
        started.elapsed() < ms(200),
        "kinds must not be probed one after the other"
    );
}

#[tokio::test(start_paused = true)]
async fn probe_all_reports_every_candidate_in_order() {
    let prober = ScriptedProber::new(&[
        ("tcp://slow:50001", Health::Up(ms(50))),
        ("tcp://down:50001", Health::Down(ms(1))),
    ]);
    let candidates = [electrum("tcp://slow:50001"), electrum("tcp://down:50001")];

    let results = probe_all(&as_prober(&prober), &candidates).await;

    let report: Vec<(&str, bool)> = results
        .iter()
        .map(|r| (r.endpoint.url.as_str(), r.available))
        .collect();
    assert_eq!(report, vec![("tcp://slow:50001", true), ("tcp://down:50001", false)]);
}
