use std::{
    sync::Arc,
    time::Duration,
};

use pulse_core::FixedEstimator;
use pulse_watcher::{
    MetricsWatcher,
    NetworkMetrics,
    WatcherConfig,
};
use serde_json::json;
use tokio::time::timeout;
use url::Url;
use wiremock::{
    Mock,
    MockServer,
    ResponseTemplate,
    matchers::{
        method,
        path,
    },
};

fn snapshot_body(source: &str) -> serde_json::Value {
    json!({
        "success": true,
        "data": {
            "tps": 3200,
            "tvl": "$74.0B",
            "activeWallets": "1.4M",
            "validatorCount": 2914,
            "avgSlotTime": 395,
            "timestamp": "2025-01-01T00:00:00Z",
            "source": source,
        },
    })
}

fn fast_config(server: &MockServer) -> WatcherConfig {
    let endpoint = Url::parse(&format!("{}/api/solana/metrics", server.uri())).unwrap();
    WatcherConfig {
        refresh_interval: Duration::from_millis(10),
        request_timeout: Duration::from_millis(500),
        max_backoff: Duration::from_millis(40),
        ..WatcherConfig::new(endpoint)
    }
}

/// Live snapshots are merged wholesale and mark the state live.
#[tokio::test]
async fn live_snapshot_is_merged() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/solana/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_body("rpc")))
        .mount(&server)
        .await;

    let watcher =
        MetricsWatcher::spawn_with_estimator(fast_config(&server), Arc::new(FixedEstimator(0.5)));
    let mut rx = watcher.subscribe();

    timeout(Duration::from_secs(5), rx.changed())
        .await
        .expect("first poll")
        .unwrap();

    let state = rx.borrow().clone();
    assert!(state.is_live);
    assert_eq!(state.tps, 3200);
    assert_eq!(state.tvl, "$74.0B");
    assert_eq!(state.validator_count, 2914);
    assert_eq!(state.retry_count, 0);
    assert!(state.error.is_none());

    watcher.shutdown().await;
}

/// Gateway fallback data counts as a degraded tick: the numbers keep
/// moving but `is_live` drops.
#[tokio::test]
async fn fallback_snapshot_degrades_without_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/solana/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_body("fallback")))
        .mount(&server)
        .await;

    let watcher =
        MetricsWatcher::spawn_with_estimator(fast_config(&server), Arc::new(FixedEstimator(0.5)));
    let mut rx = watcher.subscribe();

    timeout(Duration::from_secs(5), rx.changed())
        .await
        .expect("first poll")
        .unwrap();

    let state = rx.borrow().clone();
    assert!(!state.is_live);
    assert_eq!(state.retry_count, 1);
    assert!(state.error.is_none());
    // The centered estimator leaves the defaults in place.
    assert_eq!(state.tps, 2847);

    watcher.shutdown().await;
}

/// After the retry budget is exhausted the watcher surfaces an error and
/// stops perturbing.
#[tokio::test]
async fn repeated_failures_surface_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/solana/metrics"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let watcher =
        MetricsWatcher::spawn_with_estimator(fast_config(&server), Arc::new(FixedEstimator(0.5)));
    let mut rx = watcher.subscribe();

    let errored = timeout(Duration::from_secs(10), async {
        loop {
            rx.changed().await.unwrap();
            let state = rx.borrow().clone();
            if state.error.is_some() {
                break state;
            }
            // Until the budget runs out, degraded ticks stay error-free.
            assert!(state.retry_count <= 3);
        }
    })
    .await
    .expect("error state");

    assert!(errored.retry_count > 3);
    assert!(!errored.is_live);
    // Perturbation stopped with the centered estimator never having moved
    // the defaults.
    assert_eq!(errored.tps, 2847);
    assert_eq!(errored.avg_slot_time, 412);

    watcher.shutdown().await;
}

/// Shutdown while a fetch is in flight discards the response: no state
/// change may be published afterwards.
#[tokio::test]
async fn shutdown_discards_in_flight_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/solana/metrics"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(snapshot_body("rpc"))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let watcher =
        MetricsWatcher::spawn_with_estimator(fast_config(&server), Arc::new(FixedEstimator(0.5)));
    let rx = watcher.subscribe();
    let initial = rx.borrow().clone();

    // Let the first fetch get airborne, then tear down mid-flight.
    tokio::time::sleep(Duration::from_millis(50)).await;
    watcher.shutdown().await;

    // Give a straggling response every chance to land before checking.
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(rx.borrow().clone(), initial);
    assert_eq!(initial, NetworkMetrics::default());
}
