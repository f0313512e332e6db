use std::{
    sync::Arc,
    time::Duration,
};

use pulse_core::{
    Estimator,
    MetricsResponse,
    MetricsSnapshot,
    MetricsSource,
    ThreadRngEstimator,
};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::sleep,
};
use tokio_util::sync::CancellationToken;
use tracing::{
    debug,
    warn,
};
use url::Url;

use crate::{
    Result,
    WatchError,
    state::NetworkMetrics,
};

/// Configuration for the polling loop.
#[derive(Clone, Debug)]
pub struct WatcherConfig {
    /// Gateway metrics endpoint, e.g.
    /// `http://127.0.0.1:9080/api/solana/metrics`.
    pub endpoint: Url,
    /// Cadence between polls under normal operation.
    pub refresh_interval: Duration,
    /// Hard deadline for each poll request.
    pub request_timeout: Duration,
    /// Consecutive failures tolerated before an error is surfaced.
    pub max_retries: u32,
    /// Ceiling for the delay while failures persist.
    pub max_backoff: Duration,
}

impl WatcherConfig {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            refresh_interval: Duration::from_secs(5),
            request_timeout: Duration::from_secs(5),
            max_retries: 3,
            max_backoff: Duration::from_secs(10),
        }
    }
}

/// Handle to a spawned polling loop.
///
/// Dropping the handle does not stop the loop; call
/// [`MetricsWatcher::shutdown`] so in-flight responses are discarded
/// instead of applied to state.
pub struct MetricsWatcher {
    rx: watch::Receiver<NetworkMetrics>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl MetricsWatcher {
    /// Spawn the loop with the production estimator.
    pub fn spawn(config: WatcherConfig) -> Self {
        Self::spawn_with_estimator(config, Arc::new(ThreadRngEstimator))
    }

    pub fn spawn_with_estimator(config: WatcherConfig, estimator: Arc<dyn Estimator>) -> Self {
        let (tx, rx) = watch::channel(NetworkMetrics::default());
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_poll_loop(config, estimator, tx, cancel.clone()));
        Self { rx, cancel, task }
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<NetworkMetrics> {
        self.rx.clone()
    }

    /// Snapshot of the current state.
    pub fn current(&self) -> NetworkMetrics {
        self.rx.borrow().clone()
    }

    /// Stop the loop and wait for it to wind down.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }
}

/// One fetch per iteration, awaited to completion before the next delay is
/// scheduled, so polls never overlap regardless of response latency.
async fn run_poll_loop(
    config: WatcherConfig,
    estimator: Arc<dyn Estimator>,
    tx: watch::Sender<NetworkMetrics>,
    cancel: CancellationToken,
) {
    let http = reqwest::Client::new();
    let mut delay = config.refresh_interval;

    loop {
        let outcome = tokio::select! {
            () = cancel.cancelled() => break,
            outcome = fetch_snapshot(&http, &config) => outcome,
        };

        // A response racing shutdown is discarded before any state change.
        if cancel.is_cancelled() {
            break;
        }

        let mut state = tx.borrow().clone();
        match outcome {
            Ok(snapshot) if snapshot.source == MetricsSource::Rpc => {
                state.merge(&snapshot);
                delay = config.refresh_interval;
            }
            Ok(snapshot) => {
                debug!(source = ?snapshot.source, "gateway served fallback data");
                degrade(&mut state, &config, estimator.as_ref());
                delay = (delay * 2).min(config.max_backoff);
            }
            Err(err) => {
                warn!(%err, "metrics poll failed");
                degrade(&mut state, &config, estimator.as_ref());
                delay = (delay * 2).min(config.max_backoff);
            }
        }
        let _ = tx.send(state);

        tokio::select! {
            () = cancel.cancelled() => break,
            () = sleep(delay) => {}
        }
    }

    debug!("metrics watcher stopped");
}

/// Classify a degraded tick: perturb while the retry budget lasts, then
/// surface a visible error and stop synthesizing.
fn degrade(state: &mut NetworkMetrics, config: &WatcherConfig, estimator: &dyn Estimator) {
    state.retry_count += 1;
    if state.retry_count <= config.max_retries {
        state.perturb(estimator);
    } else {
        state.is_live = false;
        state.error = Some("Failed to fetch live metrics".to_string());
    }
}

async fn fetch_snapshot(
    http: &reqwest::Client,
    config: &WatcherConfig,
) -> Result<MetricsSnapshot> {
    let response = http
        .get(config.endpoint.clone())
        .timeout(config.request_timeout)
        .send()
        .await?
        .error_for_status()?;
    let body: MetricsResponse = response.json().await.map_err(WatchError::Decode)?;
    if !body.success {
        return Err(WatchError::Gateway(
            "metrics endpoint reported failure".to_string(),
        ));
    }
    Ok(body.data)
}
