use chrono::Utc;
use pulse_core::{
    Estimator,
    MetricsSnapshot,
};

/// View-facing metrics state maintained by the polling loop.
///
/// Starts from static defaults and is only ever mutated by the loop; the
/// snapshot-shaped fields always hold the last merged (or perturbed)
/// values, so a consumer can render them at any time.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkMetrics {
    pub tps: u64,
    pub tvl: String,
    pub active_wallets: String,
    pub validator_count: u64,
    /// Average slot time in milliseconds.
    pub avg_slot_time: u64,
    /// True while the gateway is serving live (`source = rpc`) data.
    pub is_live: bool,
    /// Consecutive failed or degraded polls.
    pub retry_count: u32,
    /// Non-null once failures have exhausted the retry budget.
    pub error: Option<String>,
    /// RFC 3339 timestamp of the last state change, empty before the
    /// first poll completes.
    pub last_update: String,
}

impl Default for NetworkMetrics {
    fn default() -> Self {
        Self {
            tps: 2847,
            tvl: "$8.2B".to_string(),
            active_wallets: "1.2M".to_string(),
            validator_count: 3847,
            avg_slot_time: 412,
            is_live: false,
            retry_count: 0,
            error: None,
            last_update: String::new(),
        }
    }
}

impl NetworkMetrics {
    /// Merge a live snapshot, resetting failure tracking.
    pub(crate) fn merge(&mut self, snapshot: &MetricsSnapshot) {
        self.tps = snapshot.tps;
        self.tvl = snapshot.tvl.clone();
        self.active_wallets = snapshot.active_wallets.clone();
        self.validator_count = snapshot.validator_count;
        self.avg_slot_time = snapshot.avg_slot_time;
        self.is_live = true;
        self.retry_count = 0;
        self.error = None;
        self.last_update = Utc::now().to_rfc3339();
    }

    /// Small perturbation of the current numbers so the view keeps moving
    /// while the gateway is degraded.
    pub(crate) fn perturb(&mut self, estimator: &dyn Estimator) {
        let tps_jitter = (estimator.sample() - 0.5) * 50.0;
        self.tps = (self.tps as f64 + tps_jitter).max(0.0) as u64;
        let slot_jitter = (estimator.sample() - 0.5) * 20.0;
        self.avg_slot_time = (self.avg_slot_time as f64 + slot_jitter).max(1.0) as u64;
        self.is_live = false;
        self.last_update = Utc::now().to_rfc3339();
    }
}
