//! Polling client for the Solana Pulse gateway.
//!
//! [`MetricsWatcher`] runs a self-rescheduling loop that fetches the
//! aggregated snapshot, merges it into a [`NetworkMetrics`] view-state, and
//! publishes every change over a `tokio::sync::watch` channel. A fetch is
//! always awaited to completion before the next tick is scheduled, so polls
//! can never overlap. Failures (and gateway fallback data) are tolerated
//! with synthetic perturbation and a backoff that doubles up to a ceiling;
//! after `max_retries` consecutive failures a visible error is surfaced
//! instead.

mod state;
mod watcher;

use thiserror::Error;

pub use state::NetworkMetrics;
pub use watcher::{
    MetricsWatcher,
    WatcherConfig,
};

pub type Result<T, E = WatchError> = std::result::Result<T, E>;

/// Failures observed while polling the gateway. All variants are
/// recoverable; they only feed the watcher's failure classification.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to decode metrics payload: {0}")]
    Decode(reqwest::Error),
    #[error("gateway reported failure: {0}")]
    Gateway(String),
}
