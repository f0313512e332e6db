//! Shared building blocks for the Solana Pulse workspace.
//!
//! This crate carries the value types exchanged between the gateway and its
//! clients ([`MetricsSnapshot`], [`ContractInfo`], the API envelopes), the
//! [`Estimator`] seam through which all randomized synthesis flows, and the
//! display-formatting helpers used by the aggregator.

pub mod estimator;
pub mod format;
pub mod types;

pub use estimator::{
    Estimator,
    FixedEstimator,
    ThreadRngEstimator,
};
pub use types::{
    ApiError,
    ContractInfo,
    MetricsResponse,
    MetricsSnapshot,
    MetricsSource,
    TokenInfo,
    TransactionActivity,
};
