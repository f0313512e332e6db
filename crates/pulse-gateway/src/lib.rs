//! Solana Pulse gateway.
//!
//! This crate exposes two integration surfaces:
//!
//! - [`Gateway`], a ready-to-run HTTP server that aggregates upstream
//!   JSON-RPC data into the dashboard's metrics API.
//! - Library pieces ([`rpc::RpcClient`], [`cache::ResponseCache`],
//!   [`aggregator::MetricsAggregator`]) that other services can embed
//!   without running the standalone server.
//!
//! The metrics pipeline is best-effort by design: upstream failures degrade
//! individual fields and flip the snapshot's `source` tag to `fallback`,
//! they never surface as errors to HTTP callers.

pub mod aggregator;
pub mod analyze;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod query;
pub mod rpc;
pub mod server;

pub use config::GatewayConfig;
pub use error::{
    GatewayError,
    Result,
    RpcError,
};
pub use server::{
    Gateway,
    GatewayBuilder,
};
