use std::net::SocketAddr;

use serde::{
    Deserialize,
    Serialize,
};
use url::Url;

use crate::error::{
    GatewayError,
    Result,
};

/// Public mainnet endpoint used when no `SOLANA_RPC_URL` is configured.
pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Runtime configuration for the gateway.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Address the HTTP server listens on (e.g. `127.0.0.1:9080`).
    pub bind_addr: SocketAddr,
    /// Upstream Solana JSON-RPC endpoint.
    pub rpc_url: Url,
    /// Hard deadline for each upstream call, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// TTL for cached upstream responses, in milliseconds.
    #[serde(default = "default_rpc_cache_ttl_ms")]
    pub rpc_cache_ttl_ms: u64,
    /// TTL for the aggregated snapshot, in milliseconds.
    #[serde(default = "default_snapshot_ttl_ms")]
    pub snapshot_ttl_ms: u64,
}

const fn default_request_timeout_secs() -> u64 {
    5
}

const fn default_rpc_cache_ttl_ms() -> u64 {
    1_500
}

const fn default_snapshot_ttl_ms() -> u64 {
    1_500
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 9080)),
            rpc_url: Url::parse(DEFAULT_RPC_URL).expect("static URL"),
            request_timeout_secs: default_request_timeout_secs(),
            rpc_cache_ttl_ms: default_rpc_cache_ttl_ms(),
            snapshot_ttl_ms: default_snapshot_ttl_ms(),
        }
    }
}

impl GatewayConfig {
    /// Validates a configuration loaded from CLI flags or disk.
    pub fn validate(self) -> Result<Self> {
        if self.request_timeout_secs == 0 {
            return Err(GatewayError::InvalidConfig(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        if self.rpc_cache_ttl_ms == 0 {
            return Err(GatewayError::InvalidConfig(
                "rpc_cache_ttl_ms must be positive".to_string(),
            ));
        }
        if self.snapshot_ttl_ms == 0 {
            return Err(GatewayError::InvalidConfig(
                "snapshot_ttl_ms must be positive".to_string(),
            ));
        }
        Ok(self)
    }
}
