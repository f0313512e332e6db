use thiserror::Error;

pub type Result<T, E = GatewayError> = std::result::Result<T, E>;

/// Top level error type for the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Bad address shape, surfaced to the caller as HTTP 400.
    #[error("{0}")]
    InvalidAddress(String),
    /// Malformed request body, surfaced to the caller as HTTP 400.
    #[error("{0}")]
    InvalidRequest(String),
    #[error("Account not found")]
    AccountNotFound,
    #[error("Query not recognized")]
    QueryNotRecognized,
    #[error("bind or socket error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Rpc(#[from] RpcError),
}

/// Failures surfaced by the upstream JSON-RPC client.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The node answered with a JSON-RPC error object.
    #[error("upstream RPC error code {code}: {message}")]
    Upstream { code: i64, message: String },
    #[error("upstream request timed out")]
    Timeout,
    #[error("upstream transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid upstream response: {0}")]
    InvalidResponse(String),
}
