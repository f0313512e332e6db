use serde::{
    Deserialize,
    Serialize,
};

/// Where the numbers in a snapshot came from.
///
/// `Fallback` is a normal steady state, not an error: the gateway serves it
/// whenever the upstream node is rate-limiting or unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricsSource {
    Rpc,
    Fallback,
}

/// One point-in-time aggregated metrics result.
///
/// Field names on the wire keep the dashboard's historical camelCase shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// Estimated transactions per second.
    pub tps: u64,
    /// Formatted value-locked estimate, e.g. `"$16.6B"`.
    pub tvl: String,
    /// Formatted active wallet count, e.g. `"1.2M"`.
    pub active_wallets: String,
    pub validator_count: u64,
    /// Average slot time in milliseconds.
    pub avg_slot_time: u64,
    /// RFC 3339 timestamp of when the snapshot was assembled.
    pub timestamp: String,
    pub source: MetricsSource,
}

/// Success envelope returned by `GET /api/solana/metrics`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub success: bool,
    pub data: MetricsSnapshot,
}

/// Failure envelope shared by all gateway endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub success: bool,
    pub error: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Profile of an on-chain account assembled by the analyze endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInfo {
    pub address: String,
    pub owner: String,
    pub executable: bool,
    pub lamports: u64,
    pub data_size: usize,
    pub program_id: String,
    /// `"Program"` for executable accounts, `"Account"` otherwise.
    pub account_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_info: Option<TokenInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transactions: Option<TransactionActivity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<String>,
}

/// Balance details for SPL token accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supply: Option<String>,
}

/// Signature activity observed for an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionActivity {
    pub total: usize,
    pub recent: usize,
}
