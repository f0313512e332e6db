use chrono::Utc;
use serde_json::{
    Value,
    json,
};

use crate::{
    error::{
        GatewayError,
        Result,
    },
    rpc::RpcClient,
};

/// Dispatch a free-text query by keyword substring.
///
/// `slot` wins over `transaction`, which wins over `nodes`/`validators`,
/// preserving the dashboard's historical precedence. Unlike the metrics
/// pipeline, these lookups have no fallback: upstream failure surfaces to
/// the caller.
pub async fn execute_query(rpc: &RpcClient, query: &str) -> Result<Value> {
    let lowered = query.to_lowercase();

    if lowered.contains("slot") {
        let (slot, supply, version) = tokio::try_join!(
            rpc.call("getSlot", json!([])),
            rpc.call("getSupply", json!([])),
            rpc.get_version(),
        )?;
        return Ok(json!({
            "slot": slot,
            "supply": supply,
            "version": version,
            "timestamp": Utc::now().to_rfc3339(),
        }));
    }

    if lowered.contains("transaction") {
        let count = rpc.get_transaction_count().await?;
        return Ok(json!(count));
    }

    if lowered.contains("nodes") || lowered.contains("validators") {
        let nodes = rpc.get_cluster_nodes().await?;
        return Ok(Value::Array(nodes));
    }

    Err(GatewayError::QueryNotRecognized)
}
