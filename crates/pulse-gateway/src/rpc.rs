use std::{
    sync::atomic::{
        AtomicU64,
        Ordering,
    },
    time::Duration,
};

use serde::Deserialize;
use serde_json::{
    Value,
    json,
};
use tracing::{
    debug,
    warn,
};
use url::Url;

use crate::{
    cache::ResponseCache,
    error::RpcError,
};

/// Owner program of SPL token accounts.
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// JSON-RPC client for the upstream Solana node.
///
/// Successful calls populate the shared response cache; lookups inside the
/// TTL window short-circuit the network entirely. Concurrent identical
/// calls during a miss are not coalesced, each issues its own request.
pub struct RpcClient {
    http: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
    cache: ResponseCache,
    request_id: AtomicU64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Total supply figures, in lamports.
#[derive(Debug, Clone, Deserialize)]
pub struct SupplyInfo {
    pub value: SupplyValue,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplyValue {
    pub total: u64,
    pub circulating: Option<u64>,
    pub non_circulating: Option<u64>,
}

impl RpcClient {
    pub fn new(endpoint: Url, timeout: Duration, cache: ResponseCache) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            timeout,
            cache,
            request_id: AtomicU64::new(1),
        }
    }

    /// Issue a JSON-RPC call, consulting the response cache first.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let key = ResponseCache::key(method, &params);
        if let Some(cached) = self.cache.get(&key) {
            debug!(method, "serving upstream response from cache");
            return Ok(cached);
        }

        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(self.endpoint.clone())
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(classify_transport)?;
        let body: RpcResponse = response.json().await.map_err(classify_transport)?;

        if let Some(error) = body.error {
            warn!(method, code = error.code, message = %error.message, "upstream returned an error");
            metrics::counter!("pulse_rpc_upstream_error_total").increment(1);
            return Err(RpcError::Upstream {
                code: error.code,
                message: error.message,
            });
        }

        // The node answers an explicit `null` result for some calls (e.g.
        // getBlockTime outside its timestamp window); a missing result
        // field deserializes the same way.
        let result = body.result.unwrap_or(Value::Null);

        self.cache.insert(key, result.clone());
        metrics::counter!("pulse_rpc_call_total", "method" => method.to_string()).increment(1);
        Ok(result)
    }

    pub async fn get_slot(&self) -> Result<u64, RpcError> {
        let value = self.call("getSlot", json!([])).await?;
        as_u64(&value, "getSlot")
    }

    pub async fn get_supply(&self) -> Result<SupplyInfo, RpcError> {
        let value = self.call("getSupply", json!([])).await?;
        serde_json::from_value(value)
            .map_err(|err| RpcError::InvalidResponse(format!("getSupply: {err}")))
    }

    pub async fn get_cluster_nodes(&self) -> Result<Vec<Value>, RpcError> {
        let value = self.call("getClusterNodes", json!([])).await?;
        as_array(value, "getClusterNodes")
    }

    pub async fn get_version(&self) -> Result<Value, RpcError> {
        self.call("getVersion", json!([])).await
    }

    pub async fn get_transaction_count(&self) -> Result<u64, RpcError> {
        let value = self.call("getTransactionCount", json!([])).await?;
        as_u64(&value, "getTransactionCount")
    }

    /// Estimated production time of a slot. The node answers `null` for
    /// slots outside its timestamp window.
    pub async fn get_block_time(&self, slot: u64) -> Result<Option<i64>, RpcError> {
        let value = self.call("getBlockTime", json!([slot])).await?;
        match value {
            Value::Null => Ok(None),
            other => as_i64(&other, "getBlockTime").map(Some),
        }
    }

    pub async fn get_account_info(&self, address: &str) -> Result<Value, RpcError> {
        self.call("getAccountInfo", json!([address, {"encoding": "base64"}]))
            .await
    }

    pub async fn get_token_account_balance(&self, address: &str) -> Result<Value, RpcError> {
        self.call("getTokenAccountBalance", json!([address])).await
    }

    pub async fn get_signatures_for_address(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<Value>, RpcError> {
        let value = self
            .call("getSignaturesForAddress", json!([address, {"limit": limit}]))
            .await?;
        as_array(value, "getSignaturesForAddress")
    }
}

fn classify_transport(err: reqwest::Error) -> RpcError {
    if err.is_timeout() {
        RpcError::Timeout
    } else {
        RpcError::Transport(err)
    }
}

fn as_u64(value: &Value, method: &str) -> Result<u64, RpcError> {
    value
        .as_u64()
        .ok_or_else(|| RpcError::InvalidResponse(format!("{method} returned a non-integer result")))
}

fn as_i64(value: &Value, method: &str) -> Result<i64, RpcError> {
    value
        .as_i64()
        .ok_or_else(|| RpcError::InvalidResponse(format!("{method} returned a non-integer result")))
}

fn as_array(value: Value, method: &str) -> Result<Vec<Value>, RpcError> {
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(RpcError::InvalidResponse(format!(
            "{method} returned a non-array result"
        ))),
    }
}
