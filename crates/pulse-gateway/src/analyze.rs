use chrono::DateTime;
use pulse_core::{
    ContractInfo,
    TokenInfo,
    TransactionActivity,
};
use serde_json::Value;
use tracing::debug;

use crate::{
    error::{
        GatewayError,
        Result,
    },
    rpc::{
        RpcClient,
        TOKEN_PROGRAM_ID,
    },
};

/// Validate the shape of a submitted address before any upstream call.
/// Base58-encoded Solana addresses are 32 to 44 characters long.
pub fn validate_address(address: &str) -> Result<()> {
    if address.is_empty() {
        return Err(GatewayError::InvalidAddress(
            "Valid contract address is required".to_string(),
        ));
    }
    if address.len() < 32 || address.len() > 44 {
        return Err(GatewayError::InvalidAddress(
            "Invalid Solana address format".to_string(),
        ));
    }
    Ok(())
}

/// Inspect an on-chain account and assemble a best-effort profile.
///
/// The account lookup itself must succeed; the token-balance and signature
/// enrichments are guarded and leave their fields empty on failure.
pub async fn analyze_address(rpc: &RpcClient, address: &str) -> Result<ContractInfo> {
    let account_info = rpc.get_account_info(address).await?;
    let account = account_info
        .get("value")
        .filter(|value| !value.is_null())
        .ok_or(GatewayError::AccountNotFound)?;

    let owner = account
        .get("owner")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let executable = account
        .get("executable")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let lamports = account
        .get("lamports")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let data_size = account
        .get("data")
        .and_then(|data| data.get(0))
        .and_then(Value::as_str)
        .map(str::len)
        .unwrap_or(0);

    let mut info = ContractInfo {
        address: address.to_string(),
        owner: owner.clone(),
        executable,
        lamports,
        data_size,
        program_id: owner.clone(),
        account_type: if executable { "Program" } else { "Account" }.to_string(),
        token_info: None,
        transactions: None,
        last_activity: None,
    };

    if owner == TOKEN_PROGRAM_ID {
        match rpc.get_token_account_balance(address).await {
            Ok(balance) => {
                if let Some(value) = balance.get("value") {
                    info.token_info = Some(TokenInfo {
                        decimals: value
                            .get("decimals")
                            .and_then(Value::as_u64)
                            .map(|decimals| decimals as u8),
                        supply: value
                            .get("amount")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                    });
                }
            }
            Err(err) => debug!(address, %err, "token balance lookup failed"),
        }
    }

    match rpc.get_signatures_for_address(address, 10).await {
        Ok(signatures) if !signatures.is_empty() => {
            info.transactions = Some(TransactionActivity {
                total: signatures.len(),
                recent: signatures.len(),
            });
            info.last_activity = signatures
                .first()
                .and_then(|signature| signature.get("blockTime"))
                .and_then(Value::as_i64)
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .map(|timestamp| timestamp.to_rfc3339());
        }
        Ok(_) => {}
        Err(err) => debug!(address, %err, "signature lookup failed"),
    }

    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_addresses_are_rejected() {
        let err = validate_address("short12345").unwrap_err();
        assert_eq!(err.to_string(), "Invalid Solana address format");
    }

    #[test]
    fn long_addresses_are_rejected() {
        let address = "a".repeat(45);
        assert!(validate_address(&address).is_err());
    }

    #[test]
    fn empty_addresses_get_the_required_message() {
        let err = validate_address("").unwrap_err();
        assert_eq!(err.to_string(), "Valid contract address is required");
    }

    #[test]
    fn boundary_lengths_are_accepted() {
        assert!(validate_address(&"a".repeat(32)).is_ok());
        assert!(validate_address(&"a".repeat(44)).is_ok());
    }
}
