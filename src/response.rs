//! Response types for the relayer API.

use serde::Serialize;
use serde_json::Value;

/// Response from the execute-trade endpoint.
#[derive(Serialize)]
pub struct TradeResponse {
    pub success: bool,
    #[serde(rename = "transactionHash", skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TradeResponse {
    pub fn ok(tx_hash: String, receipt: Option<Value>) -> Self {
        Self {
            success: true,
            transaction_hash: Some(tx_hash),
            receipt,
            error: None,
        }
    }

    pub fn err(error: impl Into<String>, tx_hash: Option<String>) -> Self {
        Self {
            success: false,
            transaction_hash: tx_hash,
            receipt: None,
            error: Some(error.into()),
        }
    }
}

/// Response from the health endpoint.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub signer_address: String,
    pub contract_address: String,
    pub chain_id: u64,
    pub uptime_secs: u64,
    pub requests: u64,
    pub rpc_status: &'static str,
}

/// Response from the tx-status endpoint.
#[derive(Serialize)]
pub struct TxStatusResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TxStatusResponse {
    pub fn mined(tx_hash: String, receipt: Option<Value>) -> Self {
        Self {
            status: "success",
            tx_hash: Some(tx_hash),
            receipt,
            error: None,
        }
    }

    pub fn reverted(tx_hash: String, receipt: Option<Value>) -> Self {
        Self {
            status: "reverted",
            tx_hash: Some(tx_hash),
            receipt,
            error: None,
        }
    }

    pub fn pending(tx_hash: String) -> Self {
        Self {
            status: "pending",
            tx_hash: Some(tx_hash),
            receipt: None,
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            status: "error",
            tx_hash: None,
            receipt: None,
            error: Some(error.into()),
        }
    }
}
