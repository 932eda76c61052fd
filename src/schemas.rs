//! Wire types for the trade endpoint.

use ethers::types::{Address, Bytes, U256};
use serde::Deserialize;

/// A trade request as posted by clients. Field names match the original
/// API surface (`tokenIn`, `tokenOut`, `flashloanAmt`).
#[derive(Debug, Clone, Deserialize)]
pub struct TradeRequest {
    #[serde(rename = "tokenIn")]
    pub token_in: Address,

    #[serde(rename = "tokenOut")]
    pub token_out: Address,

    #[serde(rename = "flashloanAmt")]
    pub flashloan_amt: LoanAmount,

    /// Caller-supplied gas limit; the configured fallback applies when absent.
    #[serde(rename = "gasLimit", default)]
    pub gas_limit: Option<u64>,

    /// Extra ABI-encoded blob, appended as a trailing `bytes` argument.
    #[serde(default)]
    pub params: Option<Bytes>,
}

/// Loan amount as sent on the wire: a JSON number, a decimal string, or a
/// 0x-prefixed hex string. Big amounts arrive as strings from JS clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanAmount(U256);

impl From<LoanAmount> for U256 {
    fn from(amount: LoanAmount) -> Self {
        amount.0
    }
}

impl std::fmt::Display for LoanAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for LoanAmount {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let value = if let Some(hex) = s.strip_prefix("0x") {
            U256::from_str_radix(hex, 16)
                .map_err(|err| format!("invalid hex loan amount: {err}"))?
        } else {
            U256::from_dec_str(s).map_err(|err| format!("invalid loan amount: {err}"))?
        };
        Ok(Self(value))
    }
}

impl<'de> Deserialize<'de> for LoanAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Number(u64),
            Text(String),
        }

        match Wire::deserialize(deserializer)? {
            Wire::Number(n) => Ok(LoanAmount(U256::from(n))),
            Wire::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_request() {
        let request: TradeRequest = serde_json::from_str(
            r#"{
                "tokenIn": "0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c",
                "tokenOut": "0xe9e7CEA3DedcA5984780Bafc599bD69ADd087D56",
                "flashloanAmt": "1000000000000000000",
                "gasLimit": 800000
            }"#,
        )
        .unwrap();
        assert_eq!(
            U256::from(request.flashloan_amt),
            U256::from_dec_str("1000000000000000000").unwrap()
        );
        assert_eq!(request.gas_limit, Some(800_000));
        assert!(request.params.is_none());
    }

    #[test]
    fn test_amount_accepts_number_and_hex() {
        let from_number: LoanAmount = serde_json::from_str("42").unwrap();
        let from_hex: LoanAmount = serde_json::from_str("\"0x2a\"").unwrap();
        assert_eq!(from_number, from_hex);
    }

    #[test]
    fn test_amount_rejects_garbage() {
        assert!(serde_json::from_str::<LoanAmount>("\"a lot\"").is_err());
        assert!(serde_json::from_str::<LoanAmount>("\"-5\"").is_err());
    }

    #[test]
    fn test_missing_amount_is_an_error() {
        let result = serde_json::from_str::<TradeRequest>(
            r#"{
                "tokenIn": "0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c",
                "tokenOut": "0xe9e7CEA3DedcA5984780Bafc599bD69ADd087D56"
            }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_params_blob_decodes_from_hex() {
        let request: TradeRequest = serde_json::from_str(
            r#"{
                "tokenIn": "0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c",
                "tokenOut": "0xe9e7CEA3DedcA5984780Bafc599bD69ADd087D56",
                "flashloanAmt": 7,
                "params": "0xdeadbeef"
            }"#,
        )
        .unwrap();
        assert_eq!(request.params.unwrap().to_vec(), vec![0xde, 0xad, 0xbe, 0xef]);
    }
}
