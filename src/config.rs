//! Relayer configuration.

use serde::Deserialize;

/// Configuration for the trade relayer. Loaded once at startup from
/// `relayer.toml` and/or `RELAYER_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "defaults::bind_address")]
    pub bind_address: String,

    #[serde(default = "defaults::rpc_url")]
    pub rpc_url: String,

    /// Hex-encoded secp256k1 signing key. Never logged.
    #[serde(default = "defaults::private_key")]
    pub private_key: String,

    #[serde(default = "defaults::contract_address")]
    pub contract_address: String,

    /// Contract interface as a JSON ABI string.
    #[serde(default = "defaults::contract_abi")]
    pub contract_abi: String,

    /// Contract method invoked per trade.
    #[serde(default = "defaults::method")]
    pub method: String,

    /// Fallback gas limit used when the caller supplies none.
    #[serde(default = "defaults::gas_limit")]
    pub gas_limit: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: defaults::bind_address(),
            rpc_url: defaults::rpc_url(),
            private_key: defaults::private_key(),
            contract_address: defaults::contract_address(),
            contract_abi: defaults::contract_abi(),
            method: defaults::method(),
            gas_limit: defaults::gas_limit(),
        }
    }
}

mod defaults {
    /// Environment names from the original deployment, honored before the
    /// `RELAYER_*` overrides so existing .env files keep working.
    fn legacy_env(name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }

    pub fn bind_address() -> String {
        let port = legacy_env("PORT").unwrap_or_else(|| "3000".into());
        format!("0.0.0.0:{port}")
    }

    pub fn rpc_url() -> String {
        legacy_env("BNB_CHAIN_NODE_URL").unwrap_or_else(|| "http://localhost:8545".into())
    }

    pub fn private_key() -> String {
        legacy_env("PRIVATE_KEY").unwrap_or_default()
    }

    pub fn contract_address() -> String {
        legacy_env("CONTRACT_ADDRESS").unwrap_or_default()
    }

    pub fn contract_abi() -> String {
        legacy_env("CONTRACT_ABI").unwrap_or_else(|| DEFAULT_ABI.into())
    }

    pub fn method() -> String {
        "executeTrade".into()
    }

    pub fn gas_limit() -> u64 {
        3_000_000
    }

    /// Interface of the standard flash-loan trade contract.
    const DEFAULT_ABI: &str = r#"[
        {
            "type": "function",
            "name": "executeTrade",
            "stateMutability": "nonpayable",
            "inputs": [
                { "name": "tokenIn", "type": "address" },
                { "name": "tokenOut", "type": "address" },
                { "name": "flashloanAmt", "type": "uint256" }
            ],
            "outputs": []
        }
    ]"#;
}
