//! EVM client: provider, signing wallet, and the trade contract call.

use crate::config::Config;
use crate::metrics::METRICS;
use crate::Error;
use ethers::abi::{Abi, Function, Token};
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, Bytes, TransactionReceipt, TransactionRequest, H256, U256, U64};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

/// Client holding the node connection, the relayer wallet, and the
/// resolved trade method. Built once at startup.
pub struct EthClient {
    client: Arc<SignerMiddleware<Provider<Http>, LocalWallet>>,
    contract_address: Address,
    method: Function,
    chain_id: u64,
}

/// A trade that the network has mined. May still have reverted.
pub struct MinedTrade {
    pub tx_hash: H256,
    pub receipt: TransactionReceipt,
}

impl MinedTrade {
    pub fn is_success(&self) -> bool {
        !is_reverted(&self.receipt)
    }
}

impl EthClient {
    /// Connect to the node, bind the wallet to its chain id, and resolve
    /// the configured contract method. Fails fast on bad configuration.
    pub async fn connect(config: &Config) -> Result<Self, Error> {
        let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
            .map_err(|e| Error::Config(format!("invalid RPC URL '{}': {e}", config.rpc_url)))?;

        let chain_id = provider
            .get_chainid()
            .await
            .map_err(|e| Error::Rpc(format!("failed to reach node at {}: {e}", config.rpc_url)))?
            .as_u64();

        let wallet = parse_private_key(&config.private_key)?.with_chain_id(chain_id);
        info!(address = %format!("{:#x}", wallet.address()), chain_id, "Wallet initialized");

        let abi: Abi = serde_json::from_str(&config.contract_abi)
            .map_err(|e| Error::Config(format!("invalid contract ABI: {e}")))?;
        let method = abi
            .function(&config.method)
            .map_err(|_| {
                Error::Config(format!("method '{}' not found in contract ABI", config.method))
            })?
            .clone();

        let contract_address: Address = config
            .contract_address
            .parse()
            .map_err(|e| Error::Config(format!("invalid contract address: {e}")))?;

        info!(contract = %format!("{contract_address:#x}"), method = %method.name, "Contract resolved");

        Ok(Self {
            client: Arc::new(SignerMiddleware::new(provider, wallet)),
            contract_address,
            method,
            chain_id,
        })
    }

    /// Sign and submit one trade, blocking until the network mines it.
    pub async fn execute_trade(
        &self,
        token_in: Address,
        token_out: Address,
        amount: U256,
        params: Option<Bytes>,
        gas: U256,
    ) -> Result<MinedTrade, Error> {
        let calldata = encode_trade_call(&self.method, token_in, token_out, amount, params.as_ref())?;

        let tx = TransactionRequest::new()
            .to(self.contract_address)
            .data(calldata)
            .gas(gas);

        let pending = self.client.send_transaction(tx, None).await.map_err(|e| {
            METRICS.rpc_errors.fetch_add(1, Ordering::Relaxed);
            Error::Rpc(format!("transaction submission failed: {e}"))
        })?;

        let tx_hash = *pending;
        info!(tx_hash = %format!("{tx_hash:#x}"), "Transaction sent, waiting until mined");

        let receipt = pending
            .await
            .map_err(|e| {
                METRICS.rpc_errors.fetch_add(1, Ordering::Relaxed);
                Error::Rpc(format!("waiting for receipt of {tx_hash:#x} failed: {e}"))
            })?
            .ok_or_else(|| {
                Error::Tx(format!("transaction {tx_hash:#x} was dropped before being mined"))
            })?;

        Ok(MinedTrade { tx_hash, receipt })
    }

    /// Look up the receipt of a previously submitted transaction.
    pub async fn transaction_receipt(
        &self,
        tx_hash: H256,
    ) -> Result<Option<TransactionReceipt>, Error> {
        self.client.get_transaction_receipt(tx_hash).await.map_err(|e| {
            METRICS.rpc_errors.fetch_add(1, Ordering::Relaxed);
            Error::Rpc(format!("receipt query failed: {e}"))
        })
    }

    /// Quick connectivity probe against the node.
    pub async fn health_check(&self) -> Result<u64, Error> {
        self.client
            .get_block_number()
            .await
            .map(|n| n.as_u64())
            .map_err(|e| {
                METRICS.rpc_errors.fetch_add(1, Ordering::Relaxed);
                Error::Rpc(format!("node unreachable: {e}"))
            })
    }

    pub fn signer_address(&self) -> Address {
        self.client.signer().address()
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }
}

/// Gas limit for a trade: the caller-supplied value wins, the configured
/// fallback applies otherwise.
pub(crate) fn effective_gas(caller: Option<u64>, fallback: u64) -> U256 {
    U256::from(caller.unwrap_or(fallback))
}

/// A mined transaction reverted if its receipt carries `status == 0`.
/// Receipts without a status field predate EIP-658 and count as success.
pub(crate) fn is_reverted(receipt: &TransactionReceipt) -> bool {
    receipt.status == Some(U64::zero())
}

/// ABI-encode calldata for the trade method. The optional params blob is
/// appended as a trailing `bytes` argument.
fn encode_trade_call(
    method: &Function,
    token_in: Address,
    token_out: Address,
    amount: U256,
    params: Option<&Bytes>,
) -> Result<Bytes, Error> {
    let mut tokens = vec![
        Token::Address(token_in),
        Token::Address(token_out),
        Token::Uint(amount),
    ];
    if let Some(blob) = params {
        tokens.push(Token::Bytes(blob.to_vec()));
    }

    method
        .encode_input(&tokens)
        .map(Bytes::from)
        .map_err(|e| Error::Tx(format!("calldata encoding failed: {e}")))
}

fn parse_private_key(key: &str) -> Result<LocalWallet, Error> {
    let key = key.trim();
    if key.is_empty() {
        return Err(Error::Config(
            "private_key is not set (PRIVATE_KEY or RELAYER_PRIVATE_KEY)".into(),
        ));
    }
    key.trim_start_matches("0x")
        .parse::<LocalWallet>()
        .map_err(|e| Error::Config(format!("invalid private key: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREE_ARG_ABI: &str = r#"[
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

    const FOUR_ARG_ABI: &str = r#"[
        {
            "type": "function",
            "name": "executeTrade",
            "stateMutability": "nonpayable",
            "inputs": [
                { "name": "tokenIn", "type": "address" },
                { "name": "tokenOut", "type": "address" },
                { "name": "flashloanAmt", "type": "uint256" },
                { "name": "params", "type": "bytes" }
            ],
            "outputs": []
        }
    ]"#;

    fn method(abi_json: &str) -> Function {
        let abi: Abi = serde_json::from_str(abi_json).unwrap();
        abi.function("executeTrade").unwrap().clone()
    }

    #[test]
    fn test_encode_three_arg_call() {
        let method = method(THREE_ARG_ABI);
        let calldata = encode_trade_call(
            &method,
            Address::repeat_byte(0x11),
            Address::repeat_byte(0x22),
            U256::from(1_000_000u64),
            None,
        )
        .unwrap();

        assert_eq!(&calldata[..4], &method.short_signature()[..]);
        // Three static words after the selector.
        assert_eq!(calldata.len(), 4 + 3 * 32);

        let decoded = method.decode_input(&calldata[4..]).unwrap();
        assert_eq!(decoded[0], Token::Address(Address::repeat_byte(0x11)));
        assert_eq!(decoded[2], Token::Uint(U256::from(1_000_000u64)));
    }

    #[test]
    fn test_encode_with_params_blob() {
        let method = method(FOUR_ARG_ABI);
        let blob = Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]);
        let calldata = encode_trade_call(
            &method,
            Address::repeat_byte(0x11),
            Address::repeat_byte(0x22),
            U256::one(),
            Some(&blob),
        )
        .unwrap();

        assert_eq!(&calldata[..4], &method.short_signature()[..]);
        let decoded = method.decode_input(&calldata[4..]).unwrap();
        assert_eq!(decoded[3], Token::Bytes(blob.to_vec()));
    }

    #[test]
    fn test_encode_arity_mismatch_fails() {
        // Params supplied against a method that does not take them.
        let method = method(THREE_ARG_ABI);
        let blob = Bytes::from(vec![0x01]);
        let result = encode_trade_call(
            &method,
            Address::zero(),
            Address::zero(),
            U256::one(),
            Some(&blob),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_caller_gas_limit_wins_over_fallback() {
        assert_eq!(effective_gas(Some(800_000), 3_000_000), U256::from(800_000u64));
        assert_eq!(effective_gas(None, 3_000_000), U256::from(3_000_000u64));
    }

    #[test]
    fn test_receipt_revert_classification() {
        let mut receipt = TransactionReceipt::default();
        receipt.status = Some(U64::one());
        assert!(!is_reverted(&receipt));

        receipt.status = Some(U64::zero());
        assert!(is_reverted(&receipt));

        // Pre-EIP-658 receipts carry no status.
        receipt.status = None;
        assert!(!is_reverted(&receipt));
    }

    #[test]
    fn test_parse_private_key_with_and_without_prefix() {
        // Well-known dev key (hardhat/anvil account #0).
        let raw = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
        let bare = parse_private_key(raw).unwrap();
        let prefixed = parse_private_key(&format!("0x{raw}")).unwrap();
        assert_eq!(bare.address(), prefixed.address());
        assert_eq!(
            format!("{:#x}", bare.address()),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_empty_private_key_is_config_error() {
        assert!(matches!(parse_private_key("  "), Err(Error::Config(_))));
    }
}
