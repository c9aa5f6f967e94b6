//! Node RPC boundary.
//!
//! [`Node`] is the set of JSON-RPC calls the clients need from an
//! EVM-compatible node. [`EvmAdapter`] implements it over HTTP with alloy;
//! tests substitute an in-memory node.

use alloy::network::Ethereum;
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use thiserror::Error;

/// Errors from node calls.
#[derive(Debug, Clone, Error)]
pub enum EvmAdapterError {
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error("URL parse error: {0}")]
    UrlParse(String),
}

/// Result alias for adapter operations.
pub type Result<T> = std::result::Result<T, EvmAdapterError>;

/// A message call, used for gas estimation and read-only simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    /// Sender; required for estimates that depend on `msg.sender`.
    pub from: Option<Address>,
    /// Contract being called.
    pub to: Address,
    /// Native currency attached, in wei.
    pub value: U256,
    /// Selector plus encoded arguments.
    pub input: Bytes,
}

impl CallRequest {
    fn to_request(&self) -> TransactionRequest {
        let mut tx = TransactionRequest::default()
            .to(self.to)
            .value(self.value)
            .input(self.input.clone().into());
        if let Some(from) = self.from {
            tx = tx.from(from);
        }
        tx
    }
}

/// The parts of a mined transaction's receipt the clients look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptStatus {
    /// Execution status; `false` means the transaction reverted.
    pub success: bool,
    /// Gas consumed by the transaction.
    pub gas_used: u64,
    /// Block the transaction was mined in.
    pub block_number: Option<u64>,
    /// Hash of that block.
    pub block_hash: Option<B256>,
}

/// JSON-RPC surface of an EVM node.
#[allow(async_fn_in_trait)]
pub trait Node {
    /// `eth_chainId`.
    async fn chain_id(&self) -> Result<u64>;

    /// `eth_getTransactionCount` at the `pending` tag.
    async fn transaction_count(&self, address: Address) -> Result<u64>;

    /// `eth_gasPrice`.
    async fn gas_price(&self) -> Result<u128>;

    /// `eth_estimateGas`; fails when the call would revert.
    async fn estimate_gas(&self, call: &CallRequest) -> Result<u64>;

    /// `eth_call` against the latest block.
    async fn call(&self, call: &CallRequest) -> Result<Bytes>;

    /// `eth_sendRawTransaction`; returns the hash reported by the node.
    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256>;

    /// `eth_getTransactionReceipt`; `None` while the transaction is pending.
    async fn receipt(&self, hash: B256) -> Result<Option<ReceiptStatus>>;
}

/// An EVM node reached over HTTP JSON-RPC.
pub struct EvmAdapter {
    provider: DynProvider<Ethereum>,
    rpc_url: String,
}

impl std::fmt::Debug for EvmAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmAdapter")
            .field("rpc_url", &self.rpc_url)
            .finish()
    }
}

impl EvmAdapter {
    /// Creates a new adapter for the given RPC URL.
    pub fn new(rpc_url: &str) -> Result<Self> {
        let url: alloy::transports::http::reqwest::Url = rpc_url
            .parse()
            .map_err(|e| EvmAdapterError::UrlParse(format!("{e}")))?;

        let provider = ProviderBuilder::new().connect_http(url).erased();

        Ok(Self {
            provider,
            rpc_url: rpc_url.to_string(),
        })
    }

    /// Returns the RPC URL.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }
}

fn rpc_err(e: impl std::fmt::Display) -> EvmAdapterError {
    EvmAdapterError::Rpc(e.to_string())
}

impl Node for EvmAdapter {
    async fn chain_id(&self) -> Result<u64> {
        self.provider.get_chain_id().await.map_err(rpc_err)
    }

    async fn transaction_count(&self, address: Address) -> Result<u64> {
        self.provider
            .get_transaction_count(address)
            .pending()
            .await
            .map_err(rpc_err)
    }

    async fn gas_price(&self) -> Result<u128> {
        self.provider.get_gas_price().await.map_err(rpc_err)
    }

    async fn estimate_gas(&self, call: &CallRequest) -> Result<u64> {
        self.provider
            .estimate_gas(call.to_request())
            .await
            .map_err(rpc_err)
    }

    async fn call(&self, call: &CallRequest) -> Result<Bytes> {
        self.provider.call(call.to_request()).await.map_err(rpc_err)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256> {
        let pending = self
            .provider
            .send_raw_transaction(raw)
            .await
            .map_err(rpc_err)?;
        Ok(*pending.tx_hash())
    }

    async fn receipt(&self, hash: B256) -> Result<Option<ReceiptStatus>> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(rpc_err)?;

        Ok(receipt.map(|r| ReceiptStatus {
            success: r.status(),
            gas_used: r.gas_used,
            block_number: r.block_number,
            block_hash: r.block_hash,
        }))
    }
}
