//! # routerswap-evm
//!
//! Turns contract-call intents into signed, submitted and confirmed EVM
//! transactions, and runs read-only queries.
//!
//! ## Modules
//!
//! - [`abi`]: function table and call/return codec
//! - [`adapter`]: [`Node`] RPC boundary and its HTTP implementation
//! - [`tx`]: transaction builder and EIP-155 encoding
//! - [`executor`]: wrap, approve and swap execution
//! - [`query`]: balance and quote lookups
//! - [`error`]: the client error taxonomy

pub mod abi;
pub mod adapter;
pub mod error;
pub mod executor;
pub mod query;
pub mod tx;

#[cfg(test)]
mod mock_node;

pub use adapter::{CallRequest, EvmAdapter, EvmAdapterError, Node, ReceiptStatus};
pub use error::ClientError;
pub use executor::{ConfirmationPolicy, ExecutionClient, Operation, TransactionOutcome};
pub use query::QueryClient;
pub use tx::{CallIntent, SignedTransaction, TxBuilder, TxError, UnsignedTransaction};

// Re-export alloy primitives used in the public API.
pub use alloy::primitives::{Address, B256, U256};
pub use tokio_util::sync::CancellationToken;
