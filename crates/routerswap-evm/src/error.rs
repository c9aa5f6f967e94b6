//! Errors surfaced by the execution and query clients.
//!
//! Each variant names the operation it came from; node-side failures keep the
//! node's message verbatim. Nothing here is retried by the clients.

use std::time::Duration;

use alloy::primitives::{Address, B256};
use routerswap_core::SlippageError;
use routerswap_signer::SignerError;
use thiserror::Error;

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Classified failure of a query or transaction.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("{operation}: encoding error: {reason}")]
    Encoding {
        operation: &'static str,
        reason: String,
    },

    #[error("{operation} on {target}: malformed response: {reason}")]
    MalformedResponse {
        operation: &'static str,
        target: Address,
        reason: String,
    },

    #[error("{operation} on {target}: node error: {reason}")]
    Node {
        operation: &'static str,
        target: Address,
        reason: String,
    },

    #[error("{operation} on {target}: gas estimation failed: {reason}")]
    EstimationFailed {
        operation: &'static str,
        target: Address,
        reason: String,
    },

    #[error("{operation}: signing failed: {source}")]
    Signing {
        operation: &'static str,
        #[source]
        source: SignerError,
    },

    #[error("{operation} on {target}: transaction rejected: {reason}")]
    SubmissionRejected {
        operation: &'static str,
        target: Address,
        reason: String,
    },

    #[error("{operation} on {target}: transaction {tx_hash} reverted (gas used {gas_used})")]
    TransactionReverted {
        operation: &'static str,
        target: Address,
        tx_hash: B256,
        gas_used: u64,
    },

    #[error(
        "{operation}: no receipt for {tx_hash} after {timeout:?}{}",
        lookup_suffix(.last_error)
    )]
    ConfirmationTimeout {
        operation: &'static str,
        tx_hash: B256,
        timeout: Duration,
        /// Node message from the most recent failed receipt lookup.
        last_error: Option<String>,
    },

    #[error("{operation}: cancelled{}", submitted_suffix(.tx_hash))]
    Cancelled {
        operation: &'static str,
        tx_hash: Option<B256>,
    },

    #[error(transparent)]
    InvalidSlippage(#[from] SlippageError),
}

/// Key material that cannot become a signer is a startup configuration
/// failure. Signing failures during an operation use [`ClientError::Signing`].
impl From<SignerError> for ClientError {
    fn from(e: SignerError) -> Self {
        Self::Configuration(format!("signing key: {e}"))
    }
}

fn submitted_suffix(tx_hash: &Option<B256>) -> String {
    match tx_hash {
        Some(hash) => format!(" after submitting {hash}; it may still be mined"),
        None => String::new(),
    }
}

fn lookup_suffix(last_error: &Option<String>) -> String {
    match last_error {
        Some(reason) => format!("; last receipt lookup failed: {reason}"),
        None => String::new(),
    }
}
