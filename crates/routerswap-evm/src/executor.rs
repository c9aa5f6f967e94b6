//! Execution client for state-changing contract calls.
//!
//! Every operation runs the same pipeline: encode, read chain state, build,
//! sign, submit, then poll for the receipt. Operations are sequential and
//! never retried; nonce ordering across call sites is the caller's job.

use std::future::Future;
use std::time::Duration;

use alloy::primitives::{Address, B256, U256};
use chrono::{DateTime, Utc};
use routerswap_core::SwapConfig;
use routerswap_signer::Signer;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::abi::{AbiError, APPROVE, DEPOSIT, SWAP_EXACT_TOKENS_FOR_TOKENS};
use crate::adapter::{CallRequest, EvmAdapterError, Node, ReceiptStatus};
use crate::error::{ClientError, Result};
use crate::query::QueryClient;
use crate::tx::{
    self, CallIntent, ChainState, GasLimit, TxBuilder, TxError, UnsignedTransaction,
};

/// Bounds on waiting for a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    /// Longest wait for a receipt after submission.
    pub timeout: Duration,
    /// Delay between receipt lookups.
    pub poll_interval: Duration,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(180),
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// Terminal result of a mined, successful transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionOutcome {
    /// Hash of the signed transaction.
    pub tx_hash: B256,
    /// Always `true`; reverts are returned as errors.
    pub success: bool,
    /// Gas consumed.
    pub gas_used: u64,
    /// Block the transaction was mined in.
    pub block_number: Option<u64>,
    /// Hash of that block.
    pub block_hash: Option<B256>,
}

/// A state-changing operation the client knows how to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Send `amount` native currency to the wrapped-token contract's `deposit()`.
    WrapNative { token: Address, amount: U256 },
    /// Let `spender` move up to `amount` of `token`.
    Approve {
        token: Address,
        spender: Address,
        amount: U256,
    },
    /// Router swap of an exact input along `path`, proceeds to the signer.
    SwapExactTokensForTokens {
        amount_in: U256,
        amount_out_min: U256,
        path: Vec<Address>,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::WrapNative { .. } => "wrap_native",
            Self::Approve { .. } => "approve",
            Self::SwapExactTokensForTokens { .. } => "swap_exact_tokens_for_tokens",
        }
    }
}

enum GasStrategy {
    Estimate,
    Fixed(u64),
}

struct Plan {
    intent: CallIntent,
    value: U256,
    gas: GasStrategy,
}

/// Signs and submits transactions for one identity.
pub struct ExecutionClient<N, S> {
    node: N,
    signer: S,
    router: Address,
    config: SwapConfig,
    confirmation: ConfirmationPolicy,
    builder: TxBuilder,
}

impl<N, S> std::fmt::Debug for ExecutionClient<N, S>
where
    S: Signer,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionClient")
            .field("address", &self.signer.address())
            .field("router", &self.router)
            .field("config", &self.config)
            .field("confirmation", &self.confirmation)
            .finish_non_exhaustive()
    }
}

impl<N: Node, S: Signer> ExecutionClient<N, S> {
    /// Creates a client; fails if `config` is unusable.
    pub fn new(node: N, signer: S, router: Address, config: SwapConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        Ok(Self {
            node,
            signer,
            router,
            builder: TxBuilder::new(config.gas_limit_buffer),
            config,
            confirmation: ConfirmationPolicy::default(),
        })
    }

    /// Overrides the receipt wait bounds.
    pub fn with_confirmation(mut self, confirmation: ConfirmationPolicy) -> Self {
        self.confirmation = confirmation;
        self
    }

    /// The signer's account address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn router(&self) -> Address {
        self.router
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn signer(&self) -> &S {
        &self.signer
    }

    /// Read-only client over the same node.
    pub fn query(&self) -> QueryClient<'_, N> {
        QueryClient::new(&self.node)
    }

    /// Wraps `amount` of native currency into `token`.
    pub async fn wrap_native(
        &self,
        token: Address,
        amount: U256,
        cancel: &CancellationToken,
    ) -> Result<TransactionOutcome> {
        self.execute(&Operation::WrapNative { token, amount }, cancel)
            .await
    }

    /// Approves `spender` for `amount` of `token`.
    pub async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
        cancel: &CancellationToken,
    ) -> Result<TransactionOutcome> {
        self.execute(
            &Operation::Approve {
                token,
                spender,
                amount,
            },
            cancel,
        )
        .await
    }

    /// Swaps exactly `amount_in` of `path[0]` for at least `amount_out_min`
    /// of the last token in `path`.
    pub async fn swap_exact_tokens_for_tokens(
        &self,
        amount_in: U256,
        amount_out_min: U256,
        path: &[Address],
        cancel: &CancellationToken,
    ) -> Result<TransactionOutcome> {
        self.execute(
            &Operation::SwapExactTokensForTokens {
                amount_in,
                amount_out_min,
                path: path.to_vec(),
            },
            cancel,
        )
        .await
    }

    /// Runs `op` to a mined, successful receipt.
    pub async fn execute(
        &self,
        op: &Operation,
        cancel: &CancellationToken,
    ) -> Result<TransactionOutcome> {
        let operation = op.name();
        let unsigned = self.prepare(op, cancel).await?;
        let target = unsigned.to.unwrap_or_default();
        let nonce = unsigned.nonce;

        let digest = unsigned.signing_hash();
        let signature = self
            .signer
            .sign_hash(&digest)
            .map_err(|source| ClientError::Signing { operation, source })?;
        let signed = unsigned.into_signed(signature).map_err(|e| match e {
            TxError::Signature(source) => ClientError::Signing { operation, source },
            TxError::ChainIdOutOfRange(chain_id) => ClientError::Node {
                operation,
                target,
                reason: format!("chain id {chain_id} out of EIP-155 range"),
            },
        })?;
        let tx_hash = signed.hash;

        // From here on the node may hold the transaction.
        let reported = cancellable(
            cancel,
            operation,
            Some(tx_hash),
            self.node.send_raw_transaction(&signed.raw),
        )
        .await?
        .map_err(|e| ClientError::SubmissionRejected {
            operation,
            target,
            reason: node_reason(e),
        })?;
        if reported != tx_hash {
            warn!(%reported, computed = %tx_hash, operation, "node reported a different tx hash");
        }
        info!(operation, %tx_hash, nonce, %target, "transaction sent");

        let receipt = self.await_receipt(operation, tx_hash, cancel).await?;
        info!(
            operation,
            %tx_hash,
            success = receipt.success,
            gas_used = receipt.gas_used,
            block = ?receipt.block_number,
            "transaction mined"
        );

        if !receipt.success {
            return Err(ClientError::TransactionReverted {
                operation,
                target,
                tx_hash,
                gas_used: receipt.gas_used,
            });
        }

        Ok(TransactionOutcome {
            tx_hash,
            success: true,
            gas_used: receipt.gas_used,
            block_number: receipt.block_number,
            block_hash: receipt.block_hash,
        })
    }

    /// Encodes `op` and builds its unsigned transaction from fresh chain
    /// state. Nothing is signed or sent.
    pub async fn prepare(
        &self,
        op: &Operation,
        cancel: &CancellationToken,
    ) -> Result<UnsignedTransaction> {
        let operation = op.name();
        let plan = self.plan(op, Utc::now())?;
        let target = plan.intent.target;
        let sender = self.signer.address();
        let encoding = |e: AbiError| ClientError::Encoding {
            operation,
            reason: e.to_string(),
        };
        let node_error = |e: EvmAdapterError| ClientError::Node {
            operation,
            target,
            reason: node_reason(e),
        };

        let input = plan.intent.encode().map_err(encoding)?;

        let chain_id = cancellable(cancel, operation, None, self.node.chain_id())
            .await?
            .map_err(node_error)?;
        if tx::eip155_v(chain_id, 1).is_none() {
            return Err(ClientError::Node {
                operation,
                target,
                reason: format!("chain id {chain_id} out of EIP-155 range"),
            });
        }
        let nonce = cancellable(
            cancel,
            operation,
            None,
            self.node.transaction_count(sender),
        )
        .await?
        .map_err(node_error)?;
        let gas_price = cancellable(cancel, operation, None, self.node.gas_price())
            .await?
            .map_err(node_error)?;

        let gas = match plan.gas {
            GasStrategy::Fixed(limit) => GasLimit::Fixed(limit),
            GasStrategy::Estimate => {
                let call = CallRequest {
                    from: Some(sender),
                    to: target,
                    value: plan.value,
                    input,
                };
                let estimate = cancellable(cancel, operation, None, self.node.estimate_gas(&call))
                    .await?
                    .map_err(|e| {
                        let reason = node_reason(e);
                        warn!(operation, %target, %reason, "gas estimation failed");
                        ClientError::EstimationFailed {
                            operation,
                            target,
                            reason,
                        }
                    })?;
                GasLimit::Estimated(estimate)
            }
        };

        let state = ChainState {
            chain_id,
            nonce,
            gas_price,
            gas,
        };
        debug!(operation, ?state, "chain state");

        self.builder
            .build(&plan.intent, plan.value, &state)
            .map_err(encoding)
    }

    fn plan(&self, op: &Operation, now: DateTime<Utc>) -> Result<Plan> {
        let plan = match op {
            Operation::WrapNative { token, amount } => Plan {
                intent: CallIntent::new(*token, &DEPOSIT, vec![]),
                value: *amount,
                gas: GasStrategy::Estimate,
            },
            Operation::Approve {
                token,
                spender,
                amount,
            } => Plan {
                intent: CallIntent::new(*token, &APPROVE, vec![(*spender).into(), (*amount).into()]),
                value: U256::ZERO,
                gas: GasStrategy::Estimate,
            },
            Operation::SwapExactTokensForTokens {
                amount_in,
                amount_out_min,
                path,
            } => {
                if path.len() < 2 {
                    return Err(ClientError::Encoding {
                        operation: op.name(),
                        reason: format!("swap path needs at least 2 tokens, got {}", path.len()),
                    });
                }
                let deadline = tx::deadline_after(now, self.config.deadline_duration);
                Plan {
                    intent: CallIntent::new(
                        self.router,
                        &SWAP_EXACT_TOKENS_FOR_TOKENS,
                        vec![
                            (*amount_in).into(),
                            (*amount_out_min).into(),
                            path.clone().into(),
                            self.signer.address().into(),
                            deadline.into(),
                        ],
                    ),
                    value: U256::ZERO,
                    gas: GasStrategy::Fixed(self.config.swap_gas_limit),
                }
            }
        };
        Ok(plan)
    }

    async fn await_receipt(
        &self,
        operation: &'static str,
        tx_hash: B256,
        cancel: &CancellationToken,
    ) -> Result<ReceiptStatus> {
        let mut last_error = None;
        let poll = async {
            loop {
                match self.node.receipt(tx_hash).await {
                    Ok(Some(receipt)) => break receipt,
                    Ok(None) => {}
                    Err(e) => {
                        debug!(operation, %tx_hash, error = %e, "receipt lookup failed");
                        last_error = Some(node_reason(e));
                    }
                }
                tokio::time::sleep(self.confirmation.poll_interval).await;
            }
        };

        let timeout = self.confirmation.timeout;
        let waited = cancellable(
            cancel,
            operation,
            Some(tx_hash),
            tokio::time::timeout(timeout, poll),
        )
        .await?;
        waited.map_err(|_| ClientError::ConfirmationTimeout {
            operation,
            tx_hash,
            timeout,
            last_error,
        })
    }
}

/// Races `fut` against `cancel`.
pub(crate) async fn cancellable<F: Future>(
    cancel: &CancellationToken,
    operation: &'static str,
    tx_hash: Option<B256>,
    fut: F,
) -> Result<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ClientError::Cancelled { operation, tx_hash }),
        out = fut => Ok(out),
    }
}

/// The node's message without the adapter's prefix.
pub(crate) fn node_reason(e: EvmAdapterError) -> String {
    match e {
        EvmAdapterError::Rpc(reason) | EvmAdapterError::UrlParse(reason) => reason,
    }
}
