//! Read-only contract queries.
//!
//! Simulates calls with `eth_call`: no nonce, no signature, no gas paid.

use alloy::primitives::{Address, U256};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::abi::{AbiValue, BALANCE_OF, GET_AMOUNTS_OUT};
use crate::adapter::{CallRequest, Node};
use crate::error::{ClientError, Result};
use crate::executor::{cancellable, node_reason};
use crate::tx::CallIntent;

/// Runs read-only calls against a node.
#[derive(Debug)]
pub struct QueryClient<'a, N> {
    node: &'a N,
}

impl<'a, N: Node> QueryClient<'a, N> {
    pub fn new(node: &'a N) -> Self {
        Self { node }
    }

    /// Encodes `intent`, simulates it and decodes the declared outputs.
    pub async fn call(
        &self,
        intent: &CallIntent,
        cancel: &CancellationToken,
    ) -> Result<Vec<AbiValue>> {
        let operation = intent.function.name;
        let target = intent.target;

        let input = intent.encode().map_err(|e| ClientError::Encoding {
            operation,
            reason: e.to_string(),
        })?;
        let call = CallRequest {
            from: None,
            to: target,
            value: U256::ZERO,
            input,
        };

        let output = cancellable(cancel, operation, None, self.node.call(&call))
            .await?
            .map_err(|e| ClientError::Node {
                operation,
                target,
                reason: node_reason(e),
            })?;

        intent
            .function
            .decode_output(&output)
            .map_err(|e| ClientError::MalformedResponse {
                operation,
                target,
                reason: e.to_string(),
            })
    }

    /// `token.balanceOf(owner)`.
    pub async fn balance_of(
        &self,
        token: Address,
        owner: Address,
        cancel: &CancellationToken,
    ) -> Result<U256> {
        let intent = CallIntent::new(token, &BALANCE_OF, vec![owner.into()]);
        let values = self.call(&intent, cancel).await?;
        values
            .first()
            .and_then(AbiValue::as_uint)
            .ok_or_else(|| ClientError::MalformedResponse {
                operation: BALANCE_OF.name,
                target: token,
                reason: "missing uint256 balance".into(),
            })
    }

    /// `router.getAmountsOut(amount_in, path)`; one amount per path entry.
    pub async fn amounts_out(
        &self,
        router: Address,
        amount_in: U256,
        path: &[Address],
        cancel: &CancellationToken,
    ) -> Result<Vec<U256>> {
        let operation = GET_AMOUNTS_OUT.name;
        if path.len() < 2 {
            return Err(ClientError::Encoding {
                operation,
                reason: format!("quote path needs at least 2 tokens, got {}", path.len()),
            });
        }

        let intent = CallIntent::new(
            router,
            &GET_AMOUNTS_OUT,
            vec![amount_in.into(), path.to_vec().into()],
        );
        let values = self.call(&intent, cancel).await?;
        let amounts = values
            .first()
            .and_then(AbiValue::as_uint_array)
            .map(<[U256]>::to_vec)
            .unwrap_or_default();

        if amounts.len() != path.len() {
            return Err(ClientError::MalformedResponse {
                operation,
                target: router,
                reason: format!(
                    "expected {} amounts for path, got {}",
                    path.len(),
                    amounts.len()
                ),
            });
        }
        Ok(amounts)
    }

    /// Final output amount quoted for swapping `amount_in` along `path`.
    pub async fn expected_amount_out(
        &self,
        router: Address,
        amount_in: U256,
        path: &[Address],
        cancel: &CancellationToken,
    ) -> Result<U256> {
        let amounts = self.amounts_out(router, amount_in, path, cancel).await?;
        let expected = amounts[amounts.len() - 1];
        debug!(%amount_in, %expected, hops = path.len() - 1, "quote");
        Ok(expected)
    }
}
