//! Transaction building and EIP-155 legacy encoding.
//!
//! [`TxBuilder`] turns a [`CallIntent`] plus freshly queried chain state into
//! an [`UnsignedTransaction`]. Signing produces a [`SignedTransaction`] whose
//! raw RLP bytes go to the node and whose hash identifies it on-chain.

use std::time::Duration;

use alloy::primitives::{Address, Bytes, B256, U256};
use chrono::{DateTime, Utc};
use routerswap_signer::{Signature, SignerError};
use sha3::{Digest, Keccak256};
use thiserror::Error;

use crate::abi::{AbiError, AbiValue, FunctionSpec};

/// "Call function F on contract C with arguments A".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallIntent {
    pub target: Address,
    pub function: &'static FunctionSpec,
    pub args: Vec<AbiValue>,
}

impl CallIntent {
    pub fn new(target: Address, function: &'static FunctionSpec, args: Vec<AbiValue>) -> Self {
        Self {
            target,
            function,
            args,
        }
    }

    /// ABI-encodes the call payload.
    pub fn encode(&self) -> Result<Bytes, AbiError> {
        self.function.encode(&self.args)
    }
}

/// Where the gas limit of a transaction comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasLimit {
    /// Node estimate plus the configured buffer.
    Estimated(u64),
    /// A fixed ceiling, used as-is.
    Fixed(u64),
}

/// Chain state read from the node right before building.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainState {
    pub chain_id: u64,
    pub nonce: u64,
    pub gas_price: u128,
    pub gas: GasLimit,
}

/// A transaction ready to be signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub chain_id: u64,
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    /// `None` is contract creation.
    pub to: Option<Address>,
    pub value: U256,
    pub input: Bytes,
}

/// A signed transaction and its on-chain identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub tx: UnsignedTransaction,
    pub signature: Signature,
    /// EIP-155 `v`: `y_parity + 35 + 2 * chain_id`.
    pub v: u64,
    pub raw: Bytes,
    pub hash: B256,
}

/// Assembles unsigned transactions.
#[derive(Debug, Clone, Copy)]
pub struct TxBuilder {
    gas_limit_buffer: u64,
}

impl TxBuilder {
    pub fn new(gas_limit_buffer: u64) -> Self {
        Self { gas_limit_buffer }
    }

    /// Builds the transaction for `intent`, sending `value` wei.
    pub fn build(
        &self,
        intent: &CallIntent,
        value: U256,
        state: &ChainState,
    ) -> Result<UnsignedTransaction, AbiError> {
        let input = intent.encode()?;
        let gas_limit = match state.gas {
            GasLimit::Estimated(estimate) => estimate.saturating_add(self.gas_limit_buffer),
            GasLimit::Fixed(ceiling) => ceiling,
        };

        Ok(UnsignedTransaction {
            chain_id: state.chain_id,
            nonce: state.nonce,
            gas_price: state.gas_price,
            gas_limit,
            to: Some(intent.target),
            value,
            input,
        })
    }
}

/// Errors attaching a signature to a transaction.
#[derive(Debug, Error)]
pub enum TxError {
    #[error("chain id {0} has no EIP-155 v value")]
    ChainIdOutOfRange(u64),
    #[error(transparent)]
    Signature(#[from] SignerError),
}

/// EIP-155 `v = y_parity + 35 + 2 * chain_id`; `None` if it overflows.
pub fn eip155_v(chain_id: u64, y_parity: u8) -> Option<u64> {
    chain_id
        .checked_mul(2)?
        .checked_add(35)?
        .checked_add(u64::from(y_parity))
}

/// Seconds-since-epoch deadline `window` after `now`.
pub fn deadline_after(now: DateTime<Utc>, window: Duration) -> U256 {
    let now_secs = u64::try_from(now.timestamp()).unwrap_or(0);
    U256::from(now_secs.saturating_add(window.as_secs()))
}

impl UnsignedTransaction {
    /// keccak256 of `rlp([nonce, gasPrice, gas, to, value, data, chainId, 0, 0])`.
    pub fn signing_hash(&self) -> [u8; 32] {
        let mut fields = self.rlp_fields();
        rlp_uint(&mut fields, &self.chain_id.to_be_bytes());
        rlp_uint(&mut fields, &[]);
        rlp_uint(&mut fields, &[]);
        Keccak256::digest(rlp_list(&fields)).into()
    }

    /// Attaches a signature over [`Self::signing_hash`].
    pub fn into_signed(self, signature: Signature) -> Result<SignedTransaction, TxError> {
        let y_parity = signature.recovery_id()?;
        let v = eip155_v(self.chain_id, y_parity)
            .ok_or(TxError::ChainIdOutOfRange(self.chain_id))?;

        let mut fields = self.rlp_fields();
        rlp_uint(&mut fields, &v.to_be_bytes());
        rlp_uint(&mut fields, &signature.r);
        rlp_uint(&mut fields, &signature.s);
        let raw = rlp_list(&fields);
        let hash = B256::from(<[u8; 32]>::from(Keccak256::digest(&raw)));

        Ok(SignedTransaction {
            tx: self,
            signature,
            v,
            raw: Bytes::from(raw),
            hash,
        })
    }

    fn rlp_fields(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(64 + self.input.len());
        rlp_uint(&mut out, &self.nonce.to_be_bytes());
        rlp_uint(&mut out, &self.gas_price.to_be_bytes());
        rlp_uint(&mut out, &self.gas_limit.to_be_bytes());
        match &self.to {
            Some(to) => rlp_bytes(&mut out, to.as_slice()),
            None => rlp_bytes(&mut out, &[]),
        }
        rlp_uint(&mut out, &self.value.to_be_bytes::<32>());
        rlp_bytes(&mut out, &self.input);
        out
    }
}

// ---- RLP ----

/// Big-endian integer, minimal form (no leading zeros, zero is empty).
fn rlp_uint(out: &mut Vec<u8>, be: &[u8]) {
    let start = be.iter().position(|&b| b != 0).unwrap_or(be.len());
    rlp_bytes(out, &be[start..]);
}

fn rlp_bytes(out: &mut Vec<u8>, data: &[u8]) {
    if data.len() == 1 && data[0] < 0x80 {
        out.push(data[0]);
    } else {
        rlp_header(out, 0x80, data.len());
        out.extend_from_slice(data);
    }
}

fn rlp_list(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 9);
    rlp_header(&mut out, 0xc0, payload.len());
    out.extend_from_slice(payload);
    out
}

fn rlp_header(out: &mut Vec<u8>, offset: u8, len: usize) {
    if len < 56 {
        out.push(offset + len as u8);
    } else {
        let be = (len as u64).to_be_bytes();
        let start = be.iter().position(|&b| b != 0).unwrap_or(7);
        out.push(offset + 55 + (8 - start) as u8);
        out.extend_from_slice(&be[start..]);
    }
}
