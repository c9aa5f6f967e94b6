//! In-memory [`Node`] for unit tests.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;

use alloy::primitives::{keccak256, Address, Bytes, B256};
use routerswap_signer::{LocalSigner, Signature, Signer, SignerError};

use crate::adapter::{CallRequest, EvmAdapterError, Node, ReceiptStatus, Result};

/// Scripted node that records which RPC methods were called.
pub(crate) struct MockNode {
    pub chain_id: u64,
    pub nonce: u64,
    pub gas_price: u128,
    /// Added to `gas_price` once per prior `gas_price` call.
    pub gas_price_step: u128,
    pub estimate: std::result::Result<u64, String>,
    pub call_result: std::result::Result<Bytes, String>,
    pub send_error: Option<String>,
    /// Receipt appears on this poll (1-based); `None` never mines.
    pub mined_on_poll: Option<u32>,
    pub receipt_success: bool,
    /// Every receipt lookup fails with this message.
    pub receipt_error: Option<String>,
    pub calls: Mutex<Vec<&'static str>>,
    pub sent: Mutex<Vec<Bytes>>,
    pub estimated: Mutex<Vec<CallRequest>>,
    pub(crate) polls: AtomicU32,
    pub(crate) price_reads: AtomicU32,
}

impl Default for MockNode {
    fn default() -> Self {
        Self {
            chain_id: 31337,
            nonce: 5,
            gas_price: 7_000_000_000,
            gas_price_step: 0,
            estimate: Ok(21_000),
            call_result: Ok(Bytes::new()),
            send_error: None,
            mined_on_poll: Some(1),
            receipt_success: true,
            receipt_error: None,
            calls: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            estimated: Mutex::new(Vec::new()),
            polls: AtomicU32::new(0),
            price_reads: AtomicU32::new(0),
        }
    }
}

impl MockNode {
    pub fn called(&self, method: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|m| *m == method)
    }

    fn record(&self, method: &'static str) {
        self.calls.lock().unwrap().push(method);
    }
}

impl Node for MockNode {
    async fn chain_id(&self) -> Result<u64> {
        self.record("chain_id");
        Ok(self.chain_id)
    }

    async fn transaction_count(&self, _address: Address) -> Result<u64> {
        self.record("transaction_count");
        Ok(self.nonce)
    }

    async fn gas_price(&self) -> Result<u128> {
        self.record("gas_price");
        let reads = self.price_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.gas_price + self.gas_price_step * u128::from(reads))
    }

    async fn estimate_gas(&self, call: &CallRequest) -> Result<u64> {
        self.record("estimate_gas");
        self.estimated.lock().unwrap().push(call.clone());
        self.estimate.clone().map_err(EvmAdapterError::Rpc)
    }

    async fn call(&self, _call: &CallRequest) -> Result<Bytes> {
        self.record("call");
        self.call_result.clone().map_err(EvmAdapterError::Rpc)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256> {
        self.record("send_raw_transaction");
        if let Some(reason) = &self.send_error {
            return Err(EvmAdapterError::Rpc(reason.clone()));
        }
        self.sent.lock().unwrap().push(Bytes::copy_from_slice(raw));
        Ok(keccak256(raw))
    }

    async fn receipt(&self, _hash: B256) -> Result<Option<ReceiptStatus>> {
        self.record("receipt");
        if let Some(reason) = &self.receipt_error {
            return Err(EvmAdapterError::Rpc(reason.clone()));
        }
        let poll = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        match self.mined_on_poll {
            Some(n) if poll >= n => Ok(Some(ReceiptStatus {
                success: self.receipt_success,
                gas_used: 46_000,
                block_number: Some(100),
                block_hash: Some(B256::with_last_byte(1)),
            })),
            _ => Ok(None),
        }
    }
}

/// Wraps a real signer and counts signatures.
pub(crate) struct CountingSigner {
    inner: LocalSigner,
    pub signed: AtomicUsize,
    /// Rewrites the `v` of each signature.
    pub map_v: fn(u8) -> u8,
}

impl CountingSigner {
    pub fn new() -> Self {
        Self {
            inner: LocalSigner::from_bytes(&[0x11; 32]).unwrap(),
            signed: AtomicUsize::new(0),
            map_v: |v| v,
        }
    }

    pub fn with_v(map_v: fn(u8) -> u8) -> Self {
        Self {
            map_v,
            ..Self::new()
        }
    }

    pub fn count(&self) -> usize {
        self.signed.load(Ordering::SeqCst)
    }
}

impl Signer for CountingSigner {
    fn sign_hash(&self, hash: &[u8; 32]) -> std::result::Result<Signature, SignerError> {
        self.signed.fetch_add(1, Ordering::SeqCst);
        let mut signature = self.inner.sign_hash(hash)?;
        signature.v = (self.map_v)(signature.v);
        Ok(signature)
    }

    fn address(&self) -> Address {
        self.inner.address()
    }
}
