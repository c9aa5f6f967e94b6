//! Signing interface.
//!
//! [`Signer`] is the seam the execution client signs through; [`LocalSigner`]
//! is the in-process secp256k1 implementation. Key bytes never appear in
//! `Debug` output or error messages.

use alloy::primitives::Address;
use k256::ecdsa::{SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};
use thiserror::Error;
use zeroize::Zeroizing;

/// Errors from key handling and signing.
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("invalid private key: {0}")]
    InvalidKey(&'static str),
    #[error("signing failed: {0}")]
    Signing(String),
    #[error("invalid signature recovery id: v = {0}")]
    InvalidRecoveryId(u8),
}

/// A recoverable secp256k1 signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    /// Recovery id, either `y_parity` or `27 + y_parity`.
    pub v: u8,
}

impl Signature {
    /// The y-parity bit (0 or 1). Accepts both `v` conventions.
    pub fn recovery_id(&self) -> Result<u8, SignerError> {
        match self.v {
            0 | 1 => Ok(self.v),
            27 | 28 => Ok(self.v - 27),
            other => Err(SignerError::InvalidRecoveryId(other)),
        }
    }
}

/// A signer holding one account's key.
pub trait Signer {
    /// Sign a 32-byte digest.
    fn sign_hash(&self, hash: &[u8; 32]) -> Result<Signature, SignerError>;

    /// Returns the signer's address.
    fn address(&self) -> Address;
}

/// Signs with a secp256k1 key held in process memory.
pub struct LocalSigner {
    key: SigningKey,
    address: Address,
}

impl std::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl LocalSigner {
    /// Wraps an existing signing key.
    pub fn new(key: SigningKey) -> Self {
        let address = public_key_to_address(&key);
        Self { key, address }
    }

    /// Parses a hex-encoded 32-byte key, with or without `0x`.
    pub fn from_hex(hex_key: &str) -> Result<Self, SignerError> {
        let trimmed = hex_key.trim();
        let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if stripped.is_empty() {
            return Err(SignerError::InvalidKey("key is not set"));
        }

        let bytes = Zeroizing::new(
            hex::decode(stripped).map_err(|_| SignerError::InvalidKey("key is not valid hex"))?,
        );
        Self::from_bytes(&bytes)
    }

    /// Builds a signer from raw key bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignerError> {
        if bytes.len() != 32 {
            return Err(SignerError::InvalidKey("key must be 32 bytes"));
        }
        let key = SigningKey::from_slice(bytes)
            .map_err(|_| SignerError::InvalidKey("key is not a valid secp256k1 scalar"))?;
        Ok(Self::new(key))
    }
}

impl Signer for LocalSigner {
    fn sign_hash(&self, hash: &[u8; 32]) -> Result<Signature, SignerError> {
        let (sig, recid) = self
            .key
            .sign_prehash_recoverable(hash)
            .map_err(|e| SignerError::Signing(e.to_string()))?;

        let bytes = sig.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);

        Ok(Signature {
            r,
            s,
            v: 27 + recid.to_byte(),
        })
    }

    fn address(&self) -> Address {
        self.address
    }
}

/// Derives the account address from a signing key.
pub fn public_key_to_address(key: &SigningKey) -> Address {
    let verifying_key = VerifyingKey::from(key);
    let pubkey = verifying_key.to_encoded_point(false);
    // Skip the 0x04 prefix, hash x || y, keep the low 20 bytes.
    let hash = Keccak256::digest(&pubkey.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}
