//! # routerswap-signer
//!
//! Holds the process's signing key and signs transaction digests.

pub mod signer;

pub use signer::{public_key_to_address, LocalSigner, Signature, Signer, SignerError};
