//! # routerswap-core
//!
//! Client configuration and pure swap math shared by the routerswap crates.

pub mod config;
pub mod slippage;

pub use config::{ConfigError, SwapConfig};
pub use slippage::{min_output, SlippageError};
