//! CLI subcommand implementations.

use std::path::Path;

use routerswap_core::SwapConfig;
use routerswap_evm::{CancellationToken, ClientError, EvmAdapter};
use routerswap_signer::LocalSigner;

pub mod balance;
pub mod quote;
pub mod run;

pub(crate) type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Token cancelled on the first Ctrl-C.
pub(crate) fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling");
            trigger.cancel();
        }
    });
    cancel
}

pub(crate) fn connect(rpc_url: &str) -> Result<EvmAdapter, Box<dyn std::error::Error>> {
    EvmAdapter::new(rpc_url).map_err(|e| format!("cannot connect to {rpc_url}: {e}").into())
}

pub(crate) fn load_signer(private_key: &str) -> Result<LocalSigner, ClientError> {
    Ok(LocalSigner::from_hex(private_key)?)
}

pub(crate) fn load_config(path: Option<&Path>) -> Result<SwapConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => SwapConfig::from_file(path)
            .map_err(|e| format!("failed to load {}: {e}", path.display()).into()),
        None => Ok(SwapConfig::default()),
    }
}
