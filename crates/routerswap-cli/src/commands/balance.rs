//! `routerswap balance`: print an ERC-20 balance.

use alloy::primitives::Address;
use routerswap_evm::{CancellationToken, QueryClient};
use routerswap_signer::Signer;

use super::{connect, load_signer, CommandResult};

/// Run the `balance` subcommand.
pub async fn run(
    rpc_url: &str,
    token: Address,
    owner: Option<Address>,
    private_key: Option<String>,
    cancel: &CancellationToken,
) -> CommandResult {
    let owner = match (owner, private_key) {
        (Some(owner), _) => owner,
        (None, Some(key)) => load_signer(&key)?.address(),
        (None, None) => return Err("either --owner or --private-key is required".into()),
    };

    let node = connect(rpc_url)?;
    let balance = QueryClient::new(&node)
        .balance_of(token, owner, cancel)
        .await?;
    println!("{balance}");
    Ok(())
}
