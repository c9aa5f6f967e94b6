//! `routerswap quote`: print the router's quote for a swap path.

use alloy::primitives::{Address, U256};
use routerswap_evm::{CancellationToken, QueryClient};

use super::{connect, CommandResult};

/// Run the `quote` subcommand.
pub async fn run(
    rpc_url: &str,
    router: Address,
    amount_in: U256,
    path: &[Address],
    cancel: &CancellationToken,
) -> CommandResult {
    let node = connect(rpc_url)?;
    let amounts = QueryClient::new(&node)
        .amounts_out(router, amount_in, path, cancel)
        .await?;

    for (token, amount) in path.iter().zip(&amounts) {
        println!("{token}  {amount}");
    }
    Ok(())
}
