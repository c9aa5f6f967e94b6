//! `routerswap run`: wrap native currency, approve the router and swap.
//!
//! Steps are causally dependent, so the first failure aborts the rest.

use std::path::PathBuf;

use alloy::primitives::{Address, U256};
use routerswap_core::min_output;
use routerswap_evm::{CancellationToken, EvmAdapter, ExecutionClient};
use routerswap_signer::LocalSigner;
use rust_decimal::Decimal;
use tracing::info;

use super::{connect, load_config, load_signer, CommandResult};

/// Arguments for `routerswap run`.
pub struct RunArgs {
    /// Node JSON-RPC endpoint.
    pub rpc_url: String,
    /// Router contract; also the approved spender.
    pub router: Address,
    /// Wrapped native token, the first hop of the swap.
    pub token_in: Address,
    /// Token received from the swap.
    pub token_out: Address,
    /// Amount wrapped, approved and swapped, in base units.
    pub amount_in: U256,
    /// Slippage tolerance in percent.
    pub slippage: Decimal,
    /// Optional YAML swap config; defaults apply when absent.
    pub config: Option<PathBuf>,
    /// Hex-encoded signing key.
    pub private_key: String,
}

/// Run the `run` subcommand.
pub async fn run(args: RunArgs, cancel: &CancellationToken) -> CommandResult {
    let config = load_config(args.config.as_deref())?;
    let signer = load_signer(&args.private_key)?;
    let node = connect(&args.rpc_url)?;
    let client = ExecutionClient::new(node, signer, args.router, config)?;
    let path = [args.token_in, args.token_out];

    println!("\n=== Swap Summary ===");
    println!("  Account:   {}", client.address());
    println!("  Router:    {}", args.router);
    println!("  Token in:  {}", args.token_in);
    println!("  Token out: {}", args.token_out);
    println!("  Amount in: {}", args.amount_in);
    println!("  Slippage:  {}%", args.slippage);
    println!("====================\n");

    log_balances(&client, &path, "before", cancel).await?;

    let expected = client
        .query()
        .expected_amount_out(args.router, args.amount_in, &path, cancel)
        .await?;
    let amount_out_min = min_output(expected, args.slippage)?;
    info!(%expected, %amount_out_min, "quoted swap");

    let wrap = client
        .wrap_native(args.token_in, args.amount_in, cancel)
        .await?;
    println!("Wrapped:  {}", wrap.tx_hash);

    let approve = client
        .approve(args.token_in, args.router, args.amount_in, cancel)
        .await?;
    println!("Approved: {}", approve.tx_hash);

    let swap = client
        .swap_exact_tokens_for_tokens(args.amount_in, amount_out_min, &path, cancel)
        .await?;
    println!(
        "Swapped:  {} (gas used {}, block {})",
        swap.tx_hash,
        swap.gas_used,
        swap.block_number
            .map_or_else(|| "unknown".to_string(), |b| b.to_string())
    );

    log_balances(&client, &path, "after", cancel).await?;
    Ok(())
}

async fn log_balances(
    client: &ExecutionClient<EvmAdapter, LocalSigner>,
    tokens: &[Address],
    stage: &str,
    cancel: &CancellationToken,
) -> CommandResult {
    let owner = client.address();
    for token in tokens {
        let balance = client.query().balance_of(*token, owner, cancel).await?;
        info!(%token, %balance, stage, "balance");
    }
    Ok(())
}
