//! # routerswap CLI
//!
//! Entry point for the `routerswap` binary.
//!
//! Subcommands:
//! - `routerswap run`    : wrap native currency, approve the router, swap
//! - `routerswap quote`  : print the router's quote for a path
//! - `routerswap balance`: print a token balance

use std::path::PathBuf;

use alloy::primitives::{Address, U256};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

mod commands;

/// routerswap: wrap, approve and swap through a Uniswap V2-style router.
#[derive(Parser)]
#[command(name = "routerswap", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full sequence: quote, wrap, approve, swap.
    Run {
        /// Node JSON-RPC endpoint.
        #[arg(long, env = "RPC_URL")]
        rpc_url: String,

        /// Router contract address.
        #[arg(long)]
        router: Address,

        /// Wrapped native token; swap input.
        #[arg(long)]
        token_in: Address,

        /// Swap output token.
        #[arg(long)]
        token_out: Address,

        /// Amount to wrap and swap, in base units (wei).
        #[arg(long)]
        amount_in: U256,

        /// Slippage tolerance in percent (e.g. 0.5).
        #[arg(long)]
        slippage: Decimal,

        /// Path to a YAML swap config (gas buffer, swap gas ceiling, deadline).
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Hex-encoded signing key (or set PRIVATE_KEY env var).
        #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
        private_key: String,
    },

    /// Print the router's expected output for a swap path.
    Quote {
        /// Node JSON-RPC endpoint.
        #[arg(long, env = "RPC_URL")]
        rpc_url: String,

        /// Router contract address.
        #[arg(long)]
        router: Address,

        /// Input amount in base units.
        #[arg(long)]
        amount_in: U256,

        /// Comma-separated token path, input first.
        #[arg(long, value_delimiter = ',', required = true)]
        path: Vec<Address>,
    },

    /// Print an ERC-20 balance.
    Balance {
        /// Node JSON-RPC endpoint.
        #[arg(long, env = "RPC_URL")]
        rpc_url: String,

        /// Token contract address.
        #[arg(long)]
        token: Address,

        /// Account to query (default: the signing key's address).
        #[arg(long)]
        owner: Option<Address>,

        /// Hex-encoded signing key (or set PRIVATE_KEY env var).
        #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
        private_key: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cancel = commands::cancel_on_ctrl_c();

    let result = match cli.command {
        Commands::Run {
            rpc_url,
            router,
            token_in,
            token_out,
            amount_in,
            slippage,
            config,
            private_key,
        } => {
            commands::run::run(
                commands::run::RunArgs {
                    rpc_url,
                    router,
                    token_in,
                    token_out,
                    amount_in,
                    slippage,
                    config,
                    private_key,
                },
                &cancel,
            )
            .await
        }
        Commands::Quote {
            rpc_url,
            router,
            amount_in,
            path,
        } => commands::quote::run(&rpc_url, router, amount_in, &path, &cancel).await,
        Commands::Balance {
            rpc_url,
            token,
            owner,
            private_key,
        } => commands::balance::run(&rpc_url, token, owner, private_key, &cancel).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
