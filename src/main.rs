//! Whitelist CLI
//!
//! Connects a wallet to the configured whitelist contract and shows or joins it.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use whitelist_dapp::notice::ConsoleNotifier;
use whitelist_dapp::wallet::{RpcWalletProvider, SecureWallet};
use whitelist_dapp::{
    Config, Network, PageState, PrimaryAction, Result, RpcConfig, WhitelistController,
};

#[derive(Parser)]
#[command(name = "whitelist")]
#[command(about = "Check and join an on-chain whitelist")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Network to require (mainnet, rinkeby, goerli, sepolia, anvil)
    #[arg(short, long, global = true)]
    network: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect the wallet and show whitelist status
    Status {
        /// Print the page state as JSON
        #[arg(long)]
        json: bool,
    },

    /// Connect the wallet and join the whitelist
    Join,

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(network) = cli.network.as_deref() {
        config.network = network.parse::<Network>()?;
    }

    match cli.command {
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Status { json } => {
            let mut controller = build_controller(&config)?;
            controller.connect().await;
            print_state(&controller.state(), json)?;
        }
        Commands::Join => {
            let mut controller = build_controller(&config)?;
            controller.connect().await;
            if controller.state().primary_action() == PrimaryAction::JoinWhitelist {
                controller.activate().await;
            }
            print_state(&controller.state(), false)?;
        }
    }

    Ok(())
}

fn build_controller(config: &Config) -> Result<WhitelistController> {
    config.validate()?;

    let rpc_url = config.resolve_rpc_url(&RpcConfig::from_env())?;

    let wallet = match SecureWallet::from_env(&config.private_key_env) {
        Ok(wallet) => {
            tracing::info!(
                address = %wallet.address(),
                "Loaded wallet from {}",
                config.private_key_env
            );
            Some(wallet)
        }
        Err(e) => {
            tracing::warn!(error = %e, "No signing key - running in read-only mode");
            None
        }
    };

    tracing::info!(
        network = config.network.name(),
        contract = %config.contract_address,
        "Starting whitelist session"
    );

    let provider = RpcWalletProvider::new(rpc_url, wallet)
        .with_poll_interval(Duration::from_millis(config.poll_interval_ms));

    Ok(WhitelistController::from_config(
        config,
        Arc::new(provider),
        Arc::new(ConsoleNotifier),
    ))
}

fn print_state(state: &PageState, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(state)?);
        return Ok(());
    }

    println!("{}", state.count_line());
    println!("[{}]", state.primary_action().label());
    if let Some(kind) = state.last_error {
        println!("  last error: {:?}", kind);
    }
    Ok(())
}
