//! # ethrpc-cli
//!
//! Command-line interface for Ethereum JSON-RPC nodes.
//!
//! ## Usage
//!
//! ```bash
//! # Offline ABI helpers
//! ethrpc selector 'transfer(address,uint256)'
//! ethrpc calldata 'getDAOById(bytes32)' --arg bytes32=0x01
//! ethrpc decode --types int32,bool 0xffff...
//!
//! # Node queries
//! ethrpc call --to 0x... --sig 'totalSupply()' --types uint256
//! ethrpc block-number
//! ethrpc gas-price
//!
//! # Address checks
//! ethrpc address valid 0x0ccaf8cb1c92aef64dd36ce1f3882d195180ad5c
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod error;
mod output;

use config::Config;
use error::CliError;
use output::Output;

/// Ethereum JSON-RPC CLI
#[derive(Parser, Debug)]
#[command(name = "ethrpc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// RPC endpoint URL
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Config file (default: ~/.ethrpc/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// CLI commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the 4-byte selector of a function signature
    Selector {
        /// Canonical signature, e.g. transfer(address,uint256)
        signature: String,
    },
    /// Encode call data
    Calldata {
        /// Canonical signature
        signature: String,
        /// Argument as type=value (repeatable)
        #[arg(long = "arg")]
        args: Vec<String>,
    },
    /// Decode hex return data
    Decode {
        /// Comma-separated output types
        #[arg(long, value_delimiter = ',', required = true)]
        types: Vec<String>,
        /// Hex data, with or without 0x
        data: String,
    },
    /// Call a contract method (eth_call)
    Call {
        /// Contract address
        #[arg(long)]
        to: String,
        /// Canonical signature
        #[arg(long)]
        sig: String,
        /// Argument as type=value (repeatable)
        #[arg(long = "arg")]
        args: Vec<String>,
        /// Block tag or 0x-prefixed block number
        #[arg(long, default_value = "latest")]
        block: String,
        /// Comma-separated output types; prints raw hex when omitted
        #[arg(long, value_delimiter = ',')]
        types: Vec<String>,
    },
    /// Query current block number
    BlockNumber,
    /// Query current gas price
    GasPrice,
    /// Address checks
    #[command(subcommand)]
    Address(commands::address::AddressCommand),
    /// Show or edit configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Set RPC URL
        #[arg(long)]
        set_rpc: Option<String>,
        /// Set chain ID
        #[arg(long)]
        set_chain_id: Option<u64>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(e) = run(cli).await {
        if json {
            println!(
                "{}",
                serde_json::json!({
                    "error": e.to_string(),
                    "success": false
                })
            );
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = config::resolve_path(cli.config)?;
    let mut config = Config::load_from(&config_path)?;

    init_tracing(&config.log_level);

    if let Some(rpc_url) = cli.rpc_url {
        config.rpc_url = rpc_url;
    }

    let json = cli.json;
    match cli.command {
        Commands::Selector { signature } => commands::abi::selector(&signature, json),
        Commands::Calldata { signature, args } => commands::abi::calldata(&signature, &args, json),
        Commands::Decode { types, data } => commands::abi::decode(&types, &data, json),
        Commands::Call {
            to,
            sig,
            args,
            block,
            types,
        } => commands::query::call(&config, &to, &sig, &args, &block, &types, json).await,
        Commands::BlockNumber => commands::query::block_number(&config, json).await,
        Commands::GasPrice => commands::query::gas_price(&config, json).await,
        Commands::Address(cmd) => cmd.execute(json),
        Commands::Config {
            show,
            set_rpc,
            set_chain_id,
        } => handle_config(&mut config, &config_path, show, set_rpc, set_chain_id, json),
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn handle_config(
    config: &mut Config,
    path: &Path,
    show: bool,
    set_rpc: Option<String>,
    set_chain_id: Option<u64>,
    json: bool,
) -> Result<(), CliError> {
    let mut modified = false;

    if let Some(rpc) = set_rpc {
        config.rpc_url = rpc;
        modified = true;
    }

    if let Some(chain_id) = set_chain_id {
        config.chain_id = Some(chain_id);
        modified = true;
    }

    if modified {
        config.save_to(path)?;
        tracing::info!(path = %path.display(), "configuration saved");
        Output::new(json)
            .field("status", "saved")
            .message("Configuration saved")
            .print();
    } else if show {
        let chain_id = config
            .chain_id
            .map_or_else(|| "none".to_string(), |id| id.to_string());
        Output::new(json)
            .field("rpc_url", &config.rpc_url)
            .field_value("chain_id", serde_json::json!(config.chain_id))
            .field_u64("gas_limit", config.gas_limit)
            .field("log_level", &config.log_level)
            .message(&format!(
                "RPC URL: {}\nChain ID: {}\nGas Limit: {}\nLog Level: {}",
                config.rpc_url, chain_id, config.gas_limit, config.log_level
            ))
            .print();
    } else {
        Output::new(json)
            .message("Use --show to display config, or --set-rpc/--set-chain-id to modify")
            .print();
    }

    Ok(())
}
