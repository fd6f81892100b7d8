//! Swapdesk: terminal front end for the atomic swap daemon.
//!
//! # Usage
//!
//! ```text
//! swapdesk watch [--logs]
//! swapdesk context status|init
//! swapdesk nodes check|select
//! swapdesk balance [--force] [--json]
//! swapdesk swaps list|show|resume|suspend|recover|logs
//! swapdesk buy --seller <multiaddr> --receive <xmr address> [--change <btc address>]
//! swapdesk withdraw <address> [--amount <sats>]
//! swapdesk sellers [--rendezvous <multiaddr>]
//! swapdesk wallet descriptor|monero-addresses
//! swapdesk config show|path|init
//! ```

mod commands;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{
    config::ConfigCommand,
    context::ContextCommand,
    nodes::NodesCommand,
    swaps::{BalanceArgs, BuyArgs, SwapsCommand, WithdrawArgs},
    wallet::{SellersArgs, WalletCommand},
    watch::WatchArgs,
};
use swapdesk_core::types::Network;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "swapdesk",
    version,
    about = "Drive BTC→XMR atomic swaps through a running swap daemon",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options accepted by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Daemon socket; overrides the configured location.
    #[arg(long, global = true, value_name = "PATH")]
    pub socket: Option<PathBuf>,

    /// Network to operate on: mainnet | testnet. Overrides the config file.
    #[arg(long, global = true, value_name = "NETWORK")]
    pub network: Option<NetworkArg>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Bring the daemon context up and follow live state until interrupted.
    Watch(WatchArgs),

    /// Inspect or initialize the daemon context.
    Context {
        #[command(subcommand)]
        command: ContextCommand,
    },

    /// Probe the configured Electrum and Monero nodes.
    Nodes {
        #[command(subcommand)]
        command: NodesCommand,
    },

    /// Show the Bitcoin wallet balance.
    Balance(BalanceArgs),

    /// List and operate on swaps.
    Swaps {
        #[command(subcommand)]
        command: SwapsCommand,
    },

    /// Start a swap with a seller.
    Buy(BuyArgs),

    /// Withdraw Bitcoin from the internal wallet.
    Withdraw(WithdrawArgs),

    /// Discover sellers at a rendezvous point.
    Sellers(SellersArgs),

    /// Wallet export helpers.
    Wallet {
        #[command(subcommand)]
        command: WalletCommand,
    },

    /// Show or write the local configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

// ---------------------------------------------------------------------------
// Shared Network argument, parsed from CLI strings
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse `Network` from CLI args.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkArg(pub Network);

impl FromStr for NetworkArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self(Network::Mainnet)),
            "testnet" => Ok(Self(Network::Testnet)),
            other => Err(format!(
                "unknown network '{other}'; expected: mainnet, testnet"
            )),
        }
    }
}

impl fmt::Display for NetworkArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<NetworkArg> for Network {
    fn from(n: NetworkArg) -> Self {
        n.0
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let global = cli.global;
    match cli.command {
        Commands::Watch(args) => args.run(&global),
        Commands::Context { command } => commands::context::run(command, &global),
        Commands::Nodes { command } => commands::nodes::run(command, &global),
        Commands::Balance(args) => args.run(&global),
        Commands::Swaps { command } => commands::swaps::run(command, &global),
        Commands::Buy(args) => args.run(&global),
        Commands::Withdraw(args) => args.run(&global),
        Commands::Sellers(args) => args.run(&global),
        Commands::Wallet { command } => commands::wallet::run(command, &global),
        Commands::Config { command } => commands::config::run(command, &global),
    }
}
