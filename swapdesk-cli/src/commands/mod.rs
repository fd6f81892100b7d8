pub mod config;
pub mod context;
pub mod nodes;
pub mod swaps;
pub mod wallet;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::runtime::Runtime;

use swapdesk_core::config::{load_at, Config};
use swapdesk_daemon::paths::resolve_socket;
use swapdesk_daemon::{DaemonClient, SocketTransport};

use crate::GlobalArgs;

const SATS_PER_BTC: f64 = 100_000_000.0;
const PICONERO_PER_XMR: f64 = 1_000_000_000_000.0;

/// Home, loaded config and daemon socket for one invocation.
pub struct Env {
    pub home: PathBuf,
    pub config: Config,
    pub socket: PathBuf,
}

impl Env {
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let mut config = load_at(&home).context("failed to load swapdesk config")?;
        if let Some(network) = global.network {
            config.network = network.into();
        }
        let socket = global
            .socket
            .clone()
            .unwrap_or_else(|| resolve_socket(&home, &config));
        tracing::debug!(network = %config.network, socket = %socket.display(), "loaded config");
        Ok(Self {
            home,
            config,
            socket,
        })
    }

    pub fn client(&self) -> DaemonClient {
        DaemonClient::new(Arc::new(SocketTransport::new(&self.socket)))
    }
}

/// Everything runs on one thread; callbacks interleave only at await points.
pub fn runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("failed to serialize JSON output")?
    );
    Ok(())
}

pub fn format_btc(sats: u64) -> String {
    format!("{:.8} BTC", sats as f64 / SATS_PER_BTC)
}

pub fn format_xmr(piconero: u64) -> String {
    format!("{:.12} XMR", piconero as f64 / PICONERO_PER_XMR)
}
