//! `swapdesk nodes check` and `swapdesk nodes select`

use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use swapdesk_core::types::BackendKind;
use swapdesk_sync::{probe_all, select_all, DaemonProber, Prober};

use super::{print_json, runtime, Env};
use crate::GlobalArgs;

#[derive(Subcommand, Debug)]
pub enum NodesCommand {
    /// Probe every configured node and report which ones answer.
    Check(OutputArgs),
    /// Run the node race and print the endpoints a bootstrap would use.
    Select(OutputArgs),
}

#[derive(Args, Debug)]
pub struct OutputArgs {
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled, Serialize)]
struct NodeRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(skip)]
    available: bool,
}

#[derive(Serialize)]
struct Selection {
    network: String,
    electrum: Option<String>,
    monero: Option<String>,
}

pub fn run(command: NodesCommand, global: &GlobalArgs) -> Result<()> {
    let env = Env::load(global)?;
    let prober: Arc<dyn Prober> = Arc::new(DaemonProber::new(env.client()));
    let rt = runtime()?;
    match command {
        NodesCommand::Check(args) => rt.block_on(check(&env, &prober, args.json)),
        NodesCommand::Select(args) => rt.block_on(select(&env, &prober, args.json)),
    }
}

async fn check(env: &Env, prober: &Arc<dyn Prober>, json: bool) -> Result<()> {
    let network = env.config.network;
    let mut rows = Vec::new();
    for kind in BackendKind::all() {
        let candidates = env.config.candidates(network, kind);
        for result in probe_all(prober, &candidates).await {
            rows.push(NodeRow {
                kind: kind.to_string(),
                url: result.endpoint.url,
                status: status_word(result.available).to_string(),
                available: result.available,
            });
        }
    }

    if json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        println!("No nodes configured for {network}.");
        return Ok(());
    }
    let up = rows.iter().filter(|row| row.available).count();
    println!("{network}: {up}/{} nodes reachable", rows.len());
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn status_word(available: bool) -> &'static str {
    if available {
        "UP"
    } else {
        "DOWN"
    }
}

async fn select(env: &Env, prober: &Arc<dyn Prober>, json: bool) -> Result<()> {
    let resolved = select_all(prober, &env.config).await;
    let selection = Selection {
        network: env.config.network.to_string(),
        electrum: resolved.electrum.map(|e| e.url),
        monero: resolved.monero.map(|e| e.url),
    };
    if json {
        return print_json(&selection);
    }
    let show = |url: &Option<String>| match url {
        Some(url) => url.green().to_string(),
        None => "none reachable (daemon default)".yellow().to_string(),
    };
    println!("network   {}", selection.network);
    println!("electrum  {}", show(&selection.electrum));
    println!("monero    {}", show(&selection.monero));
    Ok(())
}
