//! `swapdesk watch`: bootstrap the daemon context and stream state changes.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use swapdesk_core::types::{ComponentState, ContextStatus, InitPhase};
use swapdesk_sync::{AppState, Session};

use super::{format_btc, runtime, Env};
use crate::GlobalArgs;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Also print daemon log lines as they arrive.
    #[arg(long)]
    pub logs: bool,
}

impl WatchArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let env = Env::load(global)?;
        runtime()?.block_on(self.watch(env))
    }

    async fn watch(self, env: Env) -> Result<()> {
        let session = Session::connect(&env.socket, env.config.clone())
            .await
            .context("failed to connect to daemon")?;
        println!(
            "watching {} ({}); Ctrl-C to stop",
            env.socket.display(),
            env.config.network
        );

        let mut updates = session.store().subscribe();
        let (mut previous, mut logs_seen) = {
            let current = updates.borrow_and_update();
            let lines = changes(&AppState::default(), &current, self.logs.then_some(0));
            for line in lines {
                println!("{line}");
            }
            (without_logs(&current), current.logs.len())
        };
        let closed = session.closed();
        tokio::pin!(closed);

        loop {
            tokio::select! {
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let next = updates.borrow_and_update();
                    for line in changes(&previous, &next, self.logs.then_some(logs_seen)) {
                        println!("{line}");
                    }
                    previous = without_logs(&next);
                    logs_seen = next.logs.len();
                }
                _ = &mut closed => {
                    println!("{}", "daemon closed the event stream".yellow());
                    break;
                }
                _ = tokio::signal::ctrl_c() => break,
            }
        }
        Ok(())
    }
}

/// Copy of `state` minus its log history, which only ever grows and is
/// tracked by length instead.
fn without_logs(state: &AppState) -> AppState {
    AppState {
        context: state.context.clone(),
        balance: state.balance,
        swaps: state.swaps.clone(),
        progress: state.progress.clone(),
        running_swap: state.running_swap,
        logs: Vec::new(),
        background_refunds: state.background_refunds.clone(),
        sellers: state.sellers.clone(),
    }
}

/// One line per observable difference between two snapshots. Log lines from
/// index `logs_seen` on are included when it is set.
pub fn changes(prev: &AppState, next: &AppState, logs_seen: Option<usize>) -> Vec<String> {
    let mut lines = Vec::new();

    if prev.context != next.context {
        lines.push(format!("context  {}", describe_context(&next.context)));
    }
    if prev.balance != next.balance {
        if let Some(balance) = next.balance {
            lines.push(format!("balance  {}", format_btc(balance)));
        }
    }

    for (id, info) in &next.swaps {
        match prev.swaps.get(id) {
            Some(old) if old.state_name == info.state_name && old.timelock == info.timelock => {}
            _ => {
                let timelock = info
                    .timelock
                    .as_ref()
                    .map(|t| format!(" ({t})"))
                    .unwrap_or_default();
                lines.push(format!("swap {id}  {}{timelock}", info.state_name));
            }
        }
    }

    for (id, steps) in &next.progress {
        let seen = prev.progress.get(id).map_or(0, Vec::len);
        for step in steps.iter().skip(seen) {
            lines.push(format!("swap {id}  step {}", step.kind.cyan()));
        }
    }

    for (id, refund) in &next.background_refunds {
        if prev.background_refunds.get(id) != Some(refund) {
            lines.push(format!("swap {id}  background refund {refund}"));
        }
    }

    if let Some(seen) = logs_seen {
        for entry in next.logs.iter().skip(seen) {
            let level = entry.level.as_deref().unwrap_or("LOG");
            lines.push(format!("{} {}", level.bright_black(), entry.message));
        }
    }

    lines
}

pub fn describe_context(status: &ContextStatus) -> String {
    match status {
        ContextStatus::Uninitialized => "uninitialized".bright_black().to_string(),
        ContextStatus::Initializing(InitPhase::SelectingNodes) => {
            "initializing: selecting nodes".yellow().to_string()
        }
        ContextStatus::Initializing(InitPhase::Requested) => {
            "initializing: waiting for daemon".yellow().to_string()
        }
        ContextStatus::Initializing(InitPhase::Components(components)) => {
            let parts: Vec<String> = components
                .iter()
                .map(|c| match &c.progress {
                    ComponentState::Pending => format!("{} pending", c.component_name),
                    ComponentState::Progress { current, total } => {
                        format!("{} {current}/{total}", c.component_name)
                    }
                    ComponentState::Completed => format!("{} done", c.component_name),
                })
                .collect();
            format!("{} {}", "initializing:".yellow(), parts.join(", "))
        }
        ContextStatus::Available => "available".green().bold().to_string(),
        ContextStatus::Failed(reason) => format!("{} {reason}", "failed:".red().bold()),
    }
}
