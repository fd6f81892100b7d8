//! `swapdesk context status` and `swapdesk context init`

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use serde_json::json;

use swapdesk_core::types::ContextStatus;
use swapdesk_sync::{BootstrapOutcome, Session};

use super::{print_json, runtime, watch::describe_context, Env};
use crate::GlobalArgs;

#[derive(Subcommand, Debug)]
pub enum ContextCommand {
    /// Ask the daemon whether its context is ready.
    Status(StatusArgs),
    /// Select nodes and initialize the context, then wait until it is ready.
    Init(InitArgs),
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Seconds to wait for the daemon to report readiness.
    #[arg(long, default_value_t = 300)]
    pub timeout: u64,
}

pub fn run(command: ContextCommand, global: &GlobalArgs) -> Result<()> {
    let env = Env::load(global)?;
    let rt = runtime()?;
    match command {
        ContextCommand::Status(args) => rt.block_on(status(&env, args.json)),
        ContextCommand::Init(args) => rt.block_on(init(&env, Duration::from_secs(args.timeout))),
    }
}

async fn status(env: &Env, json: bool) -> Result<()> {
    let available = env
        .client()
        .is_context_available()
        .await
        .context("failed to query context status")?;
    if json {
        return print_json(&json!({ "available": available }));
    }
    let status = if available {
        ContextStatus::Available
    } else {
        ContextStatus::Uninitialized
    };
    println!("context {}", describe_context(&status));
    Ok(())
}

async fn init(env: &Env, timeout: Duration) -> Result<()> {
    let mut session = Session::connect(&env.socket, env.config.clone())
        .await
        .context("failed to connect to daemon")?;
    let mut updates = session.store().subscribe();

    match session.bootstrap_outcome().await {
        Some(BootstrapOutcome::AlreadyAvailable) => {
            println!("context already available");
            return Ok(());
        }
        Some(BootstrapOutcome::Requested { attempts }) => {
            println!("initialization requested after {attempts} attempt(s)");
        }
        Some(BootstrapOutcome::DaemonInitializing) => {
            println!("daemon is already initializing its context");
        }
        Some(BootstrapOutcome::Failed { attempts, reason }) => {
            bail!("context initialization failed after {attempts} attempts: {reason}");
        }
        None => bail!("bootstrap task ended unexpectedly"),
    }

    let wait = async {
        loop {
            let context = updates.borrow_and_update().context.clone();
            match context {
                ContextStatus::Available => return Ok::<(), anyhow::Error>(()),
                ContextStatus::Failed(reason) => {
                    bail!("daemon reported failure: {reason}")
                }
                other => println!("context {}", describe_context(&other)),
            }
            if updates.changed().await.is_err() {
                bail!("status store closed before the context became ready");
            }
        }
    };

    tokio::select! {
        result = tokio::time::timeout(timeout, wait) => match result {
            Ok(ready) => ready?,
            Err(_) => bail!("context not ready after {}s", timeout.as_secs()),
        },
        _ = tokio::signal::ctrl_c() => bail!("interrupted"),
    }
    println!("context {}", describe_context(&ContextStatus::Available));
    Ok(())
}
