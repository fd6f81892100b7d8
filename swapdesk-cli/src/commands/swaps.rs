//! Swap lifecycle and Bitcoin wallet commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use serde_json::json;
use tabled::{settings::Style, Table, Tabled};

use swapdesk_core::types::{SwapId, SwapInfo};

use super::{format_btc, format_xmr, print_json, runtime, Env};
use crate::GlobalArgs;

#[derive(Subcommand, Debug)]
pub enum SwapsCommand {
    /// List every swap the daemon knows about.
    List(JsonArgs),
    /// Show one swap in detail.
    Show(SwapArgs),
    /// Resume a suspended or interrupted swap.
    Resume(SwapIdArg),
    /// Suspend the swap the daemon is currently running.
    Suspend,
    /// Print the Monero keys needed to recover a swap's funds manually.
    Recover(SwapArgs),
    /// Print the daemon's log lines for one swap.
    Logs(LogsArgs),
}

#[derive(Args, Debug)]
pub struct JsonArgs {
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SwapIdArg {
    pub swap_id: SwapId,
}

#[derive(Args, Debug)]
pub struct SwapArgs {
    pub swap_id: SwapId,

    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct LogsArgs {
    pub swap_id: SwapId,

    /// Ask the daemon to redact addresses and transaction ids.
    #[arg(long)]
    pub redact: bool,
}

#[derive(Args, Debug)]
pub struct BalanceArgs {
    /// Resync the wallet before reporting.
    #[arg(long)]
    pub force: bool,

    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct BuyArgs {
    /// Seller multiaddress, including its `/p2p/<peer id>` suffix.
    #[arg(long)]
    pub seller: String,

    /// Monero address that receives the bought XMR.
    #[arg(long = "receive", value_name = "XMR_ADDRESS")]
    pub monero_receive_address: String,

    /// Bitcoin address for change and refunds; defaults to the internal wallet.
    #[arg(long = "change", value_name = "BTC_ADDRESS")]
    pub bitcoin_change_address: Option<String>,
}

#[derive(Args, Debug)]
pub struct WithdrawArgs {
    /// Destination Bitcoin address.
    pub address: String,

    /// Amount in satoshi; omit to sweep the whole balance.
    #[arg(long)]
    pub amount: Option<u64>,
}

#[derive(Tabled)]
struct SwapRow {
    #[tabled(rename = "swap")]
    swap_id: String,
    #[tabled(rename = "state")]
    state: String,
    #[tabled(rename = "btc")]
    btc: String,
    #[tabled(rename = "xmr")]
    xmr: String,
    #[tabled(rename = "started")]
    started: String,
    #[tabled(rename = "timelock")]
    timelock: String,
}

impl From<&SwapInfo> for SwapRow {
    fn from(info: &SwapInfo) -> Self {
        Self {
            swap_id: info.swap_id.to_string(),
            state: if info.completed {
                info.state_name.green().to_string()
            } else {
                info.state_name.clone()
            },
            btc: format_btc(info.btc_amount),
            xmr: format_xmr(info.xmr_amount),
            started: info.start_date.clone(),
            timelock: info
                .timelock
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

pub fn run(command: SwapsCommand, global: &GlobalArgs) -> Result<()> {
    let env = Env::load(global)?;
    runtime()?.block_on(dispatch(command, &env))
}

async fn dispatch(command: SwapsCommand, env: &Env) -> Result<()> {
    let client = env.client();
    match command {
        SwapsCommand::List(args) => {
            let mut swaps = client
                .get_swap_infos_all()
                .await
                .context("failed to list swaps")?;
            swaps.sort_by(|a, b| b.start_date.cmp(&a.start_date));
            if args.json {
                return print_json(&swaps);
            }
            if swaps.is_empty() {
                println!("No swaps yet.");
                return Ok(());
            }
            let mut table = Table::new(swaps.iter().map(SwapRow::from));
            table.with(Style::rounded());
            println!("{table}");
        }
        SwapsCommand::Show(args) => {
            let info = client
                .get_swap_info(args.swap_id)
                .await
                .with_context(|| format!("failed to fetch swap {}", args.swap_id))?;
            if args.json {
                return print_json(&info);
            }
            print_swap(&info);
        }
        SwapsCommand::Resume(args) => {
            client
                .resume_swap(args.swap_id)
                .await
                .with_context(|| format!("failed to resume swap {}", args.swap_id))?;
            println!("resumed swap {}", args.swap_id);
        }
        SwapsCommand::Suspend => {
            client
                .suspend_current_swap()
                .await
                .context("failed to suspend running swap")?;
            println!("running swap suspended");
        }
        SwapsCommand::Recover(args) => {
            let keys = client
                .monero_recovery(args.swap_id)
                .await
                .with_context(|| format!("failed to fetch recovery keys for {}", args.swap_id))?;
            if args.json {
                return print_json(&keys);
            }
            println!("address         {}", keys.address);
            println!("spend key       {}", keys.spend_key);
            println!("view key        {}", keys.view_key);
            println!("restore height  {}", keys.restore_height);
        }
        SwapsCommand::Logs(args) => {
            let logs = client
                .get_logs(args.swap_id, args.redact)
                .await
                .with_context(|| format!("failed to fetch logs for {}", args.swap_id))?;
            for line in logs.logs {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn print_swap(info: &SwapInfo) {
    println!("{}", info.swap_id.to_string().bold());
    println!("state             {}", info.state_name);
    println!("completed         {}", info.completed);
    println!("started           {}", info.start_date);
    println!("seller            {}", info.seller.peer_id);
    for address in &info.seller.addresses {
        println!("                  {address}");
    }
    println!("send              {}", format_btc(info.btc_amount));
    println!("receive           {}", format_xmr(info.xmr_amount));
    println!("lock fee          {}", format_btc(info.tx_lock_fee));
    println!("cancel fee        {}", format_btc(info.tx_cancel_fee));
    println!("refund fee        {}", format_btc(info.tx_refund_fee));
    if let Some(txid) = &info.tx_lock_id {
        println!("lock tx           {txid}");
    }
    if let Some(address) = &info.btc_refund_address {
        println!("refund address    {address}");
    }
    println!(
        "timelocks         cancel {} / punish {} blocks",
        info.cancel_timelock, info.punish_timelock
    );
    if let Some(timelock) = &info.timelock {
        println!("timelock status   {timelock}");
    }
}

impl BalanceArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let env = Env::load(global)?;
        let balance = runtime()?
            .block_on(env.client().get_balance(self.force))
            .context("failed to fetch balance")?
            .balance;
        if self.json {
            return print_json(&json!({ "balance": balance }));
        }
        println!("{}", format_btc(balance));
        Ok(())
    }
}

impl BuyArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let env = Env::load(global)?;
        runtime()?
            .block_on(env.client().buy_xmr(
                &self.seller,
                &self.monero_receive_address,
                self.bitcoin_change_address.as_deref(),
            ))
            .context("failed to start swap")?;
        println!("swap started; follow it with `swapdesk watch`");
        Ok(())
    }
}

impl WithdrawArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let env = Env::load(global)?;
        let response = runtime()?
            .block_on(env.client().withdraw_btc(&self.address, self.amount))
            .context("failed to withdraw")?;
        match response.amount {
            Some(amount) => println!("sent {} in {}", format_btc(amount), response.txid),
            None => println!("sent in {}", response.txid),
        }
        Ok(())
    }
}
