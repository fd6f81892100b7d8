//! `swapdesk sellers` and `swapdesk wallet descriptor|monero-addresses`

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tabled::{settings::Style, Table, Tabled};

use swapdesk_core::types::Seller;
use swapdesk_sync::{Actions, StatusStore};

use super::{format_btc, print_json, runtime, Env};
use crate::GlobalArgs;

#[derive(Subcommand, Debug)]
pub enum WalletCommand {
    /// Export the Bitcoin wallet descriptor.
    Descriptor,
    /// List the Monero addresses used as swap destinations.
    MoneroAddresses,
}

#[derive(Args, Debug)]
pub struct SellersArgs {
    /// Rendezvous point to query; defaults to the configured one.
    #[arg(long, value_name = "MULTIADDR")]
    pub rendezvous: Option<String>,

    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct SellerRow {
    #[tabled(rename = "peer")]
    peer_id: String,
    #[tabled(rename = "price")]
    price: String,
    #[tabled(rename = "min")]
    min: String,
    #[tabled(rename = "max")]
    max: String,
    #[tabled(rename = "address")]
    multiaddr: String,
}

impl From<&Seller> for SellerRow {
    fn from(seller: &Seller) -> Self {
        let (price, min, max) = match &seller.quote {
            Some(quote) => (
                format!("{} / XMR", format_btc(quote.price)),
                format_btc(quote.min_quantity),
                format_btc(quote.max_quantity),
            ),
            None => ("-".to_string(), "-".to_string(), "-".to_string()),
        };
        Self {
            peer_id: seller.peer_id.clone(),
            price,
            min,
            max,
            multiaddr: seller.multiaddr.clone(),
        }
    }
}

impl SellersArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let env = Env::load(global)?;
        let actions = Actions::new(env.client(), StatusStore::new());
        let point = self
            .rendezvous
            .unwrap_or_else(|| env.config.rendezvous_point.clone());
        let sellers = runtime()?
            .block_on(actions.discover_sellers(Some(&point)))
            .with_context(|| format!("failed to list sellers at {point}"))?;

        if self.json {
            return print_json(&sellers);
        }
        if sellers.is_empty() {
            println!("No sellers registered at {point}.");
            return Ok(());
        }
        let mut table = Table::new(sellers.iter().map(SellerRow::from));
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}

pub fn run(command: WalletCommand, global: &GlobalArgs) -> Result<()> {
    let env = Env::load(global)?;
    let client = env.client();
    let rt = runtime()?;
    match command {
        WalletCommand::Descriptor => {
            let descriptor = rt
                .block_on(client.get_wallet_descriptor())
                .context("failed to export wallet descriptor")?;
            print_json(&descriptor.descriptor)
        }
        WalletCommand::MoneroAddresses => {
            let addresses = rt
                .block_on(client.get_monero_addresses())
                .context("failed to list Monero addresses")?;
            if addresses.is_empty() {
                println!("No Monero addresses recorded.");
            }
            for address in addresses {
                println!("{address}");
            }
            Ok(())
        }
    }
}
