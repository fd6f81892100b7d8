//! `swapdesk config show|path|init`

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};

use swapdesk_core::config::{self, Config};

use super::{print_json, Env};
use crate::GlobalArgs;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration (defaults merged with the file).
    Show(ShowArgs),
    /// Print the config file location.
    Path,
    /// Write a config file with default values.
    Init(InitArgs),
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Emit JSON instead of YAML.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(long)]
    pub force: bool,
}

pub fn run(command: ConfigCommand, global: &GlobalArgs) -> Result<()> {
    let env = Env::load(global)?;
    match command {
        ConfigCommand::Show(args) => show(&env.config, args.json),
        ConfigCommand::Path => {
            println!("{}", config::config_path_at(&env.home).display());
            Ok(())
        }
        ConfigCommand::Init(args) => init(&env, args.force),
    }
}

fn show(config: &Config, json: bool) -> Result<()> {
    if json {
        return print_json(config);
    }
    let yaml = serde_yaml::to_string(config).context("failed to serialize config")?;
    print!("{yaml}");
    Ok(())
}

fn init(env: &Env, force: bool) -> Result<()> {
    let path = config::config_path_at(&env.home);
    if path.exists() && !force {
        bail!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    let mut fresh = Config::default();
    fresh.network = env.config.network;
    let written = config::save_at(&env.home, &fresh).context("failed to write config")?;
    println!("wrote {}", written.display());
    Ok(())
}
