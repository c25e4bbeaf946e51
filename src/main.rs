mod cli;
mod command_handlers;
mod config;
mod fetcher;
mod installer;
mod platform;
mod versioning;

use anyhow::Result;
use clap::Parser;

use crate::cli::Cli;
use crate::config::Settings;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| "kubeget.toml".to_string());
    let settings = Settings::load(&path)?;
    command_handlers::dispatch::dispatch(cli.command, &settings)?;
    Ok(())
}
