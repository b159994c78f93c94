//! PetFriends CLI - client and scenario test runner for the PetFriends API
//!
//! Exposes every API operation as a subcommand and runs YAML test
//! scenarios against a live service.

use std::path::PathBuf;

use clap::Parser;
use petfriends::commands::Commands;
use petfriends::common::config::Config;
use petfriends::common::logging;
use petfriends::{cli, Result};

#[derive(Parser)]
#[command(name = "petfriends", about = "PetFriends API client and test runner")]
#[command(version, long_about = None)]
struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the service base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(url) = &cli.base_url {
        config.service.base_url = url.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() {
    logging::init_cli();

    let cli = Cli::parse();

    let result = match load_config(&cli) {
        Ok(config) => cli::dispatch(cli.command, &config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
