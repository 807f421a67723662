//! Daily moving-average crossover trading bot.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use trading_config::load_config;
use trading_monitor::setup_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Credentials may live in a local .env file
    dotenvy::dotenv().ok();

    let config = load_config(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;

    let level = cli
        .log_level
        .map(|l| l.as_str().to_string())
        .unwrap_or_else(|| config.logging.level.clone());
    let json = cli.json_logs || config.logging.is_json();
    let _guard = setup_logging(&level, json, config.logging.file.as_deref().map(Path::new));

    match cli.command {
        Commands::Run => cli::commands::run::run(config).await,
        Commands::Once => cli::commands::once::run(config).await,
        Commands::ValidateConfig => cli::commands::validate::run(&cli.config, &config),
    }
}
