//! Validate configuration command.

use anyhow::Result;
use std::path::Path;
use trading_config::AppConfig;

/// Loading already validated the configuration; print what took effect.
pub fn run(config_path: &Path, config: &AppConfig) -> Result<()> {
    println!("Configuration is valid: {}", config_path.display());
    println!();
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
