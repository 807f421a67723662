//! Scheduled trading command.

use anyhow::{anyhow, Result};
use tracing::info;
use trading_config::AppConfig;
use trading_engine::DailyScheduler;

use super::build_engine;

pub async fn run(config: AppConfig) -> Result<()> {
    let at = config.schedule.time_of_day().map_err(|e| anyhow!(e))?;
    let mut engine = build_engine(&config)?;
    let scheduler = DailyScheduler::new(at);

    info!(at = %scheduler.time_of_day(), "Starting daily scheduler");

    tokio::select! {
        _ = scheduler.run(&mut engine) => {}
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }

    Ok(())
}
