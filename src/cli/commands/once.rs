//! Single cycle command.

use anyhow::Result;
use tracing::info;
use trading_config::AppConfig;

use super::build_engine;

pub async fn run(config: AppConfig) -> Result<()> {
    let mut engine = build_engine(&config)?;

    match engine.run_guarded().await {
        Some(report) => info!(
            market_open = report.market_open,
            sells = report.sells.len(),
            buys = report.buys.len(),
            elapsed = ?report.elapsed,
            "Cycle finished"
        ),
        None => info!("Cycle aborted, see operator channel"),
    }

    Ok(())
}
