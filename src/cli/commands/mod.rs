//! CLI command implementations.

pub mod once;
pub mod run;
pub mod validate;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use trading_broker::{AlpacaBroker, AlpacaConfig};
use trading_config::{AppConfig, NotifierKind};
use trading_core::traits::{Broker, Notifier};
use trading_engine::{EngineConfig, TradingEngine};
use trading_monitor::{DiscordNotifier, LogNotifier};

/// Engine settings from the loaded configuration.
pub fn engine_config(config: &AppConfig) -> EngineConfig {
    EngineConfig {
        crossover: config.strategy.crossover(),
        lookback_days: config.strategy.lookback_days,
        history_limit: config.strategy.history_limit,
        exchanges: config.universe.exchanges.clone(),
        asset_class: config.universe.asset_class,
        status: config.universe.status,
        min_price: config.universe.min_price,
        requote_min_price: config.universe.requote_min_price,
        min_cash: config.entry.min_cash,
        order_quantity: config.entry.order_quantity,
        settle_delay: config.entry.settle_delay(),
        alert_prefix: config.notifier.alert_prefix.clone(),
    }
}

fn notifier(config: &AppConfig) -> Result<Arc<dyn Notifier>> {
    let settings = &config.notifier;
    Ok(match settings.kind {
        NotifierKind::Discord => Arc::new(
            DiscordNotifier::from_env(&settings.discord_id_env, &settings.discord_token_env)
                .context("configuring Discord notifier")?
                .with_username(settings.username.clone())
                .with_avatar_url(settings.avatar_url.clone()),
        ),
        NotifierKind::Log => Arc::new(LogNotifier),
    })
}

/// Wire the Alpaca client, notifier and selector into an engine.
pub fn build_engine(config: &AppConfig) -> Result<TradingEngine> {
    let alpaca = AlpacaConfig::from_env_vars(
        &config.alpaca.api_key_env,
        &config.alpaca.api_secret_env,
        config.alpaca.paper,
    )
    .context("reading Alpaca credentials")?
    .with_data_feed(config.alpaca.data_feed.clone());

    let broker = Arc::new(
        AlpacaBroker::new(alpaca)
            .context("creating Alpaca client")?
            .with_batch_size(config.universe.quote_batch_size),
    );
    let notifier = notifier(config)?;
    let selector = config.selection.policy.build(config.selection.seed);

    info!(
        broker = Broker::name(broker.as_ref()),
        notifier = notifier.name(),
        selector = selector.name(),
        paper = config.alpaca.paper,
        "Engine ready"
    );

    Ok(TradingEngine::new(
        engine_config(config),
        broker.clone(),
        broker.clone(),
        broker,
        notifier,
        selector,
    ))
}
