//! Configuration management.

mod settings;

pub use settings::{
    AlpacaSettings, AppConfig, AppSettings, EntrySettings, LoggingConfig, NotifierKind,
    NotifierSettings, ScheduleSettings, SelectionSettings, StrategySettings, UniverseSettings,
};

use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use config::builder::DefaultState;
use std::path::Path;

/// Load configuration from file and environment.
///
/// Environment variables use the `TRADING__` prefix with `__` between
/// section and key, e.g. `TRADING__ENTRY__SETTLE_DELAY_SECS=30`.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    build(Config::builder().add_source(File::from(path).required(true)))
}

/// Load configuration from TOML text and environment.
pub fn load_config_str(toml: &str) -> Result<AppConfig, ConfigError> {
    build(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
}

fn build(builder: ConfigBuilder<DefaultState>) -> Result<AppConfig, ConfigError> {
    let config = builder
        .add_source(
            Environment::with_prefix("TRADING")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app: AppConfig = config.try_deserialize()?;
    app.validate().map_err(ConfigError::Message)?;
    Ok(app)
}
