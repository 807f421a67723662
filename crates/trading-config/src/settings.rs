//! Configuration structures.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use trading_core::{AssetClass, AssetStatus, Exchange};
use trading_strategies::{MACrossoverConfig, SelectionPolicy, WindowConvention};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub alpaca: AlpacaSettings,
    #[serde(default)]
    pub strategy: StrategySettings,
    #[serde(default)]
    pub universe: UniverseSettings,
    #[serde(default)]
    pub entry: EntrySettings,
    #[serde(default)]
    pub selection: SelectionSettings,
    #[serde(default)]
    pub schedule: ScheduleSettings,
    #[serde(default)]
    pub notifier: NotifierSettings,
}

impl AppConfig {
    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        self.strategy
            .crossover()
            .validate()
            .map_err(|e| e.to_string())?;
        if self.strategy.lookback_days <= 0 {
            return Err("strategy.lookback_days must be positive".into());
        }
        if self.strategy.history_limit < self.strategy.long_window + 1 {
            return Err(format!(
                "strategy.history_limit must be at least long_window + 1 ({})",
                self.strategy.long_window + 1
            ));
        }
        if self.universe.exchanges.is_empty() {
            return Err("universe.exchanges must list at least one exchange".into());
        }
        if self.universe.min_price < Decimal::ZERO || self.universe.requote_min_price < Decimal::ZERO {
            return Err("universe price floors must not be negative".into());
        }
        if self.universe.quote_batch_size == 0 {
            return Err("universe.quote_batch_size must be positive".into());
        }
        if self.entry.order_quantity <= Decimal::ZERO {
            return Err("entry.order_quantity must be positive".into());
        }
        self.schedule.time_of_day()?;
        Ok(())
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "crossover-bot".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file: Option<String>,
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Alpaca API configuration. Credentials stay in the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlpacaSettings {
    pub api_key_env: String,
    pub api_secret_env: String,
    pub paper: bool,
    pub data_feed: String,
}

impl Default for AlpacaSettings {
    fn default() -> Self {
        Self {
            api_key_env: "APCA_API_KEY_ID".to_string(),
            api_secret_env: "APCA_API_SECRET_KEY".to_string(),
            paper: true,
            data_feed: "iex".to_string(),
        }
    }
}

/// Signal engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategySettings {
    pub short_window: usize,
    pub long_window: usize,
    /// Calendar days of daily history requested per symbol
    pub lookback_days: i64,
    /// Trailing bars kept per symbol
    pub history_limit: usize,
    pub window_convention: WindowConvention,
}

impl StrategySettings {
    pub fn crossover(&self) -> MACrossoverConfig {
        MACrossoverConfig {
            short_window: self.short_window,
            long_window: self.long_window,
            convention: self.window_convention,
        }
    }
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            short_window: 30,
            long_window: 100,
            lookback_days: 210,
            history_limit: 210,
            window_convention: WindowConvention::Truncated,
        }
    }
}

/// Candidate universe settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UniverseSettings {
    pub exchanges: Vec<Exchange>,
    pub asset_class: AssetClass,
    pub status: AssetStatus,
    /// Exclusive price floor for the initial candidate scan
    pub min_price: Decimal,
    /// Exclusive price floor when re-quoting candidates inside the entry loop
    pub requote_min_price: Decimal,
    /// Symbols per market data request
    pub quote_batch_size: usize,
}

impl Default for UniverseSettings {
    fn default() -> Self {
        Self {
            exchanges: vec![Exchange::Nasdaq, Exchange::Nyse],
            asset_class: AssetClass::UsEquity,
            status: AssetStatus::Active,
            min_price: dec!(2),
            requote_min_price: dec!(1),
            quote_batch_size: 200,
        }
    }
}

/// Entry loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntrySettings {
    /// Buying stops once cash is at or below this amount
    pub min_cash: Decimal,
    /// Shares per buy order
    pub order_quantity: Decimal,
    /// Wait after each buy before re-reading cash
    pub settle_delay_secs: u64,
}

impl EntrySettings {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs)
    }
}

impl Default for EntrySettings {
    fn default() -> Self {
        Self {
            min_cash: dec!(5),
            order_quantity: dec!(1),
            settle_delay_secs: 60,
        }
    }
}

/// Candidate selection settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SelectionSettings {
    pub policy: SelectionPolicy,
    pub seed: Option<u64>,
}

/// Daily trigger settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    /// Local time of day, `HH:MM`
    pub time: String,
}

impl ScheduleSettings {
    pub fn time_of_day(&self) -> Result<NaiveTime, String> {
        NaiveTime::parse_from_str(&self.time, "%H:%M")
            .map_err(|e| format!("schedule.time '{}' is not HH:MM: {}", self.time, e))
    }
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            time: "15:30".to_string(),
        }
    }
}

/// Where operator messages go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    #[default]
    Discord,
    Log,
}

/// Operator notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierSettings {
    pub kind: NotifierKind,
    pub discord_id_env: String,
    pub discord_token_env: String,
    pub username: String,
    pub avatar_url: Option<String>,
    /// Prepended to error reports to page the operator
    pub alert_prefix: String,
}

impl Default for NotifierSettings {
    fn default() -> Self {
        Self {
            kind: NotifierKind::Discord,
            discord_id_env: "DISCORD_ID".to_string(),
            discord_token_env: "DISCORD_TOKEN".to_string(),
            username: "alpaca-algorithmic-trader".to_string(),
            avatar_url: None,
            alert_prefix: "@everyone".to_string(),
        }
    }
}
