//! Core traits for the trading bot.

mod broker;
mod data_source;
mod indicator;
mod notifier;

pub use broker::Broker;
pub use data_source::{AssetSource, PriceSource};
pub use indicator::Indicator;
pub use notifier::Notifier;
