//! Core data types for the trading bot.

mod asset;
mod order;
mod position;
mod price;
mod signal;

pub use asset::{AssetCandidate, AssetClass, AssetStatus, Exchange};
pub use order::{OrderConfirmation, OrderRequest, OrderStatus, OrderType, Side, TimeInForce};
pub use position::{Account, Position};
pub use price::{PriceBar, PriceSeries};
pub use signal::Signal;
