//! Core types and traits for the crossover trading bot.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (PriceBar, PriceSeries)
//! - Order, position, account and asset reference types
//! - Crossover signals
//! - Collaborator traits for brokers, price and asset sources, notifiers and indicators

pub mod types;
pub mod traits;
pub mod error;

pub use error::{TradingError, TradingResult};
pub use types::*;
pub use traits::*;
