//! Error types for the trading bot.

use thiserror::Error;

/// Top-level trading error.
///
/// Anything that reaches the cycle boundary as a `TradingError` aborts the
/// remainder of that cycle.
#[derive(Error, Debug)]
pub enum TradingError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),

    #[error("Broker error: {0}")]
    Broker(#[from] BrokerError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Strategy-specific errors.
#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Broker-specific errors.
#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Order rejected: {0}")]
    OrderRejected(String),

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        required: rust_decimal::Decimal,
        available: rust_decimal::Decimal,
    },

    #[error("Position not found: {0}")]
    PositionNotFound(String),

    #[error("Market closed")]
    MarketClosed,

    #[error("API error: {0}")]
    ApiError(String),
}

/// Price and reference data errors.
///
/// A symbol that is simply missing from a response is not an error; it is
/// dropped from consideration by the caller.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("No data available for the requested range")]
    NoDataAvailable,

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Data source error: {0}")]
    Internal(String),
}

/// Operator notification errors. Never fatal to a cycle.
#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Notifier configuration error: {0}")]
    Configuration(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Result type alias for trading operations.
pub type TradingResult<T> = Result<T, TradingError>;
