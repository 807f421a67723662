//! Position and account types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A broker-held position in a single security.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Symbol
    pub symbol: String,
    /// Number of shares (positive for long, negative for short)
    pub quantity: Decimal,
    /// Average entry price
    pub avg_entry_price: Decimal,
    /// Current market price
    pub current_price: Decimal,
}

impl Position {
    /// Create a new position.
    pub fn new(symbol: impl Into<String>, quantity: Decimal, avg_entry_price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            avg_entry_price,
            current_price: avg_entry_price,
        }
    }

    /// Check if the position is long.
    pub fn is_long(&self) -> bool {
        self.quantity > Decimal::ZERO
    }

    /// Check if the position is flat (no shares).
    pub fn is_flat(&self) -> bool {
        self.quantity.is_zero()
    }

    /// Market value at the current price.
    pub fn market_value(&self) -> Decimal {
        self.quantity * self.current_price
    }
}

/// Broker account snapshot.
///
/// Re-read after every order: fills change the cash balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Settled cash available
    pub cash: Decimal,
    /// Buying power reported by the broker
    pub buying_power: Decimal,
    /// Total equity
    pub equity: Decimal,
}

impl Account {
    /// Cash rounded down to a whole currency unit.
    pub fn whole_cash(&self) -> Decimal {
        self.cash.floor()
    }
}
