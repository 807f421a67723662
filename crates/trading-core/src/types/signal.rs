//! Crossover signal.

use serde::{Deserialize, Serialize};

/// Outcome of evaluating one symbol's price history for one cycle.
///
/// `None` covers both "no crossover" and "not enough history"; the two are
/// deliberately indistinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    /// Golden cross: short average just rose above the long average
    Buy,
    /// Death cross: short average just fell below the long average
    Sell,
    #[default]
    None,
}

impl Signal {
    pub fn is_buy(&self) -> bool {
        matches!(self, Signal::Buy)
    }

    pub fn is_sell(&self) -> bool {
        matches!(self, Signal::Sell)
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::None => write!(f, "NONE"),
        }
    }
}
