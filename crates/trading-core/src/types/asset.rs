//! Asset reference data.

use serde::{Deserialize, Serialize};

/// Listing exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Exchange {
    Nasdaq,
    Nyse,
    Amex,
    Arca,
    Bats,
    Otc,
    /// Anything the broker lists that the bot does not trade
    #[serde(other)]
    Other,
}

impl Exchange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Exchange::Nasdaq => "NASDAQ",
            Exchange::Nyse => "NYSE",
            Exchange::Amex => "AMEX",
            Exchange::Arca => "ARCA",
            Exchange::Bats => "BATS",
            Exchange::Otc => "OTC",
            Exchange::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Asset class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    #[default]
    UsEquity,
    Crypto,
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::UsEquity => "us_equity",
            AssetClass::Crypto => "crypto",
        }
    }
}

/// Listing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    #[default]
    Active,
    Inactive,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Active => "active",
            AssetStatus::Inactive => "inactive",
        }
    }
}

/// A tradable instrument as listed by the broker. Never mutated by the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetCandidate {
    pub symbol: String,
    pub exchange: Exchange,
    pub asset_class: AssetClass,
    pub status: AssetStatus,
    pub tradable: bool,
    pub marginable: bool,
    pub shortable: bool,
    pub easy_to_borrow: bool,
}

impl AssetCandidate {
    /// All four eligibility flags set.
    pub fn is_eligible(&self) -> bool {
        self.easy_to_borrow && self.marginable && self.shortable && self.tradable
    }
}
