//! Price and reference data source traits.

use crate::error::DataError;
use crate::types::{AssetCandidate, AssetClass, AssetStatus, Exchange, PriceSeries};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Trait for daily price data.
///
/// Symbols the provider has no data for are omitted from the returned maps
/// rather than reported as errors.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Latest closing price per symbol.
    async fn latest_prices(&self, symbols: &[String]) -> Result<HashMap<String, Decimal>, DataError>;

    /// Daily bars per symbol.
    ///
    /// # Arguments
    /// * `symbols` - Symbols to fetch
    /// * `lookback_days` - Calendar days of history to request
    /// * `limit` - Maximum number of trailing bars kept per symbol
    ///
    /// # Returns
    /// One series per symbol, ordered oldest to newest
    async fn daily_history(
        &self,
        symbols: &[String],
        lookback_days: i64,
        limit: usize,
    ) -> Result<HashMap<String, PriceSeries>, DataError>;

    /// Get the data source name.
    fn name(&self) -> &str;
}

/// Trait for broker asset reference data.
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// List assets on one exchange.
    async fn list_assets(
        &self,
        exchange: Exchange,
        asset_class: AssetClass,
        status: AssetStatus,
    ) -> Result<Vec<AssetCandidate>, DataError>;
}
