//! Universe filtering: from the broker's asset list down to affordable candidates.

use rust_decimal::Decimal;
use std::collections::HashMap;
use trading_core::AssetCandidate;

/// Keep assets that are easy to borrow, marginable, shortable and tradable.
pub fn filter_eligible(assets: Vec<AssetCandidate>) -> Vec<AssetCandidate> {
    assets.into_iter().filter(AssetCandidate::is_eligible).collect()
}

/// Keep symbols whose latest price lies strictly between `low` and `high`.
///
/// Symbols without a quote are dropped. An empty band (`low >= high`)
/// admits nothing.
pub fn filter_by_price(
    symbols: &[String],
    prices: &HashMap<String, Decimal>,
    low: Decimal,
    high: Decimal,
) -> Vec<String> {
    if low >= high {
        return Vec::new();
    }

    symbols
        .iter()
        .filter(|symbol| {
            prices
                .get(symbol.as_str())
                .is_some_and(|price| *price > low && *price < high)
        })
        .cloned()
        .collect()
}
