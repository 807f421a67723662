//! Daily closing price types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single daily bar, reduced to the fields the signal engine needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Symbol
    pub symbol: String,
    /// Closing price
    pub close: Decimal,
    /// Bar timestamp
    pub timestamp: DateTime<Utc>,
}

impl PriceBar {
    /// Create a new bar.
    pub fn new(symbol: impl Into<String>, close: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            close,
            timestamp,
        }
    }
}

/// Price history for one symbol, ordered oldest to newest.
///
/// Construction normalizes provider output: bars are sorted by timestamp and
/// bars sharing a timestamp are collapsed to the last one received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSeries {
    /// Symbol
    pub symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Create a series from bars in any order.
    pub fn new(symbol: impl Into<String>, mut bars: Vec<PriceBar>) -> Self {
        // stable sort keeps arrival order for equal timestamps
        bars.sort_by_key(|b| b.timestamp);
        let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.timestamp == bar.timestamp => *last = bar,
                _ => deduped.push(bar),
            }
        }

        Self {
            symbol: symbol.into(),
            bars: deduped,
        }
    }

    /// Closing prices, oldest first.
    pub fn closes(&self) -> Vec<Decimal> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// The most recent bar.
    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Keep only the `limit` most recent bars.
    pub fn truncate_front(&mut self, limit: usize) {
        if self.bars.len() > limit {
            let excess = self.bars.len() - limit;
            self.bars.drain(..excess);
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_series_sorts_newest_first_input() {
        let bars = vec![
            PriceBar::new("AAPL", dec!(3), day(3)),
            PriceBar::new("AAPL", dec!(2), day(2)),
            PriceBar::new("AAPL", dec!(1), day(1)),
        ];
        let series = PriceSeries::new("AAPL", bars);

        assert_eq!(series.closes(), vec![dec!(1), dec!(2), dec!(3)]);
        assert_eq!(series.last().unwrap().close, dec!(3));
    }

    #[test]
    fn test_series_collapses_duplicate_timestamps() {
        let bars = vec![
            PriceBar::new("AAPL", dec!(1), day(1)),
            PriceBar::new("AAPL", dec!(2), day(2)),
            PriceBar::new("AAPL", dec!(2.5), day(2)),
        ];
        let series = PriceSeries::new("AAPL", bars);

        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![dec!(1), dec!(2.5)]);
    }

    #[test]
    fn test_truncate_front_keeps_most_recent() {
        let bars = (1..=5)
            .map(|d| PriceBar::new("AAPL", Decimal::from(d), day(d)))
            .collect();
        let mut series = PriceSeries::new("AAPL", bars);
        series.truncate_front(3);

        assert_eq!(series.closes(), vec![dec!(3), dec!(4), dec!(5)]);

        series.truncate_front(10);
        assert_eq!(series.len(), 3);
    }
}
