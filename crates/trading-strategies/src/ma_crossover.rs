//! Moving Average Crossover signal engine.
//!
//! Classifies a daily closing-price history as a golden cross (buy), a death
//! cross (sell) or neither, by comparing the two most recent points of a
//! short-window and a long-window simple moving average.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use trading_core::traits::Indicator;
use trading_core::{error::StrategyError, PriceSeries, Signal};
use trading_indicators::{Sma, WindowConvention};

/// Configuration for the MA Crossover engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MACrossoverConfig {
    /// Short moving average window
    pub short_window: usize,
    /// Long moving average window
    pub long_window: usize,
    /// How each window is summed
    #[serde(default)]
    pub convention: WindowConvention,
}

impl Default for MACrossoverConfig {
    fn default() -> Self {
        Self {
            short_window: 30,
            long_window: 100,
            convention: WindowConvention::Truncated,
        }
    }
}

impl MACrossoverConfig {
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.short_window == 0 {
            return Err(StrategyError::InvalidConfig(
                "Short window must be greater than 0".into(),
            ));
        }
        if self.short_window >= self.long_window {
            return Err(StrategyError::InvalidConfig(
                "Short window must be less than long window".into(),
            ));
        }
        Ok(())
    }

    /// Closes needed before a signal can be produced.
    pub fn min_history(&self) -> usize {
        self.long_window + 1
    }
}

/// Short and long averages, newest first (index 0 is the latest average).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovingAverageSeries {
    short: Vec<Decimal>,
    long: Vec<Decimal>,
}

/// The four values a crossover decision is made from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossoverPoints {
    pub short_latest: Decimal,
    pub short_prior: Decimal,
    pub long_latest: Decimal,
    pub long_prior: Decimal,
}

impl CrossoverPoints {
    pub fn signal(&self) -> Signal {
        if self.short_latest > self.long_latest && self.short_prior < self.long_prior {
            Signal::Buy
        } else if self.short_latest < self.long_latest && self.short_prior > self.long_prior {
            Signal::Sell
        } else {
            Signal::None
        }
    }
}

impl MovingAverageSeries {
    /// Compute both averages over closes ordered oldest to newest.
    pub fn compute(closes: &[Decimal], config: &MACrossoverConfig) -> Self {
        if config.short_window == 0 || config.long_window == 0 {
            return Self::default();
        }

        let newest_first = |period: usize| {
            let mut values = Sma::with_convention(period, config.convention).calculate(closes);
            values.reverse();
            values
        };

        Self {
            short: newest_first(config.short_window),
            long: newest_first(config.long_window),
        }
    }

    pub fn short(&self) -> &[Decimal] {
        &self.short
    }

    pub fn long(&self) -> &[Decimal] {
        &self.long
    }

    /// Latest and prior point of each average, if both have two points.
    pub fn latest_pair(&self) -> Option<CrossoverPoints> {
        match (self.short.as_slice(), self.long.as_slice()) {
            ([s0, s1, ..], [l0, l1, ..]) => Some(CrossoverPoints {
                short_latest: *s0,
                short_prior: *s1,
                long_latest: *l0,
                long_prior: *l1,
            }),
            _ => None,
        }
    }
}

/// Moving Average Crossover engine. Stateless between calls.
#[derive(Debug, Clone, Default)]
pub struct MACrossover {
    config: MACrossoverConfig,
}

impl MACrossover {
    pub fn new(config: MACrossoverConfig) -> Self {
        Self { config }
    }

    /// Classify closes ordered oldest to newest.
    pub fn classify(&self, closes: &[Decimal]) -> Signal {
        self.evaluate(closes)
            .map(|points| points.signal())
            .unwrap_or_default()
    }

    /// Classify a provider series. The series is already in timestamp order.
    pub fn classify_series(&self, series: &PriceSeries) -> Signal {
        self.classify(&series.closes())
    }

    /// The averages behind a decision, or `None` when history is too short.
    pub fn evaluate(&self, closes: &[Decimal]) -> Option<CrossoverPoints> {
        if closes.len() < self.config.min_history() {
            return None;
        }
        MovingAverageSeries::compute(closes, &self.config).latest_pair()
    }
}

/// Classify closes ordered oldest to newest with the given windows and the
/// default window convention.
pub fn classify(closes: &[Decimal], short_window: usize, long_window: usize) -> Signal {
    MACrossover::new(MACrossoverConfig {
        short_window,
        long_window,
        convention: WindowConvention::default(),
    })
    .classify(closes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use trading_core::PriceBar;

    fn closes(values: &[i64]) -> Vec<Decimal> {
        values.iter().copied().map(Decimal::from).collect()
    }

    /// 150 flat days at 10, then a steady climb of 2 per day.
    fn flat_then_rising() -> Vec<Decimal> {
        let mut values = vec![10; 150];
        values.extend((1..=60).map(|i| 10 + 2 * i));
        closes(&values)
    }

    #[test]
    fn test_config_validation() {
        let mut config = MACrossoverConfig::default();
        assert!(config.validate().is_ok());

        config.short_window = 100;
        assert!(config.validate().is_err());

        config.short_window = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_short_history_is_none() {
        let data = closes(&[1, 2, 3, 4, 5]);
        assert_eq!(classify(&data, 2, 5), Signal::None);
        assert_eq!(classify(&[], 2, 5), Signal::None);
    }

    #[test]
    fn test_zero_window_is_none() {
        let data = closes(&[1; 10]);
        assert_eq!(classify(&data, 0, 5), Signal::None);
    }

    #[test]
    fn test_golden_cross_on_flat_then_rising() {
        let data = flat_then_rising();
        let engine = MACrossover::default();

        let signals: Vec<Signal> = (1..=data.len())
            .map(|n| engine.classify(&data[..n]))
            .collect();

        // the third rising close is the crossing point
        let first_buy = signals.iter().position(|s| s.is_buy()).unwrap();
        assert_eq!(first_buy + 1, 153);
        assert!(signals[..first_buy].iter().all(|s| *s == Signal::None));
        assert!(signals[first_buy + 1..].iter().all(|s| *s == Signal::None));
    }

    #[test]
    fn test_flat_then_rising_never_crosses_with_full_windows() {
        let data = flat_then_rising();
        let engine = MACrossover::new(MACrossoverConfig {
            convention: WindowConvention::Full,
            ..Default::default()
        });

        // flat prices give equal averages, so the prior point never sits strictly below
        assert!((1..=data.len()).all(|n| engine.classify(&data[..n]) == Signal::None));
    }

    #[test]
    fn test_death_cross() {
        let data = closes(&[10, 10, 10, 10, 30, 30, 1]);
        let engine = MACrossover::new(MACrossoverConfig {
            short_window: 2,
            long_window: 4,
            convention: WindowConvention::Full,
        });

        let points = engine.evaluate(&data).unwrap();
        // short (30+1)/2 = 15.5 < long (10+30+30+1)/4 = 17.75, prior short 30 > prior long 20
        assert_eq!(points.short_latest, dec!(15.5));
        assert_eq!(points.long_latest, dec!(17.75));
        assert_eq!(points.short_prior, dec!(30));
        assert_eq!(points.long_prior, dec!(20));
        assert_eq!(engine.classify(&data), Signal::Sell);
    }

    #[test]
    fn test_truncated_windows_can_sell_on_rising_prices() {
        // each window drops its oldest close, so a decelerating rise reads as a death cross
        let data = vec![dec!(1), dec!(2), dec!(3), dec!(7), dec!(7.5)];

        assert_eq!(classify(&data, 2, 3), Signal::Sell);

        let full = MACrossover::new(MACrossoverConfig {
            short_window: 2,
            long_window: 3,
            convention: WindowConvention::Full,
        });
        assert_eq!(full.classify(&data), Signal::None);
    }

    #[test]
    fn test_series_is_newest_first() {
        let data = closes(&[1, 2, 3, 4, 5, 6]);
        let config = MACrossoverConfig {
            short_window: 2,
            long_window: 3,
            convention: WindowConvention::Full,
        };
        let series = MovingAverageSeries::compute(&data, &config);

        assert_eq!(series.short().len(), 5);
        assert_eq!(series.long().len(), 4);
        assert_eq!(series.short()[0], dec!(5.5));
        assert_eq!(series.long()[0], dec!(5));
        assert_eq!(series.long()[3], dec!(2));
    }

    #[test]
    fn test_classify_series_normalizes_order() {
        let data = flat_then_rising();
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut bars: Vec<PriceBar> = data[..153]
            .iter()
            .enumerate()
            .map(|(i, close)| PriceBar::new("XYZ", *close, start + Duration::days(i as i64)))
            .collect();
        // providers may hand bars back newest first
        bars.reverse();

        let series = PriceSeries::new("XYZ", bars);
        assert_eq!(MACrossover::default().classify_series(&series), Signal::Buy);
    }
}
