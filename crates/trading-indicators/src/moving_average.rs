//! Moving average indicators.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use trading_core::traits::Indicator;

/// Which values of each window contribute to the average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WindowConvention {
    /// Sum the `period - 1` most recent values of each window, divide by `period`.
    ///
    /// This is the behavior the bot has always traded on. It understates every
    /// average by a factor of roughly `(period - 1) / period`, which biases the
    /// short average below the long one on flat prices and shifts crossover
    /// timing accordingly.
    #[default]
    Truncated,
    /// Textbook SMA: sum all `period` values, divide by `period`.
    Full,
}

/// Simple Moving Average (SMA).
///
/// Calculates the arithmetic mean of the last N values using a sliding sum.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    convention: WindowConvention,
}

impl Sma {
    /// Create a new textbook SMA with the specified period.
    pub fn new(period: usize) -> Self {
        Self::with_convention(period, WindowConvention::Full)
    }

    /// Create an SMA using the given window convention.
    pub fn with_convention(period: usize, convention: WindowConvention) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period, convention }
    }

    /// Number of leading window values left out of the sum.
    fn skipped(&self) -> usize {
        match self.convention {
            WindowConvention::Truncated => 1,
            WindowConvention::Full => 0,
        }
    }
}

impl Indicator for Sma {
    type Output = Decimal;

    fn calculate(&self, data: &[Decimal]) -> Vec<Decimal> {
        if data.len() < self.period {
            return vec![];
        }

        let mut result = Vec::with_capacity(data.len() - self.period + 1);
        let divisor = Decimal::from(self.period);
        let skip = self.skipped();

        // Initial sum
        let mut sum: Decimal = data[skip..self.period].iter().sum();
        result.push(sum / divisor);

        // Sliding window: the summed span is data[i + 1 - period + skip ..= i]
        for i in self.period..data.len() {
            sum = sum + data[i] - data[i - self.period + skip];
            result.push(sum / divisor);
        }

        result
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "SMA"
    }
}
