//! Indicator trait definitions.

use rust_decimal::Decimal;

/// Trait for technical indicators.
///
/// Indicators process price data and produce derived values
/// useful for trading decisions.
pub trait Indicator: Send + Sync {
    /// The output type of the indicator.
    type Output;

    /// Calculate indicator values for the given data.
    ///
    /// # Arguments
    /// * `data` - Input prices, oldest first
    ///
    /// # Returns
    /// A vector of indicator values, oldest first
    fn calculate(&self, data: &[Decimal]) -> Vec<Self::Output>;

    /// Get the minimum data points required.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    struct TestIndicator {
        period: usize,
    }

    impl Indicator for TestIndicator {
        type Output = Decimal;

        fn calculate(&self, data: &[Decimal]) -> Vec<Decimal> {
            if data.len() < self.period {
                return vec![];
            }
            // Simple sum indicator for testing
            data.windows(self.period)
                .map(|w| w.iter().sum())
                .collect()
        }

        fn period(&self) -> usize {
            self.period
        }

        fn name(&self) -> &str {
            "test"
        }
    }


    #[test]
    fn test_indicator_calculate() {
        let indicator = TestIndicator { period: 3 };
        let data = vec![dec!(1), dec!(2), dec!(3), dec!(4), dec!(5)];
        let result = indicator.calculate(&data);

        assert_eq!(result, vec![dec!(6), dec!(9), dec!(12)]);
    }
}
