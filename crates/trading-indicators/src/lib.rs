//! Technical indicators over decimal prices.
//!
//! Only the simple moving average is needed by the crossover bot. It is
//! computed with exact decimal arithmetic so crossover comparisons are not
//! perturbed by floating point drift.

pub mod moving_average;

pub use moving_average::{Sma, WindowConvention};
