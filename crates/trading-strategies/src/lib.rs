//! Signal generation and candidate selection.
//!
//! - [`ma_crossover`]: golden/death cross classification of a closing-price history
//! - [`universe`]: eligibility and affordability filters over the broker's asset list
//! - [`selection`]: pluggable choice of the next symbol to buy

pub mod ma_crossover;
pub mod selection;
pub mod universe;

pub use ma_crossover::{classify, CrossoverPoints, MACrossover, MACrossoverConfig, MovingAverageSeries};
pub use selection::{CandidateSelector, FirstSelector, RandomSelector, SelectionPolicy};
pub use trading_indicators::WindowConvention;
pub use universe::{filter_by_price, filter_eligible};
