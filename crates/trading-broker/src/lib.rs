//! Broker integrations.
//!
//! [`AlpacaBroker`] talks to the Alpaca trading and market data APIs.
//! [`PaperBroker`] keeps the whole account in memory.

mod alpaca;
mod paper;

pub use alpaca::{AlpacaBroker, AlpacaConfig};
pub use paper::PaperBroker;
