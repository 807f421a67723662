//! Execution cycle and daily scheduler.

mod executor;
mod scheduler;

pub use executor::{CyclePhase, CycleReport, EngineConfig, TradingEngine};
pub use scheduler::DailyScheduler;
