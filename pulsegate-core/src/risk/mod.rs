//! Risk state store — process-lifetime counters and the emergency stop.

pub mod state;

pub use state::{RiskSnapshot, RiskTracker};
