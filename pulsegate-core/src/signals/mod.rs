//! Candidate generation — confluence rules and the rate-limited
//! synthesizer.

pub mod confluence;
pub mod generator;

pub use confluence::{ConfluenceSettings, RuleToggles, Strictness};
pub use generator::{CandidateGenerator, GeneratorSettings, TimeWindow};
