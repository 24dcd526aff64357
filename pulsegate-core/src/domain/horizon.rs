//! Horizon — the candle bucket size a series is sampled at.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Candle bucket sizes tracked by the pipeline.
///
/// Each horizon carries the scalping parameters that scale with bucket
/// size: minimum re-signal interval, ATR-multiple bounds for stops and
/// targets, minimum risk:reward, and the hold-time cap. These are the
/// built-in defaults; the engine config can override any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Horizon {
    M1,
    M5,
    M15,
}

impl Horizon {
    pub const ALL: [Horizon; 3] = [Horizon::M1, Horizon::M5, Horizon::M15];

    pub fn candle_seconds(&self) -> u64 {
        match self {
            Horizon::M1 => 60,
            Horizon::M5 => 300,
            Horizon::M15 => 900,
        }
    }

    /// Minimum gap between two signals for the same (instrument, horizon).
    pub fn min_signal_gap(&self) -> Duration {
        match self {
            Horizon::M1 => Duration::seconds(120),
            Horizon::M5 => Duration::seconds(300),
            Horizon::M15 => Duration::seconds(900),
        }
    }

    /// Allowed stop distance as ATR multiples: (min, max).
    pub fn stop_atr_bounds(&self) -> (f64, f64) {
        match self {
            Horizon::M1 => (0.5, 2.0),
            Horizon::M5 => (0.75, 2.5),
            Horizon::M15 => (1.0, 3.0),
        }
    }

    /// Allowed target distance as ATR multiples: (min, max).
    pub fn target_atr_bounds(&self) -> (f64, f64) {
        match self {
            Horizon::M1 => (0.75, 3.0),
            Horizon::M5 => (1.0, 4.0),
            Horizon::M15 => (1.5, 5.0),
        }
    }

    /// Minimum acceptable risk:reward for this horizon.
    pub fn min_risk_reward(&self) -> f64 {
        match self {
            Horizon::M1 => 1.2,
            Horizon::M5 => 1.3,
            Horizon::M15 => 1.5,
        }
    }

    /// Longest a scalp on this horizon may stay open.
    pub fn max_hold_minutes(&self) -> u32 {
        match self {
            Horizon::M1 => 15,
            Horizon::M5 => 45,
            Horizon::M15 => 90,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Horizon::M1 => "1m",
            Horizon::M5 => "5m",
            Horizon::M15 => "15m",
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parse failure for a horizon label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported horizon: {0}")]
pub struct ParseHorizonError(pub String);

impl FromStr for Horizon {
    type Err = ParseHorizonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1m" | "M1" => Ok(Horizon::M1),
            "5m" | "M5" => Ok(Horizon::M5),
            "15m" | "M15" => Ok(Horizon::M15),
            other => Err(ParseHorizonError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gap_scales_with_horizon() {
        assert!(Horizon::M1.min_signal_gap() < Horizon::M5.min_signal_gap());
        assert!(Horizon::M5.min_signal_gap() < Horizon::M15.min_signal_gap());
    }

    #[test]
    fn bounds_are_ordered() {
        for h in Horizon::ALL {
            let (stop_min, stop_max) = h.stop_atr_bounds();
            let (tgt_min, tgt_max) = h.target_atr_bounds();
            assert!(stop_min < stop_max);
            assert!(tgt_min < tgt_max);
            assert!(h.min_risk_reward() > 1.0);
        }
    }

    #[test]
    fn m1_bounds_match_scalp_profile() {
        assert_eq!(Horizon::M1.stop_atr_bounds(), (0.5, 2.0));
        assert_eq!(Horizon::M1.target_atr_bounds().1, 3.0);
        assert_eq!(Horizon::M1.max_hold_minutes(), 15);
    }

    #[test]
    fn parse_roundtrip() {
        for h in Horizon::ALL {
            assert_eq!(h.label().parse::<Horizon>().unwrap(), h);
        }
        assert!("2h".parse::<Horizon>().is_err());
    }
}
