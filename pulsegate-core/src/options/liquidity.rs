//! Liquidity model for a hypothetical option strike.
//!
//! Without a live chain, liquidity is modeled as a function of moneyness:
//! spreads widen and depth/volume decay as the strike moves away from the
//! underlying. The score is a 0–100 composite used by the executability
//! gate and the strike selector.

use serde::{Deserialize, Serialize};

use crate::domain::Instrument;

/// Spread at the money, percent of mid.
const BASE_SPREAD_PCT: f64 = 0.40;
/// Spread widening per strike step away from the money.
const SPREAD_WIDENING: f64 = 0.35;
/// Resting contracts near the top of book at the money.
const BASE_DEPTH: f64 = 5_000.0;
/// Session contract volume at the money.
const BASE_VOLUME: f64 = 180_000.0;

/// Liquidity picture for one strike.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidityAssessment {
    /// Bid/ask spread, percent of mid.
    pub spread_pct: f64,
    /// Modeled top-of-book depth in contracts.
    pub depth: f64,
    /// Modeled session volume in contracts.
    pub volume: f64,
    /// 0–100 composite.
    pub score: f64,
    pub passes_filter: bool,
}

/// Assess a strike's liquidity for an instrument at the given underlying
/// price.
pub fn assess_liquidity(
    instrument: &Instrument,
    strike: f64,
    underlying: f64,
) -> LiquidityAssessment {
    let steps = if instrument.strike_step > 0.0 {
        (strike - underlying).abs() / instrument.strike_step
    } else {
        0.0
    };

    let spread_pct = BASE_SPREAD_PCT * (1.0 + SPREAD_WIDENING * steps);
    let depth = BASE_DEPTH * (-0.40 * steps).exp();
    let volume = BASE_VOLUME * (-0.30 * steps).exp();

    // Spread contributes inversely, depth and volume against their
    // at-the-money baselines.
    let spread_component = (BASE_SPREAD_PCT / spread_pct).min(1.0);
    let depth_component = (depth / BASE_DEPTH).min(1.0);
    let volume_component = (volume / BASE_VOLUME).min(1.0);
    let score = 100.0 * (0.4 * spread_component + 0.3 * depth_component + 0.3 * volume_component);

    LiquidityAssessment {
        spread_pct,
        depth,
        volume,
        score,
        passes_filter: score >= 40.0 && spread_pct <= 1.5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nifty() -> Instrument {
        Instrument::new("NIFTY", 0.05, 50, 50.0, 22_000.0, 0.009)
    }

    #[test]
    fn at_the_money_is_most_liquid() {
        let atm = assess_liquidity(&nifty(), 22_000.0, 22_000.0);
        let otm = assess_liquidity(&nifty(), 22_200.0, 22_000.0);
        assert!(atm.score > otm.score);
        assert!(atm.spread_pct < otm.spread_pct);
        assert!(atm.depth > otm.depth);
        assert!(atm.passes_filter);
    }

    #[test]
    fn atm_score_is_maximal() {
        let atm = assess_liquidity(&nifty(), 22_000.0, 22_000.0);
        assert!((atm.score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn deep_otm_fails_the_filter() {
        // 20 steps away: spread has widened past any scalpable level.
        let deep = assess_liquidity(&nifty(), 23_000.0, 22_000.0);
        assert!(!deep.passes_filter);
    }

    #[test]
    fn score_decays_monotonically() {
        let inst = nifty();
        let mut prev = f64::MAX;
        for steps in 0..8 {
            let strike = 22_000.0 + steps as f64 * 50.0;
            let assessment = assess_liquidity(&inst, strike, 22_000.0);
            assert!(assessment.score < prev || steps == 0);
            prev = assessment.score;
        }
    }
}
