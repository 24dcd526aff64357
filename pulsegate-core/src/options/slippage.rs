//! Slippage model with bounded feedback learning.
//!
//! Square-root market impact plus half-spread for aggressive orders.
//! `SlippageModel::observe` nudges the base impact coefficient toward
//! observed slippage with a bounded learning rate, clamped so a burst of
//! bad fills cannot blow the model up.

use serde::{Deserialize, Serialize};

/// How the order crosses the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStyle {
    /// Crosses the spread, pays impact.
    Market,
    /// Rests at the touch; pays no spread, half the impact on fill.
    Limit,
}

/// One slippage estimate, percent of premium.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlippageEstimate {
    pub estimate_pct: f64,
    pub spread_cost_pct: f64,
    pub impact_cost_pct: f64,
}

/// The model. `base_impact` is the learned coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlippageModel {
    pub base_impact: f64,
    pub learning_rate: f64,
}

impl Default for SlippageModel {
    fn default() -> Self {
        Self {
            base_impact: 0.45,
            learning_rate: 0.10,
        }
    }
}

impl SlippageModel {
    const IMPACT_FLOOR: f64 = 0.05;
    const IMPACT_CEIL: f64 = 2.0;

    /// Estimate slippage for `quantity` contracts against `depth` resting
    /// contracts, with `spread_pct` the quoted spread. The model is
    /// participation-based, so it needs no per-instrument inputs beyond
    /// what the liquidity assessment already encodes.
    pub fn estimate(
        &self,
        quantity: u32,
        style: OrderStyle,
        depth: f64,
        spread_pct: f64,
    ) -> SlippageEstimate {
        let participation = if depth > 0.0 {
            quantity as f64 / depth
        } else {
            1.0
        };
        let raw_impact = self.base_impact * participation.sqrt();

        let (spread_cost_pct, impact_cost_pct) = match style {
            OrderStyle::Market => (spread_pct / 2.0, raw_impact),
            OrderStyle::Limit => (0.0, raw_impact / 2.0),
        };

        SlippageEstimate {
            estimate_pct: spread_cost_pct + impact_cost_pct,
            spread_cost_pct,
            impact_cost_pct,
        }
    }

    /// Feedback: move the impact coefficient toward what was observed.
    ///
    /// The step is proportional to the error and capped by the learning
    /// rate; the coefficient itself is clamped to a sane band.
    pub fn observe(&mut self, predicted_pct: f64, observed_pct: f64) {
        let error = observed_pct - predicted_pct;
        self.base_impact =
            (self.base_impact + self.learning_rate * error).clamp(Self::IMPACT_FLOOR, Self::IMPACT_CEIL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_orders_pay_half_spread() {
        let model = SlippageModel::default();
        let est = model.estimate(100, OrderStyle::Market, 5_000.0, 0.8);
        assert!((est.spread_cost_pct - 0.4).abs() < 1e-12);
        assert!(est.impact_cost_pct > 0.0);
        assert!((est.estimate_pct - (est.spread_cost_pct + est.impact_cost_pct)).abs() < 1e-12);
    }

    #[test]
    fn limit_orders_skip_the_spread() {
        let model = SlippageModel::default();
        let market = model.estimate(100, OrderStyle::Market, 5_000.0, 0.8);
        let limit = model.estimate(100, OrderStyle::Limit, 5_000.0, 0.8);
        assert_eq!(limit.spread_cost_pct, 0.0);
        assert!(limit.estimate_pct < market.estimate_pct);
    }

    #[test]
    fn impact_grows_with_participation() {
        let model = SlippageModel::default();
        let small = model.estimate(50, OrderStyle::Market, 5_000.0, 0.8);
        let large = model.estimate(2_000, OrderStyle::Market, 5_000.0, 0.8);
        assert!(large.impact_cost_pct > small.impact_cost_pct);
    }

    #[test]
    fn zero_depth_assumes_full_participation() {
        let model = SlippageModel::default();
        let est = model.estimate(100, OrderStyle::Market, 0.0, 0.8);
        assert!((est.impact_cost_pct - model.base_impact).abs() < 1e-12);
    }

    #[test]
    fn observe_moves_toward_observation() {
        let mut model = SlippageModel::default();
        let before = model.base_impact;
        model.observe(0.5, 1.5); // slipped worse than predicted
        assert!(model.base_impact > before);
        let after_up = model.base_impact;
        model.observe(1.5, 0.5); // better than predicted
        assert!(model.base_impact < after_up);
    }

    #[test]
    fn observe_is_bounded() {
        let mut model = SlippageModel::default();
        for _ in 0..100 {
            model.observe(0.0, 50.0);
        }
        assert!(model.base_impact <= 2.0);
        for _ in 0..100 {
            model.observe(50.0, 0.0);
        }
        assert!(model.base_impact >= 0.05);
    }

    #[test]
    fn single_step_is_proportional_to_error() {
        let mut model = SlippageModel { base_impact: 0.45, learning_rate: 0.1 };
        model.observe(1.0, 2.0);
        assert!((model.base_impact - 0.55).abs() < 1e-12);
    }
}
