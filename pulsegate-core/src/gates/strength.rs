//! Gate 3 — indicator confluence strength.
//!
//! Requires a non-neutral trend read from the next horizon up, at least
//! `min_aligned_indicators` of the four confluence bits, agreement
//! between the higher-horizon bias and the scalp's direction, and no
//! contradiction between that bias and where price sits against the
//! session VWAP. Never correctable.

use crate::domain::{Direction, TrendBias};
use crate::gates::{Gate, GateContext, GateReport};

pub struct StrengthGate;

pub const GATE_NAME: &str = "confluence_strength";

impl Gate for StrengthGate {
    fn name(&self) -> &'static str {
        GATE_NAME
    }

    fn evaluate(&self, ctx: &GateContext) -> GateReport {
        let mut reasons = Vec::new();
        let bias = ctx.market.higher_horizon_bias;

        if bias == TrendBias::Neutral {
            reasons.push("higher-horizon trend is neutral".to_string());
        }

        let aligned = ctx.candidate.confluence.aligned_count();
        let required = ctx.limits.min_aligned_indicators;
        if aligned < required {
            reasons.push(format!(
                "only {aligned} of 4 confluence indicators aligned (need {required})"
            ));
        }

        match (ctx.candidate.direction, bias) {
            (Direction::Long, TrendBias::Bearish) | (Direction::Short, TrendBias::Bullish) => {
                reasons.push(format!(
                    "{} candidate against {bias:?} higher-horizon bias",
                    ctx.candidate.direction.label()
                ));
            }
            _ => {}
        }

        // Bias must agree with where price sits against the average price.
        let price_above_vwap = ctx.market.quote.last_price >= ctx.market.vwap;
        let contradiction = match bias {
            TrendBias::Bullish => !price_above_vwap,
            TrendBias::Bearish => price_above_vwap,
            TrendBias::Neutral => false,
        };
        if contradiction {
            reasons.push(format!(
                "{bias:?} bias contradicts price {} VWAP",
                if price_above_vwap { "above" } else { "below" }
            ));
        }

        if reasons.is_empty() {
            GateReport::pass(GATE_NAME)
        } else {
            GateReport::fail(GATE_NAME, reasons)
        }
    }
}
