//! Gate 2 — option executability.
//!
//! The selected leg must be tradable at scalping speed: tight spread,
//! real liquidity, a delta that moves with the underlying, theta that
//! will not eat the edge intraday, and a modeled execution probability
//! worth the attempt. Failures are terminal — the pipeline does not go
//! shopping for a different strike.

use crate::gates::{Gate, GateContext, GateReport};
use crate::options::{estimate_costs, execution_probability, OrderStyle, SlippageModel};

pub struct ExecutabilityGate;

pub const GATE_NAME: &str = "option_executability";

impl Gate for ExecutabilityGate {
    fn name(&self) -> &'static str {
        GATE_NAME
    }

    fn evaluate(&self, ctx: &GateContext) -> GateReport {
        let leg = &ctx.plan.leg;
        let limits = ctx.limits;
        let mut reasons = Vec::new();

        if leg.spread_pct > limits.max_spread_pct {
            reasons.push(format!(
                "spread {:.2}% above {:.2}% cap",
                leg.spread_pct, limits.max_spread_pct
            ));
        }

        if leg.liquidity_score < limits.min_liquidity_score {
            reasons.push(format!(
                "liquidity score {:.0} below {:.0} floor",
                leg.liquidity_score, limits.min_liquidity_score
            ));
        }

        let abs_delta = leg.delta.abs();
        let (delta_min, delta_max) = limits.delta_band;
        if abs_delta < delta_min || abs_delta > delta_max {
            reasons.push(format!(
                "|delta| {abs_delta:.2} outside [{delta_min:.2}, {delta_max:.2}]"
            ));
        }

        if leg.theta_per_day > limits.max_theta_per_day {
            reasons.push(format!(
                "theta {:.2}/day above {:.2} cap",
                leg.theta_per_day, limits.max_theta_per_day
            ));
        }

        let fill_probability = execution_probability(leg);
        if fill_probability < limits.min_execution_probability {
            reasons.push(format!(
                "execution probability {fill_probability:.2} below {:.2} floor",
                limits.min_execution_probability
            ));
        }

        // Friction: modeled slippage for the full quantity, and the fee
        // drag on the order's notional.
        let slippage = SlippageModel::default().estimate(
            ctx.plan.quantity(),
            OrderStyle::Market,
            ctx.plan.liquidity.depth,
            leg.spread_pct,
        );
        if slippage.estimate_pct > limits.max_slippage_pct {
            reasons.push(format!(
                "modeled slippage {:.2}% above {:.2}% cap",
                slippage.estimate_pct, limits.max_slippage_pct
            ));
        }

        let costs = estimate_costs(leg.premium, ctx.plan.quantity());
        if costs.pct > limits.max_cost_pct {
            reasons.push(format!(
                "cost drag {:.2}% above {:.2}% cap",
                costs.pct, limits.max_cost_pct
            ));
        }

        if reasons.is_empty() {
            GateReport::pass(GATE_NAME)
        } else {
            GateReport::fail(GATE_NAME, reasons)
        }
    }
}
