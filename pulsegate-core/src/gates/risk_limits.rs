//! Gate 4 — portfolio risk limits.
//!
//! Per-trade risk, daily loss, daily trade count, concurrent positions,
//! and the emergency stop. Only the per-trade-risk breach is correctable
//! (proportional scale-down of the position); any other breach — or a
//! scale-down that would go below one lot — is terminal.

use crate::gates::{Correction, Gate, GateContext, GateReport, GateStatus};

pub struct RiskLimitsGate;

pub const GATE_NAME: &str = "risk_limits";

impl Gate for RiskLimitsGate {
    fn name(&self) -> &'static str {
        GATE_NAME
    }

    fn evaluate(&self, ctx: &GateContext) -> GateReport {
        let limits = ctx.limits;
        let mut hard_reasons = Vec::new();

        if ctx.risk.emergency_stop {
            hard_reasons.push("emergency stop is engaged".to_string());
        }
        if ctx.risk.loss_today_pct >= limits.max_daily_loss_pct {
            hard_reasons.push(format!(
                "daily loss {:.2}% at/above {:.2}% cap",
                ctx.risk.loss_today_pct, limits.max_daily_loss_pct
            ));
        }
        if ctx.risk.trades_today >= limits.max_trades_per_day {
            hard_reasons.push(format!(
                "daily trade count {} at cap {}",
                ctx.risk.trades_today, limits.max_trades_per_day
            ));
        }
        if ctx.risk.open_positions >= limits.max_open_positions {
            hard_reasons.push(format!(
                "{} open positions at cap {}",
                ctx.risk.open_positions, limits.max_open_positions
            ));
        }

        let stop_distance = ctx.candidate.stop_distance();
        let risk_pct = ctx.plan.risk_pct(stop_distance);
        let over_risk = risk_pct > limits.max_risk_per_trade_pct;

        if over_risk && hard_reasons.is_empty() && ctx.allow_rewrite {
            // Scale the position down proportionally to fit the cap.
            let scale = limits.max_risk_per_trade_pct / risk_pct;
            let scaled_lots = (ctx.plan.lots as f64 * scale).floor() as u32;
            if scaled_lots >= 1 {
                return GateReport::rewrite(
                    GATE_NAME,
                    vec![format!(
                        "per-trade risk {risk_pct:.2}% above {:.2}% cap",
                        limits.max_risk_per_trade_pct
                    )],
                    vec![Correction::ScaleLots(scaled_lots)],
                );
            }
            return GateReport::fail(
                GATE_NAME,
                vec![format!(
                    "per-trade risk {risk_pct:.2}% cannot be scaled under {:.2}% at one lot",
                    limits.max_risk_per_trade_pct
                )],
            );
        }

        if over_risk {
            hard_reasons.push(format!(
                "per-trade risk {risk_pct:.2}% above {:.2}% cap",
                limits.max_risk_per_trade_pct
            ));
        }

        if hard_reasons.is_empty() {
            GateReport::pass(GATE_NAME)
        } else {
            GateReport {
                gate: GATE_NAME,
                status: GateStatus::Fail,
                reasons: hard_reasons,
                corrections: Vec::new(),
            }
        }
    }
}
