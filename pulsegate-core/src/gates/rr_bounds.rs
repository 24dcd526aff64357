//! Gate 1 — timeframe risk:reward bounds.
//!
//! Stop and target distances, in ATR multiples, must sit inside the
//! horizon's bounds; the implied risk:reward must clear the horizon
//! minimum; the hold time must not exceed the horizon cap. Violations are
//! correctable: the corrector clamps each multiple to the nearest bound
//! (and raises the target to restore risk:reward when there is room).

use crate::gates::{Correction, Gate, GateContext, GateReport, GateStatus};

pub struct TimeframeRiskGate;

pub const GATE_NAME: &str = "timeframe_risk_reward";

impl Gate for TimeframeRiskGate {
    fn name(&self) -> &'static str {
        GATE_NAME
    }

    fn evaluate(&self, ctx: &GateContext) -> GateReport {
        let bounds = ctx.limits.bounds_for(ctx.candidate.horizon);
        let atr = ctx.market.atr;

        if !atr.is_finite() || atr <= 0.0 {
            return GateReport::fail(
                GATE_NAME,
                vec![format!("ATR unavailable ({atr}); cannot size stop/target")],
            );
        }

        let stop_mult = ctx.candidate.stop_distance() / atr;
        let target_mult = ctx.candidate.target_distance() / atr;

        let mut reasons = Vec::new();
        let mut corrections = Vec::new();

        let (stop_min, stop_max) = bounds.stop_atr;
        let corrected_stop = stop_mult.clamp(stop_min, stop_max);
        if stop_mult < stop_min || stop_mult > stop_max {
            reasons.push(format!(
                "stop {stop_mult:.2}xATR outside [{stop_min:.2}, {stop_max:.2}]"
            ));
            corrections.push(Correction::StopAtrMultiple(corrected_stop));
        }

        let (target_min, target_max) = bounds.target_atr;
        let mut corrected_target = target_mult.clamp(target_min, target_max);
        if target_mult < target_min || target_mult > target_max {
            reasons.push(format!(
                "target {target_mult:.2}xATR outside [{target_min:.2}, {target_max:.2}]"
            ));
            corrections.push(Correction::TargetAtrMultiple(corrected_target));
        }

        let risk_reward = if corrected_stop > 0.0 {
            corrected_target / corrected_stop
        } else {
            0.0
        };
        if risk_reward < bounds.min_risk_reward {
            // Raise the target toward the minimum ratio if the band allows.
            let needed = corrected_stop * bounds.min_risk_reward;
            if needed <= target_max {
                reasons.push(format!(
                    "risk:reward {risk_reward:.2} below {:.2}",
                    bounds.min_risk_reward
                ));
                corrected_target = needed;
                corrections.retain(|c| !matches!(c, Correction::TargetAtrMultiple(_)));
                corrections.push(Correction::TargetAtrMultiple(corrected_target));
            } else {
                return GateReport::fail(
                    GATE_NAME,
                    vec![format!(
                        "risk:reward {risk_reward:.2} below {:.2} and target band caps at {target_max:.2}xATR",
                        bounds.min_risk_reward
                    )],
                );
            }
        }

        if ctx.plan.max_hold_minutes > bounds.max_hold_minutes {
            reasons.push(format!(
                "hold time {}m exceeds {}m cap",
                ctx.plan.max_hold_minutes, bounds.max_hold_minutes
            ));
            corrections.push(Correction::MaxHoldMinutes(bounds.max_hold_minutes));
        }

        if reasons.is_empty() {
            GateReport::pass(GATE_NAME)
        } else if ctx.allow_rewrite {
            GateReport::rewrite(GATE_NAME, reasons, corrections)
        } else {
            GateReport {
                gate: GATE_NAME,
                status: GateStatus::Fail,
                reasons,
                corrections: Vec::new(),
            }
        }
    }
}
