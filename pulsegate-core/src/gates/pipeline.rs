//! The validation pipeline — run all gates, correct once, re-run once.
//!
//! Explicit two-pass state machine: candidate → corrected candidate →
//! final. The first pass runs with rewrites allowed; if any gate fails,
//! the candidate is rejected outright. Otherwise proposed corrections are
//! applied (a superseding candidate, never a mutation) and the full gate
//! set runs once more with rewrites disabled — whatever the second pass
//! says is final.

use log::debug;

use crate::domain::{
    CandidateSignal, FinalSignal, ManagementPlan, RiskPlan, TrailingMethod,
};
use crate::gates::events::EventFilterGate;
use crate::gates::executability::ExecutabilityGate;
use crate::gates::risk_limits::RiskLimitsGate;
use crate::gates::rr_bounds::TimeframeRiskGate;
use crate::gates::strength::StrengthGate;
use crate::gates::{
    Correction, Decision, Gate, GateContext, GateLimits, GateReport, GateStatus, MarketSnapshot,
    PlanDraft, ValidationResult,
};
use crate::risk::RiskSnapshot;

pub struct ValidationPipeline {
    gates: Vec<Box<dyn Gate>>,
    limits: GateLimits,
}

impl ValidationPipeline {
    pub fn new(limits: GateLimits) -> Self {
        Self {
            gates: vec![
                Box::new(TimeframeRiskGate),
                Box::new(ExecutabilityGate),
                Box::new(StrengthGate),
                Box::new(RiskLimitsGate),
                Box::new(EventFilterGate),
            ],
            limits,
        }
    }

    pub fn limits(&self) -> &GateLimits {
        &self.limits
    }

    pub fn validate(
        &self,
        candidate: &CandidateSignal,
        plan: &PlanDraft,
        market: &MarketSnapshot,
        risk: &RiskSnapshot,
    ) -> ValidationResult {
        let first = self.run_pass(candidate, plan, market, risk, true);

        if has_terminal(&first) {
            return finalize(Decision::Rejected, first, None);
        }

        let corrections: Vec<Correction> = first
            .iter()
            .flat_map(|r| r.corrections.iter().copied())
            .collect();

        if corrections.is_empty() {
            let signal = assemble(candidate, plan, market);
            return finalize(Decision::Passed, first, Some(signal));
        }

        let (corrected, corrected_plan) = apply_corrections(candidate, plan, market, &corrections);
        debug!(
            "candidate {} superseded by {} after {} correction(s)",
            candidate.id,
            corrected.id,
            corrections.len()
        );

        let second = self.run_pass(&corrected, &corrected_plan, market, risk, false);
        if second.iter().all(|r| r.status == GateStatus::Pass) {
            let signal = assemble(&corrected, &corrected_plan, market);
            finalize(Decision::Rewritten, second, Some(signal))
        } else {
            // Corrections are not retried; a second-pass miss is terminal.
            finalize(Decision::Rejected, second, None)
        }
    }

    fn run_pass(
        &self,
        candidate: &CandidateSignal,
        plan: &PlanDraft,
        market: &MarketSnapshot,
        risk: &RiskSnapshot,
        allow_rewrite: bool,
    ) -> Vec<GateReport> {
        let ctx = GateContext {
            candidate,
            plan,
            market,
            risk,
            limits: &self.limits,
            allow_rewrite,
        };
        // Every gate runs; nothing short-circuits.
        self.gates.iter().map(|gate| gate.evaluate(&ctx)).collect()
    }
}

fn has_terminal(reports: &[GateReport]) -> bool {
    reports
        .iter()
        .any(|r| matches!(r.status, GateStatus::Fail | GateStatus::Blocked))
}

fn finalize(
    decision: Decision,
    reports: Vec<GateReport>,
    final_signal: Option<FinalSignal>,
) -> ValidationResult {
    let passed = reports
        .iter()
        .filter(|r| r.status == GateStatus::Pass)
        .count();
    let gate_score = if reports.is_empty() {
        0.0
    } else {
        passed as f64 / reports.len() as f64 * 100.0
    };
    ValidationResult {
        decision,
        reports,
        gate_score,
        final_signal,
    }
}

/// Apply the collected corrections, producing the superseding candidate
/// and its adjusted plan.
fn apply_corrections(
    candidate: &CandidateSignal,
    plan: &PlanDraft,
    market: &MarketSnapshot,
    corrections: &[Correction],
) -> (CandidateSignal, PlanDraft) {
    let mut stop_mult = None;
    let mut target_mult = None;
    let mut plan = plan.clone();

    for correction in corrections {
        match *correction {
            Correction::StopAtrMultiple(m) => stop_mult = Some(m),
            Correction::TargetAtrMultiple(m) => target_mult = Some(m),
            Correction::MaxHoldMinutes(minutes) => plan.max_hold_minutes = minutes,
            Correction::ScaleLots(lots) => plan.lots = lots,
        }
    }

    let entry = candidate.entry_price;
    let atr = market.atr;
    let stop_loss = stop_mult
        .map(|m| entry - m * atr)
        .unwrap_or(candidate.stop_loss);
    let target1 = target_mult
        .map(|m| entry + m * atr)
        .unwrap_or(candidate.target1);

    // The second target keeps its original proportion to the first.
    let old_t1_distance = candidate.target_distance();
    let ratio = if old_t1_distance > 0.0 {
        (candidate.target2 - entry) / old_t1_distance
    } else {
        1.5
    };
    let target2 = entry + (target1 - entry) * ratio;

    (candidate.superseding(stop_loss, target1, target2), plan)
}

/// Build the immutable outbound payload from an accepted candidate.
fn assemble(candidate: &CandidateSignal, plan: &PlanDraft, market: &MarketSnapshot) -> FinalSignal {
    let atr = market.atr;
    let stop_distance = candidate.stop_distance();
    let (stop_atr_multiple, target_atr_multiple) = if atr > 0.0 {
        (stop_distance / atr, candidate.target_distance() / atr)
    } else {
        (0.0, 0.0)
    };

    let risk = RiskPlan {
        atr,
        stop_atr_multiple,
        target_atr_multiple,
        risk_reward: candidate.risk_reward(),
        lots: plan.lots,
        quantity: plan.quantity(),
        max_risk_amount: plan.risk_amount(stop_distance),
    };

    let management = ManagementPlan {
        max_hold_minutes: plan.max_hold_minutes,
        trailing: TrailingMethod::ParabolicStop,
        scale_out_at_target1: true,
        time_stop_minutes: plan.max_hold_minutes,
        invalidation_conditions: vec![
            format!("close below {:.2}", candidate.stop_loss),
            "trailing stop flips direction".to_string(),
            "higher-horizon bias turns bearish".to_string(),
        ],
    };

    FinalSignal {
        candidate: candidate.clone(),
        leg: plan.leg.clone(),
        risk,
        management,
    }
}
