//! Validation gate pipeline — the last stop before a signal is emitted.
//!
//! Five independent gates evaluate one candidate against the live market
//! snapshot and risk state. Gates never short-circuit: all of them run so
//! the full reason list can be reported. The pipeline aggregates the
//! verdicts, applies corrections at most once, and re-runs the gate set a
//! single time (two-pass state machine — no iterative retries).

pub mod events;
pub mod executability;
pub mod pipeline;
pub mod risk_limits;
pub mod rr_bounds;
pub mod strength;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::{
    CandidateSignal, Horizon, OptionLeg, Quote, SessionHours, TrendBias,
};
use crate::risk::RiskSnapshot;

pub use events::{EventCalendar, EventKind, MacroEvent};
pub use pipeline::ValidationPipeline;

/// Verdict from one gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateStatus {
    Pass,
    Fail,
    Rewrite,
    Blocked,
}

/// A correction proposed by a REWRITE verdict, applied by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Correction {
    /// Clamp the stop distance to this many ATRs.
    StopAtrMultiple(f64),
    /// Clamp the first target distance to this many ATRs.
    TargetAtrMultiple(f64),
    /// Cap the hold time.
    MaxHoldMinutes(u32),
    /// Scale the position down to this many lots.
    ScaleLots(u32),
}

/// One gate's full report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateReport {
    pub gate: &'static str,
    pub status: GateStatus,
    pub reasons: Vec<String>,
    pub corrections: Vec<Correction>,
}

impl GateReport {
    pub fn pass(gate: &'static str) -> Self {
        Self {
            gate,
            status: GateStatus::Pass,
            reasons: Vec::new(),
            corrections: Vec::new(),
        }
    }

    pub fn pass_with_warning(gate: &'static str, warning: String) -> Self {
        Self {
            gate,
            status: GateStatus::Pass,
            reasons: vec![warning],
            corrections: Vec::new(),
        }
    }

    pub fn fail(gate: &'static str, reasons: Vec<String>) -> Self {
        Self {
            gate,
            status: GateStatus::Fail,
            reasons,
            corrections: Vec::new(),
        }
    }

    pub fn blocked(gate: &'static str, reasons: Vec<String>) -> Self {
        Self {
            gate,
            status: GateStatus::Blocked,
            reasons,
            corrections: Vec::new(),
        }
    }

    pub fn rewrite(gate: &'static str, reasons: Vec<String>, corrections: Vec<Correction>) -> Self {
        Self {
            gate,
            status: GateStatus::Rewrite,
            reasons,
            corrections,
        }
    }
}

/// Aggregate pipeline decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Passed,
    Rewritten,
    Rejected,
}

/// Market context for one validation run.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    pub quote: Quote,
    /// Horizon ATR, the unit for stop/target distances.
    pub atr: f64,
    /// Session VWAP at evaluation time.
    pub vwap: f64,
    /// Trend read from the next horizon up.
    pub higher_horizon_bias: TrendBias,
    pub now: NaiveDateTime,
}

/// The sizing draft the engine attaches to a candidate before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanDraft {
    pub leg: OptionLeg,
    /// Full liquidity picture behind the leg's summary figures; the
    /// executability gate feeds it to the slippage model.
    pub liquidity: crate::options::LiquidityAssessment,
    pub lots: u32,
    pub lot_size: u32,
    /// Deployable capital the risk percentages are measured against.
    pub capital: f64,
    pub max_hold_minutes: u32,
}

impl PlanDraft {
    pub fn quantity(&self) -> u32 {
        self.lots * self.lot_size
    }

    /// Money at risk if the stop is hit: underlying stop distance carried
    /// through the leg's delta.
    pub fn risk_amount(&self, stop_distance: f64) -> f64 {
        stop_distance * self.leg.delta.abs() * self.quantity() as f64
    }

    pub fn risk_pct(&self, stop_distance: f64) -> f64 {
        if self.capital > 0.0 {
            self.risk_amount(stop_distance) / self.capital * 100.0
        } else {
            0.0
        }
    }
}

/// Per-horizon bounds used by the timeframe gate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeframeBounds {
    pub stop_atr: (f64, f64),
    pub target_atr: (f64, f64),
    pub min_risk_reward: f64,
    pub max_hold_minutes: u32,
}

impl TimeframeBounds {
    pub fn for_horizon(horizon: Horizon) -> Self {
        Self {
            stop_atr: horizon.stop_atr_bounds(),
            target_atr: horizon.target_atr_bounds(),
            min_risk_reward: horizon.min_risk_reward(),
            max_hold_minutes: horizon.max_hold_minutes(),
        }
    }
}

/// Every tunable the gates consult.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateLimits {
    /// Per-horizon overrides; unlisted horizons use the built-in bounds.
    pub bounds_overrides: HashMap<Horizon, TimeframeBounds>,

    // Executability thresholds.
    pub max_spread_pct: f64,
    pub min_liquidity_score: f64,
    pub delta_band: (f64, f64),
    pub max_theta_per_day: f64,
    pub min_execution_probability: f64,
    /// Modeled slippage cap, percent of premium.
    pub max_slippage_pct: f64,
    /// Transaction-cost drag cap, percent of notional.
    pub max_cost_pct: f64,

    // Confluence strength.
    pub min_aligned_indicators: u8,

    // Risk limits.
    pub max_risk_per_trade_pct: f64,
    pub max_daily_loss_pct: f64,
    pub max_trades_per_day: u32,
    pub max_open_positions: u32,

    // Event/session filter.
    pub session: SessionHours,
    pub open_blackout_minutes: i64,
    pub close_blackout_minutes: i64,
    pub blackout_warning_margin_minutes: i64,
    pub calendar: EventCalendar,
}

impl Default for GateLimits {
    fn default() -> Self {
        Self {
            bounds_overrides: HashMap::new(),
            max_spread_pct: 1.2,
            min_liquidity_score: 40.0,
            delta_band: (0.10, 0.95),
            max_theta_per_day: 0.55,
            min_execution_probability: 0.55,
            max_slippage_pct: 1.5,
            max_cost_pct: 3.0,
            min_aligned_indicators: 3,
            max_risk_per_trade_pct: 1.0,
            max_daily_loss_pct: 3.0,
            max_trades_per_day: 10,
            max_open_positions: 2,
            session: SessionHours::default(),
            open_blackout_minutes: 10,
            close_blackout_minutes: 10,
            blackout_warning_margin_minutes: 5,
            calendar: EventCalendar::default(),
        }
    }
}

impl GateLimits {
    pub fn bounds_for(&self, horizon: Horizon) -> TimeframeBounds {
        self.bounds_overrides
            .get(&horizon)
            .copied()
            .unwrap_or_else(|| TimeframeBounds::for_horizon(horizon))
    }
}

/// Everything one gate sees. `allow_rewrite` is false on the second pass:
/// a violation that would have been correctable becomes a failure, which
/// is what guarantees the two-pass machine terminates.
#[derive(Debug)]
pub struct GateContext<'a> {
    pub candidate: &'a CandidateSignal,
    pub plan: &'a PlanDraft,
    pub market: &'a MarketSnapshot,
    pub risk: &'a RiskSnapshot,
    pub limits: &'a GateLimits,
    pub allow_rewrite: bool,
}

/// One independent validation check.
pub trait Gate: Send + Sync {
    fn name(&self) -> &'static str;
    fn evaluate(&self, ctx: &GateContext) -> GateReport;
}

/// The final product of a validation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub decision: Decision,
    /// Reports from the deciding pass (second pass when a rewrite ran).
    pub reports: Vec<GateReport>,
    /// Percentage of gates that passed on the deciding pass.
    pub gate_score: f64,
    pub final_signal: Option<crate::domain::FinalSignal>,
}

impl ValidationResult {
    /// All reasons across the deciding pass, for logging.
    pub fn reasons(&self) -> Vec<&str> {
        self.reports
            .iter()
            .flat_map(|r| r.reasons.iter().map(String::as_str))
            .collect()
    }
}
