//! Signal payloads — candidate signals and the final validated form.
//!
//! A `CandidateSignal` is immutable once synthesized. The gate pipeline
//! never mutates one; an auto-corrected variant is a new value created by
//! `superseding()`, with a fresh id. `FinalSignal` is what the
//! distribution layer sees — candidate fields plus the selected option
//! leg, risk plan, and management plan.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::horizon::Horizon;
use crate::domain::ids::SignalId;

/// Directional intent of a scalp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }
}

/// Higher-horizon trend read used by the strength gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendBias {
    Bullish,
    Bearish,
    Neutral,
}

/// Which confluence conditions fired when the candidate was synthesized.
///
/// `trend`, `momentum`, `volatility` and `structure` are the four
/// alignment bits the strength gate counts; `final_gate` is the
/// pass-through hook; `bearish` records opposing alignment for the
/// contradiction check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfluenceFlags {
    pub trend: bool,
    pub momentum: bool,
    pub volatility: bool,
    pub structure: bool,
    pub final_gate: bool,
    pub bearish: bool,
}

impl ConfluenceFlags {
    /// How many of the four alignment indicators agree.
    pub fn aligned_count(&self) -> u8 {
        [self.trend, self.momentum, self.volatility, self.structure]
            .iter()
            .filter(|&&fired| fired)
            .count() as u8
    }
}

/// A raw candidate produced by the generator, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSignal {
    pub id: SignalId,
    pub symbol: String,
    pub horizon: Horizon,
    pub direction: Direction,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub target1: f64,
    pub target2: f64,
    /// Composite confluence strength, 0–100.
    pub strength: u8,
    pub confluence: ConfluenceFlags,
    pub created_at: NaiveDateTime,
}

impl CandidateSignal {
    /// Distance from entry to stop, always positive.
    pub fn stop_distance(&self) -> f64 {
        (self.entry_price - self.stop_loss).abs()
    }

    /// Distance from entry to the first target, always positive.
    pub fn target_distance(&self) -> f64 {
        (self.target1 - self.entry_price).abs()
    }

    /// Risk:reward ratio (target distance over stop distance).
    pub fn risk_reward(&self) -> f64 {
        let stop = self.stop_distance();
        if stop > 0.0 {
            self.target_distance() / stop
        } else {
            0.0
        }
    }

    /// Build the corrected variant that supersedes this candidate.
    ///
    /// The original is untouched; the new value carries a fresh id derived
    /// from the corrected levels.
    pub fn superseding(&self, stop_loss: f64, target1: f64, target2: f64) -> CandidateSignal {
        let mut next = self.clone();
        next.stop_loss = stop_loss;
        next.target1 = target1;
        next.target2 = target2;
        next.id = SignalId::derive(
            &next.symbol,
            next.horizon.label(),
            next.direction.label(),
            next.entry_price,
            &format!("{}#corrected", next.created_at),
        );
        next
    }
}

/// Call or put side of the selected option leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionSide {
    Call,
    Put,
}

/// The option leg a final signal trades, with modeled execution figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionLeg {
    pub strike: f64,
    pub side: OptionSide,
    pub premium: f64,
    pub delta: f64,
    /// Daily time decay as a fraction of premium.
    pub theta_per_day: f64,
    /// Bid/ask spread as a percentage of mid.
    pub spread_pct: f64,
    /// 0–100 composite liquidity score.
    pub liquidity_score: f64,
}

/// Risk block: how the stop/target map to ATR units and money at risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskPlan {
    pub atr: f64,
    pub stop_atr_multiple: f64,
    pub target_atr_multiple: f64,
    pub risk_reward: f64,
    /// Number of option lots.
    pub lots: u32,
    /// Total contracts (lots × lot size).
    pub quantity: u32,
    pub max_risk_amount: f64,
}

/// How an open scalp is managed after entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailingMethod {
    /// Parabolic reversal series from the indicator set.
    ParabolicStop,
    /// Static stop at the signal's stop_loss.
    FixedStop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagementPlan {
    pub max_hold_minutes: u32,
    pub trailing: TrailingMethod,
    /// Scale out half the position at target1.
    pub scale_out_at_target1: bool,
    /// Exit unconditionally this many minutes after entry.
    pub time_stop_minutes: u32,
    pub invalidation_conditions: Vec<String>,
}

/// The validated, immutable signal emitted to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalSignal {
    #[serde(flatten)]
    pub candidate: CandidateSignal,
    pub leg: OptionLeg,
    pub risk: RiskPlan,
    pub management: ManagementPlan,
}
