//! Candidate generator — synthesizes raw signals from confluence.
//!
//! Rate-limited per (instrument, horizon): the minimum re-signal interval
//! scales with the horizon and compresses inside high-liquidity session
//! windows. Stop selection takes the tightest valid level below entry;
//! targets are risk multiples of the stop distance; strength is an
//! additive composite over the fired conditions.

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::domain::{
    CandidateSignal, Candle, ConfluenceFlags, Direction, Horizon, Instrument, SignalId,
};
use crate::indicators::IndicatorSet;
use crate::risk::RiskTracker;
use crate::signals::confluence::{self, ConfluenceSettings};

/// Additive strength weights per fired condition. Sums to 100.
const WEIGHT_TREND: u8 = 30;
const WEIGHT_MOMENTUM: u8 = 25;
const WEIGHT_VOLATILITY: u8 = 20;
const WEIGHT_STRUCTURE: u8 = 15;
const WEIGHT_FINAL: u8 = 10;

/// A high-liquidity window of the session, local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        let t = at.time();
        t >= self.start && t < self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorSettings {
    pub confluence: ConfluenceSettings,
    /// Session windows where the re-signal interval compresses.
    pub high_liquidity_windows: Vec<TimeWindow>,
    /// Interval multiplier inside a high-liquidity window.
    pub liquidity_compression: f64,
    /// Target distances as multiples of the stop distance.
    pub target_multiples: (f64, f64),
    /// Stop fallback when no valid level sits below entry.
    pub stop_fallback_fraction: f64,
    /// Signal caps consulted against the risk counters.
    pub max_signals_per_hour: u32,
    pub max_signals_per_day: u32,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            confluence: ConfluenceSettings::default(),
            high_liquidity_windows: vec![
                TimeWindow {
                    start: NaiveTime::from_hms_opt(9, 15, 0).unwrap(),
                    end: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
                },
                TimeWindow {
                    start: NaiveTime::from_hms_opt(14, 15, 0).unwrap(),
                    end: NaiveTime::from_hms_opt(15, 30, 0).unwrap(),
                },
            ],
            liquidity_compression: 0.5,
            target_multiples: (1.0, 1.5),
            stop_fallback_fraction: 0.005,
            max_signals_per_hour: 6,
            max_signals_per_day: 20,
        }
    }
}

pub struct CandidateGenerator {
    settings: GeneratorSettings,
}

impl CandidateGenerator {
    pub fn new(settings: GeneratorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Try to synthesize a candidate for one (instrument, horizon).
    ///
    /// Returns `None` when rate-limited, capped, emergency-stopped, or
    /// when confluence falls short — all normal per-cycle outcomes. An
    /// emitted candidate bumps the rate counters as a side effect.
    pub fn try_generate(
        &self,
        instrument: &Instrument,
        horizon: Horizon,
        candles: &[Candle],
        indicators: &IndicatorSet,
        now: NaiveDateTime,
        risk: &RiskTracker,
    ) -> Option<CandidateSignal> {
        if risk.emergency_stopped() {
            return None;
        }

        let symbol = instrument.symbol.as_str();
        if !self.interval_elapsed(symbol, horizon, now, risk) {
            return None;
        }
        if risk.signals_this_hour(symbol, horizon, now) >= self.settings.max_signals_per_hour
            || risk.signals_today(symbol, horizon, now) >= self.settings.max_signals_per_day
        {
            return None;
        }

        let latest = candles.last()?;
        let flags = confluence::evaluate(latest, indicators, &self.settings.confluence);
        if !confluence::satisfied(&flags, &self.settings.confluence) {
            return None;
        }

        let entry_price = latest.close;
        let stop_loss = self.select_stop(entry_price, latest, indicators);
        let stop_distance = entry_price - stop_loss;
        let (t1_mult, t2_mult) = self.settings.target_multiples;
        let target1 = entry_price + t1_mult * stop_distance;
        let target2 = entry_price + t2_mult * stop_distance;

        let direction = Direction::Long;
        let candidate = CandidateSignal {
            id: SignalId::derive(
                symbol,
                horizon.label(),
                direction.label(),
                entry_price,
                &now.to_string(),
            ),
            symbol: symbol.to_string(),
            horizon,
            direction,
            entry_price,
            stop_loss,
            target1,
            target2,
            strength: strength_score(&flags),
            confluence: flags,
            created_at: now,
        };

        risk.note_signal(symbol, horizon, now);
        Some(candidate)
    }

    /// The tightest valid stop below entry: the best (highest) of the
    /// candle low, the session VWAP, and the pivot when it sits below the
    /// entry price. Falls back to a fixed fraction under entry.
    fn select_stop(&self, entry: f64, latest: &Candle, indicators: &IndicatorSet) -> f64 {
        let mut best: Option<f64> = None;
        let mut consider = |level: f64| {
            if level.is_finite() && level > 0.0 && level < entry {
                best = Some(match best {
                    Some(current) => current.max(level),
                    None => level,
                });
            }
        };

        consider(latest.low);
        if let Some(vwap) = indicators.vwap.latest_valid() {
            consider(vwap);
        }
        consider(indicators.pivots.pivot);

        best.unwrap_or(entry * (1.0 - self.settings.stop_fallback_fraction))
    }

    fn interval_elapsed(
        &self,
        symbol: &str,
        horizon: Horizon,
        now: NaiveDateTime,
        risk: &RiskTracker,
    ) -> bool {
        let last = match risk.last_signal_at(symbol, horizon) {
            Some(last) => last,
            None => return true,
        };

        let mut gap_secs = horizon.min_signal_gap().num_seconds() as f64;
        if self
            .settings
            .high_liquidity_windows
            .iter()
            .any(|w| w.contains(now))
        {
            gap_secs *= self.settings.liquidity_compression;
        }

        (now - last).num_seconds() as f64 >= gap_secs
    }
}

fn strength_score(flags: &ConfluenceFlags) -> u8 {
    let mut score = 0u16;
    if flags.trend {
        score += WEIGHT_TREND as u16;
    }
    if flags.momentum {
        score += WEIGHT_MOMENTUM as u16;
    }
    if flags.volatility {
        score += WEIGHT_VOLATILITY as u16;
    }
    if flags.structure {
        score += WEIGHT_STRUCTURE as u16;
    }
    if flags.final_gate {
        score += WEIGHT_FINAL as u16;
    }
    score.min(100) as u8
}
