//! Process-lifetime risk state.
//!
//! Signal counters per (instrument, horizon, hour/day), the day's trade
//! and loss aggregates, open-position count, and the emergency stop. Two
//! components mutate this state — the candidate generator (rate counters)
//! and the gate pipeline (trade/loss counters) — so every mutation goes
//! through the one interior Mutex. Day counters reset on calendar
//! rollover, checked against the caller-supplied clock on every access.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::domain::Horizon;

/// Point-in-time view for gate evaluation and the ops query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSnapshot {
    pub day: NaiveDate,
    pub signals_today: u32,
    pub trades_today: u32,
    /// Cumulative losses today as a positive percentage of capital.
    pub loss_today_pct: f64,
    pub open_positions: u32,
    pub emergency_stop: bool,
}

#[derive(Debug)]
struct Inner {
    day: NaiveDate,
    hourly_signals: HashMap<(String, Horizon, u32), u32>,
    daily_signals: HashMap<(String, Horizon), u32>,
    last_signal: HashMap<(String, Horizon), NaiveDateTime>,
    trades_today: u32,
    loss_today_pct: f64,
    open_positions: u32,
    emergency_stop: bool,
}

impl Inner {
    /// Reset day-scoped counters when the calendar day changes. The
    /// emergency stop survives — a human tripped it, a date change does
    /// not untrip it. Open positions persist; scalps that somehow stay
    /// open are still open.
    fn roll_to(&mut self, day: NaiveDate) {
        if self.day != day {
            self.day = day;
            self.hourly_signals.clear();
            self.daily_signals.clear();
            self.trades_today = 0;
            self.loss_today_pct = 0.0;
        }
    }
}

/// The store. Constructed once at startup and shared by reference.
#[derive(Debug)]
pub struct RiskTracker {
    inner: Mutex<Inner>,
}

impl RiskTracker {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            inner: Mutex::new(Inner {
                day: today,
                hourly_signals: HashMap::new(),
                daily_signals: HashMap::new(),
                last_signal: HashMap::new(),
                trades_today: 0,
                loss_today_pct: 0.0,
                open_positions: 0,
                emergency_stop: false,
            }),
        }
    }

    /// Record an emitted signal: bumps the hour and day counters and the
    /// re-signal clock.
    pub fn note_signal(&self, symbol: &str, horizon: Horizon, at: NaiveDateTime) {
        let mut inner = self.inner.lock().unwrap();
        inner.roll_to(at.date());
        *inner
            .hourly_signals
            .entry((symbol.to_string(), horizon, at.hour()))
            .or_insert(0) += 1;
        *inner
            .daily_signals
            .entry((symbol.to_string(), horizon))
            .or_insert(0) += 1;
        inner.last_signal.insert((symbol.to_string(), horizon), at);
    }

    pub fn last_signal_at(&self, symbol: &str, horizon: Horizon) -> Option<NaiveDateTime> {
        self.inner
            .lock()
            .unwrap()
            .last_signal
            .get(&(symbol.to_string(), horizon))
            .copied()
    }

    pub fn signals_this_hour(&self, symbol: &str, horizon: Horizon, at: NaiveDateTime) -> u32 {
        let mut inner = self.inner.lock().unwrap();
        inner.roll_to(at.date());
        inner
            .hourly_signals
            .get(&(symbol.to_string(), horizon, at.hour()))
            .copied()
            .unwrap_or(0)
    }

    pub fn signals_today(&self, symbol: &str, horizon: Horizon, at: NaiveDateTime) -> u32 {
        let mut inner = self.inner.lock().unwrap();
        inner.roll_to(at.date());
        inner
            .daily_signals
            .get(&(symbol.to_string(), horizon))
            .copied()
            .unwrap_or(0)
    }

    /// Record an accepted signal turning into a working trade: bumps the
    /// day's trade count and the concurrent-position count.
    pub fn note_trade_opened(&self, at: NaiveDateTime) {
        let mut inner = self.inner.lock().unwrap();
        inner.roll_to(at.date());
        inner.trades_today += 1;
        inner.open_positions += 1;
    }

    /// Record a closed trade's result. Losses accumulate as positive
    /// percentages. The trade was already counted when it opened.
    pub fn record_trade_result(&self, at: NaiveDateTime, pnl_pct: f64) {
        let mut inner = self.inner.lock().unwrap();
        inner.roll_to(at.date());
        inner.open_positions = inner.open_positions.saturating_sub(1);
        if pnl_pct < 0.0 {
            inner.loss_today_pct += -pnl_pct;
        }
    }

    pub fn position_opened(&self) {
        self.inner.lock().unwrap().open_positions += 1;
    }

    pub fn position_closed(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.open_positions = inner.open_positions.saturating_sub(1);
    }

    pub fn set_emergency_stop(&self, stopped: bool) {
        self.inner.lock().unwrap().emergency_stop = stopped;
    }

    pub fn emergency_stopped(&self) -> bool {
        self.inner.lock().unwrap().emergency_stop
    }

    pub fn snapshot(&self, at: NaiveDateTime) -> RiskSnapshot {
        let mut inner = self.inner.lock().unwrap();
        inner.roll_to(at.date());
        RiskSnapshot {
            day: inner.day,
            signals_today: inner.daily_signals.values().sum(),
            trades_today: inner.trades_today,
            loss_today_pct: inner.loss_today_pct,
            open_positions: inner.open_positions,
            emergency_stop: inner.emergency_stop,
        }
    }
}
