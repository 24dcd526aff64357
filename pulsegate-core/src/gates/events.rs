//! Gate 5 — event and session blackout filter.
//!
//! Scalps are blocked inside high-impact windows: the first and last
//! minutes of the session, and configured macro events, each with an
//! asymmetric before/after blackout by event type. Just outside a window
//! the gate passes with a warning; anywhere else it passes clean.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::gates::{Gate, GateContext, GateReport};

/// Event types with their default (before, after) blackout minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Central-bank rate decisions: markets churn well after the print.
    RateDecision,
    /// Scheduled macro releases (inflation, payrolls).
    MacroRelease,
    /// Index derivative expiry burst.
    ExpiryUnwind,
}

impl EventKind {
    pub fn blackout_minutes(&self) -> (i64, i64) {
        match self {
            EventKind::RateDecision => (30, 45),
            EventKind::MacroRelease => (15, 20),
            EventKind::ExpiryUnwind => (10, 30),
        }
    }
}

/// One flagged calendar entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroEvent {
    pub name: String,
    pub at: NaiveDateTime,
    pub kind: EventKind,
}

impl MacroEvent {
    fn window(&self) -> (NaiveDateTime, NaiveDateTime) {
        let (before, after) = self.kind.blackout_minutes();
        (
            self.at - Duration::minutes(before),
            self.at + Duration::minutes(after),
        )
    }
}

/// The blackout calendar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventCalendar {
    pub events: Vec<MacroEvent>,
}

impl EventCalendar {
    /// The event whose blackout window contains `at`, if any.
    pub fn active_event(&self, at: NaiveDateTime) -> Option<&MacroEvent> {
        self.events.iter().find(|event| {
            let (start, end) = event.window();
            at >= start && at < end
        })
    }

    /// The event whose blackout window starts within `margin` of `at`.
    pub fn upcoming_event(&self, at: NaiveDateTime, margin: Duration) -> Option<&MacroEvent> {
        self.events.iter().find(|event| {
            let (start, _) = event.window();
            at < start && start - at <= margin
        })
    }
}

pub struct EventFilterGate;

pub const GATE_NAME: &str = "event_session_filter";

impl Gate for EventFilterGate {
    fn name(&self) -> &'static str {
        GATE_NAME
    }

    fn evaluate(&self, ctx: &GateContext) -> GateReport {
        let limits = ctx.limits;
        let now = ctx.market.now;
        let session = limits.session;

        let since_open = session.minutes_since_open(now);
        let to_close = session.minutes_to_close(now);

        if since_open < 0 || to_close <= 0 {
            return GateReport::blocked(GATE_NAME, vec!["outside the trading session".into()]);
        }
        if since_open < limits.open_blackout_minutes {
            return GateReport::blocked(
                GATE_NAME,
                vec![format!(
                    "first {} minutes of the session",
                    limits.open_blackout_minutes
                )],
            );
        }
        if to_close <= limits.close_blackout_minutes {
            return GateReport::blocked(
                GATE_NAME,
                vec![format!(
                    "last {} minutes of the session",
                    limits.close_blackout_minutes
                )],
            );
        }

        if let Some(event) = limits.calendar.active_event(now) {
            return GateReport::blocked(
                GATE_NAME,
                vec![format!("inside blackout window for {}", event.name)],
            );
        }

        let margin = Duration::minutes(limits.blackout_warning_margin_minutes);
        let near_open = since_open < limits.open_blackout_minutes + limits.blackout_warning_margin_minutes;
        let near_close = to_close <= limits.close_blackout_minutes + limits.blackout_warning_margin_minutes;
        if let Some(event) = limits.calendar.upcoming_event(now, margin) {
            return GateReport::pass_with_warning(
                GATE_NAME,
                format!("blackout for {} begins shortly", event.name),
            );
        }
        if near_open {
            return GateReport::pass_with_warning(GATE_NAME, "just after the open blackout".into());
        }
        if near_close {
            return GateReport::pass_with_warning(GATE_NAME, "close blackout approaching".into());
        }

        GateReport::pass(GATE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates::test_support::{at, context, scenario, Scenario};
    use crate::gates::GateStatus;

    #[test]
    fn mid_session_passes_clean() {
        let s = scenario(Scenario::default());
        let report = EventFilterGate.evaluate(&context(&s));
        assert_eq!(report.status, GateStatus::Pass);
        assert!(report.reasons.is_empty());
    }

    #[test]
    fn first_ten_minutes_blocked() {
        let mut s = scenario(Scenario::default());
        s.market.now = at(9, 20); // 5 minutes after the 09:15 open
        let report = EventFilterGate.evaluate(&context(&s));
        assert_eq!(report.status, GateStatus::Blocked);
        assert!(report.reasons[0].contains("first 10 minutes"));
    }

    #[test]
    fn last_ten_minutes_blocked() {
        let mut s = scenario(Scenario::default());
        s.market.now = at(15, 25);
        let report = EventFilterGate.evaluate(&context(&s));
        assert_eq!(report.status, GateStatus::Blocked);
    }

    #[test]
    fn outside_session_blocked() {
        let mut s = scenario(Scenario::default());
        s.market.now = at(8, 0);
        let report = EventFilterGate.evaluate(&context(&s));
        assert_eq!(report.status, GateStatus::Blocked);
    }

    #[test]
    fn rate_decision_window_is_asymmetric() {
        let mut s = scenario(Scenario::default());
        s.limits.calendar.events.push(MacroEvent {
            name: "policy rate decision".into(),
            at: at(12, 0),
            kind: EventKind::RateDecision,
        });

        // 29 minutes before: inside the 30-minute pre-window.
        s.market.now = at(11, 31);
        assert_eq!(
            EventFilterGate.evaluate(&context(&s)).status,
            GateStatus::Blocked
        );
        // 40 minutes after: still inside the 45-minute post-window.
        s.market.now = at(12, 40);
        assert_eq!(
            EventFilterGate.evaluate(&context(&s)).status,
            GateStatus::Blocked
        );
        // 50 minutes after: clear.
        s.market.now = at(12, 50);
        assert_eq!(
            EventFilterGate.evaluate(&context(&s)).status,
            GateStatus::Pass
        );
    }

    #[test]
    fn near_window_passes_with_warning() {
        let mut s = scenario(Scenario::default());
        s.limits.calendar.events.push(MacroEvent {
            name: "inflation print".into(),
            at: at(12, 0),
            kind: EventKind::MacroRelease,
        });
        // Pre-window opens 11:45; at 11:42 we are inside the 5-minute margin.
        s.market.now = at(11, 42);
        let report = EventFilterGate.evaluate(&context(&s));
        assert_eq!(report.status, GateStatus::Pass);
        assert!(report.reasons[0].contains("begins shortly"));
    }

    #[test]
    fn just_after_open_blackout_warns() {
        let mut s = scenario(Scenario::default());
        s.market.now = at(9, 27); // 12 minutes in; blackout ended at 10
        let report = EventFilterGate.evaluate(&context(&s));
        assert_eq!(report.status, GateStatus::Pass);
        assert!(!report.reasons.is_empty());
    }
}
