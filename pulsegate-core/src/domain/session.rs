//! Trading-session window.

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::domain::quote::SessionState;

/// Daily session window in exchange-local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl Default for SessionHours {
    fn default() -> Self {
        Self {
            open: NaiveTime::from_hms_opt(9, 15, 0).unwrap(),
            close: NaiveTime::from_hms_opt(15, 30, 0).unwrap(),
        }
    }
}

impl SessionHours {
    pub fn new(open: NaiveTime, close: NaiveTime) -> Self {
        Self { open, close }
    }

    pub fn state_at(&self, at: NaiveDateTime) -> SessionState {
        let t = at.time();
        if t < self.open {
            SessionState::PreOpen
        } else if t < self.close {
            SessionState::Open
        } else {
            SessionState::Closed
        }
    }

    /// Minutes elapsed since the open; negative before the open.
    pub fn minutes_since_open(&self, at: NaiveDateTime) -> i64 {
        (at.time() - self.open).num_minutes()
    }

    /// Minutes left until the close; negative after the close.
    pub fn minutes_to_close(&self, at: NaiveDateTime) -> i64 {
        (self.close - at.time()).num_minutes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    #[test]
    fn default_window_states() {
        let session = SessionHours::default();
        assert_eq!(session.state_at(at(9, 0)), SessionState::PreOpen);
        assert_eq!(session.state_at(at(9, 15)), SessionState::Open);
        assert_eq!(session.state_at(at(12, 0)), SessionState::Open);
        assert_eq!(session.state_at(at(15, 30)), SessionState::Closed);
        assert_eq!(session.state_at(at(16, 0)), SessionState::Closed);
    }

    #[test]
    fn minutes_from_edges() {
        let session = SessionHours::default();
        assert_eq!(session.minutes_since_open(at(9, 25)), 10);
        assert_eq!(session.minutes_to_close(at(15, 20)), 10);
        assert_eq!(session.minutes_since_open(at(9, 0)), -15);
    }
}
