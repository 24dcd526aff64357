//! Single-quote snapshot from the feed.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Where the trading session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    PreOpen,
    Open,
    Closed,
}

/// Latest-quote snapshot for an instrument.
///
/// Mirrors the vendor's snapshot shape: last trade plus the running day
/// aggregates. `session_state` is derived from the snapshot timestamp
/// against the configured session window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub last_price: f64,
    pub prev_close: f64,
    pub day_open: f64,
    pub day_high: f64,
    pub day_low: f64,
    pub volume: u64,
    pub session_state: SessionState,
    pub timestamp: NaiveDateTime,
}

impl Quote {
    /// Percent change from previous close, NaN-safe.
    pub fn change_pct(&self) -> f64 {
        if self.prev_close > 0.0 {
            (self.last_price - self.prev_close) / self.prev_close * 100.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_quote() -> Quote {
        Quote {
            symbol: "NIFTY".into(),
            last_price: 22_100.0,
            prev_close: 22_000.0,
            day_open: 22_020.0,
            day_high: 22_150.0,
            day_low: 21_980.0,
            volume: 1_200_000,
            session_state: SessionState::Open,
            timestamp: NaiveDate::from_ymd_opt(2024, 6, 3)
                .unwrap()
                .and_hms_opt(10, 15, 0)
                .unwrap(),
        }
    }

    #[test]
    fn change_pct_from_prev_close() {
        let quote = sample_quote();
        assert!((quote.change_pct() - 100.0 / 22_000.0 * 100.0).abs() < 1e-10);
    }

    #[test]
    fn change_pct_zero_prev_close() {
        let mut quote = sample_quote();
        quote.prev_close = 0.0;
        assert_eq!(quote.change_pct(), 0.0);
    }

    #[test]
    fn quote_serialization_roundtrip() {
        let quote = sample_quote();
        let json = serde_json::to_string(&quote).unwrap();
        let deser: Quote = serde_json::from_str(&json).unwrap();
        assert_eq!(quote, deser);
    }
}
