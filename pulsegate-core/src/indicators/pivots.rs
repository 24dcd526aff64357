//! Pivot-range levels from the previous period's high/low/close.
//!
//! Classic floor-trader formulas:
//!   pivot = (H + L + C) / 3
//!   bc = (H + L) / 2, tc = 2*pivot - bc   (central range)
//!   r1 = 2*pivot - L, s1 = 2*pivot - H
//!   r2 = pivot + (H - L), s2 = pivot - (H - L)
//!   r3 = H + 2*(pivot - L), s3 = L - 2*(H - pivot)
//!
//! The block only changes when the previous period rolls over, because its
//! only inputs are the previous period's aggregates. The previous period is
//! the most recent completed calendar day in the series; when the series
//! spans a single day, the session-so-far (all candles but the latest)
//! stands in.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::Candle;

/// The pivot ladder. Central range (bc/tc) plus three rungs each side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotLevels {
    pub pivot: f64,
    /// Bottom of the central range.
    pub bc: f64,
    /// Top of the central range.
    pub tc: f64,
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
}

impl PivotLevels {
    /// Derive the ladder from one period's high/low/close.
    pub fn from_hlc(high: f64, low: f64, close: f64) -> Self {
        let pivot = (high + low + close) / 3.0;
        let bc = (high + low) / 2.0;
        let tc = 2.0 * pivot - bc;
        let range = high - low;
        Self {
            pivot,
            bc: bc.min(tc),
            tc: bc.max(tc),
            r1: 2.0 * pivot - low,
            r2: pivot + range,
            r3: high + 2.0 * (pivot - low),
            s1: 2.0 * pivot - high,
            s2: pivot - range,
            s3: low - 2.0 * (high - pivot),
        }
    }
}

/// Compute the pivot block for a candle series.
///
/// Precondition: non-empty, ordered series (the engine enforces the
/// 50-candle minimum before calling).
pub fn compute_pivots(candles: &[Candle]) -> PivotLevels {
    let (high, low, close) = previous_period_hlc(candles);
    PivotLevels::from_hlc(high, low, close)
}

/// High/low/close of the reference period.
///
/// Most recent completed calendar day when the series spans several days;
/// otherwise all candles except the latest (session-so-far).
fn previous_period_hlc(candles: &[Candle]) -> (f64, f64, f64) {
    let last_date = candles
        .last()
        .map(|c| c.timestamp.date())
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());

    let prior_day: Vec<&Candle> = candles
        .iter()
        .filter(|c| c.timestamp.date() < last_date)
        .collect();

    let reference: Vec<&Candle> = if prior_day.is_empty() {
        // Single-day series: session-so-far stands in for the prior period.
        candles.iter().take(candles.len().saturating_sub(1)).collect()
    } else {
        let prev_date = prior_day
            .iter()
            .map(|c| c.timestamp.date())
            .max()
            .unwrap_or(last_date);
        prior_day
            .into_iter()
            .filter(|c| c.timestamp.date() == prev_date)
            .collect()
    };

    aggregate_hlc(&reference)
}

fn aggregate_hlc(candles: &[&Candle]) -> (f64, f64, f64) {
    let mut high = f64::MIN;
    let mut low = f64::MAX;
    let mut close = f64::NAN;
    for c in candles {
        if c.is_void() {
            continue;
        }
        high = high.max(c.high);
        low = low.min(c.low);
        close = c.close;
    }
    if high == f64::MIN || low == f64::MAX {
        (f64::NAN, f64::NAN, f64::NAN)
    } else {
        (high, low, close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles, DEFAULT_EPSILON};
    use chrono::Duration;

    #[test]
    fn ladder_from_known_hlc() {
        // H=110, L=90, C=100 → pivot = 100
        let levels = PivotLevels::from_hlc(110.0, 90.0, 100.0);
        assert_approx(levels.pivot, 100.0, DEFAULT_EPSILON);
        assert_approx(levels.r1, 110.0, DEFAULT_EPSILON); // 2*100 - 90
        assert_approx(levels.s1, 90.0, DEFAULT_EPSILON); // 2*100 - 110
        assert_approx(levels.r2, 120.0, DEFAULT_EPSILON);
        assert_approx(levels.s2, 80.0, DEFAULT_EPSILON);
        assert_approx(levels.r3, 130.0, DEFAULT_EPSILON); // 110 + 2*10
        assert_approx(levels.s3, 70.0, DEFAULT_EPSILON); // 90 - 2*10
    }

    #[test]
    fn ladder_is_ordered() {
        let levels = PivotLevels::from_hlc(22_150.0, 21_980.0, 22_100.0);
        assert!(levels.s3 < levels.s2);
        assert!(levels.s2 < levels.s1);
        assert!(levels.s1 < levels.pivot);
        assert!(levels.pivot < levels.r1);
        assert!(levels.r1 < levels.r2);
        assert!(levels.r2 < levels.r3);
        assert!(levels.bc <= levels.pivot);
        assert!(levels.pivot <= levels.tc);
    }

    #[test]
    fn multi_day_series_uses_completed_prior_day() {
        // Day one candles, then day two.
        let mut candles = make_candles(&[100.0, 104.0, 102.0]);
        let mut day_two = make_candles(&[103.0, 105.0]);
        for c in day_two.iter_mut() {
            c.timestamp += Duration::days(1);
        }
        candles.extend(day_two);

        let (high, low, close) = previous_period_hlc(&candles);
        // Day one: highs are open.max(close)+1, lows open.min(close)-1
        assert_approx(high, 105.0, DEFAULT_EPSILON); // candle 1: max(100,104)+1
        assert_approx(low, 99.0, DEFAULT_EPSILON); // candle 0: 100-1
        assert_approx(close, 102.0, DEFAULT_EPSILON);
    }

    #[test]
    fn single_day_series_uses_session_so_far() {
        let candles = make_candles(&[100.0, 104.0, 102.0, 108.0]);
        let (high, low, close) = previous_period_hlc(&candles);
        // Excludes the latest candle.
        assert_approx(high, 105.0, DEFAULT_EPSILON);
        assert_approx(low, 99.0, DEFAULT_EPSILON);
        assert_approx(close, 102.0, DEFAULT_EPSILON);
    }

    #[test]
    fn pivot_block_stable_within_a_day() {
        // Appending intraday candles must not move a multi-day pivot block.
        let mut candles = make_candles(&[100.0, 104.0, 102.0]);
        let mut day_two = make_candles(&[103.0, 105.0, 104.0, 106.0]);
        for c in day_two.iter_mut() {
            c.timestamp += Duration::days(1);
        }
        candles.extend(day_two);

        let early = compute_pivots(&candles[..5]);
        let late = compute_pivots(&candles);
        assert_eq!(early, late);
    }
}
