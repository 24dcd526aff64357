//! Local swing highs/lows with a symmetric lookback window.
//!
//! A candle is a swing high only if no candle within `window` on either
//! side has a strictly higher high (ties keep the pivot). The last
//! `window` candles can never be confirmed — the right side of their
//! window has not closed yet.

use crate::domain::Candle;

/// Sparse series pair: the swing level at confirmed pivot candles, NaN
/// everywhere else.
pub fn swing_series(candles: &[Candle], window: usize) -> (Vec<f64>, Vec<f64>) {
    let n = candles.len();
    let mut highs = vec![f64::NAN; n];
    let mut lows = vec![f64::NAN; n];

    if n < 2 * window + 1 {
        return (highs, lows);
    }

    for i in window..n - window {
        let candidate_high = candles[i].high;
        let candidate_low = candles[i].low;
        if candidate_high.is_nan() || candidate_low.is_nan() {
            continue;
        }

        let neighbourhood = &candles[i - window..=i + window];
        let is_high = neighbourhood
            .iter()
            .all(|c| c.high.is_nan() || c.high <= candidate_high);
        let is_low = neighbourhood
            .iter()
            .all(|c| c.low.is_nan() || c.low >= candidate_low);

        if is_high {
            highs[i] = candidate_high;
        }
        if is_low {
            lows[i] = candidate_low;
        }
    }

    (highs, lows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_candles;

    #[test]
    fn detects_isolated_peak() {
        // Peak at index 6 of a 13-candle tent.
        let closes: Vec<f64> = (0..13)
            .map(|i| 100.0 + (6.0 - (i as f64 - 6.0).abs()))
            .collect();
        let candles = make_candles(&closes);
        let (highs, lows) = swing_series(&candles, 5);

        assert!(!highs[6].is_nan(), "apex should be a confirmed swing high");
        // The candle after the apex opens at the apex close, so its high
        // ties the apex and the tie keeps it a pivot too.
        assert!(!highs[7].is_nan());
        // Everything else inside the apex window is strictly dominated.
        for i in 2..=10 {
            if i != 6 && i != 7 {
                assert!(highs[i].is_nan(), "index {i} should not be a swing high");
            }
        }
        // A tent has its lows at the edges; index 6 is not a swing low.
        assert!(lows[6].is_nan());
    }

    #[test]
    fn detects_valley() {
        let closes: Vec<f64> = (0..13)
            .map(|i| 100.0 - (6.0 - (i as f64 - 6.0).abs()))
            .collect();
        let candles = make_candles(&closes);
        let (_, lows) = swing_series(&candles, 5);
        assert!(!lows[6].is_nan(), "trough should be a confirmed swing low");
    }

    #[test]
    fn tail_candles_never_confirmed() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let candles = make_candles(&closes);
        let (highs, lows) = swing_series(&candles, 5);
        for i in 15..20 {
            assert!(highs[i].is_nan());
            assert!(lows[i].is_nan());
        }
    }

    #[test]
    fn short_series_all_nan() {
        let candles = make_candles(&[100.0, 101.0, 102.0]);
        let (highs, lows) = swing_series(&candles, 5);
        assert!(highs.iter().all(|v| v.is_nan()));
        assert!(lows.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn monotonic_series_has_no_interior_swing_high() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let candles = make_candles(&closes);
        let (highs, _) = swing_series(&candles, 5);
        // Rising forever: every interior candle is dominated by its right
        // neighbour.
        for v in &highs {
            assert!(v.is_nan());
        }
    }
}
