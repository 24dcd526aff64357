//! Volume-weighted average price.
//!
//! Running cumulative over the whole series (not windowed):
//! vwap[t] = Σ(typical_price·volume) / Σ(volume) for candles 0..=t.

use crate::domain::Candle;

pub fn cumulative_vwap(candles: &[Candle]) -> Vec<f64> {
    let mut result = vec![f64::NAN; candles.len()];
    let mut cum_pv = 0.0;
    let mut cum_vol = 0.0;

    for (i, candle) in candles.iter().enumerate() {
        let tp = candle.typical_price();
        if tp.is_nan() {
            // A void candle taints everything after it — the cumulative
            // sums are no longer meaningful.
            break;
        }
        cum_pv += tp * candle.volume as f64;
        cum_vol += candle.volume as f64;
        result[i] = if cum_vol > 0.0 { cum_pv / cum_vol } else { f64::NAN };
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles, DEFAULT_EPSILON};

    #[test]
    fn constant_series_vwap_is_typical_price() {
        let candles = make_candles(&[100.0, 100.0, 100.0]);
        let result = cumulative_vwap(&candles);
        // make_candles brackets high/low at ±1, so tp = (101 + 99 + 100)/3 = 100
        for v in &result {
            assert_approx(*v, 100.0, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn vwap_weights_by_volume() {
        let mut candles = make_candles(&[100.0, 200.0]);
        candles[0].volume = 3_000;
        candles[1].volume = 1_000;
        let result = cumulative_vwap(&candles);

        let tp0 = candles[0].typical_price();
        let tp1 = candles[1].typical_price();
        let expected = (tp0 * 3_000.0 + tp1 * 1_000.0) / 4_000.0;
        assert_approx(result[1], expected, DEFAULT_EPSILON);
    }

    #[test]
    fn vwap_is_cumulative_not_windowed() {
        let closes: Vec<f64> = (0..100).map(|i| 100.0 + i as f64).collect();
        let candles = make_candles(&closes);
        let result = cumulative_vwap(&candles);
        // The first candle still influences the last value.
        let full: f64 = result[99];
        let tail_only = cumulative_vwap(&candles[50..]);
        assert!((full - tail_only[49]).abs() > 1.0);
    }

    #[test]
    fn zero_volume_prefix_is_nan() {
        let mut candles = make_candles(&[100.0, 101.0]);
        candles[0].volume = 0;
        let result = cumulative_vwap(&candles);
        assert!(result[0].is_nan());
        assert!(!result[1].is_nan());
    }

    #[test]
    fn void_candle_stops_accumulation() {
        let mut candles = make_candles(&[100.0, 101.0, 102.0]);
        candles[1].close = f64::NAN;
        let result = cumulative_vwap(&candles);
        assert!(!result[0].is_nan());
        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
    }
}
