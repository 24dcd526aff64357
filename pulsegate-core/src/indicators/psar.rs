//! Trailing-stop series — Wilder's reversal/extreme-point/acceleration
//! state machine.
//!
//! Inherently sequential: carries trend direction, extreme point (EP) and
//! acceleration factor (AF) forward across candles, flipping when price
//! breaches the current level. Defaults: step 0.02, cap 0.20.

use crate::domain::Candle;

pub fn trailing_stop_series(
    candles: &[Candle],
    af_start: f64,
    af_step: f64,
    af_max: f64,
) -> Vec<f64> {
    let n = candles.len();
    let mut result = vec![f64::NAN; n];

    if n < 2 {
        return result;
    }

    if candles[0].high.is_nan()
        || candles[0].low.is_nan()
        || candles[1].high.is_nan()
        || candles[1].low.is_nan()
    {
        return result;
    }

    // Initial direction from the first two closes.
    let mut is_long = candles[1].close >= candles[0].close;
    let mut af = af_start;
    let mut ep: f64;
    let mut sar: f64;

    if is_long {
        sar = candles[0].low;
        ep = candles[1].high;
    } else {
        sar = candles[0].high;
        ep = candles[1].low;
    }

    result[1] = sar;

    for i in 2..n {
        if candles[i].high.is_nan() || candles[i].low.is_nan() || candles[i].close.is_nan() {
            // Void candle: no level, no state update.
            result[i] = f64::NAN;
            continue;
        }

        let mut new_sar = sar + af * (ep - sar);

        if is_long {
            // In an uptrend the level must not rise above the two prior lows.
            let prev_low1 = candles[i - 1].low;
            let prev_low2 = candles[i - 2].low;
            if !prev_low1.is_nan() {
                new_sar = new_sar.min(prev_low1);
            }
            if !prev_low2.is_nan() {
                new_sar = new_sar.min(prev_low2);
            }

            if candles[i].low < new_sar {
                // Breach: flip short. Level becomes the old extreme point.
                is_long = false;
                new_sar = ep;
                ep = candles[i].low;
                af = af_start;
            } else if candles[i].high > ep {
                ep = candles[i].high;
                af = (af + af_step).min(af_max);
            }
        } else {
            let prev_high1 = candles[i - 1].high;
            let prev_high2 = candles[i - 2].high;
            if !prev_high1.is_nan() {
                new_sar = new_sar.max(prev_high1);
            }
            if !prev_high2.is_nan() {
                new_sar = new_sar.max(prev_high2);
            }

            if candles[i].high > new_sar {
                is_long = true;
                new_sar = ep;
                ep = candles[i].high;
                af = af_start;
            } else if candles[i].low < ep {
                ep = candles[i].low;
                af = (af + af_step).min(af_max);
            }
        }

        sar = new_sar;
        result[i] = sar;
    }

    result
}
