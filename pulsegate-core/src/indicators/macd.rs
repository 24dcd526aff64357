//! Moving average convergence/divergence triple.
//!
//! line = EMA(fast) - EMA(slow)
//! signal = EMA(signal_period) of the line
//! histogram = line - signal
//!
//! The signal EMA seeds after the line's warmup prefix, so all three
//! series stay aligned to the input length.

use super::ema::{ema_after_warmup, ema_series};

pub fn macd_series(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let n = closes.len();
    let ema_fast = ema_series(closes, fast);
    let ema_slow = ema_series(closes, slow);

    let mut line = vec![f64::NAN; n];
    for i in 0..n {
        if !ema_fast[i].is_nan() && !ema_slow[i].is_nan() {
            line[i] = ema_fast[i] - ema_slow[i];
        }
    }

    let signal = ema_after_warmup(&line, signal_period);

    let mut hist = vec![f64::NAN; n];
    for i in 0..n {
        if !line[i].is_nan() && !signal[i].is_nan() {
            hist[i] = line[i] - signal[i];
        }
    }

    (line, signal, hist)
}
