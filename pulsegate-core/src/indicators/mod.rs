//! The indicator engine — a fixed battery computed over a candle series.
//!
//! Pure computation: same input, bit-identical output, no state between
//! calls. Every per-candle series in the output is exactly as long as the
//! input, with `f64::NAN` during warmup. The battery is undefined below
//! `MIN_CANDLES`.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod pivots;
pub mod psar;
pub mod rsi;
pub mod swings;
pub mod vwap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Candle;

pub use pivots::PivotLevels;

/// Fewest candles the battery is defined for.
pub const MIN_CANDLES: usize = 50;

/// EMA periods for the trend pair.
pub const EMA_FAST_PERIOD: usize = 9;
pub const EMA_SLOW_PERIOD: usize = 21;
/// RSI period.
pub const RSI_PERIOD: usize = 14;
/// MACD fast/slow/signal periods.
pub const MACD_PERIODS: (usize, usize, usize) = (12, 26, 9);
/// Bollinger period and multiplier.
pub const BAND_PERIOD: usize = 20;
pub const BAND_STDDEV: f64 = 2.0;
/// ATR period.
pub const ATR_PERIOD: usize = 14;
/// Swing pivot lookback, candles on each side.
pub const SWING_WINDOW: usize = 5;

/// Typed "not ready" outcome from the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    #[error("insufficient data: have {have} candles, need {need}")]
    InsufficientData { have: usize, need: usize },
}

/// A single indicator series with both full-series and latest-value reads.
///
/// Replaces the scalar-or-array ambiguity of loosely typed indicator maps:
/// every consumer states which view it wants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries(Vec<f64>);

impl TimeSeries {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The raw last element — NaN while the indicator is still warming up.
    pub fn latest(&self) -> f64 {
        self.0.last().copied().unwrap_or(f64::NAN)
    }

    /// The last non-NaN element, scanning backwards.
    pub fn latest_valid(&self) -> Option<f64> {
        self.0.iter().rev().copied().find(|v| !v.is_nan())
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }
}

impl From<Vec<f64>> for TimeSeries {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// The full battery for one (instrument, horizon) series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    /// Input series length the battery was computed over.
    pub candle_count: usize,
    /// Cumulative volume-weighted average price over the whole series.
    pub vwap: TimeSeries,
    pub ema_fast: TimeSeries,
    pub ema_slow: TimeSeries,
    pub rsi: TimeSeries,
    pub macd_line: TimeSeries,
    pub macd_signal: TimeSeries,
    pub macd_hist: TimeSeries,
    pub band_upper: TimeSeries,
    pub band_middle: TimeSeries,
    pub band_lower: TimeSeries,
    pub band_width: TimeSeries,
    pub atr: TimeSeries,
    /// Parabolic reversal trailing-stop series.
    pub trail_stop: TimeSeries,
    /// Sparse series: swing level at confirmed pivot candles, NaN elsewhere.
    pub swing_high: TimeSeries,
    pub swing_low: TimeSeries,
    /// Pivot-range ladder from the previous period's high/low/close.
    pub pivots: PivotLevels,
}

impl IndicatorSet {
    /// Compute the battery. Fails with `InsufficientData` below
    /// [`MIN_CANDLES`].
    pub fn compute(candles: &[Candle]) -> Result<IndicatorSet, IndicatorError> {
        if candles.len() < MIN_CANDLES {
            return Err(IndicatorError::InsufficientData {
                have: candles.len(),
                need: MIN_CANDLES,
            });
        }

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

        let (macd_line, macd_signal, macd_hist) = macd::macd_series(
            &closes,
            MACD_PERIODS.0,
            MACD_PERIODS.1,
            MACD_PERIODS.2,
        );
        let bands = bollinger::band_series(&closes, BAND_PERIOD, BAND_STDDEV);
        let (swing_high, swing_low) = swings::swing_series(candles, SWING_WINDOW);

        Ok(IndicatorSet {
            candle_count: candles.len(),
            vwap: vwap::cumulative_vwap(candles).into(),
            ema_fast: ema::ema_series(&closes, EMA_FAST_PERIOD).into(),
            ema_slow: ema::ema_series(&closes, EMA_SLOW_PERIOD).into(),
            rsi: rsi::rsi_series(&closes, RSI_PERIOD).into(),
            macd_line: macd_line.into(),
            macd_signal: macd_signal.into(),
            macd_hist: macd_hist.into(),
            band_upper: bands.upper.into(),
            band_middle: bands.middle.into(),
            band_lower: bands.lower.into(),
            band_width: bands.width.into(),
            atr: atr::atr_series(candles, ATR_PERIOD).into(),
            trail_stop: psar::trailing_stop_series(candles, 0.02, 0.02, 0.20).into(),
            swing_high: swing_high.into(),
            swing_low: swing_low.into(),
            pivots: pivots::compute_pivots(candles),
        })
    }

    /// Latest-value snapshot for the market-data update stream.
    pub fn snapshot(&self) -> IndicatorSnapshot {
        IndicatorSnapshot {
            vwap: self.vwap.latest(),
            ema_fast: self.ema_fast.latest(),
            ema_slow: self.ema_slow.latest(),
            rsi: self.rsi.latest(),
            macd_line: self.macd_line.latest(),
            macd_signal: self.macd_signal.latest(),
            macd_hist: self.macd_hist.latest(),
            band_upper: self.band_upper.latest(),
            band_middle: self.band_middle.latest(),
            band_lower: self.band_lower.latest(),
            atr: self.atr.latest(),
            trail_stop: self.trail_stop.latest(),
            pivot: self.pivots.pivot,
            support1: self.pivots.s1,
            resistance1: self.pivots.r1,
        }
    }
}

/// Flat latest-value view pushed on every short tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub vwap: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub rsi: f64,
    pub macd_line: f64,
    pub macd_signal: f64,
    pub macd_hist: f64,
    pub band_upper: f64,
    pub band_middle: f64,
    pub band_lower: f64,
    pub atr: f64,
    pub trail_stop: f64,
    pub pivot: f64,
    pub support1: f64,
    pub resistance1: f64,
}

/// Create candles from close prices for testing.
///
/// One-minute spacing, open = previous close, high/low bracket the body,
/// constant volume.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<Candle> {
    use chrono::{Duration, NaiveDate};
    let base = NaiveDate::from_ymd_opt(2024, 6, 3)
        .unwrap()
        .and_hms_opt(9, 15, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle {
                timestamp: base + Duration::minutes(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: (open.min(close) - 1.0).max(0.0),
                close,
                volume: 1_000,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_below_minimum() {
        let candles = make_candles(&vec![100.0; MIN_CANDLES - 1]);
        let err = IndicatorSet::compute(&candles).unwrap_err();
        assert_eq!(
            err,
            IndicatorError::InsufficientData {
                have: MIN_CANDLES - 1,
                need: MIN_CANDLES
            }
        );
    }

    #[test]
    fn all_series_match_input_length() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + (i as f64 * 0.7).sin()).collect();
        let candles = make_candles(&closes);
        let set = IndicatorSet::compute(&candles).unwrap();

        for series in [
            &set.vwap,
            &set.ema_fast,
            &set.ema_slow,
            &set.rsi,
            &set.macd_line,
            &set.macd_signal,
            &set.macd_hist,
            &set.band_upper,
            &set.band_middle,
            &set.band_lower,
            &set.band_width,
            &set.atr,
            &set.trail_stop,
            &set.swing_high,
            &set.swing_low,
        ] {
            assert_eq!(series.len(), candles.len());
        }
        assert_eq!(set.candle_count, candles.len());
    }

    #[test]
    fn compute_is_idempotent() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).cos() * 4.0).collect();
        let candles = make_candles(&closes);
        let a = IndicatorSet::compute(&candles).unwrap();
        let b = IndicatorSet::compute(&candles).unwrap();
        // Bit-identical output: NaN positions and values must agree exactly.
        assert_eq!(format!("{a:?}"), format!("{b:?}"));
    }

    #[test]
    fn latest_equals_last_element() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 0.2).collect();
        let candles = make_candles(&closes);
        let set = IndicatorSet::compute(&candles).unwrap();
        let snap = set.snapshot();
        assert_eq!(snap.vwap, *set.vwap.values().last().unwrap());
        assert_eq!(snap.rsi, *set.rsi.values().last().unwrap());
        assert_eq!(snap.atr, *set.atr.values().last().unwrap());
    }

    #[test]
    fn time_series_latest_valid_skips_trailing_nan() {
        let series = TimeSeries::new(vec![1.0, 2.0, f64::NAN]);
        assert!(series.latest().is_nan());
        assert_eq!(series.latest_valid(), Some(2.0));
    }
}
