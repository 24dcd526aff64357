//! Candle — the fundamental market data unit.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// OHLCV candle for a single instrument over one horizon bucket.
///
/// Timestamps are exchange-local. A series is always ordered by strictly
/// increasing timestamp with no duplicates; `series_is_ordered` checks that
/// invariant at the boundaries where candles enter the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Candle {
    /// Typical price: mean of high, low, close. The VWAP numerator.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Returns true if any OHLC field is NaN or infinite.
    pub fn is_void(&self) -> bool {
        !self.open.is_finite()
            || !self.high.is_finite()
            || !self.low.is_finite()
            || !self.close.is_finite()
    }

    /// Basic OHLC sanity: high covers open/close, low under open/close,
    /// nothing negative.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.low >= 0.0
            && self.open > 0.0
            && self.close > 0.0
    }
}

/// Series invariant: strictly increasing timestamps, no duplicates.
pub fn series_is_ordered(candles: &[Candle]) -> bool {
    candles
        .windows(2)
        .all(|pair| pair[0].timestamp < pair[1].timestamp)
}
