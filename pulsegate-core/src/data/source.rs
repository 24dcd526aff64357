//! Market source trait and the feed error taxonomy.
//!
//! Two layers of error: `SourceError` is internal to the feed adapter —
//! every variant is recoverable by falling back to the synthetic source
//! for that call. `FeedError` is what callers can actually see, and every
//! variant indicates a configuration defect, never a runtime condition.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Candle, Horizon, Instrument, Quote};

/// Which source the adapter is configured to prefer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedMode {
    Live,
    Synthetic,
}

/// Caller-visible feed failures. Configuration defects only — data
/// unavailability is handled inside the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    #[error("unsupported instrument: {symbol}")]
    UnknownInstrument { symbol: String },

    #[error("unsupported horizon: {0}")]
    UnsupportedHorizon(String),
}

/// Internal source failures, all recovered by synthetic fallback.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("request timed out")]
    Timeout,

    #[error("rate limited by vendor (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("malformed vendor response: {0}")]
    MalformedResponse(String),

    #[error("vendor does not know symbol {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("circuit breaker open")]
    BreakerOpen,

    #[error("series too short: got {have}, need {need}")]
    ShortSeries { have: usize, need: usize },
}

/// A source of candle series and quote snapshots.
///
/// `now` is the scheduler's clock; the synthetic source uses it to align
/// candle buckets, the live vendor only to derive session state.
pub trait MarketSource: Send + Sync {
    fn name(&self) -> &str;

    fn fetch_series(
        &self,
        instrument: &Instrument,
        horizon: Horizon,
        bars: usize,
        now: NaiveDateTime,
    ) -> Result<Vec<Candle>, SourceError>;

    fn fetch_quote(&self, instrument: &Instrument, now: NaiveDateTime)
        -> Result<Quote, SourceError>;
}
