//! Feed adapter facade.
//!
//! Sources candle series and quote snapshots per instrument, preferring
//! the live vendor and falling back to the synthetic walk — per call, and
//! invisibly to the caller. The only errors that escape are configuration
//! defects (unknown instrument). Owns the TTL cache exclusively.

use std::sync::Mutex;
use std::time::Duration;

use chrono::NaiveDateTime;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::data::cache::FeedCache;
use crate::data::source::{FeedError, FeedMode, MarketSource, SourceError};
use crate::data::synthetic::SyntheticSource;
use crate::domain::{Candle, InstrumentBook, Quote, SessionHours};
use crate::domain::Horizon;

/// Operational status for the REST/status surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedStatus {
    pub mode: FeedMode,
    pub last_update: Option<NaiveDateTime>,
    pub cache_size: usize,
}

/// Tunables for the adapter; defaults match the feed contract.
#[derive(Debug, Clone, Copy)]
pub struct FeedSettings {
    pub series_ttl: Duration,
    pub quote_ttl: Duration,
    pub synthetic_seed: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            series_ttl: Duration::from_secs(180),
            quote_ttl: Duration::from_secs(2),
            synthetic_seed: 2024,
        }
    }
}

pub struct FeedAdapter {
    book: InstrumentBook,
    cache: FeedCache,
    synthetic: SyntheticSource,
    live: Option<Box<dyn MarketSource>>,
    mode: Mutex<FeedMode>,
    last_update: Mutex<Option<NaiveDateTime>>,
}

impl FeedAdapter {
    /// Adapter with no live source: synthetic mode only.
    pub fn synthetic_only(book: InstrumentBook, session: SessionHours, settings: FeedSettings) -> Self {
        Self::build(book, session, settings, None, FeedMode::Synthetic)
    }

    /// Adapter with a live source, starting in live mode.
    pub fn with_live(
        book: InstrumentBook,
        session: SessionHours,
        settings: FeedSettings,
        live: Box<dyn MarketSource>,
    ) -> Self {
        Self::build(book, session, settings, Some(live), FeedMode::Live)
    }

    fn build(
        book: InstrumentBook,
        session: SessionHours,
        settings: FeedSettings,
        live: Option<Box<dyn MarketSource>>,
        mode: FeedMode,
    ) -> Self {
        Self {
            book,
            cache: FeedCache::new(settings.series_ttl, settings.quote_ttl),
            synthetic: SyntheticSource::new(session, settings.synthetic_seed),
            live,
            mode: Mutex::new(mode),
            last_update: Mutex::new(None),
        }
    }

    pub fn mode(&self) -> FeedMode {
        *self.mode.lock().unwrap()
    }

    /// Switch to live mode. Returns the mode actually in effect — without
    /// a live source the adapter stays synthetic.
    pub fn enable_live(&self) -> FeedMode {
        let mut mode = self.mode.lock().unwrap();
        if self.live.is_some() {
            *mode = FeedMode::Live;
        } else {
            warn!("enable_live requested but no live source is configured");
        }
        *mode
    }

    /// Switch to synthetic mode. In-flight live fetches complete and land
    /// in the cache tagged live, where the mode tag keeps them unread.
    pub fn disable_live(&self) {
        *self.mode.lock().unwrap() = FeedMode::Synthetic;
    }

    pub fn status(&self) -> FeedStatus {
        FeedStatus {
            mode: self.mode(),
            last_update: *self.last_update.lock().unwrap(),
            cache_size: self.cache.len(),
        }
    }

    /// Push-style live update: drop the instrument's cached entries now,
    /// TTL notwithstanding.
    pub fn apply_live_update(&self, symbol: &str, at: NaiveDateTime) -> Result<(), FeedError> {
        self.instrument(symbol)?;
        self.cache.invalidate(symbol);
        self.touch(at);
        debug!("live update for {symbol}: cache invalidated");
        Ok(())
    }

    /// Latest candle series, at least `min_bars` long. Never fails for
    /// data reasons — only for an unknown instrument.
    pub fn latest_series(
        &self,
        symbol: &str,
        horizon: Horizon,
        min_bars: usize,
        now: NaiveDateTime,
    ) -> Result<Vec<Candle>, FeedError> {
        let instrument = self.instrument(symbol)?.clone();
        let mode = self.mode();

        if let Some(cached) = self.cache.get_series(symbol, horizon, mode) {
            if cached.len() >= min_bars {
                return Ok(cached);
            }
        }

        if mode == FeedMode::Live {
            if let Some(live) = &self.live {
                match live.fetch_series(&instrument, horizon, min_bars, now) {
                    Ok(series) if series.len() >= min_bars => {
                        self.cache
                            .put_series(symbol, horizon, FeedMode::Live, series.clone());
                        self.touch(now);
                        return Ok(series);
                    }
                    Ok(series) => {
                        let err = SourceError::ShortSeries {
                            have: series.len(),
                            need: min_bars,
                        };
                        warn!("{symbol}/{horizon}: {err}; falling back to synthetic");
                    }
                    Err(err) => {
                        warn!("{symbol}/{horizon}: live fetch failed ({err}); falling back to synthetic");
                    }
                }
            }
        }

        let series = self.synthetic.series(&instrument, horizon, min_bars, now);
        // Tagged synthetic: a live-mode retry next call goes to the vendor
        // again instead of reading this fallback from cache.
        self.cache
            .put_series(symbol, horizon, FeedMode::Synthetic, series.clone());
        self.touch(now);
        Ok(series)
    }

    /// Latest quote snapshot. Same fallback contract as `latest_series`.
    pub fn snapshot(&self, symbol: &str, now: NaiveDateTime) -> Result<Quote, FeedError> {
        let instrument = self.instrument(symbol)?.clone();
        let mode = self.mode();

        if let Some(cached) = self.cache.get_quote(symbol, mode) {
            return Ok(cached);
        }

        if mode == FeedMode::Live {
            if let Some(live) = &self.live {
                match live.fetch_quote(&instrument, now) {
                    Ok(quote) => {
                        self.cache.put_quote(symbol, FeedMode::Live, quote.clone());
                        self.touch(now);
                        return Ok(quote);
                    }
                    Err(err) => {
                        warn!("{symbol}: live quote failed ({err}); falling back to synthetic");
                    }
                }
            }
        }

        let quote = self.synthetic.quote(&instrument, now);
        self.cache
            .put_quote(symbol, FeedMode::Synthetic, quote.clone());
        self.touch(now);
        Ok(quote)
    }

    fn instrument(&self, symbol: &str) -> Result<&crate::domain::Instrument, FeedError> {
        self.book.get(symbol).ok_or_else(|| FeedError::UnknownInstrument {
            symbol: symbol.to_string(),
        })
    }

    fn touch(&self, at: NaiveDateTime) {
        let mut last = self.last_update.lock().unwrap();
        *last = Some(match *last {
            Some(prev) => prev.max(at),
            None => at,
        });
    }
}
