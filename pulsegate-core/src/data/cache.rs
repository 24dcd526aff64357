//! In-memory feed cache with per-kind TTLs and mode tags.
//!
//! Quotes expire in seconds, series in minutes. Every entry is tagged with
//! the mode that produced it; a lookup under a different mode misses, so a
//! runtime mode switch can never serve data produced by the other mode.
//! Push-style live updates invalidate an instrument's entries immediately,
//! TTL notwithstanding.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::data::source::FeedMode;
use crate::domain::{Candle, Horizon, Quote};

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    inserted_at: Instant,
    mode: FeedMode,
}

impl<T> Entry<T> {
    fn is_fresh(&self, ttl: Duration, mode: FeedMode) -> bool {
        self.mode == mode && self.inserted_at.elapsed() < ttl
    }
}

#[derive(Debug, Default)]
struct Store {
    series: HashMap<(String, Horizon), Entry<Vec<Candle>>>,
    quotes: HashMap<String, Entry<Quote>>,
}

/// The feed adapter's cache. Owned exclusively by the adapter.
#[derive(Debug)]
pub struct FeedCache {
    store: Mutex<Store>,
    series_ttl: Duration,
    quote_ttl: Duration,
}

impl FeedCache {
    pub fn new(series_ttl: Duration, quote_ttl: Duration) -> Self {
        Self {
            store: Mutex::new(Store::default()),
            series_ttl,
            quote_ttl,
        }
    }

    /// Defaults per the feed contract: 180 s for series, 2 s for quotes.
    pub fn with_defaults() -> Self {
        Self::new(Duration::from_secs(180), Duration::from_secs(2))
    }

    pub fn get_series(&self, symbol: &str, horizon: Horizon, mode: FeedMode) -> Option<Vec<Candle>> {
        let mut store = self.store.lock().unwrap();
        let key = (symbol.to_string(), horizon);
        match store.series.get(&key) {
            Some(entry) if entry.is_fresh(self.series_ttl, mode) => Some(entry.value.clone()),
            Some(_) => {
                // Lazy eviction of stale or cross-mode entries.
                store.series.remove(&key);
                None
            }
            None => None,
        }
    }

    pub fn put_series(&self, symbol: &str, horizon: Horizon, mode: FeedMode, series: Vec<Candle>) {
        let mut store = self.store.lock().unwrap();
        store.series.insert(
            (symbol.to_string(), horizon),
            Entry {
                value: series,
                inserted_at: Instant::now(),
                mode,
            },
        );
    }

    pub fn get_quote(&self, symbol: &str, mode: FeedMode) -> Option<Quote> {
        let mut store = self.store.lock().unwrap();
        match store.quotes.get(symbol) {
            Some(entry) if entry.is_fresh(self.quote_ttl, mode) => Some(entry.value.clone()),
            Some(_) => {
                store.quotes.remove(symbol);
                None
            }
            None => None,
        }
    }

    pub fn put_quote(&self, symbol: &str, mode: FeedMode, quote: Quote) {
        let mut store = self.store.lock().unwrap();
        store.quotes.insert(
            symbol.to_string(),
            Entry {
                value: quote,
                inserted_at: Instant::now(),
                mode,
            },
        );
    }

    /// Drop every entry for an instrument (push update arrived).
    pub fn invalidate(&self, symbol: &str) {
        let mut store = self.store.lock().unwrap();
        store.series.retain(|(s, _), _| s != symbol);
        store.quotes.remove(symbol);
    }

    pub fn clear(&self) {
        let mut store = self.store.lock().unwrap();
        store.series.clear();
        store.quotes.clear();
    }

    /// Total live entries (series + quotes), for status reporting.
    pub fn len(&self) -> usize {
        let store = self.store.lock().unwrap();
        store.series.len() + store.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
