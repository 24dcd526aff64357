//! Synthetic market source — a seeded, bounded random walk.
//!
//! Stands in for the live vendor whenever it is unavailable. Each
//! instrument carries a persistent last price across calls, so
//! consecutive series and snapshots are coherent: every step stays inside
//! a per-candle volatility envelope derived from the instrument's daily
//! volatility, and generated OHLC is always internally consistent.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::source::{MarketSource, SourceError};
use crate::domain::{Candle, Horizon, Instrument, Quote, SessionHours};

/// Seconds in one trading session; scales daily volatility down to
/// per-candle steps.
const SESSION_SECONDS: f64 = 22_500.0;

/// Base per-candle volume before randomization.
const BASE_VOLUME: f64 = 250_000.0;

#[derive(Debug, Clone)]
struct DayTrack {
    date: NaiveDate,
    prev_close: f64,
    open: f64,
    high: f64,
    low: f64,
    volume: u64,
}

#[derive(Debug, Clone)]
struct SymbolState {
    last_price: f64,
    day: DayTrack,
}

#[derive(Debug)]
struct WalkState {
    rng: StdRng,
    symbols: HashMap<String, SymbolState>,
}

/// The synthetic source. All interior state behind one Mutex.
#[derive(Debug)]
pub struct SyntheticSource {
    session: SessionHours,
    state: Mutex<WalkState>,
}

impl SyntheticSource {
    pub fn new(session: SessionHours, seed: u64) -> Self {
        Self {
            session,
            state: Mutex::new(WalkState {
                rng: StdRng::seed_from_u64(seed),
                symbols: HashMap::new(),
            }),
        }
    }

    /// Per-candle fraction of the daily volatility envelope.
    fn per_candle_vol(instrument: &Instrument, candle_seconds: u64) -> f64 {
        instrument.daily_volatility * (candle_seconds as f64 / SESSION_SECONDS).sqrt()
    }

    /// Start of the last completed bucket at or before `now`.
    fn last_completed_bucket(now: NaiveDateTime, candle_seconds: u64) -> NaiveDateTime {
        let secs_of_day = now.time().num_seconds_from_midnight() as i64;
        let aligned = secs_of_day - secs_of_day % candle_seconds as i64;
        let bucket_start = now.date().and_hms_opt(0, 0, 0).unwrap() + Duration::seconds(aligned);
        bucket_start - Duration::seconds(candle_seconds as i64)
    }

    fn roll_day(state: &mut SymbolState, date: NaiveDate) {
        if state.day.date != date {
            let close = state.last_price;
            state.day = DayTrack {
                date,
                prev_close: close,
                open: close,
                high: close,
                low: close,
                volume: 0,
            };
        }
    }

    fn symbol_state<'a>(
        symbols: &'a mut HashMap<String, SymbolState>,
        instrument: &Instrument,
        date: NaiveDate,
    ) -> &'a mut SymbolState {
        let entry = symbols
            .entry(instrument.symbol.clone())
            .or_insert_with(|| SymbolState {
                last_price: instrument.reference_price,
                day: DayTrack {
                    date,
                    prev_close: instrument.reference_price,
                    open: instrument.reference_price,
                    high: instrument.reference_price,
                    low: instrument.reference_price,
                    volume: 0,
                },
            });
        Self::roll_day(entry, date);
        entry
    }
}

impl SyntheticSource {
    /// Generate a series ending at the last completed bucket before `now`.
    /// Infallible: the synthetic walk is the fallback of last resort.
    pub fn series(
        &self,
        instrument: &Instrument,
        horizon: Horizon,
        bars: usize,
        now: NaiveDateTime,
    ) -> Vec<Candle> {
        let secs = horizon.candle_seconds();
        let vol = Self::per_candle_vol(instrument, secs);
        let end = Self::last_completed_bucket(now, secs);

        let mut state = self.state.lock().unwrap();
        let WalkState { rng, symbols } = &mut *state;
        let entry = Self::symbol_state(symbols, instrument, now.date());

        let mut price = entry.last_price;
        let mut candles = Vec::with_capacity(bars);

        for i in 0..bars {
            let timestamp = end - Duration::seconds(((bars - 1 - i) as u64 * secs) as i64);

            let open = price;
            let ret = rng.gen_range(-1.0..1.0) * vol;
            let close = (open * (1.0 + ret)).max(instrument.tick_size);
            let wick_up = rng.gen_range(0.0..0.5) * vol * open;
            let wick_down = rng.gen_range(0.0..0.5) * vol * open;
            let high = open.max(close) + wick_up;
            let low = (open.min(close) - wick_down).max(0.0);
            let volume = (BASE_VOLUME * rng.gen_range(0.6..1.6)) as u64;

            candles.push(Candle {
                timestamp,
                open,
                high,
                low,
                close,
                volume,
            });
            price = close;
        }

        if let Some(last) = candles.last() {
            entry.last_price = last.close;
            entry.day.high = entry.day.high.max(last.high);
            entry.day.low = entry.day.low.min(last.low);
            entry.day.volume = entry.day.volume.saturating_add(last.volume);
        }

        candles
    }

    /// Step the walk once and return a snapshot. Infallible.
    pub fn quote(&self, instrument: &Instrument, now: NaiveDateTime) -> Quote {
        // One bounded step per snapshot keeps consecutive quotes coherent.
        let vol = Self::per_candle_vol(instrument, 60) * 0.25;

        let mut state = self.state.lock().unwrap();
        let WalkState { rng, symbols } = &mut *state;
        let entry = Self::symbol_state(symbols, instrument, now.date());

        let ret = rng.gen_range(-1.0..1.0) * vol;
        let last_price = (entry.last_price * (1.0 + ret)).max(instrument.tick_size);
        entry.last_price = last_price;
        entry.day.high = entry.day.high.max(last_price);
        entry.day.low = entry.day.low.min(last_price);
        entry.day.volume = entry.day.volume.saturating_add((BASE_VOLUME * 0.02) as u64);

        Quote {
            symbol: instrument.symbol.clone(),
            last_price,
            prev_close: entry.day.prev_close,
            day_open: entry.day.open,
            day_high: entry.day.high,
            day_low: entry.day.low,
            volume: entry.day.volume,
            session_state: self.session.state_at(now),
            timestamp: now,
        }
    }
}

impl MarketSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch_series(
        &self,
        instrument: &Instrument,
        horizon: Horizon,
        bars: usize,
        now: NaiveDateTime,
    ) -> Result<Vec<Candle>, SourceError> {
        Ok(self.series(instrument, horizon, bars, now))
    }

    fn fetch_quote(
        &self,
        instrument: &Instrument,
        now: NaiveDateTime,
    ) -> Result<Quote, SourceError> {
        Ok(self.quote(instrument, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series_is_ordered;

    fn nifty() -> Instrument {
        Instrument::new("NIFTY", 0.05, 50, 50.0, 22_000.0, 0.009)
    }

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    #[test]
    fn series_is_sane_and_ordered() {
        let source = SyntheticSource::new(SessionHours::default(), 7);
        let candles = source
            .fetch_series(&nifty(), Horizon::M1, 60, at(11, 0))
            .unwrap();
        assert_eq!(candles.len(), 60);
        assert!(series_is_ordered(&candles));
        for c in &candles {
            assert!(c.is_sane(), "insane candle: {c:?}");
        }
    }

    #[test]
    fn deterministic_under_fixed_seed() {
        let a = SyntheticSource::new(SessionHours::default(), 42)
            .fetch_series(&nifty(), Horizon::M5, 50, at(11, 0))
            .unwrap();
        let b = SyntheticSource::new(SessionHours::default(), 42)
            .fetch_series(&nifty(), Horizon::M5, 50, at(11, 0))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn last_price_persists_between_calls() {
        let source = SyntheticSource::new(SessionHours::default(), 7);
        let series = source
            .fetch_series(&nifty(), Horizon::M1, 50, at(11, 0))
            .unwrap();
        let quote = source.fetch_quote(&nifty(), at(11, 0)).unwrap();
        let last_close = series.last().unwrap().close;
        // One bounded quote step away from the series' final close.
        let envelope = last_close * 0.01;
        assert!(
            (quote.last_price - last_close).abs() < envelope,
            "quote {} discontinuous from close {last_close}",
            quote.last_price
        );
    }

    #[test]
    fn consecutive_quotes_stay_in_envelope() {
        let source = SyntheticSource::new(SessionHours::default(), 11);
        let inst = nifty();
        let mut prev = source.fetch_quote(&inst, at(10, 0)).unwrap().last_price;
        for minute in 1..30 {
            let quote = source.fetch_quote(&inst, at(10, minute)).unwrap();
            let step = (quote.last_price - prev).abs() / prev;
            assert!(step < 0.002, "step {step} outside envelope");
            prev = quote.last_price;
        }
    }

    #[test]
    fn day_rollover_resets_aggregates() {
        let source = SyntheticSource::new(SessionHours::default(), 5);
        let inst = nifty();
        let q1 = source.fetch_quote(&inst, at(11, 0)).unwrap();
        let next_day = at(11, 0) + Duration::days(1);
        let q2 = source.fetch_quote(&inst, next_day).unwrap();
        // New day opens where the previous day left off.
        assert_eq!(q2.prev_close, q1.last_price);
        assert!(q2.volume < q1.volume + 10_000);
    }

    #[test]
    fn bucket_alignment_ends_before_now() {
        let source = SyntheticSource::new(SessionHours::default(), 7);
        let candles = source
            .fetch_series(&nifty(), Horizon::M5, 10, at(11, 2))
            .unwrap();
        let last = candles.last().unwrap().timestamp;
        // 11:02 → current bucket starts 11:00, last completed starts 10:55.
        assert_eq!(last, at(10, 55));
    }
}
