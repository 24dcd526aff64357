//! Instrument metadata and the supported-instrument registry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::signal::Direction;

/// Static metadata for one tradable index instrument.
///
/// `reference_price` and `daily_volatility` seed the synthetic feed;
/// `strike_step` and `lot_size` drive option-leg selection and sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub tick_size: f64,
    pub lot_size: u32,
    pub strike_step: f64,
    pub reference_price: f64,
    /// Typical one-day move as a fraction (e.g. 0.01 = 1%).
    pub daily_volatility: f64,
}

impl Instrument {
    pub fn new(
        symbol: impl Into<String>,
        tick_size: f64,
        lot_size: u32,
        strike_step: f64,
        reference_price: f64,
        daily_volatility: f64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            tick_size,
            lot_size,
            strike_step,
            reference_price,
            daily_volatility,
        }
    }

    /// Nearest strike at or beyond `price` in the out-of-the-money
    /// direction for a scalp in `direction`.
    ///
    /// Long scalps buy calls, so the strike rounds up to the next step;
    /// short scalps buy puts and round down.
    pub fn otm_strike(&self, price: f64, direction: Direction) -> f64 {
        let steps = price / self.strike_step;
        match direction {
            Direction::Long => steps.ceil() * self.strike_step,
            Direction::Short => steps.floor() * self.strike_step,
        }
    }

    /// Round a price to the instrument's tick grid (nearest).
    pub fn round_to_tick(&self, price: f64) -> f64 {
        (price / self.tick_size).round() * self.tick_size
    }
}

/// Registry of supported instruments.
///
/// An unknown symbol is a configuration defect, not a runtime condition:
/// lookups at the feed/engine boundary fail fast with a typed error.
/// BTreeMap keeps iteration order stable for status output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstrumentBook {
    instruments: BTreeMap<String, Instrument>,
}

impl InstrumentBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the default index universe.
    pub fn with_defaults() -> Self {
        let mut book = Self::new();
        book.insert(Instrument::new("NIFTY", 0.05, 50, 50.0, 22_000.0, 0.009));
        book.insert(Instrument::new("BANKNIFTY", 0.05, 15, 100.0, 47_500.0, 0.012));
        book.insert(Instrument::new("FINNIFTY", 0.05, 40, 50.0, 20_500.0, 0.010));
        book
    }

    pub fn insert(&mut self, instrument: Instrument) {
        self.instruments
            .insert(instrument.symbol.clone(), instrument);
    }

    pub fn get(&self, symbol: &str) -> Option<&Instrument> {
        self.instruments.get(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.instruments.contains_key(symbol)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.instruments.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_book_has_universe() {
        let book = InstrumentBook::with_defaults();
        assert!(book.contains("NIFTY"));
        assert!(book.contains("BANKNIFTY"));
        assert!(book.contains("FINNIFTY"));
        assert!(!book.contains("SPX"));
    }

    #[test]
    fn otm_strike_rounds_by_direction() {
        let book = InstrumentBook::with_defaults();
        let nifty = book.get("NIFTY").unwrap();
        // Long → call strike rounds up to the next 50
        assert_eq!(nifty.otm_strike(22_013.0, Direction::Long), 22_050.0);
        // Short → put strike rounds down
        assert_eq!(nifty.otm_strike(22_013.0, Direction::Short), 22_000.0);
        // Already on a step stays put
        assert_eq!(nifty.otm_strike(22_050.0, Direction::Long), 22_050.0);
    }

    #[test]
    fn round_to_tick_nearest() {
        let inst = Instrument::new("NIFTY", 0.05, 50, 50.0, 22_000.0, 0.009);
        assert!((inst.round_to_tick(101.526) - 101.55).abs() < 1e-9);
        assert!((inst.round_to_tick(101.524) - 101.50).abs() < 1e-9);
    }

    #[test]
    fn symbols_iterate_sorted() {
        let book = InstrumentBook::with_defaults();
        let symbols: Vec<&str> = book.symbols().collect();
        assert_eq!(symbols, vec!["BANKNIFTY", "FINNIFTY", "NIFTY"]);
    }
}
