//! Serializable engine configuration.
//!
//! Everything the engine needs to run: the tracked universe, cadences,
//! generator and gate tunables, feed TTLs. Loadable from TOML; validated
//! fail-fast at startup — a bad config is a defect, not a runtime
//! condition to limp through.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use pulsegate_core::domain::{Horizon, InstrumentBook};
use pulsegate_core::gates::GateLimits;
use pulsegate_core::signals::GeneratorSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no instruments configured")]
    EmptyInstruments,

    #[error("unsupported instrument: {symbol}")]
    UnknownInstrument { symbol: String },

    #[error("no horizons configured")]
    EmptyHorizons,

    #[error("invalid cadence: {0}")]
    InvalidCadence(String),

    #[error("invalid limit: {0}")]
    InvalidLimit(String),

    #[error("config file unreadable: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Symbols to track; each must exist in the instrument registry.
    pub instruments: Vec<String>,
    pub horizons: Vec<Horizon>,
    /// Deployable capital the risk percentages are measured against.
    pub capital: f64,

    /// Short cadence: feed refresh + indicator snapshot.
    pub fast_tick_secs: u64,
    /// Long cadence: candidate generation + validation sweep.
    pub slow_tick_secs: u64,

    /// Candles requested per series fetch.
    pub series_bars: usize,
    pub series_ttl_secs: u64,
    pub quote_ttl_secs: u64,
    pub synthetic_seed: u64,
    /// Live vendor endpoint; synthetic-only when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_base_url: Option<String>,
    pub vendor_timeout_secs: u64,

    /// Initial sizing cap before the risk gate has its say.
    pub max_lots: u32,

    pub registry: InstrumentBook,
    pub generator: GeneratorSettings,
    pub limits: GateLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            instruments: vec!["NIFTY".into(), "BANKNIFTY".into()],
            horizons: vec![Horizon::M1, Horizon::M5, Horizon::M15],
            capital: 1_000_000.0,
            fast_tick_secs: 1,
            slow_tick_secs: 60,
            series_bars: 120,
            series_ttl_secs: 180,
            quote_ttl_secs: 2,
            synthetic_seed: 2024,
            vendor_base_url: None,
            vendor_timeout_secs: 5,
            max_lots: 10,
            registry: InstrumentBook::with_defaults(),
            generator: GeneratorSettings::default(),
            limits: GateLimits::default(),
        }
    }
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instruments.is_empty() {
            return Err(ConfigError::EmptyInstruments);
        }
        for symbol in &self.instruments {
            if !self.registry.contains(symbol) {
                return Err(ConfigError::UnknownInstrument {
                    symbol: symbol.clone(),
                });
            }
        }
        if self.horizons.is_empty() {
            return Err(ConfigError::EmptyHorizons);
        }
        if self.fast_tick_secs == 0 || self.slow_tick_secs == 0 {
            return Err(ConfigError::InvalidCadence("tick periods must be positive".into()));
        }
        if self.fast_tick_secs >= self.slow_tick_secs {
            return Err(ConfigError::InvalidCadence(format!(
                "fast tick {}s must be shorter than slow tick {}s",
                self.fast_tick_secs, self.slow_tick_secs
            )));
        }
        if self.series_ttl_secs == 0 || self.quote_ttl_secs == 0 {
            return Err(ConfigError::InvalidCadence("cache TTLs must be positive".into()));
        }
        if self.capital <= 0.0 {
            return Err(ConfigError::InvalidLimit("capital must be positive".into()));
        }
        if self.series_bars < pulsegate_core::indicators::MIN_CANDLES {
            return Err(ConfigError::InvalidLimit(format!(
                "series_bars {} below the {}-candle indicator minimum",
                self.series_bars,
                pulsegate_core::indicators::MIN_CANDLES
            )));
        }
        if self.max_lots == 0 {
            return Err(ConfigError::InvalidLimit("max_lots must be at least 1".into()));
        }
        for (horizon, bounds) in &self.limits.bounds_overrides {
            if bounds.stop_atr.0 >= bounds.stop_atr.1 || bounds.target_atr.0 >= bounds.target_atr.1
            {
                return Err(ConfigError::InvalidLimit(format!(
                    "inverted ATR bounds for {horizon}"
                )));
            }
        }
        let (delta_min, delta_max) = self.limits.delta_band;
        if delta_min >= delta_max {
            return Err(ConfigError::InvalidLimit("inverted delta band".into()));
        }
        Ok(())
    }

    /// Content fingerprint: identical configs hash identically, so runs
    /// can be tied back to the exact tunables that produced them.
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn unknown_instrument_rejected() {
        let mut config = EngineConfig::default();
        config.instruments.push("SPX".into());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownInstrument { .. })
        ));
    }

    #[test]
    fn empty_universe_rejected() {
        let mut config = EngineConfig::default();
        config.instruments.clear();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyInstruments)));

        let mut config = EngineConfig::default();
        config.horizons.clear();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyHorizons)));
    }

    #[test]
    fn inverted_cadence_rejected() {
        let mut config = EngineConfig::default();
        config.fast_tick_secs = 120;
        config.slow_tick_secs = 60;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidCadence(_))));
    }

    #[test]
    fn short_series_rejected() {
        let mut config = EngineConfig::default();
        config.series_bars = 30;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLimit(_))));
    }

    #[test]
    fn toml_roundtrip_preserves_config() {
        let config = EngineConfig::default();
        let raw = toml::to_string(&config).unwrap();
        let parsed = EngineConfig::from_toml(&raw).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let parsed = EngineConfig::from_toml("instruments = [\"NIFTY\"]\n").unwrap();
        assert_eq!(parsed.instruments, vec!["NIFTY".to_string()]);
        assert_eq!(parsed.slow_tick_secs, 60);
        assert_eq!(parsed.capital, 1_000_000.0);
    }

    #[test]
    fn fingerprint_is_stable_and_sensitive() {
        let a = EngineConfig::default();
        let b = EngineConfig::default();
        assert_eq!(a.fingerprint(), b.fingerprint());

        let mut c = EngineConfig::default();
        c.capital = 500_000.0;
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}
