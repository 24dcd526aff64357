//! The engine facade — feed, indicators, generator, pipeline and risk
//! state wired together behind the two operations the scheduler drives:
//! `market_tick` (short cadence) and `signal_sweep` (long cadence).

use std::time::Duration;

use chrono::NaiveDateTime;
use log::{info, warn};
use serde::Serialize;
use thiserror::Error;

use pulsegate_core::data::{
    CircuitBreaker, FeedAdapter, FeedError, FeedMode, FeedSettings, FeedStatus, LiveVendor,
};
use pulsegate_core::domain::{Candle, Direction, FinalSignal, Horizon};
use pulsegate_core::gates::{
    Decision, MarketSnapshot, PlanDraft, ValidationPipeline, ValidationResult,
};
use pulsegate_core::indicators::{IndicatorError, IndicatorSet, IndicatorSnapshot};
use pulsegate_core::options::{assess_liquidity, select_leg};
use pulsegate_core::risk::{RiskSnapshot, RiskTracker};
use pulsegate_core::signals::{confluence, CandidateGenerator};

use crate::config::{ConfigError, EngineConfig};

/// Pushed to the distribution layer on every short tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketDataUpdate {
    pub symbol: String,
    pub horizon: Horizon,
    pub candle: Candle,
    pub indicators: IndicatorSnapshot,
    pub is_live: bool,
    pub timestamp: NaiveDateTime,
}

/// One (instrument, horizon) result from a validation sweep.
#[derive(Debug)]
pub struct SweepOutcome {
    pub symbol: String,
    pub horizon: Horizon,
    pub result: ValidationResult,
}

/// Per-tick failures. Feed errors are configuration defects; `NotReady`
/// is the typed skip-this-cycle outcome.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error("indicators not ready: {0}")]
    NotReady(#[from] IndicatorError),
}

pub struct Engine {
    config: EngineConfig,
    feed: FeedAdapter,
    risk: RiskTracker,
    generator: CandidateGenerator,
    pipeline: ValidationPipeline,
}

impl Engine {
    /// Validate the config and wire the components. With a vendor URL the
    /// feed starts live behind a circuit breaker; otherwise synthetic.
    pub fn new(config: EngineConfig, today: chrono::NaiveDate) -> Result<Self, ConfigError> {
        config.validate()?;

        let settings = FeedSettings {
            series_ttl: Duration::from_secs(config.series_ttl_secs),
            quote_ttl: Duration::from_secs(config.quote_ttl_secs),
            synthetic_seed: config.synthetic_seed,
        };
        let session = config.limits.session;

        let feed = match &config.vendor_base_url {
            Some(base_url) => {
                let breaker = std::sync::Arc::new(CircuitBreaker::default_vendor());
                match LiveVendor::new(
                    base_url.clone(),
                    Duration::from_secs(config.vendor_timeout_secs),
                    breaker,
                ) {
                    Ok(vendor) => FeedAdapter::with_live(
                        config.registry.clone(),
                        session,
                        settings,
                        Box::new(vendor),
                    ),
                    Err(err) => {
                        warn!("live vendor unavailable ({err}); starting synthetic");
                        FeedAdapter::synthetic_only(config.registry.clone(), session, settings)
                    }
                }
            }
            None => FeedAdapter::synthetic_only(config.registry.clone(), session, settings),
        };

        info!(
            "engine up: {} instruments x {} horizons, config {}",
            config.instruments.len(),
            config.horizons.len(),
            &config.fingerprint()[..12]
        );

        Ok(Self {
            feed,
            risk: RiskTracker::new(today),
            generator: CandidateGenerator::new(config.generator.clone()),
            pipeline: ValidationPipeline::new(config.limits.clone()),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tracked_pairs(&self) -> Vec<(String, Horizon)> {
        self.config
            .instruments
            .iter()
            .flat_map(|s| self.config.horizons.iter().map(move |h| (s.clone(), *h)))
            .collect()
    }

    /// Short-cadence refresh for one pair: fetch the series, recompute
    /// the battery, emit the latest candle + indicator snapshot.
    pub fn market_tick(
        &self,
        symbol: &str,
        horizon: Horizon,
        now: NaiveDateTime,
    ) -> Result<MarketDataUpdate, EngineError> {
        let series = self
            .feed
            .latest_series(symbol, horizon, self.config.series_bars, now)?;
        let set = IndicatorSet::compute(&series)?;
        let candle = series.last().cloned().ok_or(IndicatorError::InsufficientData {
            have: 0,
            need: pulsegate_core::indicators::MIN_CANDLES,
        })?;

        Ok(MarketDataUpdate {
            symbol: symbol.to_string(),
            horizon,
            candle,
            indicators: set.snapshot(),
            is_live: self.feed.mode() == FeedMode::Live,
            timestamp: now,
        })
    }

    /// Long-cadence sweep: try to generate and validate one candidate per
    /// tracked pair. Pairs that are rate-limited, not ready, or without
    /// confluence simply produce nothing this cycle.
    pub fn signal_sweep(&self, now: NaiveDateTime) -> Vec<SweepOutcome> {
        let mut outcomes = Vec::new();

        for (symbol, horizon) in self.tracked_pairs() {
            match self.sweep_pair(&symbol, horizon, now) {
                Ok(Some(outcome)) => outcomes.push(outcome),
                Ok(None) => {}
                Err(EngineError::NotReady(err)) => {
                    warn!("{symbol}/{horizon}: {err}; skipping this cycle");
                }
                Err(EngineError::Feed(err)) => {
                    // Configuration defect: surfaced loudly, not swallowed.
                    warn!("{symbol}/{horizon}: {err}");
                }
            }
        }

        outcomes
    }

    fn sweep_pair(
        &self,
        symbol: &str,
        horizon: Horizon,
        now: NaiveDateTime,
    ) -> Result<Option<SweepOutcome>, EngineError> {
        let instrument = self
            .config
            .registry
            .get(symbol)
            .ok_or_else(|| FeedError::UnknownInstrument {
                symbol: symbol.to_string(),
            })?
            .clone();

        let series = self
            .feed
            .latest_series(symbol, horizon, self.config.series_bars, now)?;
        let set = IndicatorSet::compute(&series)?;

        let candidate =
            match self
                .generator
                .try_generate(&instrument, horizon, &series, &set, now, &self.risk)
            {
                Some(candidate) => candidate,
                None => return Ok(None),
            };

        let quote = self.feed.snapshot(symbol, now)?;
        let atr = set.atr.latest_valid().unwrap_or(f64::NAN);
        let vwap = set.vwap.latest_valid().unwrap_or(quote.last_price);

        // Trend read from the top tracked horizon.
        let bias_series = self
            .feed
            .latest_series(symbol, Horizon::M15, self.config.series_bars, now)?;
        let bias = match IndicatorSet::compute(&bias_series) {
            Ok(bias_set) => confluence::trend_bias(&bias_set, quote.last_price),
            Err(_) => pulsegate_core::domain::TrendBias::Neutral,
        };

        let market = MarketSnapshot {
            quote,
            atr,
            vwap,
            higher_horizon_bias: bias,
            now,
        };

        let leg = select_leg(
            &instrument,
            Direction::Long,
            market.quote.last_price,
            atr,
        );
        let liquidity = assess_liquidity(&instrument, leg.strike, market.quote.last_price);
        let plan = PlanDraft {
            lots: self.initial_lots(candidate.stop_distance(), &leg, instrument.lot_size),
            lot_size: instrument.lot_size,
            capital: self.config.capital,
            max_hold_minutes: horizon.max_hold_minutes(),
            leg,
            liquidity,
        };

        let risk_snapshot = self.risk.snapshot(now);
        let result = self
            .pipeline
            .validate(&candidate, &plan, &market, &risk_snapshot);

        if result.decision != Decision::Rejected {
            // An emitted signal is a working trade as far as the daily
            // caps are concerned.
            self.risk.note_trade_opened(now);
        }

        Ok(Some(SweepOutcome {
            symbol: symbol.to_string(),
            horizon,
            result,
        }))
    }

    /// Size the first draft to the per-trade risk budget; the risk gate
    /// still has the final word.
    fn initial_lots(
        &self,
        stop_distance: f64,
        leg: &pulsegate_core::domain::OptionLeg,
        lot_size: u32,
    ) -> u32 {
        let budget = self.config.capital * self.config.limits.max_risk_per_trade_pct / 100.0;
        let per_lot = stop_distance * leg.delta.abs() * lot_size as f64;
        if per_lot <= 0.0 {
            return 1;
        }
        ((budget / per_lot).floor() as u32).clamp(1, self.config.max_lots)
    }

    // ── Operational surface ─────────────────────────────────────────

    pub fn status(&self) -> FeedStatus {
        self.feed.status()
    }

    pub fn risk_metrics(&self, now: NaiveDateTime) -> RiskSnapshot {
        self.risk.snapshot(now)
    }

    pub fn enable_live(&self) -> FeedMode {
        self.feed.enable_live()
    }

    pub fn disable_live(&self) {
        self.feed.disable_live()
    }

    pub fn set_emergency_stop(&self, stopped: bool) {
        self.risk.set_emergency_stop(stopped);
    }

    pub fn apply_live_update(&self, symbol: &str, at: NaiveDateTime) -> Result<(), FeedError> {
        self.feed.apply_live_update(symbol, at)
    }

    pub fn record_trade_result(&self, at: NaiveDateTime, pnl_pct: f64) {
        self.risk.record_trade_result(at, pnl_pct);
    }
}

/// Accepted signals from a sweep, ready for distribution.
pub fn accepted_signals(outcomes: &[SweepOutcome]) -> Vec<&FinalSignal> {
    outcomes
        .iter()
        .filter_map(|o| o.result.final_signal.as_ref())
        .collect()
}
