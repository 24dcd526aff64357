//! Live vendor client.
//!
//! Fetches intraday OHLCV series and quote snapshots from the vendor's
//! chart API. Handles timeouts, retries with exponential backoff, rate
//! limiting, and the circuit breaker. Every failure here is a
//! `SourceError` — the feed adapter recovers by falling back to the
//! synthetic source, so nothing in this module is caller-visible.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;

use crate::data::circuit_breaker::CircuitBreaker;
use crate::data::source::{MarketSource, SourceError};
use crate::domain::{Candle, Horizon, Instrument, Quote, SessionState};

/// Chart endpoint response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    candles: Option<Vec<VendorCandle>>,
    error: Option<VendorFault>,
}

#[derive(Debug, Deserialize)]
struct VendorFault {
    code: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct VendorCandle {
    /// Epoch seconds, exchange-local.
    ts: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: Option<u64>,
}

/// Snapshot endpoint response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotResponse {
    last_price: f64,
    prev_close: f64,
    day_open: f64,
    day_high: f64,
    day_low: f64,
    volume: Option<u64>,
    session_state: String,
}

/// Blocking HTTP client for the vendor chart API.
pub struct LiveVendor {
    client: reqwest::blocking::Client,
    base_url: String,
    breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl LiveVendor {
    /// `timeout` is the per-request cap; the adapter's fallback guarantee
    /// depends on it, so it is not optional.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        breaker: Arc<CircuitBreaker>,
    ) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent("pulsegate/0.1")
            .build()
            .map_err(|e| SourceError::NetworkUnreachable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            breaker,
            max_retries: 2,
            base_delay: Duration::from_millis(250),
        })
    }

    fn chart_url(&self, symbol: &str, horizon: Horizon, bars: usize) -> String {
        format!(
            "{}/v2/chart/{symbol}?interval={}&bars={bars}",
            self.base_url,
            horizon.label()
        )
    }

    fn snapshot_url(&self, symbol: &str) -> String {
        format!("{}/v2/quote/{symbol}", self.base_url)
    }

    /// GET with retry/backoff under the circuit breaker. Retries only
    /// transient failures; malformed responses and vendor bans bail out.
    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        let mut attempt = 0;
        loop {
            if !self.breaker.allow_request() {
                return Err(SourceError::BreakerOpen);
            }

            match self.try_once(url) {
                Ok(body) => {
                    self.breaker.on_success();
                    return serde_json::from_str(&body)
                        .map_err(|e| SourceError::MalformedResponse(e.to_string()));
                }
                Err(err) => {
                    match &err {
                        SourceError::NetworkUnreachable(_)
                        | SourceError::Timeout
                        | SourceError::RateLimited { .. } => {
                            self.breaker.on_failure();
                            if attempt < self.max_retries {
                                std::thread::sleep(self.base_delay * 2u32.pow(attempt));
                                attempt += 1;
                                continue;
                            }
                        }
                        _ => {}
                    }
                    return Err(err);
                }
            }
        }
    }

    fn try_once(&self, url: &str) -> Result<String, SourceError> {
        let response = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout
            } else {
                SourceError::NetworkUnreachable(e.to_string())
            }
        })?;

        match response.status().as_u16() {
            200 => response
                .text()
                .map_err(|e| SourceError::NetworkUnreachable(e.to_string())),
            429 => {
                let retry_after_secs = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30);
                Err(SourceError::RateLimited { retry_after_secs })
            }
            403 => {
                // Vendor has blocked us; stop asking for a while.
                self.breaker.trip_now();
                Err(SourceError::NetworkUnreachable("403 forbidden".into()))
            }
            404 => Err(SourceError::MalformedResponse("404 not found".into())),
            status => Err(SourceError::NetworkUnreachable(format!(
                "unexpected status {status}"
            ))),
        }
    }
}

/// Convert a chart response into an ordered candle series.
fn parse_chart(symbol: &str, response: ChartResponse) -> Result<Vec<Candle>, SourceError> {
    let raw = response.candles.ok_or_else(|| {
        if let Some(fault) = response.error {
            if fault.code == "NOT_FOUND" {
                SourceError::SymbolNotFound {
                    symbol: symbol.to_string(),
                }
            } else {
                SourceError::MalformedResponse(format!("{}: {}", fault.code, fault.message))
            }
        } else {
            SourceError::MalformedResponse("empty result with no error".into())
        }
    })?;

    let mut candles = Vec::with_capacity(raw.len());
    for vc in raw {
        let timestamp = epoch_to_naive(vc.ts)
            .ok_or_else(|| SourceError::MalformedResponse(format!("bad timestamp {}", vc.ts)))?;
        let candle = Candle {
            timestamp,
            open: vc.open,
            high: vc.high,
            low: vc.low,
            close: vc.close,
            volume: vc.volume.unwrap_or(0),
        };
        // Holiday/no-trade buckets come through as zero rows; drop them.
        if !candle.is_sane() {
            continue;
        }
        candles.push(candle);
    }

    // The vendor occasionally repeats the forming bucket; keep the series
    // strictly ordered by dropping non-advancing rows.
    candles.dedup_by(|b, a| b.timestamp <= a.timestamp);

    Ok(candles)
}

fn parse_snapshot(
    instrument: &Instrument,
    now: NaiveDateTime,
    response: SnapshotResponse,
) -> Quote {
    Quote {
        symbol: instrument.symbol.clone(),
        last_price: response.last_price,
        prev_close: response.prev_close,
        day_open: response.day_open,
        day_high: response.day_high,
        day_low: response.day_low,
        volume: response.volume.unwrap_or(0),
        session_state: parse_session_state(&response.session_state),
        timestamp: now,
    }
}

fn parse_session_state(raw: &str) -> SessionState {
    match raw.to_ascii_lowercase().as_str() {
        "open" | "regular" => SessionState::Open,
        "pre_open" | "preopen" | "pre" => SessionState::PreOpen,
        _ => SessionState::Closed,
    }
}

fn epoch_to_naive(ts: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(ts, 0).map(|dt| dt.naive_utc())
}

impl MarketSource for LiveVendor {
    fn name(&self) -> &str {
        "vendor"
    }

    fn fetch_series(
        &self,
        instrument: &Instrument,
        horizon: Horizon,
        bars: usize,
        _now: NaiveDateTime,
    ) -> Result<Vec<Candle>, SourceError> {
        let url = self.chart_url(&instrument.symbol, horizon, bars);
        let response: ChartResponse = self.get_json(&url)?;
        parse_chart(&instrument.symbol, response)
    }

    fn fetch_quote(
        &self,
        instrument: &Instrument,
        now: NaiveDateTime,
    ) -> Result<Quote, SourceError> {
        let url = self.snapshot_url(&instrument.symbol);
        let response: SnapshotResponse = self.get_json(&url)?;
        Ok(parse_snapshot(instrument, now, response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn nifty() -> Instrument {
        Instrument::new("NIFTY", 0.05, 50, 50.0, 22_000.0, 0.009)
    }

    #[test]
    fn chart_url_carries_interval_and_bars() {
        let vendor = LiveVendor::new(
            "https://feed.example.com",
            Duration::from_secs(5),
            Arc::new(CircuitBreaker::default_vendor()),
        )
        .unwrap();
        let url = vendor.chart_url("NIFTY", Horizon::M5, 120);
        assert_eq!(
            url,
            "https://feed.example.com/v2/chart/NIFTY?interval=5m&bars=120"
        );
    }

    #[test]
    fn parse_chart_orders_and_filters() {
        let body = r#"{
            "candles": [
                {"ts": 1717405200, "open": 100.0, "high": 101.0, "low": 99.5, "close": 100.5, "volume": 1000},
                {"ts": 1717405260, "open": 100.5, "high": 100.4, "low": 99.0, "close": 100.0, "volume": 900},
                {"ts": 1717405320, "open": 100.5, "high": 102.0, "low": 100.0, "close": 101.5, "volume": 1200}
            ],
            "error": null
        }"#;
        let response: ChartResponse = serde_json::from_str(body).unwrap();
        let candles = parse_chart("NIFTY", response).unwrap();
        // Middle row is insane (high < open) and gets dropped.
        assert_eq!(candles.len(), 2);
        assert!(candles[0].timestamp < candles[1].timestamp);
    }

    #[test]
    fn parse_chart_unknown_symbol() {
        let body = r#"{"candles": null, "error": {"code": "NOT_FOUND", "message": "no such symbol"}}"#;
        let response: ChartResponse = serde_json::from_str(body).unwrap();
        let err = parse_chart("WAT", response).unwrap_err();
        assert!(matches!(err, SourceError::SymbolNotFound { .. }));
    }

    #[test]
    fn parse_snapshot_maps_session_state() {
        let body = r#"{
            "lastPrice": 22100.5, "prevClose": 22000.0,
            "dayOpen": 22020.0, "dayHigh": 22150.0, "dayLow": 21980.0,
            "volume": 123456, "sessionState": "OPEN"
        }"#;
        let response: SnapshotResponse = serde_json::from_str(body).unwrap();
        let now = NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let quote = parse_snapshot(&nifty(), now, response);
        assert_eq!(quote.session_state, SessionState::Open);
        assert_eq!(quote.last_price, 22_100.5);
        assert_eq!(quote.volume, 123_456);
    }

    #[test]
    fn session_state_defaults_to_closed() {
        assert_eq!(parse_session_state("halted"), SessionState::Closed);
        assert_eq!(parse_session_state("pre_open"), SessionState::PreOpen);
    }
}
