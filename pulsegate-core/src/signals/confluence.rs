//! Confluence rules — independent indicator conditions combined by a
//! configurable strictness.
//!
//! Each rule is individually toggleable. A NaN input (indicator still
//! warming up) never fires a rule: missing evidence is not evidence.

use serde::{Deserialize, Serialize};

use crate::domain::{Candle, ConfluenceFlags};
use crate::indicators::IndicatorSet;

/// How many of the enabled rules must fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// No rule required — every evaluation synthesizes a candidate.
    Permissive,
    /// A majority of the enabled rules.
    #[default]
    Balanced,
    /// Every enabled rule.
    Strict,
}

/// Per-rule enable switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleToggles {
    pub trend: bool,
    pub momentum: bool,
    pub volatility: bool,
    pub structure: bool,
}

impl Default for RuleToggles {
    fn default() -> Self {
        Self {
            trend: true,
            momentum: true,
            volatility: true,
            structure: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfluenceSettings {
    pub strictness: Strictness,
    pub toggles: RuleToggles,
    /// Momentum oscillator neutral threshold.
    pub rsi_threshold: f64,
}

impl Default for ConfluenceSettings {
    fn default() -> Self {
        Self {
            strictness: Strictness::default(),
            toggles: RuleToggles::default(),
            rsi_threshold: 55.0,
        }
    }
}

/// Evaluate every rule against the latest candle.
pub fn evaluate(
    candle: &Candle,
    indicators: &IndicatorSet,
    settings: &ConfluenceSettings,
) -> ConfluenceFlags {
    let close = candle.close;

    let vwap = indicators.vwap.latest_valid();
    let ema_fast = indicators.ema_fast.latest_valid();
    let ema_slow = indicators.ema_slow.latest_valid();
    let rsi = indicators.rsi.latest_valid();
    let macd_hist = indicators.macd_hist.latest_valid();
    let band_upper = indicators.band_upper.latest_valid();
    let band_lower = indicators.band_lower.latest_valid();

    // Trend: price at/above the average price, or fast average leading.
    let above_vwap = vwap.map(|v| close >= v).unwrap_or(false);
    let ema_cross_up = match (ema_fast, ema_slow) {
        (Some(fast), Some(slow)) => fast > slow,
        _ => false,
    };
    let trend = above_vwap || ema_cross_up;

    // Momentum: oscillator above neutral, or non-negative histogram.
    let rsi_hot = rsi.map(|r| r > settings.rsi_threshold).unwrap_or(false);
    let hist_up = macd_hist.map(|h| h >= 0.0).unwrap_or(false);
    let momentum = rsi_hot || hist_up;

    // Volatility: price inside the band extremes (no chasing a blowout).
    let volatility = match (band_lower, band_upper) {
        (Some(lo), Some(hi)) => close >= lo && close <= hi,
        _ => false,
    };

    // Structure: not below the first pivot support.
    let s1 = indicators.pivots.s1;
    let structure = s1.is_finite() && close >= s1;

    // Pass-through hook for future stricter checks.
    let final_gate = true;

    // Bearish alignment, tracked for the contradiction check downstream.
    let below_vwap = vwap.map(|v| close < v).unwrap_or(false);
    let ema_cross_down = match (ema_fast, ema_slow) {
        (Some(fast), Some(slow)) => fast < slow,
        _ => false,
    };
    let hist_down = macd_hist.map(|h| h < 0.0).unwrap_or(false);
    let bearish = below_vwap && ema_cross_down && hist_down;

    ConfluenceFlags {
        trend,
        momentum,
        volatility,
        structure,
        final_gate,
        bearish,
    }
}

/// Trend read for a higher-horizon series: both the EMA pair and the
/// price-vs-VWAP position must agree, otherwise the read is neutral.
pub fn trend_bias(indicators: &IndicatorSet, close: f64) -> crate::domain::TrendBias {
    use crate::domain::TrendBias;

    let fast = indicators.ema_fast.latest_valid();
    let slow = indicators.ema_slow.latest_valid();
    let vwap = indicators.vwap.latest_valid();

    match (fast, slow, vwap) {
        (Some(fast), Some(slow), Some(vwap)) => {
            if fast > slow && close >= vwap {
                TrendBias::Bullish
            } else if fast < slow && close < vwap {
                TrendBias::Bearish
            } else {
                TrendBias::Neutral
            }
        }
        _ => TrendBias::Neutral,
    }
}

/// Whether the fired rules satisfy the configured strictness.
pub fn satisfied(flags: &ConfluenceFlags, settings: &ConfluenceSettings) -> bool {
    let toggles = &settings.toggles;
    let enabled_fired: Vec<bool> = [
        (toggles.trend, flags.trend),
        (toggles.momentum, flags.momentum),
        (toggles.volatility, flags.volatility),
        (toggles.structure, flags.structure),
    ]
    .iter()
    .filter(|(enabled, _)| *enabled)
    .map(|(_, fired)| *fired)
    .collect();

    let enabled = enabled_fired.len();
    let fired = enabled_fired.iter().filter(|&&f| f).count();

    match settings.strictness {
        Strictness::Permissive => true,
        Strictness::Balanced => enabled == 0 || fired * 2 > enabled,
        Strictness::Strict => fired == enabled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{make_candles, IndicatorSet};

    fn bullish_setup() -> (Vec<crate::domain::Candle>, IndicatorSet) {
        // A steady climb: close above VWAP, fast EMA above slow, RSI hot.
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 0.4).collect();
        let candles = make_candles(&closes);
        let set = IndicatorSet::compute(&candles).unwrap();
        (candles, set)
    }

    #[test]
    fn uptrend_fires_trend_and_momentum() {
        let (candles, set) = bullish_setup();
        let flags = evaluate(candles.last().unwrap(), &set, &ConfluenceSettings::default());
        assert!(flags.trend);
        assert!(flags.momentum);
        assert!(flags.final_gate);
        assert!(!flags.bearish);
    }

    #[test]
    fn downtrend_sets_bearish() {
        let closes: Vec<f64> = (0..60).map(|i| 130.0 - i as f64 * 0.4).collect();
        let candles = make_candles(&closes);
        let set = IndicatorSet::compute(&candles).unwrap();
        let flags = evaluate(candles.last().unwrap(), &set, &ConfluenceSettings::default());
        assert!(flags.bearish);
        assert!(!flags.trend);
    }

    #[test]
    fn strictness_permissive_accepts_nothing_fired() {
        let flags = ConfluenceFlags::default();
        let settings = ConfluenceSettings {
            strictness: Strictness::Permissive,
            ..Default::default()
        };
        assert!(satisfied(&flags, &settings));
    }

    #[test]
    fn strictness_strict_requires_all_enabled() {
        let mut flags = ConfluenceFlags {
            trend: true,
            momentum: true,
            volatility: true,
            structure: false,
            final_gate: true,
            bearish: false,
        };
        let settings = ConfluenceSettings {
            strictness: Strictness::Strict,
            ..Default::default()
        };
        assert!(!satisfied(&flags, &settings));
        flags.structure = true;
        assert!(satisfied(&flags, &settings));
    }

    #[test]
    fn strictness_balanced_needs_majority() {
        let settings = ConfluenceSettings::default();
        let two_of_four = ConfluenceFlags {
            trend: true,
            momentum: true,
            volatility: false,
            structure: false,
            final_gate: true,
            bearish: false,
        };
        assert!(!satisfied(&two_of_four, &settings));
        let three_of_four = ConfluenceFlags {
            volatility: true,
            ..two_of_four
        };
        assert!(satisfied(&three_of_four, &settings));
    }

    #[test]
    fn trend_bias_requires_agreement() {
        use crate::domain::TrendBias;

        let (candles, set) = bullish_setup();
        let close = candles.last().unwrap().close;
        assert_eq!(trend_bias(&set, close), TrendBias::Bullish);
        // Same indicators, but price dumped under the VWAP: neutral.
        assert_eq!(trend_bias(&set, close * 0.8), TrendBias::Neutral);

        let closes: Vec<f64> = (0..60).map(|i| 130.0 - i as f64 * 0.4).collect();
        let down_candles = make_candles(&closes);
        let down_set = IndicatorSet::compute(&down_candles).unwrap();
        let down_close = down_candles.last().unwrap().close;
        assert_eq!(trend_bias(&down_set, down_close), TrendBias::Bearish);
    }

    #[test]
    fn disabled_rules_drop_out_of_the_count() {
        let settings = ConfluenceSettings {
            strictness: Strictness::Strict,
            toggles: RuleToggles {
                structure: false,
                ..Default::default()
            },
            ..Default::default()
        };
        let flags = ConfluenceFlags {
            trend: true,
            momentum: true,
            volatility: true,
            structure: false,
            final_gate: true,
            bearish: false,
        };
        // Structure is off, so its miss cannot block strict mode.
        assert!(satisfied(&flags, &settings));
    }
}
