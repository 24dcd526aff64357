//! Strike selection and the modeled option leg.
//!
//! Scalps trade the nearest out-of-the-money strike in the scalp's
//! direction. Without a live chain the leg's premium, delta and theta are
//! modeled from the underlying price and the horizon ATR; the figures are
//! estimates used only to gate signal quality, never to price real
//! orders.

use crate::domain::{Direction, Instrument, OptionLeg, OptionSide};
use crate::options::liquidity::assess_liquidity;

/// Select the option leg for a scalp at the current underlying price.
///
/// A non-finite or non-positive ATR falls back to a 0.2% band of the
/// underlying so the model stays defined during warmup.
pub fn select_leg(
    instrument: &Instrument,
    direction: Direction,
    underlying: f64,
    atr: f64,
) -> OptionLeg {
    let atr = if atr.is_finite() && atr > 0.0 {
        atr
    } else {
        underlying * 0.002
    };

    let strike = instrument.otm_strike(underlying, direction);
    let side = match direction {
        Direction::Long => OptionSide::Call,
        Direction::Short => OptionSide::Put,
    };

    let steps = if instrument.strike_step > 0.0 {
        (strike - underlying).abs() / instrument.strike_step
    } else {
        0.0
    };

    let intrinsic = match side {
        OptionSide::Call => (underlying - strike).max(0.0),
        OptionSide::Put => (strike - underlying).max(0.0),
    };
    let time_value = atr * 0.9 * (-0.25 * steps).exp() + atr * 0.1;
    let premium = instrument.round_to_tick(intrinsic + time_value).max(instrument.tick_size);

    // Moneyness drives the delta curve. The scale is floored at one
    // strike step so a quiet tape cannot push nearest-OTM deltas to zero.
    let delta_scale = (2.0 * atr).max(instrument.strike_step);
    let moneyness = match side {
        OptionSide::Call => (underlying - strike) / delta_scale,
        OptionSide::Put => (strike - underlying) / delta_scale,
    };
    let magnitude = 0.5 + 0.5 * moneyness.tanh();
    let delta = match side {
        OptionSide::Call => magnitude,
        OptionSide::Put => -magnitude,
    };

    // Short-dated time value decays hard: model half of it per day.
    let theta_per_day = 0.5 * time_value / premium;

    let liquidity = assess_liquidity(instrument, strike, underlying);

    OptionLeg {
        strike,
        side,
        premium,
        delta,
        theta_per_day,
        spread_pct: liquidity.spread_pct,
        liquidity_score: liquidity.score,
    }
}

/// Modeled probability that an aggressive order at this leg fills near
/// the quote. Spread and thin books both cut into it.
pub fn execution_probability(leg: &OptionLeg) -> f64 {
    (0.95 - 0.08 * leg.spread_pct - 0.004 * (100.0 - leg.liquidity_score)).clamp(0.0, 1.0)
}
