//! Transaction cost estimates for one option order.
//!
//! Fixed-rate formulas on notional turnover (premium × quantity). The
//! default rates follow the Indian index-option fee schedule shape:
//! securities levies and stamp duty, exchange transaction charge,
//! regulator turnover fee, service tax on charges, flat brokerage.

use serde::{Deserialize, Serialize};

/// Per-component rates, as fractions of notional unless noted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostRates {
    /// Securities transaction levy + stamp duty.
    pub levies: f64,
    /// Exchange transaction charge.
    pub exchange: f64,
    /// Regulator turnover fee.
    pub regulatory: f64,
    /// Service tax applied to exchange charge + brokerage.
    pub tax_on_charges: f64,
    /// Flat brokerage per order, in currency units.
    pub brokerage_flat: f64,
}

impl Default for CostRates {
    fn default() -> Self {
        Self {
            levies: 0.000655,      // 0.0625% levy + 0.003% stamp
            exchange: 0.000503,    // 0.0503%
            regulatory: 0.000001,  // 0.0001%
            tax_on_charges: 0.18,  // 18%
            brokerage_flat: 20.0,
        }
    }
}

/// Cost estimate for one order at `premium` × `quantity` notional.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub levies: f64,
    pub exchange_fee: f64,
    pub regulatory_fee: f64,
    pub tax: f64,
    pub brokerage: f64,
    pub total: f64,
    /// Total as a percentage of notional.
    pub pct: f64,
}

/// Estimate round-trip-side costs for a single order.
///
/// Zero or negative notional yields an all-zero breakdown rather than a
/// division by zero in `pct`.
pub fn estimate_costs(premium: f64, quantity: u32) -> CostBreakdown {
    estimate_costs_with(CostRates::default(), premium, quantity)
}

pub fn estimate_costs_with(rates: CostRates, premium: f64, quantity: u32) -> CostBreakdown {
    let notional = premium * quantity as f64;
    if notional <= 0.0 {
        return CostBreakdown {
            levies: 0.0,
            exchange_fee: 0.0,
            regulatory_fee: 0.0,
            tax: 0.0,
            brokerage: 0.0,
            total: 0.0,
            pct: 0.0,
        };
    }

    let levies = notional * rates.levies;
    let exchange_fee = notional * rates.exchange;
    let regulatory_fee = notional * rates.regulatory;
    let brokerage = rates.brokerage_flat;
    let tax = (exchange_fee + brokerage) * rates.tax_on_charges;
    let total = levies + exchange_fee + regulatory_fee + tax + brokerage;

    CostBreakdown {
        levies,
        exchange_fee,
        regulatory_fee,
        tax,
        brokerage,
        total,
        pct: total / notional * 100.0,
    }
}
