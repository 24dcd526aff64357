//! Quality & cost model — stateless estimates for a hypothetical option
//! leg: transaction costs, liquidity, slippage, and the modeled chain
//! used for strike selection.

pub mod costs;
pub mod liquidity;
pub mod slippage;
pub mod strike;

pub use costs::{estimate_costs, estimate_costs_with, CostBreakdown, CostRates};
pub use liquidity::{assess_liquidity, LiquidityAssessment};
pub use slippage::{OrderStyle, SlippageEstimate, SlippageModel};
pub use strike::{execution_probability, select_leg};
