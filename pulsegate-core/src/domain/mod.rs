//! Domain types — candles, quotes, instruments, horizons, signal payloads.

pub mod candle;
pub mod horizon;
pub mod ids;
pub mod instrument;
pub mod quote;
pub mod session;
pub mod signal;

pub use candle::{series_is_ordered, Candle};
pub use horizon::{Horizon, ParseHorizonError};
pub use ids::SignalId;
pub use instrument::{Instrument, InstrumentBook};
pub use quote::{Quote, SessionState};
pub use session::SessionHours;
pub use signal::{
    CandidateSignal, ConfluenceFlags, Direction, FinalSignal, ManagementPlan, OptionLeg,
    OptionSide, RiskPlan, TrailingMethod, TrendBias,
};
