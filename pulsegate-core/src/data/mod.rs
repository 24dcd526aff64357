//! The feed adapter — live vendor with transparent synthetic fallback.

pub mod cache;
pub mod circuit_breaker;
pub mod feed;
pub mod source;
pub mod synthetic;
pub mod vendor;

pub use cache::FeedCache;
pub use circuit_breaker::CircuitBreaker;
pub use feed::{FeedAdapter, FeedSettings, FeedStatus};
pub use source::{FeedError, FeedMode, MarketSource, SourceError};
pub use synthetic::SyntheticSource;
pub use vendor::LiveVendor;
