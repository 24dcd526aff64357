//! Content-addressed signal identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Deterministic signal id.
///
/// Derived by BLAKE3 over the fields that make a signal unique
/// (instrument, horizon, direction, entry, creation time), so re-running
/// the pipeline over the same inputs yields the same id. A corrected
/// candidate derives a fresh id — it is a new value, never a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalId(pub String);

impl SignalId {
    /// Derive from the identity fields. Truncated hex keeps ids legible
    /// in logs while staying collision-resistant at this volume.
    pub fn derive(
        symbol: &str,
        horizon: &str,
        direction: &str,
        entry_price: f64,
        created_at: &str,
    ) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(symbol.as_bytes());
        hasher.update(horizon.as_bytes());
        hasher.update(direction.as_bytes());
        hasher.update(&entry_price.to_le_bytes());
        hasher.update(created_at.as_bytes());
        let hash = hasher.finalize();
        Self(hash.to_hex().as_str()[..16].to_string())
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_is_deterministic() {
        let a = SignalId::derive("NIFTY", "1m", "long", 22_100.0, "2024-06-03T10:15:00");
        let b = SignalId::derive("NIFTY", "1m", "long", 22_100.0, "2024-06-03T10:15:00");
        assert_eq!(a, b);
    }

    #[test]
    fn derive_differs_on_entry() {
        let a = SignalId::derive("NIFTY", "1m", "long", 22_100.0, "2024-06-03T10:15:00");
        let b = SignalId::derive("NIFTY", "1m", "long", 22_100.05, "2024-06-03T10:15:00");
        assert_ne!(a, b);
    }

    #[test]
    fn id_is_short_hex() {
        let id = SignalId::derive("NIFTY", "1m", "long", 22_100.0, "2024-06-03T10:15:00");
        assert_eq!(id.0.len(), 16);
        assert!(id.0.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
