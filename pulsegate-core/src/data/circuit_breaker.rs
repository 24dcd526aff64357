//! Circuit breaker in front of the live vendor.
//!
//! Repeated transient failures trip the breaker, which then refuses all
//! live requests for a cooldown period; the feed adapter serves synthetic
//! data in the meantime instead of hammering a struggling vendor.

use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
enum BreakerState {
    Closed,
    Open { tripped_at: Instant },
}

#[derive(Debug)]
struct Inner {
    state: BreakerState,
    consecutive_failures: u32,
}

/// Trips after `failure_threshold` consecutive failures, reopens after
/// `cooldown`.
#[derive(Debug)]
pub struct CircuitBreaker {
    inner: Mutex<Inner>,
    cooldown: Duration,
    failure_threshold: u32,
}

impl CircuitBreaker {
    pub fn new(cooldown: Duration, failure_threshold: u32) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
            }),
            cooldown,
            failure_threshold,
        }
    }

    /// Vendor default: 3 strikes, 5-minute cooldown.
    pub fn default_vendor() -> Self {
        Self::new(Duration::from_secs(5 * 60), 3)
    }

    /// Whether a live request may be attempted right now. An expired
    /// cooldown resets the breaker as a side effect.
    pub fn allow_request(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        match inner.state {
            BreakerState::Closed => true,
            BreakerState::Open { tripped_at } => {
                if tripped_at.elapsed() >= self.cooldown {
                    inner.state = BreakerState::Closed;
                    inner.consecutive_failures = 0;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn on_success(&self) {
        self.inner.lock().unwrap().consecutive_failures = 0;
    }

    pub fn on_failure(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.consecutive_failures += 1;
        if inner.consecutive_failures >= self.failure_threshold {
            inner.state = BreakerState::Open {
                tripped_at: Instant::now(),
            };
        }
    }

    /// Trip immediately, failure count notwithstanding (vendor ban,
    /// authentication revoked).
    pub fn trip_now(&self) {
        self.inner.lock().unwrap().state = BreakerState::Open {
            tripped_at: Instant::now(),
        };
    }

    /// Remaining cooldown; zero when closed.
    pub fn cooldown_remaining(&self) -> Duration {
        match self.inner.lock().unwrap().state {
            BreakerState::Closed => Duration::ZERO,
            BreakerState::Open { tripped_at } => {
                self.cooldown.saturating_sub(tripped_at.elapsed())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_closed() {
        let breaker = CircuitBreaker::new(Duration::from_secs(60), 3);
        assert!(breaker.allow_request());
    }

    #[test]
    fn trips_at_threshold() {
        let breaker = CircuitBreaker::new(Duration::from_secs(60), 3);
        breaker.on_failure();
        breaker.on_failure();
        assert!(breaker.allow_request());
        breaker.on_failure();
        assert!(!breaker.allow_request());
    }

    #[test]
    fn success_resets_the_count() {
        let breaker = CircuitBreaker::new(Duration::from_secs(60), 3);
        breaker.on_failure();
        breaker.on_failure();
        breaker.on_success();
        breaker.on_failure();
        assert!(breaker.allow_request());
    }

    #[test]
    fn trip_now_is_immediate() {
        let breaker = CircuitBreaker::new(Duration::from_secs(60), 3);
        breaker.trip_now();
        assert!(!breaker.allow_request());
        assert!(breaker.cooldown_remaining() > Duration::ZERO);
    }

    #[test]
    fn cooldown_expiry_reopens() {
        let breaker = CircuitBreaker::new(Duration::from_millis(10), 3);
        breaker.trip_now();
        assert!(!breaker.allow_request());
        std::thread::sleep(Duration::from_millis(15));
        assert!(breaker.allow_request());
        assert_eq!(breaker.cooldown_remaining(), Duration::ZERO);
    }
}
