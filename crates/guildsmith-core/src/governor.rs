//! Fixed-interval rate governor for outbound mutation calls
//!
//! The remote API's rate limit is shared and fragile, so every
//! mutation call across all operations is serialized through one
//! governor with a fixed inter-call delay. A fixed delay trades
//! throughput for predictable limit avoidance; this is deliberately
//! not a token bucket.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Serializes outbound mutation calls with a fixed minimum interval
#[derive(Debug)]
pub struct RateGovernor {
    interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateGovernor {
    /// Create a governor with the given inter-call interval
    ///
    /// The interval is fixed at construction and never mutated.
    #[inline]
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_call: Mutex::new(None),
        }
    }

    /// Configured inter-call interval
    #[inline]
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Resolve once the interval has elapsed since the previous
    /// `throttle` returned
    ///
    /// Concurrent callers queue on the internal lock, so calls across
    /// operations are spaced out as well as calls within one.
    pub async fn throttle(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(previous) = *last_call {
            tokio::time::sleep_until(previous + self.interval).await;
        }
        *last_call = Some(Instant::now());
    }
}
