//! Requests-per-second rate limiting for outbound attempts.

use crate::error::{TransportError, TransportResult};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Token-interval rate limiter.
///
/// Grants one send slot every `1s / requests_per_second`. Callers reserve the
/// next free slot and sleep until it arrives; a caller whose wait would
/// exceed its deadline fails immediately without consuming a slot.
pub struct RateLimiter {
    /// Minimum spacing between granted slots.
    interval: Duration,
    /// The next free slot, None until the first acquisition.
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter granting `requests_per_second` slots per second.
    ///
    /// A zero rate is clamped to one request per second.
    pub fn new(requests_per_second: u32) -> Self {
        let rps = requests_per_second.max(1);
        Self {
            interval: Duration::from_secs(1) / rps,
            next_slot: Mutex::new(None),
        }
    }

    /// Wait for a send slot, failing fast if it cannot be granted in time.
    ///
    /// Returns [`TransportError::RateLimited`] when the wait until the next
    /// free slot is longer than `deadline`; in that case no slot is consumed.
    pub async fn acquire(&self, deadline: Duration) -> TransportResult<()> {
        let slot = {
            let mut next_slot = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next_slot {
                Some(next) if next > now => next,
                _ => now,
            };

            let wait = slot.saturating_duration_since(now);
            if wait > deadline {
                return Err(TransportError::RateLimited(wait));
            }

            *next_slot = Some(slot + self.interval);
            slot
        };

        tokio::time::sleep_until(slot).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_acquire_is_immediate() {
        let limiter = RateLimiter::new(1);
        let start = Instant::now();
        limiter.acquire(Duration::from_secs(1)).await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn acquires_are_spaced_by_the_token_interval() {
        // 20 rps -> 50ms between slots.
        let limiter = RateLimiter::new(20);
        let start = Instant::now();
        for _ in 0..3 {
            limiter.acquire(Duration::from_secs(1)).await.unwrap();
        }
        // Slots at 0ms, 50ms, 100ms.
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn deadline_exceeded_fails_without_consuming_a_slot() {
        let limiter = RateLimiter::new(2); // 500ms interval
        limiter.acquire(Duration::from_secs(1)).await.unwrap();

        // The next slot is ~500ms away; a 10ms deadline cannot be met.
        let err = limiter.acquire(Duration::from_millis(10)).await.unwrap_err();
        assert!(matches!(err, TransportError::RateLimited(_)));

        // The failed acquire did not push the slot further out.
        let start = Instant::now();
        limiter.acquire(Duration::from_secs(2)).await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(600));
    }

    #[tokio::test]
    async fn zero_rate_is_clamped() {
        let limiter = RateLimiter::new(0);
        limiter.acquire(Duration::from_secs(2)).await.unwrap();
    }
}
