//! One explicit policy for outbound registry traffic.
//!
//! Precedence, outermost first:
//! 1. the rate gate: every attempt, retried or not, waits for a permit;
//! 2. the per-call timeout, which turns a slow attempt into a transient failure;
//! 3. the retry loop, with its own exponential backoff clock.
//!
//! The rate gate is the only bound on call rate. There is no extra pause between records.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::retry::RetryPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestPolicy {
    /// Maximum attempts per second, retries included.
    pub max_requests_per_second: u32,
    pub max_attempts: usize,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for RequestPolicy {
    fn default() -> Self {
        Self {
            max_requests_per_second: 5,
            max_attempts: 3,
            initial_backoff_ms: 4000,
            max_backoff_ms: 10000,
            request_timeout_secs: 30,
        }
    }
}

impl RequestPolicy {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.initial_backoff_ms, self.max_backoff_ms)
    }

    pub fn rate_gate(&self) -> Result<RateGate, FetchError> {
        RateGate::per_second(self.max_requests_per_second)
    }
}

/// Admits at most `n` calls in any rolling one-second window.
///
/// Burst is fixed at one, so permits are spaced `1s / n` apart.
pub struct RateGate {
    limiter: DefaultDirectRateLimiter,
    per_second: u32,
}

impl RateGate {
    pub fn per_second(per_second: u32) -> Result<Self, FetchError> {
        let rate = NonZeroU32::new(per_second).ok_or_else(|| {
            FetchError::InvalidPolicy("max_requests_per_second must be at least 1".to_string())
        })?;
        let quota = Quota::per_second(rate).allow_burst(NonZeroU32::MIN);

        Ok(Self {
            limiter: RateLimiter::direct(quota),
            per_second,
        })
    }

    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }

    pub fn per_second_ceiling(&self) -> u32 {
        self.per_second
    }
}

impl std::fmt::Debug for RateGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateGate")
            .field("per_second", &self.per_second)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn zero_rate_is_rejected() {
        let policy = RequestPolicy {
            max_requests_per_second: 0,
            ..Default::default()
        };
        assert!(matches!(policy.rate_gate(), Err(FetchError::InvalidPolicy(_))));
    }

    #[test]
    fn defaults_match_the_registry_contract() {
        let policy = RequestPolicy::default();
        assert_eq!(policy.max_requests_per_second, 5);
        assert_eq!(policy.retry_policy().max_attempts(), 3);
        assert_eq!(policy.timeout(), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn permits_are_spaced_by_the_rate() {
        let gate = RateGate::per_second(20).unwrap();
        let start = Instant::now();
        for _ in 0..5 {
            gate.acquire().await;
        }
        // first permit is immediate, the next four are 50ms apart
        assert!(start.elapsed() >= Duration::from_millis(190));
    }
}
