//! Timeout and exponential-backoff retry around any [`PlatformProvider`].
//!
//! Each attempt is bounded by [`RetryPolicy::attempt_timeout`]. Transient
//! failures (`timeout`, `network`) are retried with growing delays until
//! [`RetryPolicy::max_attempts`] is exhausted; `not_found` and
//! `parse_error` are returned immediately because retrying cannot help.

use std::time::Duration;

use async_trait::async_trait;
use napwatch_core::platform::{FailureReason, FetchFailure, PlatformTarget, RawSnapshot};

use crate::provider::PlatformProvider;

/// Tunable parameters for the retry strategy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Upper bound on a single attempt.
    pub attempt_timeout: Duration,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            attempt_timeout: Duration::from_secs(20),
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

/// Calculate the next backoff delay from the current delay and policy.
///
/// The result is clamped to [`RetryPolicy::max_delay`].
pub fn next_delay(current: Duration, policy: &RetryPolicy) -> Duration {
    let next_ms = (current.as_millis() as f64 * policy.multiplier) as u64;
    Duration::from_millis(next_ms).min(policy.max_delay)
}

/// Wraps a provider with the timeout and retry behaviour of a [`RetryPolicy`].
pub struct RetryingProvider<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P: PlatformProvider> RetryingProvider<P> {
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    async fn attempt(&self, target: &PlatformTarget) -> Result<RawSnapshot, FetchFailure> {
        match tokio::time::timeout(self.policy.attempt_timeout, self.inner.fetch_snapshot(target))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(FetchFailure::new(
                FailureReason::Timeout,
                format!(
                    "no response within {} ms",
                    self.policy.attempt_timeout.as_millis()
                ),
            )),
        }
    }
}

#[async_trait]
impl<P: PlatformProvider> PlatformProvider for RetryingProvider<P> {
    async fn fetch_snapshot(&self, target: &PlatformTarget) -> Result<RawSnapshot, FetchFailure> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut delay = self.policy.initial_delay;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            match self.attempt(target).await {
                Ok(snapshot) => {
                    if attempt > 1 {
                        tracing::info!(platform = %target.name, attempt, "Fetch succeeded after retry");
                    }
                    return Ok(snapshot);
                }
                Err(failure) if failure.reason.is_transient() && attempt < max_attempts => {
                    tracing::warn!(
                        platform = %target.name,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %failure,
                        "Fetch attempt failed, retrying",
                    );
                    tokio::time::sleep(delay).await;
                    delay = next_delay(delay, &self.policy);
                }
                Err(failure) => {
                    tracing::error!(
                        platform = %target.name,
                        attempt,
                        error = %failure,
                        "Fetch failed",
                    );
                    return Err(failure);
                }
            }
        }
    }
}
