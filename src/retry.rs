//! Retry policy for transient failures.
//!
//! Only transient errors are retried (see [`Error::is_retryable`](crate::Error::is_retryable)):
//! rate limits, 5xx responses, connection failures and timeouts. Delays grow
//! exponentially with optional jitter, and a server-supplied `Retry-After`
//! takes precedence over the computed delay.

use rand::Rng;
use std::time::Duration;

/// Defines how many times and how long to wait between retries.
///
/// # Examples
///
/// ```
/// use finwise::RetryPolicy;
/// use std::time::Duration;
///
/// // Exponential backoff without jitter: 100ms, 200ms, 400ms (capped at 1s)
/// let policy = RetryPolicy::default()
///     .with_max_retries(3)
///     .with_initial_delay(Duration::from_millis(100))
///     .with_max_delay(Duration::from_secs(1))
///     .with_jitter(false);
///
/// assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(200));
///
/// // Fail fast
/// let none = RetryPolicy::no_retry();
/// assert_eq!(none.max_retries, 0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one; total attempts are `max_retries + 1`.
    pub max_retries: u32,
    /// The delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on the computed backoff delay.
    pub max_delay: Duration,
    /// Whether to scale each delay by a random factor in `[0.5, 1.0]`.
    pub jitter: bool,
    /// Upper bound on a server-supplied `Retry-After` wait.
    pub max_retry_after: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            jitter: true,
            max_retry_after: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Sets the maximum number of retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the delay before the first retry.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the cap on computed backoff delays.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Enables or disables jitter.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Sets the cap on server-supplied `Retry-After` waits.
    pub fn with_max_retry_after(mut self, max: Duration) -> Self {
        self.max_retry_after = max;
        self
    }

    /// Returns the computed backoff before the given retry.
    ///
    /// # Arguments
    ///
    /// * `attempt` - The retry number (1-indexed, so 1 = first retry)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        // initial_delay * 2^(attempt - 1)
        let multiplier = 2u32.saturating_pow(attempt.saturating_sub(1));
        let delay = self
            .initial_delay
            .saturating_mul(multiplier)
            .min(self.max_delay);

        if self.jitter {
            let jitter_factor = rand::thread_rng().gen_range(0.5..=1.0);
            delay.mul_f64(jitter_factor)
        } else {
            delay
        }
    }

    /// Returns the wait before the given retry, honouring `retry_after` when present.
    pub(crate) fn delay_before_retry(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(wait) => wait.min(self.max_retry_after),
            None => self.delay_for_attempt(attempt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed() -> RetryPolicy {
        RetryPolicy::default()
            .with_initial_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_secs(10))
            .with_jitter(false)
    }

    #[test]
    fn test_exponential_backoff_delays() {
        let policy = fixed();

        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(400));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_millis(800));
        assert_eq!(policy.delay_for_attempt(5), Duration::from_millis(1600));
    }

    #[test]
    fn test_backoff_capped() {
        let policy = fixed().with_max_delay(Duration::from_millis(300));

        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(300));
        assert_eq!(policy.delay_for_attempt(40), Duration::from_millis(300));
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let policy = fixed().with_jitter(true);

        for _ in 0..100 {
            let delay = policy.delay_for_attempt(2);
            // float scaling may land a nanosecond either side of the bounds
            assert!(delay >= Duration::from_millis(99) && delay <= Duration::from_millis(201));
        }
    }

    #[test]
    fn test_retry_after_takes_precedence() {
        let policy = fixed();

        assert_eq!(
            policy.delay_before_retry(1, Some(Duration::from_secs(2))),
            Duration::from_secs(2)
        );
        assert_eq!(policy.delay_before_retry(1, None), Duration::from_millis(100));
    }

    #[test]
    fn test_retry_after_capped() {
        let policy = fixed().with_max_retry_after(Duration::from_secs(5));

        assert_eq!(
            policy.delay_before_retry(1, Some(Duration::from_secs(600))),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_no_retry() {
        assert_eq!(RetryPolicy::no_retry().max_retries, 0);
        assert_eq!(RetryPolicy::default().max_retries, 3);
    }
}
