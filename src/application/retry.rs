//! Exponential-backoff executor for fallible datastore calls.
//!
//! Every call gets its own attempt budget: there is no shared state between
//! calls and no fast-fail mode. Delays double per attempt without jitter.

use std::{fmt::Display, future::Future, time::Duration};

use metrics::counter;
use tracing::warn;

const DEFAULT_MAX_ATTEMPTS: u32 = 4;
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

const METRIC_RETRY_FAILURE_TOTAL: &str = "quire_retry_failure_total";
const METRIC_RETRY_EXHAUSTED_TOTAL: &str = "quire_retry_exhausted_total";

/// Tunable parameters for the backoff strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero behaves as one.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay slept after the failed attempt at `attempt_index` (zero based).
    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt_index))
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Run `op` until it succeeds or the policy's attempts are used up.
///
/// The error of the final attempt is returned unchanged.
pub async fn retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    operation: &'static str,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = policy.attempts();
    let mut attempt_index = 0u32;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                counter!(METRIC_RETRY_FAILURE_TOTAL, "operation" => operation).increment(1);

                if attempt_index + 1 >= attempts {
                    counter!(METRIC_RETRY_EXHAUSTED_TOTAL, "operation" => operation).increment(1);
                    warn!(
                        target = "quire::retry",
                        operation,
                        attempts,
                        error = %err,
                        "Giving up after final attempt"
                    );
                    return Err(err);
                }

                let delay = policy.delay_for(attempt_index);
                warn!(
                    target = "quire::retry",
                    operation,
                    attempt = attempt_index + 1,
                    attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Attempt failed; backing off"
                );
                tokio::time::sleep(delay).await;
                attempt_index += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicU32, Ordering},
    };

    use tokio::time::Instant;

    use super::*;

    #[test]
    fn default_policy_matches_documented_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 4);
        assert_eq!(policy.base_delay, Duration::from_millis(1000));
    }

    #[test]
    fn delays_double_per_attempt() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100));
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(400));
        assert_eq!(policy.delay_for(3), Duration::from_millis(800));
    }

    #[test]
    fn delay_saturates_instead_of_overflowing() {
        let policy = RetryPolicy::new(64, Duration::from_secs(1));
        assert_eq!(policy.delay_for(63), policy.delay_for(40));
        assert!(policy.delay_for(63) > policy.delay_for(20));
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_third_attempt_with_growing_delays() {
        let policy = RetryPolicy::new(4, Duration::from_millis(50));
        let calls = Arc::new(Mutex::new(Vec::<Instant>::new()));

        let result = retry(&policy, "flaky", || {
            let calls = calls.clone();
            async move {
                let mut guard = calls.lock().expect("calls lock");
                guard.push(Instant::now());
                if guard.len() < 3 {
                    Err("transient")
                } else {
                    Ok(guard.len())
                }
            }
        })
        .await;

        assert_eq!(result, Ok(3));

        let calls = calls.lock().expect("calls lock");
        assert_eq!(calls.len(), 3);
        let first_gap = calls[1] - calls[0];
        let second_gap = calls[2] - calls[1];
        assert!(first_gap >= Duration::from_millis(50));
        assert!(second_gap >= first_gap * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_returns_last_error_after_exact_attempts() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10));
        let attempts = AtomicU32::new(0);

        let result: Result<(), String> = retry(&policy, "always_fails", || {
            let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Err(format!("failure {n}")) }
        })
        .await;

        assert_eq!(result, Err("failure 3".to_string()));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_attempts_still_runs_once() {
        let policy = RetryPolicy::new(0, Duration::from_millis(10));
        let attempts = AtomicU32::new(0);

        let result: Result<(), &str> = retry(&policy, "once", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err("nope") }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
