//! Retry policy
//!
//! Governs how many times a failing operation is attempted and how long to
//! wait between attempts.

use crate::config::download::{MAX_ATTEMPTS, MAX_BACKOFF_SECS, RETRY_DELAY_SECS};
use std::time::Duration;

/// How the pause between attempts evolves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay before every retry
    Fixed,
    /// min(2^(n-1) * delay, max)
    Exponential { max: Duration },
}

/// Attempt count and delay rule for retried operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(MAX_ATTEMPTS, Duration::from_secs(RETRY_DELAY_SECS))
    }
}

impl RetryPolicy {
    /// Constant delay between attempts
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            backoff: Backoff::Fixed,
        }
    }

    /// Doubling delay, capped at `MAX_BACKOFF_SECS`
    pub fn exponential(max_attempts: u32, base: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay: base,
            backoff: Backoff::Exponential {
                max: Duration::from_secs(MAX_BACKOFF_SECS),
            },
        }
    }

    /// Delay to wait after the given number of consecutive failures
    pub fn delay_after(&self, failures: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.delay,
            Backoff::Exponential { max } => {
                let exp = failures.saturating_sub(1).min(16);
                self.delay.saturating_mul(1u32 << exp).min(max)
            }
        }
    }

    /// Run `op` until it succeeds or attempts are exhausted
    ///
    /// `op` receives the 1-based attempt number. The last error is returned
    /// together with the number of attempts made. No delay follows the
    /// final attempt.
    pub fn run<T, E, F>(&self, mut op: F) -> std::result::Result<T, (E, u32)>
    where
        F: FnMut(u32) -> std::result::Result<T, E>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= self.max_attempts => return Err((e, attempt)),
                Err(_) => {
                    std::thread::sleep(self.delay_after(attempt));
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay, Duration::from_secs(1));
        assert_eq!(policy.backoff, Backoff::Fixed);
    }

    #[test]
    fn test_fixed_delay_does_not_grow() {
        let policy = RetryPolicy::fixed(5, Duration::from_secs(1));
        assert_eq!(policy.delay_after(1), Duration::from_secs(1));
        assert_eq!(policy.delay_after(4), Duration::from_secs(1));
    }

    #[test]
    fn test_exponential_growth_and_cap() {
        let policy = RetryPolicy::exponential(10, Duration::from_secs(2));
        assert_eq!(policy.delay_after(1), Duration::from_secs(2));
        assert_eq!(policy.delay_after(2), Duration::from_secs(4));
        assert_eq!(policy.delay_after(3), Duration::from_secs(8));
        assert_eq!(policy.delay_after(5), Duration::from_secs(MAX_BACKOFF_SECS));
        assert_eq!(policy.delay_after(100), Duration::from_secs(MAX_BACKOFF_SECS));
    }

    #[test]
    fn test_zero_attempts_clamped_to_one() {
        assert_eq!(RetryPolicy::fixed(0, Duration::ZERO).max_attempts, 1);
    }

    #[test]
    fn test_run_stops_on_first_success() {
        let mut calls = 0;
        let result: std::result::Result<u32, (&str, u32)> =
            RetryPolicy::fixed(3, Duration::ZERO).run(|attempt| {
                calls += 1;
                Ok(attempt)
            });
        assert_eq!(result, Ok(1));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_run_exhausts_attempts() {
        let mut calls = 0;
        let result: std::result::Result<(), (&str, u32)> =
            RetryPolicy::fixed(3, Duration::ZERO).run(|_| {
                calls += 1;
                Err("boom")
            });
        assert_eq!(result, Err(("boom", 3)));
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_run_recovers_after_failure() {
        let result: std::result::Result<u32, (&str, u32)> = RetryPolicy::fixed(3, Duration::ZERO)
            .run(|attempt| if attempt < 3 { Err("again") } else { Ok(attempt) });
        assert_eq!(result, Ok(3));
    }

    #[test]
    fn test_run_waits_between_failures() {
        let start = Instant::now();
        let _: std::result::Result<(), (&str, u32)> =
            RetryPolicy::fixed(2, Duration::from_millis(200)).run(|_| Err("x"));
        assert!(start.elapsed() >= Duration::from_millis(200));
    }
}
