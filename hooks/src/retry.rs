//! Bounded retries for queries.
//!
//! Delays grow exponentially from `base_delay`, capped at `max_delay`.
//! Which errors are retried is up to the caller's predicate.

use std::thread;
use std::time::Duration;

use story_schematics_core::ApiError;
use tracing::{debug, warn};

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    /// A single attempt.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Delay before retry number `retry` (0-based).
    pub fn delay(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Run `attempt` until it succeeds, `should_retry` rejects the error, or
    /// the retries run out. The last error is returned.
    pub fn run<T>(
        &self,
        label: &str,
        should_retry: impl Fn(&ApiError) -> bool,
        mut attempt: impl FnMut() -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let mut retry = 0;
        loop {
            match attempt() {
                Ok(value) => return Ok(value),
                Err(err) if retry < self.max_retries && should_retry(&err) => {
                    let delay = self.delay(retry);
                    warn!(key = label, retry = retry + 1, ?delay, error = %err, "retrying");
                    thread::sleep(delay);
                    retry += 1;
                }
                Err(err) => {
                    debug!(key = label, retries = retry, error = %err, "giving up");
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn fast() -> RetryPolicy {
        RetryPolicy::default().with_base_delay(Duration::ZERO)
    }

    #[test]
    fn delay_doubles_up_to_the_cap() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(0), Duration::from_secs(1));
        assert_eq!(policy.delay(1), Duration::from_secs(2));
        assert_eq!(policy.delay(4), Duration::from_secs(16));
        assert_eq!(policy.delay(5), Duration::from_secs(30));
        assert_eq!(policy.delay(40), Duration::from_secs(30));
    }

    #[test]
    fn retries_internal_until_success() {
        let calls = Cell::new(0);
        let result = fast().run("k", ApiError::is_internal, || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(ApiError::Internal("boom".to_string()))
            } else {
                Ok(calls.get())
            }
        });
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn stops_after_max_retries() {
        let calls = Cell::new(0);
        let result: Result<(), _> = fast().run("k", ApiError::is_internal, || {
            calls.set(calls.get() + 1);
            Err(ApiError::Internal("boom".to_string()))
        });
        assert!(result.unwrap_err().is_internal());
        assert_eq!(calls.get(), 1 + DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn non_retryable_errors_fail_immediately() {
        let calls = Cell::new(0);
        let result: Result<(), _> = fast().run("k", ApiError::is_internal, || {
            calls.set(calls.get() + 1);
            Err(ApiError::NotFound("gone".to_string()))
        });
        assert!(result.unwrap_err().is_not_found());
        assert_eq!(calls.get(), 1);
    }
}
