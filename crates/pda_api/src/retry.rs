use std::time::Duration;

use pda_core::error::AppError;

/// Bounded retry for the PagerDuty GETs. Only errors flagged `retryable` are retried, which
/// `error_for_status` sets for 5xx replies alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Pause after the given (1-based) failed attempt: base, 2x base, 4x base, ...
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exp)
    }

    pub fn should_retry(&self, err: &AppError) -> bool {
        err.retryable
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or attempts run out.
    /// `sleep` is called between attempts; tests pass a recorder instead of a real sleep.
    pub fn run<T>(
        &self,
        sleep: &mut dyn FnMut(Duration),
        mut op: impl FnMut(u32) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let max = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(v) => return Ok(v),
                Err(e) if attempt < max && self.should_retry(&e) => {
                    let delay = self.delay_for(attempt);
                    tracing::debug!(attempt, ?delay, code = %e.code, "retrying PagerDuty request");
                    sleep(delay);
                    attempt += 1;
                }
                Err(e) => {
                    let details = match e.details.as_deref() {
                        Some(d) => format!("attempts={attempt}; {d}"),
                        None => format!("attempts={attempt}"),
                    };
                    return Err(e.with_details(details));
                }
            }
        }
    }
}
