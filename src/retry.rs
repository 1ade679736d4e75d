/// Bounded retry with randomized exponential backoff.
///
/// `RetryPolicy` wraps a single fallible operation and re-runs it until it
/// succeeds, fails with an error the caller marks as permanent, or the attempt
/// budget is spent.
use std::thread;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

/// Default number of attempts, including the first one.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default lower bound of the delay envelope.
pub const DEFAULT_MIN_DELAY: Duration = Duration::from_secs(1);

/// Default upper bound of the delay envelope.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(20);

/// The error returned once a retried operation gives up.
#[derive(Debug)]
pub struct RetryFailure<E> {
    /// Number of times the operation was called.
    pub attempts: u32,
    /// The error from the last call.
    pub error: E,
}

/// Retry policy: attempt budget, delay envelope and backoff multiplier.
///
/// After failed attempt `n` (1-based) the policy sleeps for a random duration
/// in `[min_delay, high]`, where `high = min_delay * multiplier * 2^(n-1)`
/// clamped to the envelope. With the defaults that is exactly 1s after the
/// first failure and 1-2s after the second.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use askrelay::RetryPolicy;
///
/// let policy = RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(5), 1.0);
/// let mut calls = 0;
/// let result: Result<u32, _> = policy.run(
///     || {
///         calls += 1;
///         if calls < 3 { Err("busy") } else { Ok(calls) }
///     },
///     |_| true,
/// );
/// assert_eq!(result.unwrap(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    min_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            min_delay: DEFAULT_MIN_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            multiplier: 1.0,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy.
    ///
    /// `max_attempts` is raised to 1 and `max_delay` to `min_delay` when they
    /// are smaller, so a policy always makes at least one call.
    pub fn new(max_attempts: u32, min_delay: Duration, max_delay: Duration, multiplier: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            min_delay,
            max_delay: max_delay.max(min_delay),
            multiplier: if multiplier.is_finite() && multiplier > 0.0 {
                multiplier
            } else {
                1.0
            },
        }
    }

    /// Returns the attempt budget.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the lower bound of the delay envelope.
    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// Returns the upper bound of the delay envelope.
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Upper bound of the randomized delay after failed attempt `attempt`.
    pub fn delay_ceiling(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(63) as i32;
        let secs = self.min_delay.as_secs_f64() * self.multiplier * 2f64.powi(exponent);
        let capped = secs.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped).clamp(self.min_delay, self.max_delay)
    }

    /// Draws the delay to sleep after failed attempt `attempt`.
    pub fn delay_for(&self, attempt: u32, rng: &mut impl Rng) -> Duration {
        let low = self.min_delay.as_secs_f64();
        let high = self.delay_ceiling(attempt).as_secs_f64();
        if high <= low {
            return self.min_delay;
        }
        Duration::from_secs_f64(rng.random_range(low..=high))
    }

    /// Runs `op` under this policy.
    ///
    /// `should_retry` decides whether an error is worth another attempt; a
    /// `false` answer returns immediately. On exhaustion the last error is
    /// returned along with the number of calls made.
    pub fn run<T, E, F, R>(&self, mut op: F, should_retry: R) -> Result<T, RetryFailure<E>>
    where
        F: FnMut() -> Result<T, E>,
        R: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let mut rng = rand::rng();
        let mut attempt = 1;

        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if attempt >= self.max_attempts || !should_retry(&error) {
                        return Err(RetryFailure {
                            attempts: attempt,
                            error,
                        });
                    }

                    let delay = self.delay_for(attempt, &mut rng);
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        %error,
                        "attempt failed, retrying"
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
            }
        }
    }
}
