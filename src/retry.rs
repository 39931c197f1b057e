//! Retry Logic with Exponential Backoff
//!
//! Handles transient probe failures by retrying with progressively longer
//! delays between attempts.
//!
//! ## Exponential Backoff
//!
//! Delays between probe attempts grow exponentially, indexed by the attempt
//! about to run:
//! - Attempt 0: No delay (immediate)
//! - Attempt 1: 2000ms delay (base * 2^1)
//! - Attempt 2: 4000ms delay (base * 2^2)
//! - Capped at max_delay_ms to prevent excessive delays
//!
//! With the default base of 1000ms and 3 attempts, the worst-case schedule
//! is 2s + 4s = 6s of backoff, well inside the 15s analysis deadline. The
//! wall-clock deadline is enforced by the analyzer, not here; this module
//! only computes the schedule.
//!
//! ## Configuration Example
//!
//! ```yaml
//! analysis:
//!   max_attempts: 3
//!   base_delay_ms: 1000
//!   max_delay_ms: 8000
//! ```

use std::time::Duration;

/// Retry policy configuration
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of probe attempts (including initial attempt)
    pub max_attempts: u32,
    /// Base backoff delay in milliseconds
    pub base_delay_ms: u64,
    /// Maximum backoff delay in milliseconds (cap for exponential growth)
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: crate::constants::DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: crate::constants::DEFAULT_BASE_DELAY_MS,
            max_delay_ms: crate::constants::DEFAULT_MAX_DELAY_MS,
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy
    pub fn new(max_attempts: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_attempts,
            base_delay_ms,
            max_delay_ms,
        }
    }

    /// Calculate backoff delay before a given attempt number (0-indexed)
    ///
    /// # Arguments
    /// * `attempt` - The attempt about to run (0 = first attempt, 1 = first retry, etc.)
    ///
    /// # Returns
    /// Duration to wait before the attempt (0 for the first attempt)
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            // First attempt: no delay
            return Duration::from_millis(0);
        }

        // Exponential backoff: base_delay * 2^attempt
        let backoff_ms = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt))
            .min(self.max_delay_ms);

        Duration::from_millis(backoff_ms)
    }

    /// Check if another attempt is allowed after `attempts_completed` attempts
    pub fn has_budget(&self, attempts_completed: u32) -> bool {
        attempts_completed < self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_retry_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay_ms, 1000);
        assert_eq!(policy.max_delay_ms, 8000);
    }

    #[test]
    fn test_exponential_backoff_calculation() {
        let policy = RetryPolicy::new(3, 1000, 8000);

        // Attempt 0 (first attempt): no delay
        assert_eq!(policy.backoff_duration(0), Duration::from_millis(0));

        // Attempt 1 (first retry): 2000ms (1000 * 2^1)
        assert_eq!(policy.backoff_duration(1), Duration::from_millis(2000));

        // Attempt 2 (second retry): 4000ms (1000 * 2^2)
        assert_eq!(policy.backoff_duration(2), Duration::from_millis(4000));

        // Attempt 3 would be 8000ms, exactly at the cap
        assert_eq!(policy.backoff_duration(3), Duration::from_millis(8000));

        // Attempt 4 would be 16000ms, capped at 8000ms
        assert_eq!(policy.backoff_duration(4), Duration::from_millis(8000));
    }

    #[test]
    fn test_default_schedule_fits_deadline() {
        // Cumulative backoff for the default 3-attempt schedule: 2s + 4s
        let policy = RetryPolicy::default();
        let total: Duration = (1..policy.max_attempts)
            .map(|a| policy.backoff_duration(a))
            .sum();
        assert_eq!(total, Duration::from_secs(6));
        assert!(total < Duration::from_millis(crate::constants::DEFAULT_DEADLINE_MS));
    }

    #[test]
    fn test_budget_exhaustion() {
        let policy = RetryPolicy::new(3, 1000, 8000);

        assert!(policy.has_budget(0));
        assert!(policy.has_budget(2));
        assert!(!policy.has_budget(3));
        assert!(!policy.has_budget(10));
    }

    #[test]
    fn test_backoff_with_zero_base() {
        let policy = RetryPolicy::new(3, 0, 8000);

        assert_eq!(policy.backoff_duration(0), Duration::from_millis(0));
        assert_eq!(policy.backoff_duration(1), Duration::from_millis(0));
        assert_eq!(policy.backoff_duration(2), Duration::from_millis(0));
    }

    #[test]
    fn test_saturating_mul_prevents_overflow() {
        let policy = RetryPolicy::new(100, u64::MAX, u64::MAX);

        // Should not panic even with max values
        let duration = policy.backoff_duration(50);
        assert_eq!(duration, Duration::from_millis(u64::MAX));
    }
}
