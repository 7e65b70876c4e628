//! Transport-level retry policy
//!
//! speedrun.com throttles aggressive clients with HTTP 420; those responses
//! are retried in place with exponential backoff instead of being treated as
//! hard failures. The policy lives in its own value so the backoff behavior
//! can be tested apart from the page-walking loop, which has its own
//! one-retry-then-fail handling for everything else.

use std::time::Duration;

/// Bounded retry with exponential backoff for retryable HTTP statuses
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Ceiling on total attempts for one request, first try included
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each subsequent retry
    pub base_delay: Duration,
    /// Status codes that trigger a retry of the same request
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_delay: Duration::from_secs(1),
            // 420 is what speedrun.com actually sends; 429 is the standard code
            retryable_statuses: vec![420, 429],
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries, for callers that want one shot only
    #[allow(dead_code)]
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            retryable_statuses: Vec::new(),
        }
    }

    /// Whether a response with this status should be retried
    pub fn is_retryable(&self, status: u16) -> bool {
        self.retryable_statuses.contains(&status)
    }

    /// Backoff delay before the retry following attempt number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        // base, 2*base, 4*base, ...
        self.base_delay
            .saturating_mul(1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_attempt_ceiling_is_ten() {
        assert_eq!(RetryPolicy::default().max_attempts, 10);
    }

    #[test]
    fn test_rate_limit_statuses_are_retryable() {
        let policy = RetryPolicy::default();
        assert!(policy.is_retryable(420));
        assert!(policy.is_retryable(429));
    }

    #[test]
    fn test_other_statuses_are_not_retryable() {
        let policy = RetryPolicy::default();
        assert!(!policy.is_retryable(404));
        assert!(!policy.is_retryable(500));
        assert!(!policy.is_retryable(200));
    }

    #[test]
    fn test_delay_doubles_per_attempt() {
        let policy = RetryPolicy {
            base_delay: Duration::from_millis(100),
            ..RetryPolicy::default()
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
        assert_eq!(policy.delay_for(4), Duration::from_millis(800));
    }

    #[test]
    fn test_none_policy_never_retries() {
        let policy = RetryPolicy::none();
        assert_eq!(policy.max_attempts, 1);
        assert!(!policy.is_retryable(420));
    }
}
