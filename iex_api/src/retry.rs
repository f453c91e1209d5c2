//! Bounded retry configuration for the query executor.

use std::time::Duration;

/// Number of extra attempts and the pause between them.
///
/// A policy with `retry_count = n` makes at most `n + 1` requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retry_count: u32,
    pub pause: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_count: 3,
            pause: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn new(retry_count: u32, pause: Duration) -> Self {
        Self { retry_count, pause }
    }

    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self {
            retry_count: 0,
            pause: Duration::ZERO,
        }
    }

    /// Total number of requests this policy allows.
    pub fn max_attempts(&self) -> u32 {
        self.retry_count.saturating_add(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.retry_count, 3);
        assert_eq!(policy.pause, Duration::from_millis(500));
        assert_eq!(policy.max_attempts(), 4);
    }

    #[test]
    fn none_makes_single_attempt() {
        assert_eq!(RetryPolicy::none().max_attempts(), 1);
    }

    #[test]
    fn max_attempts_saturates() {
        let policy = RetryPolicy::new(u32::MAX, Duration::ZERO);
        assert_eq!(policy.max_attempts(), u32::MAX);
    }
}
