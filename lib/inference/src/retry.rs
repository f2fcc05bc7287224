//! Retry policy for completion calls.

use crate::completion::FailureKind;
use std::time::Duration;

/// How many times a completion call may be attempted.
///
/// The default is a single attempt. Only transient failures are retried;
/// a server that answered with an error is never asked again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Never below 1.
    pub max_attempts: u32,
    /// Fixed pause between attempts.
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Creates a policy; `max_attempts` is raised to 1 if zero.
    #[must_use]
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// One attempt, no retries.
    #[must_use]
    pub fn single_attempt() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Whether a failure on attempt number `attempt` (1-based) gets another try.
    #[must_use]
    pub fn should_retry(&self, attempt: u32, kind: FailureKind) -> bool {
        attempt < self.max_attempts && kind.is_transient()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::single_attempt()
    }
}
