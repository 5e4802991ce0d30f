// crates/lectern-core/src/runtime/retry.rs
// ============================================================================
// Module: Contention Retry Policy
// Description: Bounded retry with fixed backoff for lock-contention failures.
// Purpose: Re-run whole enrollment attempts when the row lock wait timed out.
// Dependencies: crate::runtime::coordinator
// ============================================================================

//! ## Overview
//! The retry policy wraps a whole enrollment attempt. Lock-contention
//! failures restart the attempt from the exclusive read, up to a fixed number
//! of total attempts with a fixed delay between them; every other failure
//! surfaces immediately on first occurrence. When the attempts exhaust, the
//! final contention failure is surfaced.
//!
//! This is an explicit wrapping policy, not interceptor machinery: callers
//! hand it a closure that performs one full attempt.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::thread;
use std::time::Duration;

use thiserror::Error;

use crate::runtime::coordinator::EnrollmentError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default total number of attempts, first try included.
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Default fixed delay between attempts (ms).
const DEFAULT_BACKOFF_MS: u64 = 200;

// ============================================================================
// SECTION: Policy Errors
// ============================================================================

/// Retry policy construction errors.
#[derive(Debug, Error)]
pub enum RetryPolicyError {
    /// A policy must allow at least one attempt.
    #[error("retry policy requires at least one attempt")]
    ZeroAttempts,
}

// ============================================================================
// SECTION: Retry Policy
// ============================================================================

/// Bounded fixed-backoff retry policy for contention failures.
///
/// # Invariants
/// - `max_attempts` >= 1; the first try counts as an attempt.
/// - Only [`EnrollmentError::is_contention`] failures are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, first try included.
    max_attempts: u32,
    /// Fixed delay between attempts.
    backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with an explicit attempt bound and backoff delay.
    ///
    /// # Errors
    ///
    /// Returns [`RetryPolicyError::ZeroAttempts`] when `max_attempts` is zero.
    pub const fn new(max_attempts: u32, backoff: Duration) -> Result<Self, RetryPolicyError> {
        if max_attempts == 0 {
            return Err(RetryPolicyError::ZeroAttempts);
        }
        Ok(Self {
            max_attempts,
            backoff,
        })
    }

    /// Returns the total attempt bound.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the fixed delay between attempts.
    #[must_use]
    pub const fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Runs one operation under the policy.
    ///
    /// The closure performs a whole attempt from the exclusive read onward;
    /// it is re-invoked only while it fails with lock contention and attempts
    /// remain.
    ///
    /// # Errors
    ///
    /// Returns the operation's first non-contention failure unmodified, or
    /// the final contention failure once the attempt bound is exhausted.
    pub fn run<T, F>(&self, mut operation: F) -> Result<T, EnrollmentError>
    where
        F: FnMut() -> Result<T, EnrollmentError>,
    {
        let mut attempt = 1;
        loop {
            match operation() {
                Err(error) if error.is_contention() && attempt < self.max_attempts => {
                    attempt += 1;
                    if !self.backoff.is_zero() {
                        thread::sleep(self.backoff);
                    }
                }
                outcome => return outcome,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::RetryPolicy;

    #[test]
    fn zero_attempt_policies_are_rejected() {
        assert!(RetryPolicy::new(0, Duration::ZERO).is_err());
    }

    #[test]
    fn default_policy_matches_the_contention_bound() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.backoff(), Duration::from_millis(200));
    }
}
