// crates/lectern-core/src/runtime/service.rs
// ============================================================================
// Module: Enrollment Service Facade
// Description: Caller-facing entry point combining coordinator and retry.
// Purpose: Expose the canonical enrollment surface for host applications.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! The service facade is what host surfaces call. It wraps every enrollment
//! attempt in the contention retry policy and passes reads through untouched,
//! so all surfaces share one execution path and one set of invariants.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::Applicant;
use crate::core::Lecture;
use crate::core::LectureId;
use crate::core::StudentId;
use crate::core::Timestamp;
use crate::interfaces::EnrollmentStore;
use crate::runtime::coordinator::EnrollmentCoordinator;
use crate::runtime::coordinator::EnrollmentError;
use crate::runtime::coordinator::EnrollmentReceipt;
use crate::runtime::retry::RetryPolicy;

// ============================================================================
// SECTION: Enrollment Service
// ============================================================================

/// Caller-facing enrollment service.
#[derive(Debug, Clone)]
pub struct EnrollmentService<S> {
    /// Coordinator executing single attempts.
    coordinator: EnrollmentCoordinator<S>,
    /// Contention retry policy around each attempt.
    retry: RetryPolicy,
}

impl<S> EnrollmentService<S>
where
    S: EnrollmentStore,
{
    /// Creates a service with the default retry policy.
    pub fn new(store: S) -> Self {
        Self::with_retry(store, RetryPolicy::default())
    }

    /// Creates a service with an explicit retry policy.
    pub const fn with_retry(store: S, retry: RetryPolicy) -> Self {
        Self {
            coordinator: EnrollmentCoordinator::new(store),
            retry,
        }
    }

    /// Returns the inner coordinator.
    pub const fn coordinator(&self) -> &EnrollmentCoordinator<S> {
        &self.coordinator
    }

    /// Submits one enrollment attempt under the retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError`] exactly as the coordinator surfaces it;
    /// lock-contention failures are retried up to the policy bound first.
    pub fn apply_lecture(
        &self,
        lecture_id: &LectureId,
        applicant: &Applicant,
        applied_at: Timestamp,
    ) -> Result<EnrollmentReceipt, EnrollmentError> {
        self.retry
            .run(|| self.coordinator.apply_lecture(lecture_id, applicant, applied_at))
    }

    /// Lists the lectures the student holds an applied seat for.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::Store`] when the store cannot be read.
    pub fn completed_lectures(
        &self,
        student_id: &StudentId,
    ) -> Result<Vec<Lecture>, EnrollmentError> {
        self.coordinator.completed_lectures(student_id)
    }
}
