// crates/lectern-core/src/runtime/coordinator.rs
// ============================================================================
// Module: Enrollment Coordinator
// Description: Serialized enrollment transactions over one lecture row.
// Purpose: Execute seat-granting attempts with duplicate and capacity invariants.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The coordinator is the single canonical execution path for enrollment. Any
//! caller-facing surface must go through these methods to preserve the seat
//! invariants. One attempt is one atomic unit of work: the lecture row is read
//! under an exclusive lock, both invariants are checked before any write, and
//! the application row plus counter increment commit together or not at all.
//!
//! Attempts against the same lecture id are serialized by the store's row
//! lock into a strict total order; attempts against different lecture ids may
//! proceed in parallel. Under N concurrent attempts with K free seats,
//! exactly `min(N, K)` commit.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::Applicant;
use crate::core::Application;
use crate::core::ApplicationStatus;
use crate::core::Lecture;
use crate::core::LectureId;
use crate::core::StudentId;
use crate::core::Timestamp;
use crate::interfaces::EnrollmentStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Enrollment Errors
// ============================================================================

/// Enrollment errors surfaced to callers.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Only lock-contention store failures are retryable; the three invariant
///   failures are final on first occurrence.
#[derive(Debug, Error)]
pub enum EnrollmentError {
    /// Referenced lecture does not exist.
    #[error("lecture not found: {0}")]
    LectureNotFound(LectureId),
    /// Student already holds an applied seat for the lecture.
    #[error("student {student_id} already applied to lecture {lecture_id}")]
    DuplicateApplication {
        /// Lecture the duplicate attempt targeted.
        lecture_id: LectureId,
        /// Student who already applied.
        student_id: StudentId,
    },
    /// Every seat of the lecture is taken.
    #[error("lecture {lecture_id} capacity of {capacity} seats exceeded")]
    CapacityExceeded {
        /// Lecture whose seats are exhausted.
        lecture_id: LectureId,
        /// Seat capacity of the lecture.
        capacity: u32,
    },
    /// Enrollment store error.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EnrollmentError {
    /// Returns true when the failure is transient lock contention.
    #[must_use]
    pub const fn is_contention(&self) -> bool {
        matches!(self, Self::Store(StoreError::LockContention(_)))
    }
}

// ============================================================================
// SECTION: Enrollment Receipt
// ============================================================================

/// Outcome of one committed enrollment attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentReceipt {
    /// Application row created by the attempt.
    pub application: Application,
    /// Lecture row after the seat counter increment.
    pub lecture: Lecture,
}

// ============================================================================
// SECTION: Enrollment Coordinator
// ============================================================================

/// Coordinator executing enrollment attempts against an injected store.
#[derive(Debug, Clone)]
pub struct EnrollmentCoordinator<S> {
    /// Enrollment store implementation.
    store: S,
}

impl<S> EnrollmentCoordinator<S>
where
    S: EnrollmentStore,
{
    /// Creates a new coordinator over the given store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Executes one enrollment attempt as a single atomic unit of work.
    ///
    /// The lecture row is resolved under an exclusive lock that blocks until
    /// every other in-flight attempt for the same lecture has committed or
    /// aborted. First-time applicants are persisted before the duplicate
    /// check, which is keyed by identity. Both invariant checks precede every
    /// write; on any failure the transaction is dropped uncommitted and the
    /// store discards the attempt's writes.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::LectureNotFound`] for an unknown lecture,
    /// [`EnrollmentError::DuplicateApplication`] when the student already
    /// holds an applied seat, [`EnrollmentError::CapacityExceeded`] when the
    /// lecture is full, and [`EnrollmentError::Store`] for store failures,
    /// including the retryable [`StoreError::LockContention`].
    pub fn apply_lecture(
        &self,
        lecture_id: &LectureId,
        applicant: &Applicant,
        applied_at: Timestamp,
    ) -> Result<EnrollmentReceipt, EnrollmentError> {
        let Some(mut txn) = self.store.begin_exclusive(lecture_id)? else {
            return Err(EnrollmentError::LectureNotFound(*lecture_id));
        };
        let lecture = txn.lecture().clone();

        let student_id = match applicant {
            Applicant::Registered(student_id) => *student_id,
            Applicant::New { name } => txn.save_student(name)?.student_id,
        };

        if txn.application_exists(lecture_id, &student_id)? {
            return Err(EnrollmentError::DuplicateApplication {
                lecture_id: *lecture_id,
                student_id,
            });
        }

        if lecture.is_full() {
            return Err(EnrollmentError::CapacityExceeded {
                lecture_id: *lecture_id,
                capacity: lecture.capacity,
            });
        }

        let application = txn.insert_application(lecture_id, &student_id, applied_at)?;

        let mut updated = lecture;
        updated.current_enrollment += 1;
        let persisted = txn.save_lecture(&updated)?;
        txn.commit()?;

        Ok(EnrollmentReceipt {
            application,
            lecture: persisted,
        })
    }

    /// Lists the lectures the student holds an applied seat for, in
    /// application insertion order.
    ///
    /// Pure read with no locking; it may observe a slightly stale snapshot
    /// concurrent with in-flight enrollment attempts.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::Store`] when the store cannot be read.
    pub fn completed_lectures(
        &self,
        student_id: &StudentId,
    ) -> Result<Vec<Lecture>, EnrollmentError> {
        Ok(self.store.applied_lectures(student_id, ApplicationStatus::Applied)?)
    }
}
