// crates/lectern-core/src/interfaces/mod.rs
// ============================================================================
// Module: Lectern Interfaces
// Description: Backend-agnostic interfaces for enrollment persistence.
// Purpose: Define the contract surfaces used by the Lectern runtime.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how the enrollment runtime integrates with persistence
//! backends without embedding backend-specific details. Implementations must
//! serialize concurrent enrollment transactions per lecture row and fail
//! closed on invalid data.
//!
//! The transaction surface groups the three collaborator roles from the
//! enrollment flow: the lecture lookup/locking primitive, the append-only
//! application history, and the student identity store. All writes staged
//! through one transaction become visible atomically on commit; dropping an
//! uncommitted transaction discards them and releases the row lock.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::Application;
use crate::core::ApplicationStatus;
use crate::core::Lecture;
use crate::core::LectureId;
use crate::core::NewLecture;
use crate::core::Student;
use crate::core::StudentId;
use crate::core::Timestamp;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Enrollment store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - `LockContention` is the only transient kind; everything else is
///   surfaced to the caller without retry.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("enrollment store io error: {0}")]
    Io(String),
    /// Exclusive row lock could not be acquired within the store's wait bound.
    #[error("enrollment store lock contention: {0}")]
    LockContention(String),
    /// Store data version is incompatible.
    #[error("enrollment store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store data is invalid.
    #[error("enrollment store invalid data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("enrollment store error: {0}")]
    Store(String),
}

// ============================================================================
// SECTION: Enrollment Transaction
// ============================================================================

/// One in-flight enrollment unit of work against a single lecture row.
///
/// The transaction holds the exclusive row lock acquired by
/// [`EnrollmentStore::begin_exclusive`] for its whole lifetime. Writes are
/// staged and become visible atomically on [`EnrollmentTxn::commit`];
/// dropping the transaction uncommitted aborts it, discarding every staged
/// write and releasing the lock.
pub trait EnrollmentTxn {
    /// Returns the locked lecture row as read at transaction start.
    fn lecture(&self) -> &Lecture;

    /// Stages an update of the locked lecture row and returns the row as it
    /// will be persisted, with its revision bumped.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] when the row violates the seat
    /// invariant or targets a different lecture than the locked row.
    fn save_lecture(&mut self, lecture: &Lecture) -> Result<Lecture, StoreError>;

    /// Stages a new student row, assigning its identity now.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the identity sequence cannot be advanced.
    fn save_student(&mut self, name: &str) -> Result<Student, StoreError>;

    /// Reports whether an `Applied` application exists for the pair.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the history cannot be read.
    fn application_exists(
        &self,
        lecture_id: &LectureId,
        student_id: &StudentId,
    ) -> Result<bool, StoreError>;

    /// Stages an append-only application row with status `Applied`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the history cannot accept the row.
    fn insert_application(
        &mut self,
        lecture_id: &LectureId,
        student_id: &StudentId,
        applied_at: Timestamp,
    ) -> Result<Application, StoreError>;

    /// Commits the transaction, making all staged writes visible atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the commit cannot be made durable; the
    /// transaction is rolled back in that case.
    fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Enrollment Store
// ============================================================================

/// Enrollment persistence backend.
///
/// Implementations serialize concurrent transactions against the same lecture
/// id into a strict total order; transactions against different lecture ids
/// may proceed in parallel where the backend's lock scope allows it.
pub trait EnrollmentStore {
    /// Begins an exclusive enrollment transaction against one lecture row.
    ///
    /// Blocks until every other in-flight transaction for the same lecture id
    /// has committed or aborted, up to the store's configured wait bound.
    /// Returns `Ok(None)` when the lecture does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::LockContention`] when the wait bound elapses
    /// before the lock is free, and other [`StoreError`] kinds for backend
    /// failures.
    fn begin_exclusive(
        &self,
        lecture_id: &LectureId,
    ) -> Result<Option<Box<dyn EnrollmentTxn + '_>>, StoreError>;

    /// Provisions a new lecture row (administrative surface).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] when the provisioning request fails
    /// validation.
    fn insert_lecture(&self, lecture: &NewLecture) -> Result<Lecture, StoreError>;

    /// Persists a new student row outside any enrollment attempt
    /// (administrative surface), assigning its identity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the identity sequence cannot be advanced
    /// or the row cannot be written.
    fn insert_student(&self, name: &str) -> Result<Student, StoreError>;

    /// Reads a lecture row without locking.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the row cannot be read.
    fn lecture(&self, lecture_id: &LectureId) -> Result<Option<Lecture>, StoreError>;

    /// Looks a student up by identity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the row cannot be read.
    fn student(&self, student_id: &StudentId) -> Result<Option<Student>, StoreError>;

    /// Lists lectures with an application of `status` for the student, in
    /// application insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the history cannot be read.
    fn applied_lectures(
        &self,
        student_id: &StudentId,
        status: ApplicationStatus,
    ) -> Result<Vec<Lecture>, StoreError>;
}
