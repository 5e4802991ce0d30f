// crates/lectern-core/src/core/records.rs
// ============================================================================
// Module: Lectern Enrollment Records
// Description: Lecture, student, and application records with seat invariants.
// Purpose: Capture the persisted enrollment state mutated by the coordinator.
// Dependencies: crate::core::{identifiers, time}, serde, thiserror
// ============================================================================

//! ## Overview
//! Records model the three persisted row kinds: capacity-limited lectures,
//! students, and append-only applications joining the two. The seat counter on
//! a lecture is denormalized state kept consistent with the application rows
//! by the enrollment transaction, never recomputed from history.
//!
//! Validation is fail-closed at store boundaries: rows that violate the seat
//! invariant are rejected on save and on load.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::ApplicationId;
use crate::core::identifiers::LectureId;
use crate::core::identifiers::StudentId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Record Errors
// ============================================================================

/// Record validation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Lecture capacity must be a positive seat count.
    #[error("lecture capacity must be at least one seat")]
    ZeroCapacity,
    /// Seat counter exceeds the lecture capacity.
    #[error("enrollment counter {current_enrollment} exceeds capacity {capacity}")]
    CounterExceedsCapacity {
        /// Current enrollment counter on the row.
        current_enrollment: u32,
        /// Seat capacity of the lecture.
        capacity: u32,
    },
}

// ============================================================================
// SECTION: Lecture
// ============================================================================

/// Provisioning request for a new lecture.
///
/// # Invariants
/// - `capacity` must be >= 1; stores reject zero-capacity provisioning.
/// - `current_enrollment` must not exceed `capacity`. Normally zero; nonzero
///   values import lectures whose seats were already taken elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLecture {
    /// Lecture title.
    pub title: String,
    /// Instructor display name.
    pub instructor: String,
    /// Seat capacity.
    pub capacity: u32,
    /// Seats already taken at provisioning time.
    #[serde(default)]
    pub current_enrollment: u32,
    /// Scheduled date and time.
    pub scheduled_at: Timestamp,
}

impl NewLecture {
    /// Validates the provisioning request.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] when the seat capacity is zero or the imported
    /// counter exceeds it.
    pub const fn validate(&self) -> Result<(), RecordError> {
        if self.capacity == 0 {
            return Err(RecordError::ZeroCapacity);
        }
        if self.current_enrollment > self.capacity {
            return Err(RecordError::CounterExceedsCapacity {
                current_enrollment: self.current_enrollment,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}

/// Capacity-limited lecture row.
///
/// # Invariants
/// - `0 <= current_enrollment <= capacity` at every transaction boundary.
/// - Mutated only inside an exclusive enrollment transaction, exactly +1 per
///   successful enrollment.
/// - `revision` increases by one on every persisted mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lecture {
    /// Lecture identifier.
    pub lecture_id: LectureId,
    /// Lecture title.
    pub title: String,
    /// Instructor display name.
    pub instructor: String,
    /// Seat capacity.
    pub capacity: u32,
    /// Current enrollment counter.
    pub current_enrollment: u32,
    /// Scheduled date and time.
    pub scheduled_at: Timestamp,
    /// Monotonically increasing revision marker for concurrent-modification detection.
    pub revision: u64,
}

impl Lecture {
    /// Returns true when every seat is taken.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.current_enrollment >= self.capacity
    }

    /// Returns the number of free seats remaining.
    #[must_use]
    pub const fn seats_remaining(&self) -> u32 {
        self.capacity.saturating_sub(self.current_enrollment)
    }

    /// Validates the seat invariant on the row.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] when the capacity is zero or the counter
    /// exceeds it.
    pub const fn validate(&self) -> Result<(), RecordError> {
        if self.capacity == 0 {
            return Err(RecordError::ZeroCapacity);
        }
        if self.current_enrollment > self.capacity {
            return Err(RecordError::CounterExceedsCapacity {
                current_enrollment: self.current_enrollment,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Student
// ============================================================================

/// Student row, immutable once persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Student identifier assigned on first persistence.
    pub student_id: StudentId,
    /// Display name.
    pub name: String,
}

/// Applicant identity carried by an enrollment request.
///
/// # Invariants
/// - `New` applicants are persisted before the duplicate check, which is
///   keyed by identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Applicant {
    /// Applicant with an existing student identity.
    Registered(StudentId),
    /// First-time applicant without an identity.
    New {
        /// Display name for the student row to create.
        name: String,
    },
}

// ============================================================================
// SECTION: Application
// ============================================================================

/// Application lifecycle status.
///
/// # Invariants
/// - Variants are stable for serialization and store labels.
/// - The enrollment core only ever produces `Applied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Seat granted; the only status produced by the enrollment core.
    Applied,
    /// Reserved for cancellation flows outside this core.
    Cancelled,
}

impl ApplicationStatus {
    /// Returns the canonical store label for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a canonical store label (returns `None` for unknown labels).
    #[must_use]
    pub fn parse_label(label: &str) -> Option<Self> {
        match label {
            "applied" => Some(Self::Applied),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Append-only application row joining a student to a lecture.
///
/// # Invariants
/// - At most one row with status `Applied` exists per (lecture, student) pair.
/// - Never mutated or deleted by the enrollment core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// Application identifier, assigned in insertion order.
    pub application_id: ApplicationId,
    /// Lecture the application is for.
    pub lecture_id: LectureId,
    /// Student who applied.
    pub student_id: StudentId,
    /// When the application was submitted.
    pub applied_at: Timestamp,
    /// Application lifecycle status.
    pub status: ApplicationStatus,
}
