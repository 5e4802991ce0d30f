// crates/lectern-core/src/core/mod.rs
// ============================================================================
// Module: Lectern Core Model
// Description: Canonical identifiers, records, and time values for enrollment.
// Purpose: Define the persisted data model shared by stores and the runtime.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Core modules define the enrollment data model: strongly typed identifiers,
//! the lecture/student/application records, and the explicit time values
//! embedded in them. Behavior lives in [`crate::runtime`]; persistence
//! contracts live in [`crate::interfaces`].

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod identifiers;
pub mod records;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use identifiers::ApplicationId;
pub use identifiers::LectureId;
pub use identifiers::StudentId;
pub use records::Applicant;
pub use records::Application;
pub use records::ApplicationStatus;
pub use records::Lecture;
pub use records::NewLecture;
pub use records::RecordError;
pub use records::Student;
pub use time::Timestamp;
