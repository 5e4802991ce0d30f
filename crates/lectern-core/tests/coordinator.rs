// crates/lectern-core/tests/coordinator.rs
// ============================================================================
// Module: Enrollment Coordinator Tests
// Description: Tests for the single-attempt enrollment transaction.
// Purpose: Validate the seat and duplicate invariants on every outcome path.
// Dependencies: lectern-core
// ============================================================================
//! ## Overview
//! Ensures one enrollment attempt grants exactly one seat, rejects duplicate
//! and over-capacity attempts without mutating state, and fails closed on
//! unknown lectures.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use lectern_core::Applicant;
use lectern_core::ApplicationStatus;
use lectern_core::EnrollmentCoordinator;
use lectern_core::EnrollmentError;
use lectern_core::EnrollmentStore;
use lectern_core::InMemoryEnrollmentStore;
use lectern_core::LectureId;
use lectern_core::NewLecture;
use lectern_core::Timestamp;

/// Provisioning request with a preseeded seat counter.
fn lecture_request(capacity: u32, current_enrollment: u32) -> NewLecture {
    NewLecture {
        title: "Operating Systems".to_string(),
        instructor: "Ritchie".to_string(),
        capacity,
        current_enrollment,
        scheduled_at: Timestamp::UnixMillis(1_760_000_000_000),
    }
}

/// Verifies a successful attempt grants one seat and records one application.
#[test]
fn enrollment_grants_exactly_one_seat() {
    let store = InMemoryEnrollmentStore::new();
    let coordinator = EnrollmentCoordinator::new(store.clone());
    let lecture = store.insert_lecture(&lecture_request(30, 5)).unwrap();

    let applicant = Applicant::New {
        name: "Hong Gildong".to_string(),
    };
    let receipt = coordinator
        .apply_lecture(&lecture.lecture_id, &applicant, Timestamp::Logical(1))
        .unwrap();

    assert_eq!(receipt.lecture.current_enrollment, 6);
    assert_eq!(receipt.lecture.revision, 1);
    assert_eq!(receipt.application.lecture_id, lecture.lecture_id);
    assert_eq!(receipt.application.status, ApplicationStatus::Applied);
    assert_eq!(receipt.application.applied_at, Timestamp::Logical(1));

    let persisted = store.lecture(&lecture.lecture_id).unwrap().unwrap();
    assert_eq!(persisted.current_enrollment, 6);
    assert_eq!(persisted.revision, 1);

    let completed = coordinator.completed_lectures(&receipt.application.student_id).unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].lecture_id, lecture.lecture_id);
}

/// Verifies first-time applicants get a persisted identity before the checks.
#[test]
fn new_applicants_are_persisted_with_an_identity() {
    let store = InMemoryEnrollmentStore::new();
    let coordinator = EnrollmentCoordinator::new(store.clone());
    let lecture = store.insert_lecture(&lecture_request(10, 0)).unwrap();

    let applicant = Applicant::New {
        name: "Kim Cheolsu".to_string(),
    };
    let receipt =
        coordinator.apply_lecture(&lecture.lecture_id, &applicant, Timestamp::Logical(2)).unwrap();

    let student = store.student(&receipt.application.student_id).unwrap().unwrap();
    assert_eq!(student.name, "Kim Cheolsu");
}

#[test]
fn second_application_for_the_same_pair_is_rejected() {
    let store = InMemoryEnrollmentStore::new();
    let coordinator = EnrollmentCoordinator::new(store.clone());
    let lecture = store.insert_lecture(&lecture_request(30, 0)).unwrap();
    let student = store.insert_student("Hong Gildong").unwrap();
    let applicant = Applicant::Registered(student.student_id);

    coordinator.apply_lecture(&lecture.lecture_id, &applicant, Timestamp::Logical(1)).unwrap();
    let error = coordinator
        .apply_lecture(&lecture.lecture_id, &applicant, Timestamp::Logical(2))
        .unwrap_err();

    assert!(matches!(error, EnrollmentError::DuplicateApplication { .. }));
    let persisted = store.lecture(&lecture.lecture_id).unwrap().unwrap();
    assert_eq!(persisted.current_enrollment, 1);
    assert_eq!(coordinator.completed_lectures(&student.student_id).unwrap().len(), 1);
}

#[test]
fn full_lectures_reject_further_applications() {
    let store = InMemoryEnrollmentStore::new();
    let coordinator = EnrollmentCoordinator::new(store.clone());
    let lecture = store.insert_lecture(&lecture_request(30, 30)).unwrap();
    let student = store.insert_student("Kim Cheolsu").unwrap();

    let error = coordinator
        .apply_lecture(
            &lecture.lecture_id,
            &Applicant::Registered(student.student_id),
            Timestamp::Logical(1),
        )
        .unwrap_err();

    assert!(matches!(error, EnrollmentError::CapacityExceeded { capacity: 30, .. }));
    let persisted = store.lecture(&lecture.lecture_id).unwrap().unwrap();
    assert_eq!(persisted.current_enrollment, 30);
    assert_eq!(persisted.revision, 0);
    assert!(coordinator.completed_lectures(&student.student_id).unwrap().is_empty());
}

#[test]
fn unknown_lectures_fail_closed_without_state_changes() {
    let store = InMemoryEnrollmentStore::new();
    let coordinator = EnrollmentCoordinator::new(store.clone());
    let missing = LectureId::from_raw(404).unwrap();

    let error = coordinator
        .apply_lecture(
            &missing,
            &Applicant::New {
                name: "Nobody".to_string(),
            },
            Timestamp::Logical(1),
        )
        .unwrap_err();

    assert!(matches!(error, EnrollmentError::LectureNotFound(id) if id == missing));
    assert!(store.lecture(&missing).unwrap().is_none());
}

/// Verifies a rejected attempt discards the staged student row as well.
#[test]
fn failed_attempts_leave_no_partial_state() {
    let store = InMemoryEnrollmentStore::new();
    let coordinator = EnrollmentCoordinator::new(store.clone());
    let lecture = store.insert_lecture(&lecture_request(1, 1)).unwrap();

    let error = coordinator
        .apply_lecture(
            &lecture.lecture_id,
            &Applicant::New {
                name: "Turned Away".to_string(),
            },
            Timestamp::Logical(1),
        )
        .unwrap_err();
    assert!(matches!(error, EnrollmentError::CapacityExceeded { .. }));

    // The staged student identity from the aborted attempt must not be visible.
    let persisted = store.lecture(&lecture.lecture_id).unwrap().unwrap();
    assert_eq!(persisted.current_enrollment, 1);
    assert_eq!(persisted.revision, 0);
}

/// Verifies the completed-lectures read follows application insertion order.
#[test]
fn completed_lectures_follow_insertion_order() {
    let store = InMemoryEnrollmentStore::new();
    let coordinator = EnrollmentCoordinator::new(store.clone());
    let first = store.insert_lecture(&lecture_request(5, 0)).unwrap();
    let second = store.insert_lecture(&lecture_request(5, 0)).unwrap();
    let student = store.insert_student("Hong Gildong").unwrap();
    let applicant = Applicant::Registered(student.student_id);

    coordinator.apply_lecture(&second.lecture_id, &applicant, Timestamp::Logical(1)).unwrap();
    coordinator.apply_lecture(&first.lecture_id, &applicant, Timestamp::Logical(2)).unwrap();

    let completed = coordinator.completed_lectures(&student.student_id).unwrap();
    let ids: Vec<_> = completed.iter().map(|lecture| lecture.lecture_id).collect();
    assert_eq!(ids, vec![second.lecture_id, first.lecture_id]);
}
