// crates/lectern-core/tests/enrollment_sequences.rs
// ============================================================================
// Module: Enrollment Sequence Tests
// Description: Deterministic fuzz-style coverage for sequential workloads.
// Purpose: Ensure the seat invariant holds across arbitrary attempt sequences.
// ============================================================================
//! ## Overview
//! Sweeps capacity/applicant grids through the service and checks that the
//! counter always equals the number of granted seats, never exceeds capacity,
//! and that re-applying every granted student is rejected.

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
use lectern_core::EnrollmentError;
use lectern_core::EnrollmentService;
use lectern_core::EnrollmentStore;
use lectern_core::InMemoryEnrollmentStore;
use lectern_core::NewLecture;
use lectern_core::Timestamp;

#[test]
fn sequential_workloads_never_oversubscribe() {
    for capacity in 1..6_u32 {
        for applicants in 0..10_u32 {
            let store = InMemoryEnrollmentStore::new();
            let lecture = store
                .insert_lecture(&NewLecture {
                    title: format!("lecture-{capacity}-{applicants}"),
                    instructor: "Knuth".to_string(),
                    capacity,
                    current_enrollment: 0,
                    scheduled_at: Timestamp::Logical(0),
                })
                .unwrap();
            let service = EnrollmentService::new(store.clone());

            let mut granted = Vec::new();
            for index in 0..applicants {
                let outcome = service.apply_lecture(
                    &lecture.lecture_id,
                    &Applicant::New {
                        name: format!("student-{index}"),
                    },
                    Timestamp::Logical(u64::from(index)),
                );
                match outcome {
                    Ok(receipt) => granted.push(receipt.application.student_id),
                    Err(EnrollmentError::CapacityExceeded { .. }) => {}
                    Err(other) => panic!("unexpected failure: {other}"),
                }
            }

            let expected = applicants.min(capacity);
            assert_eq!(granted.len(), usize::try_from(expected).unwrap());
            let persisted = store.lecture(&lecture.lecture_id).unwrap().unwrap();
            assert_eq!(persisted.current_enrollment, expected);
            assert!(persisted.current_enrollment <= persisted.capacity);

            // The duplicate check precedes the capacity check, so every
            // granted student is rejected as a duplicate even when full.
            for student_id in granted {
                let retry = service.apply_lecture(
                    &lecture.lecture_id,
                    &Applicant::Registered(student_id),
                    Timestamp::Logical(99),
                );
                assert!(matches!(retry, Err(EnrollmentError::DuplicateApplication { .. })));
            }
        }
    }
}
