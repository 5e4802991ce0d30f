// crates/lectern-store-sqlite/tests/enrollment_flow.rs
// ============================================================================
// Module: Durable Enrollment Flow Tests
// Description: Coordinator and service flows over the SQLite store.
// Purpose: Validate the seat invariants end to end on durable storage.
// Dependencies: lectern-store-sqlite, lectern-core, tempfile
// ============================================================================
//! ## Overview
//! Runs the enrollment service against the SQLite store: single attempts,
//! duplicate and capacity rejections, and thread-level races where the busy
//! timeout and the retry policy absorb writer-lock contention.

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

use std::sync::Arc;
use std::sync::Barrier;
use std::thread;
use std::time::Duration;

use lectern_core::Applicant;
use lectern_core::EnrollmentError;
use lectern_core::EnrollmentService;
use lectern_core::EnrollmentStore;
use lectern_core::NewLecture;
use lectern_core::RetryPolicy;
use lectern_core::Timestamp;
use lectern_store_sqlite::SqliteEnrollmentStore;
use lectern_store_sqlite::SqliteStoreConfig;
use lectern_store_sqlite::SqliteStoreMode;
use lectern_store_sqlite::SqliteSyncMode;
use tempfile::TempDir;

fn open_store(dir: &TempDir, busy_timeout_ms: u64) -> SqliteEnrollmentStore {
    SqliteEnrollmentStore::new(SqliteStoreConfig {
        path: dir.path().join("lectern.db"),
        busy_timeout_ms,
        journal_mode: SqliteStoreMode::Wal,
        sync_mode: SqliteSyncMode::Normal,
    })
    .expect("open store")
}

fn lecture_request(capacity: u32, current_enrollment: u32) -> NewLecture {
    NewLecture {
        title: "Concurrency Control".to_string(),
        instructor: "Bernstein".to_string(),
        capacity,
        current_enrollment,
        scheduled_at: Timestamp::UnixMillis(1_760_000_000_000),
    }
}

/// Verifies the full success flow over durable storage.
#[test]
fn enrollment_commits_one_seat_durably() {
    let dir = TempDir::new().expect("temp dir");
    let store = open_store(&dir, 1_000);
    let lecture = store.insert_lecture(&lecture_request(30, 5)).unwrap();
    let service = EnrollmentService::new(store.clone());

    let receipt = service
        .apply_lecture(
            &lecture.lecture_id,
            &Applicant::New {
                name: "Hong Gildong".to_string(),
            },
            Timestamp::Logical(1),
        )
        .unwrap();

    assert_eq!(receipt.lecture.current_enrollment, 6);
    let loaded = store.lecture(&lecture.lecture_id).unwrap().unwrap();
    assert_eq!(loaded.current_enrollment, 6);
    assert_eq!(loaded.revision, 1);
    assert_eq!(service.completed_lectures(&receipt.application.student_id).unwrap().len(), 1);
}

#[test]
fn duplicates_and_full_lectures_are_rejected_durably() {
    let dir = TempDir::new().expect("temp dir");
    let store = open_store(&dir, 1_000);
    let lecture = store.insert_lecture(&lecture_request(1, 0)).unwrap();
    let student = store.insert_student("Kim Cheolsu").unwrap();
    let other = store.insert_student("Lee Younghee").unwrap();
    let service = EnrollmentService::new(store.clone());

    service
        .apply_lecture(
            &lecture.lecture_id,
            &Applicant::Registered(student.student_id),
            Timestamp::Logical(1),
        )
        .unwrap();

    let duplicate = service.apply_lecture(
        &lecture.lecture_id,
        &Applicant::Registered(student.student_id),
        Timestamp::Logical(2),
    );
    assert!(matches!(duplicate, Err(EnrollmentError::DuplicateApplication { .. })));

    let full = service.apply_lecture(
        &lecture.lecture_id,
        &Applicant::Registered(other.student_id),
        Timestamp::Logical(3),
    );
    assert!(matches!(full, Err(EnrollmentError::CapacityExceeded { .. })));

    let loaded = store.lecture(&lecture.lecture_id).unwrap().unwrap();
    assert_eq!(loaded.current_enrollment, 1);
}

/// Verifies racing threads fill exactly the free seats on durable storage.
#[test]
fn concurrent_threads_fill_exactly_the_free_seats() {
    let dir = TempDir::new().expect("temp dir");
    let store = open_store(&dir, 5_000);
    let lecture = store.insert_lecture(&lecture_request(5, 0)).unwrap();
    let policy = RetryPolicy::new(5, Duration::from_millis(20)).expect("nonzero attempts");

    let barrier = Arc::new(Barrier::new(12));
    let handles: Vec<_> = (0..12)
        .map(|index| {
            let barrier = Arc::clone(&barrier);
            let service = EnrollmentService::with_retry(store.clone(), policy);
            let lecture_id = lecture.lecture_id;
            thread::spawn(move || {
                let applicant = Applicant::New {
                    name: format!("student-{index}"),
                };
                barrier.wait();
                service.apply_lecture(&lecture_id, &applicant, Timestamp::Logical(1))
            })
        })
        .collect();
    let outcomes: Vec<_> =
        handles.into_iter().map(|handle| handle.join().expect("enrollment thread")).collect();

    let successes = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    let capacity_failures = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, Err(EnrollmentError::CapacityExceeded { .. })))
        .count();
    assert_eq!(successes, 5);
    assert_eq!(capacity_failures, 7);

    let loaded = store.lecture(&lecture.lecture_id).unwrap().unwrap();
    assert_eq!(loaded.current_enrollment, 5);
}
