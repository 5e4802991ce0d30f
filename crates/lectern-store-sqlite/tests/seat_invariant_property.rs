// crates/lectern-store-sqlite/tests/seat_invariant_property.rs
// ============================================================================
// Module: Seat Invariant Property Tests
// Description: Property-based coverage for sequential durable workloads.
// Purpose: Ensure the counter always matches granted seats and never exceeds
// capacity, for arbitrary capacities and applicant counts.
// Dependencies: lectern-store-sqlite, lectern-core, proptest, tempfile
// ============================================================================
//! ## Overview
//! Drives the service over the SQLite store with generated workloads. After
//! any sequence of attempts the counter equals `min(applicants, capacity)`
//! and every granted student re-applies into a duplicate rejection.

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
use lectern_core::NewLecture;
use lectern_core::Timestamp;
use lectern_store_sqlite::SqliteEnrollmentStore;
use lectern_store_sqlite::SqliteStoreConfig;
use lectern_store_sqlite::SqliteStoreMode;
use lectern_store_sqlite::SqliteSyncMode;
use proptest::prelude::*;
use tempfile::TempDir;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn sequential_durable_workloads_never_oversubscribe(
        capacity in 1..8_u32,
        applicants in 0..12_u32,
    ) {
        let dir = TempDir::new().expect("temp dir");
        let store = SqliteEnrollmentStore::new(SqliteStoreConfig {
            path: dir.path().join("lectern.db"),
            busy_timeout_ms: 1_000,
            journal_mode: SqliteStoreMode::Wal,
            sync_mode: SqliteSyncMode::Normal,
        })
        .expect("open store");
        let lecture = store
            .insert_lecture(&NewLecture {
                title: "Generated Lecture".to_string(),
                instructor: "Generator".to_string(),
                capacity,
                current_enrollment: 0,
                scheduled_at: Timestamp::Logical(0),
            })
            .expect("provision lecture");
        let service = EnrollmentService::new(store.clone());

        let mut granted = Vec::new();
        for index in 0..applicants {
            let outcome = service.apply_lecture(
                &lecture.lecture_id,
                &Applicant::New { name: format!("student-{index}") },
                Timestamp::Logical(u64::from(index)),
            );
            match outcome {
                Ok(receipt) => granted.push(receipt.application.student_id),
                Err(EnrollmentError::CapacityExceeded { .. }) => {}
                Err(other) => panic!("unexpected failure: {other}"),
            }
        }

        let expected = applicants.min(capacity);
        let loaded = store.lecture(&lecture.lecture_id).expect("read lecture").expect("row");
        assert_eq!(u32::try_from(granted.len()).expect("count fits"), expected);
        assert_eq!(loaded.current_enrollment, expected);
        assert!(loaded.current_enrollment <= loaded.capacity);

        for student_id in granted {
            let retry = service.apply_lecture(
                &lecture.lecture_id,
                &Applicant::Registered(student_id),
                Timestamp::Logical(999),
            );
            assert!(matches!(retry, Err(EnrollmentError::DuplicateApplication { .. })));
        }
    }
}
