// crates/lectern-core/src/runtime/store.rs
// ============================================================================
// Module: Lectern In-Memory Store
// Description: Simple in-memory enrollment store for tests and examples.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::{core, interfaces, runtime::locks}
// ============================================================================

//! ## Overview
//! This module provides a simple in-memory implementation of
//! [`EnrollmentStore`] for tests and local demos. It is not intended for
//! production use; the durable store lives in `lectern-store-sqlite`.
//!
//! Transactions stage their writes and apply them under the state mutex on
//! commit, so a dropped transaction leaves no trace. Per-lecture serialization
//! comes from the row lock table; leases for different lectures never block
//! each other.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use crate::core::Application;
use crate::core::ApplicationId;
use crate::core::ApplicationStatus;
use crate::core::Lecture;
use crate::core::LectureId;
use crate::core::NewLecture;
use crate::core::Student;
use crate::core::StudentId;
use crate::core::Timestamp;
use crate::interfaces::EnrollmentStore;
use crate::interfaces::EnrollmentTxn;
use crate::interfaces::StoreError;
use crate::runtime::locks::RowLockGuard;
use crate::runtime::locks::RowLockTable;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default bound on the exclusive row lock wait (ms).
const DEFAULT_LOCK_WAIT_MS: u64 = 5_000;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Row state shared by all handles to one in-memory store.
#[derive(Debug, Default)]
struct StoreState {
    /// Lecture rows keyed by raw lecture id.
    lectures: BTreeMap<u64, Lecture>,
    /// Student rows keyed by raw student id.
    students: BTreeMap<u64, Student>,
    /// Application rows keyed by raw application id (insertion order).
    applications: BTreeMap<u64, Application>,
}

/// Shared interior of the in-memory store.
#[derive(Debug)]
struct StoreInner {
    /// Committed row state protected by a mutex.
    state: Mutex<StoreState>,
    /// Per-lecture exclusive lock table.
    locks: Arc<RowLockTable>,
    /// Next lecture identity (1-based).
    next_lecture_id: AtomicU64,
    /// Next student identity (1-based).
    next_student_id: AtomicU64,
    /// Next application identity (1-based).
    next_application_id: AtomicU64,
}

impl StoreInner {
    /// Locks the committed row state.
    fn state(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Store("enrollment store mutex poisoned".to_string()))
    }

    /// Draws the next identity from a 1-based sequence.
    fn next_id(sequence: &AtomicU64) -> Result<u64, StoreError> {
        let raw = sequence.fetch_add(1, Ordering::SeqCst);
        if raw == 0 {
            return Err(StoreError::Store("identifier sequence wrapped".to_string()));
        }
        Ok(raw)
    }
}

/// In-memory enrollment store for tests and examples.
#[derive(Debug, Clone)]
pub struct InMemoryEnrollmentStore {
    /// Shared row state and lock table.
    inner: Arc<StoreInner>,
    /// Bound on the exclusive row lock wait.
    lock_wait: Duration,
}

impl Default for InMemoryEnrollmentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEnrollmentStore {
    /// Creates a new in-memory enrollment store with the default lock wait.
    #[must_use]
    pub fn new() -> Self {
        Self::with_lock_timeout(Duration::from_millis(DEFAULT_LOCK_WAIT_MS))
    }

    /// Creates a new in-memory enrollment store with an explicit lock wait bound.
    #[must_use]
    pub fn with_lock_timeout(lock_wait: Duration) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: Mutex::new(StoreState::default()),
                locks: Arc::new(RowLockTable::new()),
                next_lecture_id: AtomicU64::new(1),
                next_student_id: AtomicU64::new(1),
                next_application_id: AtomicU64::new(1),
            }),
            lock_wait,
        }
    }
}

impl EnrollmentStore for InMemoryEnrollmentStore {
    fn begin_exclusive(
        &self,
        lecture_id: &LectureId,
    ) -> Result<Option<Box<dyn EnrollmentTxn + '_>>, StoreError> {
        let lease = self.inner.locks.acquire(lecture_id, self.lock_wait)?;
        let lecture = {
            let state = self.inner.state()?;
            state.lectures.get(&lecture_id.get()).cloned()
        };
        let Some(lecture) = lecture else {
            drop(lease);
            return Ok(None);
        };
        Ok(Some(Box::new(InMemoryTxn {
            inner: Arc::clone(&self.inner),
            _lease: lease,
            lecture,
            staged_lecture: None,
            staged_students: Vec::new(),
            staged_applications: Vec::new(),
        })))
    }

    fn insert_lecture(&self, lecture: &NewLecture) -> Result<Lecture, StoreError> {
        lecture.validate().map_err(|err| StoreError::Invalid(err.to_string()))?;
        let raw = StoreInner::next_id(&self.inner.next_lecture_id)?;
        let lecture_id = LectureId::from_raw(raw)
            .ok_or_else(|| StoreError::Store("identifier sequence produced zero".to_string()))?;
        let row = Lecture {
            lecture_id,
            title: lecture.title.clone(),
            instructor: lecture.instructor.clone(),
            capacity: lecture.capacity,
            current_enrollment: lecture.current_enrollment,
            scheduled_at: lecture.scheduled_at,
            revision: 0,
        };
        let mut state = self.inner.state()?;
        state.lectures.insert(raw, row.clone());
        drop(state);
        Ok(row)
    }

    fn insert_student(&self, name: &str) -> Result<Student, StoreError> {
        let raw = StoreInner::next_id(&self.inner.next_student_id)?;
        let student_id = StudentId::from_raw(raw)
            .ok_or_else(|| StoreError::Store("identifier sequence produced zero".to_string()))?;
        let student = Student {
            student_id,
            name: name.to_string(),
        };
        let mut state = self.inner.state()?;
        state.students.insert(raw, student.clone());
        drop(state);
        Ok(student)
    }

    fn lecture(&self, lecture_id: &LectureId) -> Result<Option<Lecture>, StoreError> {
        let state = self.inner.state()?;
        Ok(state.lectures.get(&lecture_id.get()).cloned())
    }

    fn student(&self, student_id: &StudentId) -> Result<Option<Student>, StoreError> {
        let state = self.inner.state()?;
        Ok(state.students.get(&student_id.get()).cloned())
    }

    fn applied_lectures(
        &self,
        student_id: &StudentId,
        status: ApplicationStatus,
    ) -> Result<Vec<Lecture>, StoreError> {
        let state = self.inner.state()?;
        let mut lectures = Vec::new();
        for application in state.applications.values() {
            if application.student_id != *student_id || application.status != status {
                continue;
            }
            let lecture = state.lectures.get(&application.lecture_id.get()).ok_or_else(|| {
                StoreError::Invalid(format!(
                    "application {} references missing lecture {}",
                    application.application_id, application.lecture_id
                ))
            })?;
            lectures.push(lecture.clone());
        }
        Ok(lectures)
    }
}

// ============================================================================
// SECTION: In-Memory Transaction
// ============================================================================

/// One staged enrollment transaction over the in-memory store.
struct InMemoryTxn {
    /// Shared store interior.
    inner: Arc<StoreInner>,
    /// Exclusive lease on the lecture row, held until drop.
    _lease: RowLockGuard,
    /// Locked lecture row as read at transaction start.
    lecture: Lecture,
    /// Staged lecture update, if any.
    staged_lecture: Option<Lecture>,
    /// Staged new student rows.
    staged_students: Vec<Student>,
    /// Staged application rows.
    staged_applications: Vec<Application>,
}

impl EnrollmentTxn for InMemoryTxn {
    fn lecture(&self) -> &Lecture {
        &self.lecture
    }

    fn save_lecture(&mut self, lecture: &Lecture) -> Result<Lecture, StoreError> {
        if lecture.lecture_id != self.lecture.lecture_id {
            return Err(StoreError::Invalid(format!(
                "transaction holds lecture {} but save targeted {}",
                self.lecture.lecture_id, lecture.lecture_id
            )));
        }
        lecture.validate().map_err(|err| StoreError::Invalid(err.to_string()))?;
        let mut staged = lecture.clone();
        staged.revision = lecture.revision.wrapping_add(1);
        self.staged_lecture = Some(staged.clone());
        Ok(staged)
    }

    fn save_student(&mut self, name: &str) -> Result<Student, StoreError> {
        let raw = StoreInner::next_id(&self.inner.next_student_id)?;
        let student_id = StudentId::from_raw(raw)
            .ok_or_else(|| StoreError::Store("identifier sequence produced zero".to_string()))?;
        let student = Student {
            student_id,
            name: name.to_string(),
        };
        self.staged_students.push(student.clone());
        Ok(student)
    }

    fn application_exists(
        &self,
        lecture_id: &LectureId,
        student_id: &StudentId,
    ) -> Result<bool, StoreError> {
        let staged = self.staged_applications.iter().any(|application| {
            application.lecture_id == *lecture_id
                && application.student_id == *student_id
                && application.status == ApplicationStatus::Applied
        });
        if staged {
            return Ok(true);
        }
        let state = self.inner.state()?;
        Ok(state.applications.values().any(|application| {
            application.lecture_id == *lecture_id
                && application.student_id == *student_id
                && application.status == ApplicationStatus::Applied
        }))
    }

    fn insert_application(
        &mut self,
        lecture_id: &LectureId,
        student_id: &StudentId,
        applied_at: Timestamp,
    ) -> Result<Application, StoreError> {
        let raw = StoreInner::next_id(&self.inner.next_application_id)?;
        let application_id = ApplicationId::from_raw(raw)
            .ok_or_else(|| StoreError::Store("identifier sequence produced zero".to_string()))?;
        let application = Application {
            application_id,
            lecture_id: *lecture_id,
            student_id: *student_id,
            applied_at,
            status: ApplicationStatus::Applied,
        };
        self.staged_applications.push(application.clone());
        Ok(application)
    }

    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let mut state = self.inner.state()?;
        for student in &self.staged_students {
            state.students.insert(student.student_id.get(), student.clone());
        }
        for application in &self.staged_applications {
            state.applications.insert(application.application_id.get(), application.clone());
        }
        if let Some(lecture) = &self.staged_lecture {
            state.lectures.insert(lecture.lecture_id.get(), lecture.clone());
        }
        drop(state);
        Ok(())
    }
}
