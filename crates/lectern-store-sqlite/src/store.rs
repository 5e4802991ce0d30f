// crates/lectern-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Enrollment Store
// Description: Durable EnrollmentStore backed by SQLite WAL.
// Purpose: Persist lectures, students, and applications with writer-lock
// serialization and fail-closed row validation.
// Dependencies: lectern-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`EnrollmentStore`] using `SQLite`. Every
//! enrollment transaction opens a dedicated connection and issues
//! `BEGIN IMMEDIATE`, taking the database writer lock for the whole unit of
//! work. A busy timeout expiring while another transaction holds the writer
//! lock maps to [`StoreError::LockContention`], which feeds the retry policy.
//!
//! The writer lock is database-scoped, coarser than the in-memory store's
//! per-lecture lease; concurrent attempts against different lectures wait on
//! the busy handler instead of proceeding in parallel, with identical
//! outcomes. The one-`applied`-row-per-pair invariant is additionally pinned
//! down by a partial unique index.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use lectern_core::Application;
use lectern_core::ApplicationId;
use lectern_core::ApplicationStatus;
use lectern_core::EnrollmentStore;
use lectern_core::EnrollmentTxn;
use lectern_core::Lecture;
use lectern_core::LectureId;
use lectern_core::NewLecture;
use lectern_core::StoreError;
use lectern_core::Student;
use lectern_core::StudentId;
use lectern_core::Timestamp;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` enrollment store.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds; the bound on the writer-lock wait.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Writer lock was still held when the busy timeout expired.
    #[error("sqlite store busy: {0}")]
    Busy(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Busy(message) => Self::LockContention(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
        }
    }
}

/// Maps a `rusqlite` error, distinguishing writer-lock contention.
fn map_sqlite_error(error: &rusqlite::Error) -> SqliteStoreError {
    if let rusqlite::Error::SqliteFailure(inner, message) = error {
        if inner.code == rusqlite::ErrorCode::DatabaseBusy
            || inner.code == rusqlite::ErrorCode::DatabaseLocked
        {
            let detail = message.clone().unwrap_or_else(|| "database writer lock held".to_string());
            return SqliteStoreError::Busy(detail);
        }
    }
    SqliteStoreError::Db(error.to_string())
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed enrollment store with WAL support.
#[derive(Clone)]
pub struct SqliteEnrollmentStore {
    /// Store configuration.
    config: SqliteStoreConfig,
    /// Shared connection for reads and administrative writes.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteEnrollmentStore {
    /// Opens an `SQLite`-backed enrollment store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            config,
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Locks the shared read/administrative connection.
    fn shared(&self) -> Result<std::sync::MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("connection mutex poisoned".to_string()))
    }
}

impl EnrollmentStore for SqliteEnrollmentStore {
    fn begin_exclusive(
        &self,
        lecture_id: &LectureId,
    ) -> Result<Option<Box<dyn EnrollmentTxn + '_>>, StoreError> {
        let connection = open_connection(&self.config).map_err(StoreError::from)?;
        connection
            .execute_batch("BEGIN IMMEDIATE;")
            .map_err(|err| StoreError::from(map_sqlite_error(&err)))?;
        let lecture = read_lecture(&connection, lecture_id).map_err(StoreError::from)?;
        let Some(lecture) = lecture else {
            // Nothing to enroll against; release the writer lock immediately.
            let _ = connection.execute_batch("ROLLBACK;");
            return Ok(None);
        };
        Ok(Some(Box::new(SqliteEnrollmentTxn {
            connection,
            lecture,
            committed: false,
        })))
    }

    fn insert_lecture(&self, lecture: &NewLecture) -> Result<Lecture, StoreError> {
        lecture.validate().map_err(|err| StoreError::Invalid(err.to_string()))?;
        let (kind, value) =
            timestamp_columns(lecture.scheduled_at).map_err(StoreError::from)?;
        let connection = self.shared().map_err(StoreError::from)?;
        connection
            .execute(
                "INSERT INTO lectures (title, instructor, capacity, current_enrollment, \
                 scheduled_at_kind, scheduled_at_value, revision) VALUES (?1, ?2, ?3, ?4, ?5, \
                 ?6, 0)",
                params![
                    lecture.title,
                    lecture.instructor,
                    lecture.capacity,
                    lecture.current_enrollment,
                    kind,
                    value
                ],
            )
            .map_err(|err| StoreError::from(map_sqlite_error(&err)))?;
        let lecture_id = identifier_from_rowid(connection.last_insert_rowid())
            .and_then(LectureId::from_raw)
            .ok_or_else(|| StoreError::Store("lecture rowid out of range".to_string()))?;
        drop(connection);
        Ok(Lecture {
            lecture_id,
            title: lecture.title.clone(),
            instructor: lecture.instructor.clone(),
            capacity: lecture.capacity,
            current_enrollment: lecture.current_enrollment,
            scheduled_at: lecture.scheduled_at,
            revision: 0,
        })
    }

    fn insert_student(&self, name: &str) -> Result<Student, StoreError> {
        let connection = self.shared().map_err(StoreError::from)?;
        connection
            .execute("INSERT INTO students (name) VALUES (?1)", params![name])
            .map_err(|err| StoreError::from(map_sqlite_error(&err)))?;
        let student_id = identifier_from_rowid(connection.last_insert_rowid())
            .and_then(StudentId::from_raw)
            .ok_or_else(|| StoreError::Store("student rowid out of range".to_string()))?;
        drop(connection);
        Ok(Student {
            student_id,
            name: name.to_string(),
        })
    }

    fn lecture(&self, lecture_id: &LectureId) -> Result<Option<Lecture>, StoreError> {
        let connection = self.shared().map_err(StoreError::from)?;
        read_lecture(&connection, lecture_id).map_err(StoreError::from)
    }

    fn student(&self, student_id: &StudentId) -> Result<Option<Student>, StoreError> {
        let connection = self.shared().map_err(StoreError::from)?;
        let row = connection
            .query_row(
                "SELECT student_id, name FROM students WHERE student_id = ?1",
                params![student_id.get()],
                |row| {
                    let raw: i64 = row.get(0)?;
                    let name: String = row.get(1)?;
                    Ok((raw, name))
                },
            )
            .optional()
            .map_err(|err| StoreError::from(map_sqlite_error(&err)))?;
        let Some((raw, name)) = row else {
            return Ok(None);
        };
        let student_id = identifier_from_rowid(raw)
            .and_then(StudentId::from_raw)
            .ok_or_else(|| StoreError::Invalid("student row has invalid identity".to_string()))?;
        Ok(Some(Student {
            student_id,
            name,
        }))
    }

    fn applied_lectures(
        &self,
        student_id: &StudentId,
        status: ApplicationStatus,
    ) -> Result<Vec<Lecture>, StoreError> {
        let connection = self.shared().map_err(StoreError::from)?;
        let mut statement = connection
            .prepare(
                "SELECT l.lecture_id, l.title, l.instructor, l.capacity, l.current_enrollment, \
                 l.scheduled_at_kind, l.scheduled_at_value, l.revision FROM applications a JOIN \
                 lectures l ON l.lecture_id = a.lecture_id WHERE a.student_id = ?1 AND a.status \
                 = ?2 ORDER BY a.application_id",
            )
            .map_err(|err| StoreError::from(map_sqlite_error(&err)))?;
        let rows = statement
            .query_map(params![student_id.get(), status.as_str()], lecture_from_row)
            .map_err(|err| StoreError::from(map_sqlite_error(&err)))?;
        let mut lectures = Vec::new();
        for row in rows {
            let raw = row.map_err(|err| StoreError::from(map_sqlite_error(&err)))?;
            lectures.push(validate_lecture_row(raw).map_err(StoreError::from)?);
        }
        Ok(lectures)
    }
}

// ============================================================================
// SECTION: Transaction
// ============================================================================

/// One enrollment transaction holding the database writer lock.
struct SqliteEnrollmentTxn {
    /// Dedicated connection with an open `BEGIN IMMEDIATE` transaction.
    connection: Connection,
    /// Locked lecture row as read at transaction start.
    lecture: Lecture,
    /// Whether the transaction has been committed.
    committed: bool,
}

impl EnrollmentTxn for SqliteEnrollmentTxn {
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
        let (kind, value) = timestamp_columns(lecture.scheduled_at).map_err(StoreError::from)?;
        let revision = lecture.revision.wrapping_add(1);
        self.connection
            .execute(
                "UPDATE lectures SET title = ?1, instructor = ?2, capacity = ?3, \
                 current_enrollment = ?4, scheduled_at_kind = ?5, scheduled_at_value = ?6, \
                 revision = ?7 WHERE lecture_id = ?8",
                params![
                    lecture.title,
                    lecture.instructor,
                    lecture.capacity,
                    lecture.current_enrollment,
                    kind,
                    value,
                    revision,
                    lecture.lecture_id.get()
                ],
            )
            .map_err(|err| StoreError::from(map_sqlite_error(&err)))?;
        let mut persisted = lecture.clone();
        persisted.revision = revision;
        Ok(persisted)
    }

    fn save_student(&mut self, name: &str) -> Result<Student, StoreError> {
        self.connection
            .execute("INSERT INTO students (name) VALUES (?1)", params![name])
            .map_err(|err| StoreError::from(map_sqlite_error(&err)))?;
        let student_id = identifier_from_rowid(self.connection.last_insert_rowid())
            .and_then(StudentId::from_raw)
            .ok_or_else(|| StoreError::Store("student rowid out of range".to_string()))?;
        Ok(Student {
            student_id,
            name: name.to_string(),
        })
    }

    fn application_exists(
        &self,
        lecture_id: &LectureId,
        student_id: &StudentId,
    ) -> Result<bool, StoreError> {
        self.connection
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM applications WHERE lecture_id = ?1 AND student_id \
                 = ?2 AND status = ?3)",
                params![lecture_id.get(), student_id.get(), ApplicationStatus::Applied.as_str()],
                |row| row.get::<_, bool>(0),
            )
            .map_err(|err| StoreError::from(map_sqlite_error(&err)))
    }

    fn insert_application(
        &mut self,
        lecture_id: &LectureId,
        student_id: &StudentId,
        applied_at: Timestamp,
    ) -> Result<Application, StoreError> {
        let (kind, value) = timestamp_columns(applied_at).map_err(StoreError::from)?;
        self.connection
            .execute(
                "INSERT INTO applications (lecture_id, student_id, applied_at_kind, \
                 applied_at_value, status) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    lecture_id.get(),
                    student_id.get(),
                    kind,
                    value,
                    ApplicationStatus::Applied.as_str()
                ],
            )
            .map_err(|err| StoreError::from(map_sqlite_error(&err)))?;
        let application_id = identifier_from_rowid(self.connection.last_insert_rowid())
            .and_then(ApplicationId::from_raw)
            .ok_or_else(|| StoreError::Store("application rowid out of range".to_string()))?;
        Ok(Application {
            application_id,
            lecture_id: *lecture_id,
            student_id: *student_id,
            applied_at,
            status: ApplicationStatus::Applied,
        })
    }

    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let mut this = self;
        this.connection
            .execute_batch("COMMIT;")
            .map_err(|err| StoreError::from(map_sqlite_error(&err)))?;
        this.committed = true;
        Ok(())
    }
}

impl Drop for SqliteEnrollmentTxn {
    fn drop(&mut self) {
        if !self.committed {
            let _ = self.connection.execute_batch("ROLLBACK;");
        }
    }
}

// ============================================================================
// SECTION: Row Mapping
// ============================================================================

/// Raw lecture row as read from `SQLite`, prior to validation.
struct RawLectureRow {
    /// Raw lecture id column.
    lecture_id: i64,
    /// Title column.
    title: String,
    /// Instructor column.
    instructor: String,
    /// Capacity column.
    capacity: i64,
    /// Enrollment counter column.
    current_enrollment: i64,
    /// Timestamp kind label column.
    scheduled_at_kind: String,
    /// Timestamp value column.
    scheduled_at_value: i64,
    /// Revision column.
    revision: i64,
}

/// Maps one lecture row from a query result.
fn lecture_from_row(row: &rusqlite::Row<'_>) -> Result<RawLectureRow, rusqlite::Error> {
    Ok(RawLectureRow {
        lecture_id: row.get(0)?,
        title: row.get(1)?,
        instructor: row.get(2)?,
        capacity: row.get(3)?,
        current_enrollment: row.get(4)?,
        scheduled_at_kind: row.get(5)?,
        scheduled_at_value: row.get(6)?,
        revision: row.get(7)?,
    })
}

/// Validates a raw lecture row fail-closed and converts it to the record.
fn validate_lecture_row(raw: RawLectureRow) -> Result<Lecture, SqliteStoreError> {
    let lecture_id = identifier_from_rowid(raw.lecture_id)
        .and_then(LectureId::from_raw)
        .ok_or_else(|| SqliteStoreError::Invalid("lecture row has invalid identity".to_string()))?;
    let capacity = u32::try_from(raw.capacity)
        .map_err(|_| SqliteStoreError::Invalid("lecture capacity out of range".to_string()))?;
    let current_enrollment = u32::try_from(raw.current_enrollment).map_err(|_| {
        SqliteStoreError::Invalid("lecture enrollment counter out of range".to_string())
    })?;
    let revision = u64::try_from(raw.revision)
        .map_err(|_| SqliteStoreError::Invalid("lecture revision out of range".to_string()))?;
    let scheduled_at = parse_timestamp(&raw.scheduled_at_kind, raw.scheduled_at_value)?;
    let lecture = Lecture {
        lecture_id,
        title: raw.title,
        instructor: raw.instructor,
        capacity,
        current_enrollment,
        scheduled_at,
        revision,
    };
    lecture.validate().map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
    Ok(lecture)
}

/// Reads and validates one lecture row by id.
fn read_lecture(
    connection: &Connection,
    lecture_id: &LectureId,
) -> Result<Option<Lecture>, SqliteStoreError> {
    let raw = connection
        .query_row(
            "SELECT lecture_id, title, instructor, capacity, current_enrollment, \
             scheduled_at_kind, scheduled_at_value, revision FROM lectures WHERE lecture_id = ?1",
            params![lecture_id.get()],
            lecture_from_row,
        )
        .optional()
        .map_err(|err| map_sqlite_error(&err))?;
    raw.map(validate_lecture_row).transpose()
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Converts a `SQLite` rowid into a raw identifier value.
fn identifier_from_rowid(rowid: i64) -> Option<u64> {
    u64::try_from(rowid).ok()
}

/// Returns the canonical column pair for a timestamp.
fn timestamp_columns(timestamp: Timestamp) -> Result<(&'static str, i64), SqliteStoreError> {
    match timestamp {
        Timestamp::UnixMillis(value) => Ok(("unix_millis", value)),
        Timestamp::Logical(value) => {
            let value = i64::try_from(value).map_err(|_| {
                SqliteStoreError::Invalid("logical timestamp out of range".to_string())
            })?;
            Ok(("logical", value))
        }
    }
}

/// Parses a timestamp column pair, failing closed on unknown labels.
fn parse_timestamp(kind: &str, value: i64) -> Result<Timestamp, SqliteStoreError> {
    match kind {
        "unix_millis" => Ok(Timestamp::UnixMillis(value)),
        "logical" => {
            let value = u64::try_from(value).map_err(|_| {
                SqliteStoreError::Invalid("negative logical timestamp".to_string())
            })?;
            Ok(Timestamp::Logical(value))
        }
        other => Err(SqliteStoreError::Invalid(format!("unsupported timestamp kind: {other}"))),
    }
}

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability and lock waits.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS lectures (
                    lecture_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT NOT NULL,
                    instructor TEXT NOT NULL,
                    capacity INTEGER NOT NULL,
                    current_enrollment INTEGER NOT NULL,
                    scheduled_at_kind TEXT NOT NULL,
                    scheduled_at_value INTEGER NOT NULL,
                    revision INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS students (
                    student_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS applications (
                    application_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    lecture_id INTEGER NOT NULL,
                    student_id INTEGER NOT NULL,
                    applied_at_kind TEXT NOT NULL,
                    applied_at_value INTEGER NOT NULL,
                    status TEXT NOT NULL,
                    FOREIGN KEY (lecture_id) REFERENCES lectures(lecture_id),
                    FOREIGN KEY (student_id) REFERENCES students(student_id)
                );
                CREATE UNIQUE INDEX IF NOT EXISTS idx_applications_applied_pair
                    ON applications (lecture_id, student_id) WHERE status = 'applied';
                CREATE INDEX IF NOT EXISTS idx_applications_student
                    ON applications (student_id);",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}
