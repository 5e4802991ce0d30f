// crates/lectern-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Enrollment Store
// Description: Durable EnrollmentStore backend using SQLite WAL.
// Purpose: Provide production-grade persistence for Lectern enrollment state.
// Dependencies: lectern-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`lectern_core::EnrollmentStore`]
//! implementation. Each enrollment transaction runs on its own connection
//! under `BEGIN IMMEDIATE`, so the database writer lock carries the exclusive
//! serialization and an expired busy timeout surfaces as the retryable
//! lock-contention failure. Rows are validated fail-closed on every load.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteEnrollmentStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
