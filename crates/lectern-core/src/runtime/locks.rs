// crates/lectern-core/src/runtime/locks.rs
// ============================================================================
// Module: Lecture Row Lock Table
// Description: Per-lecture mutual exclusion with a bounded blocking wait.
// Purpose: Serialize enrollment transactions against the same lecture row.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The row lock table grants at most one exclusive lease per lecture id.
//! Acquisition blocks the calling thread until the lease is free or the wait
//! bound elapses; an expired wait surfaces as
//! [`StoreError::LockContention`], feeding the retry policy. Leases release
//! on drop, including on abort paths.
//!
//! Lock scope is a single lecture id; leases for different ids never block
//! each other.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Condvar;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use crate::core::LectureId;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Lock Table
// ============================================================================

/// Per-lecture exclusive lock table with bounded blocking acquisition.
#[derive(Debug, Default)]
pub(crate) struct RowLockTable {
    /// Lecture ids whose lease is currently held.
    held: Mutex<BTreeSet<u64>>,
    /// Signaled whenever a lease is released.
    released: Condvar,
}

impl RowLockTable {
    /// Creates an empty lock table.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Acquires the exclusive lease for one lecture id.
    ///
    /// Blocks until the lease is free or `wait_bound` elapses.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::LockContention`] when the wait bound elapses
    /// while another transaction still holds the lease.
    pub(crate) fn acquire(
        self: &Arc<Self>,
        lecture_id: &LectureId,
        wait_bound: Duration,
    ) -> Result<RowLockGuard, StoreError> {
        let deadline = Instant::now()
            .checked_add(wait_bound)
            .ok_or_else(|| StoreError::Invalid("lock wait bound overflows the clock".to_string()))?;
        let key = lecture_id.get();
        let mut held = self
            .held
            .lock()
            .map_err(|_| StoreError::Store("row lock table mutex poisoned".to_string()))?;
        while held.contains(&key) {
            let now = Instant::now();
            let Some(remaining) = deadline.checked_duration_since(now).filter(|d| !d.is_zero())
            else {
                return Err(StoreError::LockContention(format!(
                    "timed out waiting for exclusive lock on lecture {lecture_id}"
                )));
            };
            let (guard, _timeout) = self
                .released
                .wait_timeout(held, remaining)
                .map_err(|_| StoreError::Store("row lock table mutex poisoned".to_string()))?;
            held = guard;
        }
        held.insert(key);
        drop(held);
        Ok(RowLockGuard {
            table: Arc::clone(self),
            key,
        })
    }
}

// ============================================================================
// SECTION: Lock Guard
// ============================================================================

/// Exclusive lease on one lecture row; released on drop.
#[derive(Debug)]
pub(crate) struct RowLockGuard {
    /// Owning lock table.
    table: Arc<RowLockTable>,
    /// Raw lecture id held by this lease.
    key: u64,
}

impl Drop for RowLockGuard {
    fn drop(&mut self) {
        if let Ok(mut held) = self.table.held.lock() {
            held.remove(&self.key);
        }
        self.table.released.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU64;
    use std::sync::Arc;
    use std::time::Duration;

    use super::RowLockTable;
    use crate::core::LectureId;
    use crate::interfaces::StoreError;

    #[test]
    fn second_acquire_times_out_while_lease_is_held() {
        let table = Arc::new(RowLockTable::new());
        let lecture_id = LectureId::new(NonZeroU64::MIN);
        let lease = table.acquire(&lecture_id, Duration::from_millis(50));
        assert!(lease.is_ok());
        let contended = table.acquire(&lecture_id, Duration::from_millis(10));
        assert!(matches!(contended, Err(StoreError::LockContention(_))));
        drop(lease);
        assert!(table.acquire(&lecture_id, Duration::from_millis(10)).is_ok());
    }

    #[test]
    fn distinct_rows_do_not_contend() {
        let table = Arc::new(RowLockTable::new());
        let first = LectureId::new(NonZeroU64::MIN);
        let Some(second) = LectureId::from_raw(2) else {
            return;
        };
        let lease = table.acquire(&first, Duration::from_millis(10));
        assert!(lease.is_ok());
        assert!(table.acquire(&second, Duration::from_millis(10)).is_ok());
    }
}
