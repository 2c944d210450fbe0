/// Exclusive table schema locks
///
/// A schema lock serializes schema-affecting operations on one table:
/// refreshes, DDL, anything that rewrites cached state or catalog
/// bookkeeping. The lock is granted as an owned guard, so release happens
/// on scope exit on every path out of the holding operation.
use dashmap::DashMap;
use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex};
use std::sync::Arc;

/// Exclusive, scope-bound lock on one table's schema
///
/// Held for the duration of one schema-affecting operation. Dropping the
/// guard releases the lock; there is no manual release.
pub struct TableSchemaLock {
    _guard: ArcMutexGuard<RawMutex, ()>,
}

/// Registry of per-table schema locks
///
/// Locks are keyed by (db_id, table name) and created lazily on first
/// acquisition. Entries are never removed; a dormant lock is one Arc plus
/// one unlocked mutex.
pub struct LockManager {
    locks: DashMap<(u32, String), Arc<Mutex<()>>>,
}

impl LockManager {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Acquire the exclusive schema lock for a table, blocking until granted
    pub fn lock_table_schema(&self, db_id: u32, table_name: &str) -> TableSchemaLock {
        let cell = self
            .locks
            .entry((db_id, table_name.to_string()))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        // Block outside the map entry so waiters never pin a map shard
        TableSchemaLock {
            _guard: cell.lock_arc(),
        }
    }
}

impl Default for LockManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::thread;

    #[test]
    fn test_lock_released_on_drop() {
        let manager = LockManager::new();
        {
            let _lock = manager.lock_table_schema(1, "t");
        }
        // Re-acquisition after drop must not block
        let _lock = manager.lock_table_schema(1, "t");
    }

    #[test]
    fn test_different_tables_do_not_contend() {
        let manager = LockManager::new();
        let _a = manager.lock_table_schema(1, "a");
        let _b = manager.lock_table_schema(1, "b");
        let _other_db = manager.lock_table_schema(2, "a");
    }

    #[test]
    fn test_exclusive_across_threads() {
        let manager = Arc::new(LockManager::new());
        let counter = Arc::new(AtomicU32::new(0));
        let max_seen = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let manager = manager.clone();
            let counter = counter.clone();
            let max_seen = max_seen.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    let _lock = manager.lock_table_schema(1, "t");
                    let inside = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    max_seen.fetch_max(inside, Ordering::SeqCst);
                    counter.fetch_sub(1, Ordering::SeqCst);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        // The lock is exclusive: never more than one holder at a time
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }
}
