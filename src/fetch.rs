/// External-source refetch layer
///
/// A `ForeignFetcher` repopulates a foreign table's cached data from its
/// source. The fetcher is the sole authority on whether a failure happened
/// before or after its own persisted cache was evicted; callers inspect the
/// returned `FetchOutcome` tag and must not infer commitment from cache
/// state.
use crate::error::{RefreshError, RefreshResult};
use crate::storage::{CacheManager, ChunkKey, MemoryTier, TablePrefix};
use dashmap::DashMap;
use std::sync::Arc;

/// Result of one refetch attempt
#[derive(Debug)]
pub enum FetchOutcome {
    /// Table repopulated
    Ok,

    /// Failed before any persisted cache entries were dropped; the source
    /// side is unchanged
    FailedBeforeEviction(RefreshError),

    /// Failed after persisted cache entries were already dropped; carries
    /// the underlying cause
    FailedAfterEviction(RefreshError),
}

/// Fetches a foreign table's data from its external source
pub trait ForeignFetcher: Send + Sync {
    /// Refetch all chunks for the table addressed by `prefix`
    ///
    /// When `evict_persisted` is true, persisted (on-disk) cache entries are
    /// dropped before fetching, not just in-memory ones.
    fn refetch_table(&self, prefix: TablePrefix, evict_persisted: bool) -> FetchOutcome;
}

/// Chunk payload provider backing a [`SourceFetcher`]
///
/// Returns every chunk for the table, keyed and ready to cache.
pub type ChunkSource =
    dyn Fn(TablePrefix) -> RefreshResult<Vec<(ChunkKey, Vec<u8>)>> + Send + Sync;

/// Source-backed fetcher with a persisted cache layer
///
/// Models the production shape: fetched chunks land in the CPU tier and in
/// a persisted layer that survives in-memory eviction. `evict_persisted`
/// drops the persisted copy first, which is the fetcher's commitment point
/// for outcome classification.
pub struct SourceFetcher {
    cache: Arc<CacheManager>,
    source: Arc<ChunkSource>,
    persisted: DashMap<TablePrefix, Vec<(ChunkKey, Vec<u8>)>>,
}

impl SourceFetcher {
    pub fn new(cache: Arc<CacheManager>, source: Arc<ChunkSource>) -> Self {
        Self {
            cache,
            source,
            persisted: DashMap::new(),
        }
    }

    /// Number of persisted entries held for a table
    pub fn persisted_entry_count(&self, prefix: TablePrefix) -> usize {
        self.persisted
            .get(&prefix)
            .map(|entry| entry.value().len())
            .unwrap_or(0)
    }
}

impl ForeignFetcher for SourceFetcher {
    fn refetch_table(&self, prefix: TablePrefix, evict_persisted: bool) -> FetchOutcome {
        let evicted = if evict_persisted {
            self.persisted.remove(&prefix).is_some()
        } else {
            false
        };
        if evicted {
            tracing::debug!(
                "Evicted persisted cache entries for table ({}, {})",
                prefix.db_id,
                prefix.table_id
            );
        }

        match (self.source)(prefix) {
            Ok(chunks) => {
                for (key, data) in &chunks {
                    self.cache.put_chunk(MemoryTier::Cpu, *key, data.clone());
                }
                tracing::debug!(
                    "Refetched {} chunks for table ({}, {})",
                    chunks.len(),
                    prefix.db_id,
                    prefix.table_id
                );
                self.persisted.insert(prefix, chunks);
                FetchOutcome::Ok
            }
            Err(cause) if evicted => FetchOutcome::FailedAfterEviction(cause),
            Err(cause) => FetchOutcome::FailedBeforeEviction(cause),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing_source() -> Arc<ChunkSource> {
        Arc::new(|_prefix| Err(RefreshError::fetch("source unreachable")))
    }

    fn chunk_source(count: u32) -> Arc<ChunkSource> {
        Arc::new(move |prefix: TablePrefix| {
            Ok((0..count)
                .map(|i| {
                    (
                        ChunkKey::new(prefix.db_id, prefix.table_id, 0, i),
                        vec![i as u8; 16],
                    )
                })
                .collect())
        })
    }

    #[test]
    fn test_success_populates_cpu_tier_and_persisted_layer() {
        let cache = Arc::new(CacheManager::new(16, 16));
        let fetcher = SourceFetcher::new(cache.clone(), chunk_source(3));
        let prefix = TablePrefix::new(1, 7);

        assert!(matches!(
            fetcher.refetch_table(prefix, false),
            FetchOutcome::Ok
        ));
        assert_eq!(cache.chunk_count_for_table(prefix, MemoryTier::Cpu), 3);
        assert_eq!(fetcher.persisted_entry_count(prefix), 3);
    }

    #[test]
    fn test_failure_without_persisted_eviction_is_pre_commitment() {
        let cache = Arc::new(CacheManager::new(16, 16));
        let fetcher = SourceFetcher::new(cache, failing_source());
        let prefix = TablePrefix::new(1, 7);

        match fetcher.refetch_table(prefix, false) {
            FetchOutcome::FailedBeforeEviction(cause) => {
                assert_eq!(cause, RefreshError::fetch("source unreachable"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_failure_after_persisted_eviction_is_post_commitment() {
        let cache = Arc::new(CacheManager::new(16, 16));
        let prefix = TablePrefix::new(1, 7);

        // Seed the persisted layer through a successful fetch, then fail
        let fetcher = SourceFetcher::new(cache.clone(), chunk_source(2));
        assert!(matches!(
            fetcher.refetch_table(prefix, false),
            FetchOutcome::Ok
        ));
        let failing = SourceFetcher {
            cache,
            source: failing_source(),
            persisted: fetcher.persisted,
        };

        match failing.refetch_table(prefix, true) {
            FetchOutcome::FailedAfterEviction(cause) => {
                assert_eq!(cause, RefreshError::fetch("source unreachable"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(failing.persisted_entry_count(prefix), 0);
    }

    #[test]
    fn test_evict_persisted_with_nothing_persisted_stays_pre_commitment() {
        let cache = Arc::new(CacheManager::new(16, 16));
        let fetcher = SourceFetcher::new(cache, failing_source());
        let prefix = TablePrefix::new(1, 7);

        // Nothing was persisted, so nothing was lost: pre-commitment
        assert!(matches!(
            fetcher.refetch_table(prefix, true),
            FetchOutcome::FailedBeforeEviction(_)
        ));
    }
}
