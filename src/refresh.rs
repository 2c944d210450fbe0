/// Foreign-table refresh operation
///
/// One refresh replaces a table's cached state wholesale: invalidate
/// fragment metadata, evict both cache tiers, refetch from the source,
/// record the result in the catalog. The operation is not atomic. Eviction
/// of the in-memory tiers is the commitment point: past it the old cached
/// data is gone, so catalog bookkeeping must track the actual cache state
/// rather than call success.
use crate::catalog::{Catalog, SystemCatalog};
use crate::error::{RefreshError, RefreshResult};
use crate::fetch::{FetchOutcome, ForeignFetcher};
use crate::locking::LockManager;
use crate::storage::{CacheManager, MemoryTier, TablePrefix};
use std::sync::Arc;

/// Shared collaborator set for refresh operations
///
/// One context serves both manual refreshes and the background scheduler.
/// All members are shared handles, so the context clones cheaply into the
/// scheduler thread.
#[derive(Clone)]
pub struct RefreshContext {
    pub system_catalog: Arc<SystemCatalog>,
    pub lock_manager: Arc<LockManager>,
    pub cache_manager: Arc<CacheManager>,
    pub fetcher: Arc<dyn ForeignFetcher>,
}

impl RefreshContext {
    pub fn new(
        system_catalog: Arc<SystemCatalog>,
        lock_manager: Arc<LockManager>,
        cache_manager: Arc<CacheManager>,
        fetcher: Arc<dyn ForeignFetcher>,
    ) -> Self {
        Self {
            system_catalog,
            lock_manager,
            cache_manager,
            fetcher,
        }
    }

    /// Refresh one foreign table under its exclusive schema lock
    ///
    /// Steps, all under the lock:
    /// 1. Resolve the descriptor; only foreign tables may be refreshed.
    /// 2. Drop the table's fragment-layout metadata.
    /// 3. Evict the table's chunks from the CPU and GPU tiers. This is the
    ///    commitment point.
    /// 4. Refetch through the external fetcher, passing
    ///    `evict_persisted_entries` through.
    /// 5. Record the refresh timestamp: on success, and also when the fetch
    ///    failed after the fetcher's own eviction already happened. In the
    ///    post-eviction case the underlying cause is re-raised, never a
    ///    wrapper.
    ///
    /// The lock guard releases on every exit path.
    pub fn refresh(
        &self,
        catalog: &Catalog,
        table_name: &str,
        evict_persisted_entries: bool,
    ) -> RefreshResult<()> {
        let _schema_lock = self
            .lock_manager
            .lock_table_schema(catalog.db_id(), table_name);

        let td = catalog.resolve_table(table_name)?;
        if !td.is_foreign() {
            return Err(RefreshError::not_foreign_table(table_name));
        }

        tracing::info!(
            "Refreshing foreign table {}.{}",
            catalog.name(),
            table_name
        );

        catalog.remove_fragmenter(td.table_id);
        let table_key = TablePrefix::new(catalog.db_id(), td.table_id);
        self.cache_manager
            .evict_chunks_with_prefix(table_key, MemoryTier::Cpu);
        self.cache_manager
            .evict_chunks_with_prefix(table_key, MemoryTier::Gpu);

        match self.fetcher.refetch_table(table_key, evict_persisted_entries) {
            FetchOutcome::Ok => {
                catalog.update_refresh_time(td.table_id)?;
                tracing::info!(
                    "Refreshed foreign table {}.{}",
                    catalog.name(),
                    table_name
                );
                Ok(())
            }
            FetchOutcome::FailedAfterEviction(cause) => {
                // The cache is empty either way; the timestamp reflects
                // that ground truth, then the original cause surfaces.
                catalog.update_refresh_time(td.table_id)?;
                Err(cause)
            }
            FetchOutcome::FailedBeforeEviction(cause) => Err(cause),
        }
    }
}
