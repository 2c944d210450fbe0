//! Catalog registries for databases and their tables
//!
//! One `Catalog` per database holds table descriptors, fragment-layout
//! metadata, and refresh timestamps. The `SystemCatalog` owns every
//! database catalog and is what the scheduler enumerates on each sweep.

pub mod table;

pub use table::{FragmentLayout, StorageKind, TableDescriptor};

use crate::error::{RefreshError, RefreshResult};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Per-database catalog
///
/// Thread-safe: descriptors are handed out as snapshots, and mutation goes
/// through the catalog's own methods. Callers that need mutual exclusion
/// across a whole refresh hold the table's schema lock, not a catalog lock.
pub struct Catalog {
    db_id: u32,
    name: String,

    /// Table descriptors keyed by name
    tables: DashMap<String, TableDescriptor>,

    /// Reverse lookup: table id to name
    table_names_by_id: DashMap<u32, String>,

    /// Cached fragment layouts keyed by table id
    fragment_layouts: DashMap<u32, FragmentLayout>,

    /// Next table id to assign
    next_table_id: AtomicU32,
}

impl Catalog {
    pub fn new(db_id: u32, name: impl Into<String>) -> Self {
        Self {
            db_id,
            name: name.into(),
            tables: DashMap::new(),
            table_names_by_id: DashMap::new(),
            fragment_layouts: DashMap::new(),
            next_table_id: AtomicU32::new(1),
        }
    }

    pub fn db_id(&self) -> u32 {
        self.db_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a table and return its descriptor
    pub fn add_table(
        &self,
        name: impl Into<String>,
        storage_kind: StorageKind,
        refresh_interval: Option<Duration>,
    ) -> TableDescriptor {
        let name = name.into();
        let table_id = self.next_table_id.fetch_add(1, Ordering::Relaxed);
        let descriptor = TableDescriptor {
            db_id: self.db_id,
            table_id,
            name: name.clone(),
            storage_kind,
            refresh_interval,
            last_refresh_ns: None,
        };
        self.table_names_by_id.insert(table_id, name.clone());
        self.tables.insert(name, descriptor.clone());
        descriptor
    }

    /// Resolve a table name to a descriptor snapshot
    pub fn resolve_table(&self, name: &str) -> RefreshResult<TableDescriptor> {
        self.tables
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RefreshError::not_found(name))
    }

    /// Record the fragment layout derived for a table
    pub fn set_fragment_layout(&self, table_id: u32, layout: FragmentLayout) {
        self.fragment_layouts.insert(table_id, layout);
    }

    /// Current fragment layout for a table, if one has been derived
    pub fn fragment_layout(&self, table_id: u32) -> Option<FragmentLayout> {
        self.fragment_layouts
            .get(&table_id)
            .map(|entry| entry.value().clone())
    }

    /// Drop cached fragment-layout metadata for a table
    ///
    /// Later readers re-derive the layout from cache contents.
    pub fn remove_fragmenter(&self, table_id: u32) {
        if self.fragment_layouts.remove(&table_id).is_some() {
            tracing::debug!("Dropped fragment layout for table id {}", table_id);
        }
    }

    /// Record a fresh refresh timestamp for a table
    ///
    /// Timestamps strictly increase per table, even under coarse clocks.
    pub fn update_refresh_time(&self, table_id: u32) -> RefreshResult<()> {
        let name = self
            .table_names_by_id
            .get(&table_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RefreshError::internal(format!("Unknown table id: {}", table_id)))?;

        let mut entry = self
            .tables
            .get_mut(&name)
            .ok_or_else(|| RefreshError::not_found(&name))?;

        let now = now_ns();
        let stamped = match entry.last_refresh_ns {
            Some(last) => now.max(last + 1),
            None => now,
        };
        entry.last_refresh_ns = Some(stamped);
        Ok(())
    }

    /// Last recorded refresh timestamp for a table
    pub fn last_refresh_ns(&self, name: &str) -> RefreshResult<Option<u64>> {
        Ok(self.resolve_table(name)?.last_refresh_ns)
    }

    /// Foreign tables currently due for a scheduled refresh
    ///
    /// A table is due when it carries a refresh interval and either has
    /// never been refreshed or its interval has elapsed. Returned in
    /// table-id order so sweeps are deterministic.
    pub fn foreign_tables_due_for_refresh(&self) -> Vec<TableDescriptor> {
        let now = now_ns();
        let mut due: Vec<TableDescriptor> = self
            .tables
            .iter()
            .filter(|entry| {
                let td = entry.value();
                if !td.is_foreign() {
                    return false;
                }
                let Some(interval) = td.refresh_interval else {
                    return false;
                };
                match td.last_refresh_ns {
                    None => true,
                    Some(last) => now.saturating_sub(last) >= interval.as_nanos() as u64,
                }
            })
            .map(|entry| entry.value().clone())
            .collect();
        due.sort_by_key(|td| td.table_id);
        due
    }
}

/// System-wide catalog: owns one `Catalog` per database
pub struct SystemCatalog {
    catalogs: DashMap<u32, Arc<Catalog>>,
    next_db_id: AtomicU32,
}

impl SystemCatalog {
    pub fn new() -> Self {
        Self {
            catalogs: DashMap::new(),
            next_db_id: AtomicU32::new(1),
        }
    }

    /// Create a database catalog and return it
    pub fn add_catalog(&self, name: impl Into<String>) -> Arc<Catalog> {
        let db_id = self.next_db_id.fetch_add(1, Ordering::Relaxed);
        let catalog = Arc::new(Catalog::new(db_id, name));
        self.catalogs.insert(db_id, catalog.clone());
        catalog
    }

    pub fn catalog(&self, db_id: u32) -> Option<Arc<Catalog>> {
        self.catalogs.get(&db_id).map(|entry| entry.value().clone())
    }

    /// All database catalogs, in db-id order
    pub fn catalogs_for_all_dbs(&self) -> Vec<Arc<Catalog>> {
        let mut catalogs: Vec<Arc<Catalog>> = self
            .catalogs
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        catalogs.sort_by_key(|c| c.db_id());
        catalogs
    }
}

impl Default for SystemCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper function to get current time in nanoseconds
fn now_ns() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
