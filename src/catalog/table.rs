/// Table descriptors and fragment-layout metadata
///
/// A TableDescriptor is the catalog's read-only view of one table: its
/// identity (db_id, table_id), its storage kind, and its refresh
/// bookkeeping. Identities are stable and never reused within a catalog.
use crate::storage::chunk::TablePrefix;
use std::time::Duration;

/// Where a table's data lives
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageKind {
    /// Data owned by the engine's own storage
    Ordinary,
    /// Data fetched from an external source and cached locally
    Foreign,
}

/// Catalog descriptor for one table
#[derive(Debug, Clone)]
pub struct TableDescriptor {
    /// Owning database id
    pub db_id: u32,

    /// Stable table id, unique within the database
    pub table_id: u32,

    /// Table name, unique within the database
    pub name: String,

    /// Storage kind; refreshes apply only to foreign tables
    pub storage_kind: StorageKind,

    /// Scheduled refresh cadence. None means manual refresh only.
    pub refresh_interval: Option<Duration>,

    /// Last recorded refresh (nanoseconds since epoch). None until the
    /// first refresh completes or commits.
    pub last_refresh_ns: Option<u64>,
}

impl TableDescriptor {
    pub fn is_foreign(&self) -> bool {
        self.storage_kind == StorageKind::Foreign
    }

    /// Chunk-key prefix addressing all of this table's cached chunks
    pub fn table_prefix(&self) -> TablePrefix {
        TablePrefix::new(self.db_id, self.table_id)
    }
}

/// Cached fragment-layout metadata for one table
///
/// Describes how a table's rows are split into fragments. Dropped on
/// refresh so readers re-derive it from the refetched cache contents.
#[derive(Debug, Clone, Default)]
pub struct FragmentLayout {
    /// Fragment ids in physical order
    pub fragment_ids: Vec<u32>,

    /// Total rows across all fragments
    pub total_rows: u64,
}

impl FragmentLayout {
    pub fn fragment_count(&self) -> usize {
        self.fragment_ids.len()
    }
}
