/// Stable chunk identity for the two-tier data cache
///
/// A chunk is the unit of cached columnar data: one column slice of one
/// fragment of one table. ChunkKey pins down that identity; TablePrefix
/// addresses every chunk a table owns, across all fragments and columns,
/// independent of which memory tier holds them.
///
/// # Invariants
/// - Keys are NEVER modified after creation
/// - `TablePrefix::matches` selects exactly the chunks of that table

/// Memory tiers where cached chunks may reside
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemoryTier {
    /// Fast-memory tier (system RAM)
    Cpu,
    /// Accelerator-memory tier (device memory)
    Gpu,
}

impl MemoryTier {
    pub fn name(&self) -> &'static str {
        match self {
            MemoryTier::Cpu => "cpu",
            MemoryTier::Gpu => "gpu",
        }
    }
}

/// Full chunk identity: (db, table, column, fragment)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkKey {
    pub db_id: u32,
    pub table_id: u32,
    pub column_id: u32,
    pub fragment_id: u32,
}

impl ChunkKey {
    pub fn new(db_id: u32, table_id: u32, column_id: u32, fragment_id: u32) -> Self {
        Self {
            db_id,
            table_id,
            column_id,
            fragment_id,
        }
    }

    /// The table-level prefix of this key
    pub fn table_prefix(&self) -> TablePrefix {
        TablePrefix {
            db_id: self.db_id,
            table_id: self.table_id,
        }
    }
}

/// Table-level key prefix: (db, table)
///
/// Used to address all cached chunks belonging to one table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TablePrefix {
    pub db_id: u32,
    pub table_id: u32,
}

impl TablePrefix {
    pub fn new(db_id: u32, table_id: u32) -> Self {
        Self { db_id, table_id }
    }

    /// True if `key` identifies a chunk owned by this table
    pub fn matches(&self, key: &ChunkKey) -> bool {
        self.db_id == key.db_id && self.table_id == key.table_id
    }
}
