//! Two-tier data cache for table chunks
//!
//! Cached table data lives as chunks in two memory tiers:
//!   - CPU tier: fast system memory, first landing place for fetched data
//!   - GPU tier: accelerator memory, populated on demand by query execution
//!
//! Chunks are addressed by a stable composite key and evicted table-wide
//! through the key's (db_id, table_id) prefix.

pub mod cache_manager;
pub mod chunk;

pub use cache_manager::{CacheManager, CachedChunk, TierStatistics};
pub use chunk::{ChunkKey, MemoryTier, TablePrefix};
