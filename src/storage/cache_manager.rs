/// Two-tier chunk cache manager
/// Holds cached table data in CPU (fast) and GPU (accelerator) tiers and
/// supports prefix-addressed eviction of all chunks belonging to one table.
use crate::storage::chunk::{ChunkKey, MemoryTier, TablePrefix};
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A cached data chunk
#[derive(Clone, Debug)]
pub struct CachedChunk {
    /// Raw chunk payload (shared so reads never copy)
    pub data: Arc<Vec<u8>>,
}

impl CachedChunk {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data: Arc::new(data),
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

/// Two-tier chunk cache
///
/// Chunks are keyed by their full ChunkKey within each tier. Eviction is
/// prefix-addressed: `evict_chunks_with_prefix` removes every chunk whose
/// key matches a table's (db_id, table_id) prefix, and is idempotent.
pub struct CacheManager {
    /// CPU (fast-memory) tier
    cpu_chunks: DashMap<ChunkKey, CachedChunk>,

    /// GPU (accelerator-memory) tier
    gpu_chunks: DashMap<ChunkKey, CachedChunk>,

    /// Current CPU tier usage
    cpu_usage_bytes: AtomicUsize,

    /// Current GPU tier usage
    gpu_usage_bytes: AtomicUsize,

    /// CPU tier capacity in bytes
    cpu_capacity_bytes: usize,

    /// GPU tier capacity in bytes
    gpu_capacity_bytes: usize,
}

impl CacheManager {
    pub fn new(cpu_capacity_mb: usize, gpu_capacity_mb: usize) -> Self {
        Self {
            cpu_chunks: DashMap::new(),
            gpu_chunks: DashMap::new(),
            cpu_usage_bytes: AtomicUsize::new(0),
            gpu_usage_bytes: AtomicUsize::new(0),
            cpu_capacity_bytes: cpu_capacity_mb * 1024 * 1024,
            gpu_capacity_bytes: gpu_capacity_mb * 1024 * 1024,
        }
    }

    fn tier(&self, tier: MemoryTier) -> &DashMap<ChunkKey, CachedChunk> {
        match tier {
            MemoryTier::Cpu => &self.cpu_chunks,
            MemoryTier::Gpu => &self.gpu_chunks,
        }
    }

    fn usage(&self, tier: MemoryTier) -> &AtomicUsize {
        match tier {
            MemoryTier::Cpu => &self.cpu_usage_bytes,
            MemoryTier::Gpu => &self.gpu_usage_bytes,
        }
    }

    /// Insert or replace a chunk in the given tier
    pub fn put_chunk(&self, tier: MemoryTier, key: ChunkKey, data: Vec<u8>) {
        let chunk = CachedChunk::new(data);
        let size = chunk.size_bytes();
        if let Some(old) = self.tier(tier).insert(key, chunk) {
            self.usage(tier)
                .fetch_sub(old.size_bytes(), Ordering::Relaxed);
        }
        let used = self.usage(tier).fetch_add(size, Ordering::Relaxed) + size;

        let capacity = match tier {
            MemoryTier::Cpu => self.cpu_capacity_bytes,
            MemoryTier::Gpu => self.gpu_capacity_bytes,
        };
        if used > capacity {
            tracing::warn!(
                "{} tier over capacity: {} bytes used, {} bytes available",
                tier.name(),
                used,
                capacity
            );
        }
    }

    /// Get a chunk from the given tier
    pub fn get_chunk(&self, tier: MemoryTier, key: &ChunkKey) -> Option<CachedChunk> {
        self.tier(tier).get(key).map(|entry| entry.value().clone())
    }

    /// Evict all chunks matching a table prefix from the given tier
    ///
    /// Idempotent: evicting a table with no cached chunks is a no-op.
    /// Returns the number of chunks evicted.
    pub fn evict_chunks_with_prefix(&self, prefix: TablePrefix, tier: MemoryTier) -> usize {
        let map = self.tier(tier);
        let keys: Vec<ChunkKey> = map
            .iter()
            .filter(|entry| prefix.matches(entry.key()))
            .map(|entry| *entry.key())
            .collect();

        let mut evicted = 0;
        for key in keys {
            if let Some((_, chunk)) = map.remove(&key) {
                self.usage(tier)
                    .fetch_sub(chunk.size_bytes(), Ordering::Relaxed);
                evicted += 1;
            }
        }

        if evicted > 0 {
            tracing::debug!(
                "Evicted {} chunks for table ({}, {}) from {} tier",
                evicted,
                prefix.db_id,
                prefix.table_id,
                tier.name()
            );
        }
        evicted
    }

    /// Number of chunks a table holds in the given tier
    pub fn chunk_count_for_table(&self, prefix: TablePrefix, tier: MemoryTier) -> usize {
        self.tier(tier)
            .iter()
            .filter(|entry| prefix.matches(entry.key()))
            .count()
    }

    /// Keys of all chunks a table holds in the given tier
    pub fn chunk_keys_for_table(&self, prefix: TablePrefix, tier: MemoryTier) -> Vec<ChunkKey> {
        let mut keys: Vec<ChunkKey> = self
            .tier(tier)
            .iter()
            .filter(|entry| prefix.matches(entry.key()))
            .map(|entry| *entry.key())
            .collect();
        keys.sort();
        keys
    }

    /// Get cache tier statistics
    pub fn tier_stats(&self) -> TierStatistics {
        TierStatistics {
            cpu_usage_bytes: self.cpu_usage_bytes.load(Ordering::Relaxed),
            cpu_capacity_bytes: self.cpu_capacity_bytes,
            gpu_usage_bytes: self.gpu_usage_bytes.load(Ordering::Relaxed),
            gpu_capacity_bytes: self.gpu_capacity_bytes,
            cpu_chunk_count: self.cpu_chunks.len(),
            gpu_chunk_count: self.gpu_chunks.len(),
        }
    }
}

/// Cache tier statistics
#[derive(Debug, Clone)]
pub struct TierStatistics {
    pub cpu_usage_bytes: usize,
    pub cpu_capacity_bytes: usize,
    pub gpu_usage_bytes: usize,
    pub gpu_capacity_bytes: usize,
    pub cpu_chunk_count: usize,
    pub gpu_chunk_count: usize,
}

impl TierStatistics {
    pub fn cpu_usage_percent(&self) -> f64 {
        if self.cpu_capacity_bytes > 0 {
            (self.cpu_usage_bytes as f64 / self.cpu_capacity_bytes as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn gpu_usage_percent(&self) -> f64 {
        if self.gpu_capacity_bytes > 0 {
            (self.gpu_usage_bytes as f64 / self.gpu_capacity_bytes as f64) * 100.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(table_id: u32, column_id: u32, fragment_id: u32) -> ChunkKey {
        ChunkKey::new(1, table_id, column_id, fragment_id)
    }

    #[test]
    fn test_put_and_get() {
        let cache = CacheManager::new(16, 16);
        cache.put_chunk(MemoryTier::Cpu, key(7, 0, 0), vec![1, 2, 3]);

        let chunk = cache.get_chunk(MemoryTier::Cpu, &key(7, 0, 0)).unwrap();
        assert_eq!(chunk.data.as_slice(), &[1, 2, 3]);
        assert!(cache.get_chunk(MemoryTier::Gpu, &key(7, 0, 0)).is_none());
    }

    #[test]
    fn test_prefix_eviction_spares_other_tables() {
        let cache = CacheManager::new(16, 16);
        cache.put_chunk(MemoryTier::Cpu, key(7, 0, 0), vec![0; 8]);
        cache.put_chunk(MemoryTier::Cpu, key(7, 1, 0), vec![0; 8]);
        cache.put_chunk(MemoryTier::Cpu, key(8, 0, 0), vec![0; 8]);
        cache.put_chunk(MemoryTier::Gpu, key(7, 0, 0), vec![0; 8]);

        let evicted = cache.evict_chunks_with_prefix(TablePrefix::new(1, 7), MemoryTier::Cpu);
        assert_eq!(evicted, 2);
        assert_eq!(
            cache.chunk_count_for_table(TablePrefix::new(1, 7), MemoryTier::Cpu),
            0
        );
        // Other table untouched
        assert_eq!(
            cache.chunk_count_for_table(TablePrefix::new(1, 8), MemoryTier::Cpu),
            1
        );
        // Other tier untouched
        assert_eq!(
            cache.chunk_count_for_table(TablePrefix::new(1, 7), MemoryTier::Gpu),
            1
        );
    }

    #[test]
    fn test_eviction_is_idempotent() {
        let cache = CacheManager::new(16, 16);
        let prefix = TablePrefix::new(1, 7);
        assert_eq!(cache.evict_chunks_with_prefix(prefix, MemoryTier::Cpu), 0);

        cache.put_chunk(MemoryTier::Cpu, key(7, 0, 0), vec![0; 8]);
        assert_eq!(cache.evict_chunks_with_prefix(prefix, MemoryTier::Cpu), 1);
        assert_eq!(cache.evict_chunks_with_prefix(prefix, MemoryTier::Cpu), 0);
    }

    #[test]
    fn test_usage_accounting() {
        let cache = CacheManager::new(16, 16);
        cache.put_chunk(MemoryTier::Cpu, key(7, 0, 0), vec![0; 100]);
        cache.put_chunk(MemoryTier::Cpu, key(7, 1, 0), vec![0; 50]);
        assert_eq!(cache.tier_stats().cpu_usage_bytes, 150);

        // Replacing a chunk accounts for the old size
        cache.put_chunk(MemoryTier::Cpu, key(7, 0, 0), vec![0; 10]);
        assert_eq!(cache.tier_stats().cpu_usage_bytes, 60);

        cache.evict_chunks_with_prefix(TablePrefix::new(1, 7), MemoryTier::Cpu);
        assert_eq!(cache.tier_stats().cpu_usage_bytes, 0);
    }
}
