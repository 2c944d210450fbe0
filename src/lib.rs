//! # Foreign Table Cache
//!
//! The cache-refresh subsystem of an analytical SQL engine: keeps locally
//! cached copies of externally-sourced table data consistent with their
//! source, on demand and on a periodic background schedule.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use foreign_table_cache::{
//!     CacheManager, LockManager, RefreshContext, SourceFetcher, StorageKind, SystemCatalog,
//! };
//! use foreign_table_cache::fetch::ChunkSource;
//!
//! // Catalog with one foreign table refreshed every five minutes
//! let system_catalog = Arc::new(SystemCatalog::new());
//! let catalog = system_catalog.add_catalog("analytics");
//! catalog.add_table("trips", StorageKind::Foreign, Some(Duration::from_secs(300)));
//!
//! // Two-tier cache and a source-backed fetcher
//! let cache = Arc::new(CacheManager::new(4096, 1024));
//! let source: Arc<ChunkSource> = Arc::new(|_prefix| Ok(Vec::new()));
//! let fetcher = Arc::new(SourceFetcher::new(cache.clone(), source));
//!
//! // Manual refresh
//! let ctx = RefreshContext::new(
//!     system_catalog,
//!     Arc::new(LockManager::new()),
//!     cache,
//!     fetcher,
//! );
//! ctx.refresh(&catalog, "trips", false).unwrap();
//! ```
//!
//! ## Features
//!
//! - **Locked Refresh**: each refresh runs under an exclusive schema lock
//! - **Two-Tier Eviction**: CPU and GPU cached chunks evicted by table prefix
//! - **Truthful Bookkeeping**: refresh timestamps track actual cache state,
//!   even when the fetch fails after its commitment point
//! - **Background Scheduler**: one sweep thread, cancellable mid-wait

// Internal modules
pub mod catalog;
pub mod config;
pub mod error;
pub mod fetch;
pub mod locking;
pub mod refresh;
pub mod scheduler;
pub mod storage;

// Public API - Main types users need
pub use catalog::{Catalog, FragmentLayout, StorageKind, SystemCatalog, TableDescriptor};
pub use config::RefreshConfig;
pub use fetch::{FetchOutcome, ForeignFetcher, SourceFetcher};
pub use locking::{LockManager, TableSchemaLock};
pub use refresh::RefreshContext;
pub use scheduler::RefreshScheduler;
pub use storage::{CacheManager, ChunkKey, MemoryTier, TablePrefix};

// Re-export commonly used error types
pub use error::{RefreshError, RefreshResult};
