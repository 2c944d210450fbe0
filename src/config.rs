/// Refresh subsystem configuration
///
/// Configuration management for the cache-refresh subsystem:
/// - Scheduler sweep interval
/// - Per-tier cache capacities
/// - Default refresh cadence for foreign tables
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level refresh configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Scheduler configuration
    pub scheduler: SchedulerConfig,

    /// Cache tier configuration
    pub cache: CacheConfig,
}

/// Background scheduler configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds the sweep thread waits between full passes
    pub sweep_interval_secs: u64,

    /// Default refresh cadence applied to foreign tables that do not
    /// specify their own (seconds)
    pub default_refresh_interval_secs: u64,
}

/// Cache tier configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// CPU (fast-memory) tier capacity in MB
    pub cpu_capacity_mb: usize,

    /// GPU (accelerator-memory) tier capacity in MB
    pub gpu_capacity_mb: usize,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 60,
            default_refresh_interval_secs: 86_400, // Daily
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cpu_capacity_mb: 4096,
            gpu_capacity_mb: 1024,
        }
    }
}

impl RefreshConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: RefreshConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Serialize configuration to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize config")
    }
}
