//! Snapshot cache configuration.

use serde::{Deserialize, Serialize};

/// Snapshot cache configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Parsed snapshots retained before the oldest is evicted.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

const fn default_max_entries() -> usize {
    8
}
