use serde::Serialize;

use super::config::CacheConfig;

/// Snapshot of a cache's occupancy and limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub size: u64,
    pub max_size: u64,
    /// Entry lifetime, in seconds.
    pub ttl: u64,
}

impl CacheStats {
    pub(crate) fn new(size: u64, config: &CacheConfig) -> Self {
        Self {
            size,
            max_size: config.max_entries,
            ttl: config.ttl.as_secs(),
        }
    }
}
