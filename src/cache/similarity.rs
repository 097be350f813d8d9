//! Search results keyed by store epoch, category, `k` and query embedding.

use std::sync::Arc;

use moka::policy::EvictionPolicy;
use moka::sync::Cache;

use super::config::CacheConfig;
use super::stats::CacheStats;

/// A search hit with its batch-relative similarity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedHit {
    pub position: usize,
    pub distance: f32,
    pub similarity: f32,
}

/// Cached ranked hits. Keys come from [`crate::hashing::similarity_key`].
pub struct SimilarityCache {
    entries: Cache<[u8; 32], Arc<[RankedHit]>>,
    config: CacheConfig,
}

impl SimilarityCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(config.max_entries)
                .time_to_live(config.ttl)
                .eviction_policy(EvictionPolicy::lru())
                .build(),
            config,
        }
    }

    #[inline]
    pub fn get(&self, key: &[u8; 32]) -> Option<Arc<[RankedHit]>> {
        self.entries.get(key)
    }

    #[inline]
    pub fn insert(&self, key: [u8; 32], hits: Arc<[RankedHit]>) {
        self.entries.insert(key, hits);
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks();
    }

    pub fn stats(&self) -> CacheStats {
        self.entries.run_pending_tasks();
        CacheStats::new(self.entries.entry_count(), &self.config)
    }
}

impl std::fmt::Debug for SimilarityCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimilarityCache")
            .field("entries", &self.entries.entry_count())
            .field("config", &self.config)
            .finish()
    }
}
