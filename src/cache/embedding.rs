//! Embedding reuse keyed by the raw question text.

use std::sync::Arc;

use moka::policy::EvictionPolicy;
use moka::sync::Cache;

use super::config::CacheConfig;
use super::stats::CacheStats;
use crate::hashing::hash_text;

/// Raw text → embedding. No normalisation: `"Carte"` and `"carte "` are
/// different keys.
pub struct EmbeddingCache {
    entries: Cache<[u8; 32], Arc<[f32]>>,
    config: CacheConfig,
}

impl EmbeddingCache {
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
    pub fn get(&self, text: &str) -> Option<Arc<[f32]>> {
        self.entries.get(&hash_text(text))
    }

    #[inline]
    pub fn insert(&self, text: &str, embedding: Arc<[f32]>) {
        self.entries.insert(hash_text(text), embedding);
    }

    #[inline]
    pub fn contains(&self, text: &str) -> bool {
        self.entries.contains_key(&hash_text(text))
    }

    /// Approximate entry count; see [`stats`](Self::stats) for an exact one.
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

impl std::fmt::Debug for EmbeddingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingCache")
            .field("entries", &self.entries.entry_count())
            .field("config", &self.config)
            .finish()
    }
}
