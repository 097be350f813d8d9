//! Query caches in front of the embedder and the vector indices.
//!
//! Both caches are `moka::sync` maps bounded by capacity (LRU) and TTL,
//! whichever bites first. Readers never block each other and an entry is
//! either fully present or absent.
//!
//! - [`EmbeddingCache`]: raw question text → embedding.
//! - [`SimilarityCache`]: (epoch, category, k, embedding) → ranked hits.

mod config;
mod embedding;
mod similarity;
mod stats;


pub use config::CacheConfig;
pub use embedding::EmbeddingCache;
pub use similarity::{RankedHit, SimilarityCache};
pub use stats::CacheStats;

/// The two caches used by the retriever, cleared together.
#[derive(Debug)]
pub struct QueryCache {
    embeddings: EmbeddingCache,
    similarities: SimilarityCache,
}

impl QueryCache {
    /// Both caches share `config`.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_configs(config, config)
    }

    pub fn with_configs(embeddings: CacheConfig, similarities: CacheConfig) -> Self {
        Self {
            embeddings: EmbeddingCache::new(embeddings),
            similarities: SimilarityCache::new(similarities),
        }
    }

    #[inline]
    pub fn embeddings(&self) -> &EmbeddingCache {
        &self.embeddings
    }

    #[inline]
    pub fn similarities(&self) -> &SimilarityCache {
        &self.similarities
    }

    pub fn clear(&self) {
        self.embeddings.clear();
        self.similarities.clear();
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
