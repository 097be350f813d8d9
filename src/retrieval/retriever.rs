use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, instrument};

use super::error::RetrievalError;
use super::types::{AnswerCandidate, BestAnswer, RetrieverConfig};
use crate::cache::{CacheConfig, CacheStats, QueryCache, RankedHit};
use crate::embedding::{Embedder, EmbeddingError, validate_embedding};
use crate::hashing::{embedding_fingerprint, similarity_key};
use crate::vectordb::{
    IndexStore, IndexStoreHandle, StoreSnapshot, VectorIndex, distances_to_similarities,
};

/// Finds pre-authored answers for a question within a category.
///
/// Holds the shared embedder, the published [`IndexStore`] and the query
/// caches. All methods take `&self`; one instance serves every request.
pub struct AnswerRetriever<E: Embedder> {
    embedder: Arc<E>,
    store: IndexStoreHandle,
    cache: QueryCache,
    config: RetrieverConfig,
}

impl<E: Embedder> std::fmt::Debug for AnswerRetriever<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerRetriever")
            .field("epoch", &self.store.epoch())
            .field("cache", &self.cache)
            .field("config", &self.config)
            .finish()
    }
}

impl<E: Embedder> AnswerRetriever<E> {
    pub fn new(
        embedder: Arc<E>,
        store: IndexStore,
        cache_config: CacheConfig,
        config: RetrieverConfig,
    ) -> Self {
        Self {
            embedder,
            store: IndexStoreHandle::new(store),
            cache: QueryCache::new(cache_config),
            config,
        }
    }

    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    pub fn embedder(&self) -> &Arc<E> {
        &self.embedder
    }

    /// Currently published store and its epoch.
    pub fn snapshot(&self) -> StoreSnapshot {
        self.store.snapshot()
    }

    /// Publishes a new store and drops similarity results computed against
    /// older ones. Returns the new epoch.
    pub fn replace_store(&self, store: IndexStore) -> u64 {
        let epoch = self.store.replace(store);
        self.cache.similarities().clear();
        epoch
    }

    /// Best answer in `category`, gated by `min_similarity` (the configured
    /// default when `None`).
    #[instrument(skip(self, question), fields(question_len = question.len()))]
    pub async fn find_best_answer(
        &self,
        question: &str,
        category: &str,
        min_similarity: Option<f32>,
    ) -> Result<BestAnswer, RetrievalError> {
        check_question(question)?;
        let min_similarity = self.min_similarity(min_similarity)?;

        let snapshot = self.store.snapshot();
        let Some(index) = populated(&snapshot, category) else {
            debug!("No entries for category");
            return Ok(BestAnswer::no_answer());
        };

        let hits = self
            .ranked_hits(&snapshot, &index, question, self.config.top_k)
            .await?;
        let mut candidates = hits.iter().filter_map(|hit| candidate(&index, hit));

        let Some(best) = candidates.next() else {
            return Ok(BestAnswer::no_answer());
        };
        let alternatives: Vec<AnswerCandidate> = candidates
            .filter(|c| c.similarity >= min_similarity)
            .collect();
        let is_confident = best.similarity >= min_similarity;

        debug!(
            similarity = best.similarity,
            is_confident,
            alternatives = alternatives.len(),
            "Best answer"
        );

        Ok(BestAnswer {
            answer: best.answer,
            similarity: best.similarity,
            best_question: best.question,
            is_confident,
            alternatives,
        })
    }

    /// Every entry of `category` at or above `min_similarity`, best first.
    #[instrument(skip(self, question), fields(question_len = question.len()))]
    pub async fn find_answers_in_category(
        &self,
        question: &str,
        category: &str,
        min_similarity: Option<f32>,
    ) -> Result<Vec<AnswerCandidate>, RetrievalError> {
        check_question(question)?;
        let min_similarity = self.min_similarity(min_similarity)?;

        let snapshot = self.store.snapshot();
        let Some(index) = populated(&snapshot, category) else {
            return Ok(Vec::new());
        };

        let hits = self
            .ranked_hits(&snapshot, &index, question, index.len())
            .await?;
        Ok(hits
            .iter()
            .filter_map(|hit| candidate(&index, hit))
            .filter(|c| c.similarity >= min_similarity)
            .collect())
    }

    /// The `k` nearest entries of `category`, without a similarity gate.
    #[instrument(skip(self, question), fields(question_len = question.len()))]
    pub async fn find_top_k(
        &self,
        question: &str,
        category: &str,
        k: usize,
    ) -> Result<Vec<AnswerCandidate>, RetrievalError> {
        check_question(question)?;
        if k == 0 {
            return Err(RetrievalError::InvalidInput {
                reason: "k must be at least 1".to_string(),
            });
        }

        let snapshot = self.store.snapshot();
        let Some(index) = populated(&snapshot, category) else {
            return Ok(Vec::new());
        };

        let hits = self.ranked_hits(&snapshot, &index, question, k).await?;
        Ok(hits
            .iter()
            .filter_map(|hit| candidate(&index, hit))
            .collect())
    }

    /// Embeds `question` through the embedding cache.
    ///
    /// The embedder runs outside any cache lock; concurrent misses for the
    /// same text may both call it, and the last insert wins.
    pub async fn embed(&self, question: &str) -> Result<Arc<[f32]>, RetrievalError> {
        if let Some(embedding) = self.cache.embeddings().get(question) {
            debug!("Embedding cache hit");
            return Ok(embedding);
        }

        let started = Instant::now();
        let pending = self.embedder.embed(question);
        let embedding = match self.config.embed_timeout {
            Some(limit) => tokio::time::timeout(limit, pending).await.map_err(|_| {
                EmbeddingError::Timeout {
                    elapsed: started.elapsed(),
                }
            })??,
            None => pending.await?,
        };
        validate_embedding(&embedding, self.embedder.dimension())?;

        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Embedded question"
        );

        let embedding: Arc<[f32]> = Arc::from(embedding);
        self.cache.embeddings().insert(question, Arc::clone(&embedding));
        Ok(embedding)
    }

    pub fn clear_caches(&self) {
        self.cache.clear();
        debug!("Cleared query caches");
    }

    /// Embedding cache occupancy.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.embeddings().stats()
    }

    pub fn similarity_cache_stats(&self) -> CacheStats {
        self.cache.similarities().stats()
    }

    async fn ranked_hits(
        &self,
        snapshot: &StoreSnapshot,
        index: &VectorIndex,
        question: &str,
        k: usize,
    ) -> Result<Arc<[RankedHit]>, RetrievalError> {
        let embedding = self.embed(question).await?;
        let k = k.min(index.len());
        let key = similarity_key(
            snapshot.epoch,
            index.category(),
            k,
            &embedding_fingerprint(&embedding),
        );

        if let Some(hits) = self.cache.similarities().get(&key) {
            debug!(k, "Similarity cache hit");
            return Ok(hits);
        }

        let hits = index.search(&embedding, k)?;
        let distances: Vec<f32> = hits.iter().map(|h| h.distance).collect();
        let ranked: Arc<[RankedHit]> = hits
            .iter()
            .zip(distances_to_similarities(&distances))
            .map(|(hit, similarity)| RankedHit {
                position: hit.position,
                distance: hit.distance,
                similarity,
            })
            .collect();

        self.cache.similarities().insert(key, Arc::clone(&ranked));
        Ok(ranked)
    }

    fn min_similarity(&self, requested: Option<f32>) -> Result<f32, RetrievalError> {
        let value = requested.unwrap_or(self.config.min_similarity);
        if !(0.0..=1.0).contains(&value) {
            return Err(RetrievalError::InvalidInput {
                reason: format!("min_similarity must be within [0, 1], got {value}"),
            });
        }
        Ok(value)
    }
}

fn check_question(question: &str) -> Result<(), RetrievalError> {
    if question.trim().is_empty() {
        return Err(RetrievalError::InvalidInput {
            reason: "question is empty".to_string(),
        });
    }
    Ok(())
}

/// The category's index, if it exists and has entries.
fn populated(snapshot: &StoreSnapshot, category: &str) -> Option<Arc<VectorIndex>> {
    snapshot
        .store
        .get(category)
        .filter(|index| !index.is_empty())
        .cloned()
}

fn candidate(index: &VectorIndex, hit: &RankedHit) -> Option<AnswerCandidate> {
    Some(AnswerCandidate {
        question: index.question(hit.position)?.to_string(),
        answer: index.answer(hit.position)?.to_string(),
        similarity: hit.similarity,
    })
}
