//! Confidence-aware FAQ classification and answer retrieval.
//!
//! # Public API Surface
//!
//! ## Decision layer
//! - [`ConfidenceScorer`], [`ClassificationResult`] - keyword override, temperature
//!   scaling, margin/entropy ambiguity checks
//! - [`CategoryEncoder`], [`KeywordRules`], [`CategoryThresholds`] - category tables
//! - [`AmbiguityReport`], [`ErrorReport`] - batch analysis
//!
//! ## Retrieval
//! - [`AnswerRetriever`], [`BestAnswer`], [`AnswerCandidate`] - per-category answers
//! - [`IndexStore`], [`VectorIndex`] - brute-force k-NN indices, persisted with `rkyv`
//! - [`QueryCache`] - embedding and similarity caches (`moka`)
//!
//! ## Wiring
//! - [`Engine`] - embed, predict, classify and retrieve in one call
//! - [`Embedder`], [`ProbabilityModel`] - seams for the encoder and the trained model
//! - [`Config`] - `TRIAGE_*` environment configuration
//!
//! ## Test/Mock Support
//! [`MockEmbedder`] is available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod config;
pub mod constants;
pub mod dataset;
pub mod embedding;
pub mod engine;
pub mod hashing;
pub mod model;
pub mod retrieval;
pub mod scoring;
pub mod storage;
pub mod vectordb;

pub use cache::{CacheConfig, CacheStats, EmbeddingCache, QueryCache, SimilarityCache};
pub use config::{Config, ConfigError};
pub use dataset::{DatasetError, FaqRecord, load_dataset};
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEmbedder;
pub use embedding::{Embedder, EmbeddingError, HashingEmbedder};
pub use engine::{Engine, EngineError, TriageResponse};
pub use model::{CentroidModel, ModelError, ProbabilityModel};
pub use retrieval::{AnswerCandidate, AnswerRetriever, BestAnswer, RetrievalError, RetrieverConfig};
pub use scoring::{
    AlternativeCategory, AmbiguityReport, Assessment, CategoryEncoder, CategoryThresholds,
    ClassificationResult, ConfidenceScorer, EncoderError, ErrorReport, KeywordRule, KeywordRules,
    ScorerConfig, ScoringError,
};
pub use storage::StorageError;
pub use vectordb::{
    IndexStore, IndexStoreError, IndexStoreHandle, SearchHit, VectorDbError, VectorIndex,
};
