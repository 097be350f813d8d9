use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::vectordb::VectorDbError;

/// Errors returned by answer retrieval.
///
/// A missing or empty category is not an error; it yields the no-answer sentinel.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The embedder failed or timed out. Never retried here.
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("index search failed: {0}")]
    Index(#[from] VectorDbError),
}
