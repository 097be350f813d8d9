use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::storage::StorageError;

/// Errors returned by in-memory vector index operations.
#[derive(Debug, Error, PartialEq)]
pub enum VectorDbError {
    /// Vector dimension mismatch.
    #[error("invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// A stored or query vector contains NaN or infinity.
    #[error("non-finite value in vector at position {position}")]
    NonFiniteValue { position: usize },

    #[error("category name must not be blank")]
    BlankCategory,

    #[error("index for '{category}' is inconsistent: {reason}")]
    Inconsistent { category: String, reason: String },
}

/// Errors from building, loading or persisting an [`IndexStore`](super::IndexStore).
#[derive(Debug, Error)]
pub enum IndexStoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    VectorDb(#[from] VectorDbError),

    #[error("embedding failed while building index: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Persisted indices are missing or corrupt and no dataset can rebuild them.
    #[error("dataset unavailable for index rebuild: {reason}")]
    DatasetUnavailable { reason: String },
}
