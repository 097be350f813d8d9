use std::time::Duration;

use thiserror::Error;

/// Failures raised by an [`Embedder`](super::Embedder).
///
/// These are never retried inside the engine; callers decide on retry policy.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("embedding timed out after {elapsed:?}")]
    Timeout { elapsed: Duration },

    #[error("invalid embedding dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("invalid embedder configuration: {reason}")]
    InvalidConfig { reason: String },
}
