//! Embedding seam.
//!
//! The engine never owns a text encoder: anything implementing [`Embedder`] is
//! constructed once at startup and shared behind an `Arc`.
//!
//! - [`lexical`] provides a deterministic lexical embedder for offline tooling.
//! - [`mock`] provides a scriptable embedder for tests (behind the `mock` feature).

mod error;
/// Feature-hashing lexical embedder.
pub mod lexical;
/// Scriptable embedder for tests.
#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use error::EmbeddingError;
pub use lexical::HashingEmbedder;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbedder;

use std::future::Future;

/// Turns text into a fixed-length vector.
///
/// Implementations must be deterministic for identical input and always return
/// [`dimension`](Embedder::dimension) values.
pub trait Embedder: Send + Sync {
    /// Embeds `text`. May be slow; the engine calls it outside every cache lock.
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, EmbeddingError>> + Send;

    /// Fixed output dimension for this deployment.
    fn dimension(&self) -> usize;
}

/// Checks an embedder output against the declared dimension.
pub fn validate_embedding(embedding: &[f32], expected: usize) -> Result<(), EmbeddingError> {
    if embedding.len() != expected {
        return Err(EmbeddingError::InvalidDimension {
            expected,
            actual: embedding.len(),
        });
    }
    if embedding.iter().any(|v| !v.is_finite()) {
        return Err(EmbeddingError::InferenceFailed {
            reason: "embedding contains non-finite values".to_string(),
        });
    }
    Ok(())
}
