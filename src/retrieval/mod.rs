//! Answer retrieval: embed, search the category index, convert distances to
//! similarities and gate the result.
//!
//! ```text
//! question ──► EmbeddingCache ──miss──► Embedder
//!                  │
//!                  ▼
//!            SimilarityCache ──miss──► VectorIndex::search ──► similarities
//!                  │
//!                  ▼
//!          BestAnswer / candidates
//! ```

mod error;
mod retriever;
mod types;


pub use error::RetrievalError;
pub use retriever::AnswerRetriever;
pub use types::{AnswerCandidate, BestAnswer, RetrieverConfig};
