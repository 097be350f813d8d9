use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{Embedder, EmbeddingError, HashingEmbedder};

/// Scriptable embedder for tests.
///
/// Returns registered vectors for known texts and falls back to a
/// [`HashingEmbedder`] otherwise. Every call is counted, which lets tests
/// assert cache behaviour.
#[derive(Clone)]
pub struct MockEmbedder {
    dim: usize,
    vectors: HashMap<String, Vec<f32>>,
    fallback: HashingEmbedder,
    delay: Option<Duration>,
    failing: bool,
    calls: Arc<AtomicUsize>,
}

impl MockEmbedder {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            vectors: HashMap::new(),
            fallback: HashingEmbedder::new(dim).expect("mock dimension must be > 0"),
            delay: None,
            failing: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Registers an exact vector for `text`.
    pub fn with_vector(mut self, text: &str, vector: Vec<f32>) -> Self {
        assert_eq!(vector.len(), self.dim, "mock vector has wrong dimension");
        self.vectors.insert(text.to_string(), vector);
        self
    }

    /// Sleeps before answering (for timeout tests).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Makes every call fail.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Number of `embed` calls so far (shared between clones).
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for MockEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockEmbedder")
            .field("dim", &self.dim)
            .field("vectors", &self.vectors.len())
            .field("calls", &self.calls())
            .finish()
    }
}

impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing {
            return Err(EmbeddingError::InferenceFailed {
                reason: "mock embedder configured to fail".to_string(),
            });
        }

        Ok(self
            .vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.fallback.embed_sync(text)))
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}
