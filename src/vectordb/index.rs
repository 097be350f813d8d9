use crate::storage::CategoryArtifact;

use super::error::VectorDbError;

/// One question/answer pair with its embedding, as fed to [`VectorIndex::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub question: String,
    pub answer: String,
    pub embedding: Vec<f32>,
}

/// A nearest-neighbour match: entry position and squared Euclidean distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    pub position: usize,
    pub distance: f32,
}

/// Brute-force k-NN index over the entries of one category.
///
/// Embeddings live in a single row-major arena. The index is immutable once
/// built; swapping in new content means building a new index.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorIndex {
    category: String,
    dimension: usize,
    arena: Vec<f32>,
    questions: Vec<String>,
    answers: Vec<String>,
}

impl VectorIndex {
    /// An index with no entries. Searches return nothing.
    pub fn empty(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            dimension: 0,
            arena: Vec::new(),
            questions: Vec::new(),
            answers: Vec::new(),
        }
    }

    pub fn build(
        category: impl Into<String>,
        entries: Vec<IndexEntry>,
    ) -> Result<Self, VectorDbError> {
        let category = category.into();
        if category.trim().is_empty() {
            return Err(VectorDbError::BlankCategory);
        }

        let Some(first) = entries.first() else {
            return Ok(Self::empty(category));
        };
        let dimension = first.embedding.len();
        if dimension == 0 {
            return Err(VectorDbError::InvalidDimension {
                expected: 1,
                actual: 0,
            });
        }

        let mut arena = Vec::with_capacity(entries.len() * dimension);
        let mut questions = Vec::with_capacity(entries.len());
        let mut answers = Vec::with_capacity(entries.len());

        for (position, entry) in entries.into_iter().enumerate() {
            if entry.embedding.len() != dimension {
                return Err(VectorDbError::InvalidDimension {
                    expected: dimension,
                    actual: entry.embedding.len(),
                });
            }
            if entry.embedding.iter().any(|v| !v.is_finite()) {
                return Err(VectorDbError::NonFiniteValue { position });
            }
            arena.extend_from_slice(&entry.embedding);
            questions.push(entry.question);
            answers.push(entry.answer);
        }

        Ok(Self {
            category,
            dimension,
            arena,
            questions,
            answers,
        })
    }

    /// Rebuilds an index from a persisted artifact.
    pub fn from_artifact(artifact: CategoryArtifact) -> Result<Self, VectorDbError> {
        let CategoryArtifact {
            category,
            dimension,
            questions,
            answers,
            embeddings,
        } = artifact;

        let consistent = questions.len() == answers.len()
            && embeddings.len() == questions.len() * dimension
            && (dimension > 0 || questions.is_empty());
        if !consistent {
            return Err(VectorDbError::Inconsistent {
                category,
                reason: format!(
                    "{} questions, {} answers, {} values at dimension {dimension}",
                    questions.len(),
                    answers.len(),
                    embeddings.len()
                ),
            });
        }
        if let Some(i) = embeddings.iter().position(|v| !v.is_finite()) {
            return Err(VectorDbError::NonFiniteValue {
                position: i / dimension,
            });
        }

        Ok(Self {
            category,
            dimension,
            arena: embeddings,
            questions,
            answers,
        })
    }

    pub fn to_artifact(&self) -> CategoryArtifact {
        CategoryArtifact {
            category: self.category.clone(),
            dimension: self.dimension,
            questions: self.questions.clone(),
            answers: self.answers.clone(),
            embeddings: self.arena.clone(),
        }
    }

    /// The `k` nearest entries to `query` by squared Euclidean distance.
    ///
    /// `k` is clamped to the population. Equal distances keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, VectorDbError> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(VectorDbError::InvalidDimension {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        if let Some(position) = query.iter().position(|v| !v.is_finite()) {
            return Err(VectorDbError::NonFiniteValue { position });
        }

        let mut hits: Vec<SearchHit> = self
            .arena
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, row)| SearchHit {
                position,
                distance: squared_l2(query, row),
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(k.min(self.len()));
        Ok(hits)
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Embedding dimension; 0 for an empty index.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn question(&self, position: usize) -> Option<&str> {
        self.questions.get(position).map(String::as_str)
    }

    pub fn answer(&self, position: usize) -> Option<&str> {
        self.answers.get(position).map(String::as_str)
    }

    pub fn embedding(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dimension)?;
        self.arena.get(start..start + self.dimension)
    }
}

#[inline]
fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
