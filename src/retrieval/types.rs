use std::time::Duration;

use serde::Serialize;

use crate::constants::{DEFAULT_MIN_SIMILARITY, DEFAULT_TOP_K, NO_ANSWER_MESSAGE};

/// A stored question/answer pair and how similar its question is to the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerCandidate {
    pub question: String,
    pub answer: String,
    /// Batch-relative similarity in `[0, 1]`.
    pub similarity: f32,
}

/// Best answer within a category, plus close runners-up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestAnswer {
    pub answer: String,
    pub similarity: f32,
    pub best_question: String,
    pub is_confident: bool,
    pub alternatives: Vec<AnswerCandidate>,
}

impl BestAnswer {
    /// Returned when the category is unknown or has no entries.
    pub fn no_answer() -> Self {
        Self {
            answer: NO_ANSWER_MESSAGE.to_string(),
            similarity: 0.0,
            best_question: String::new(),
            is_confident: false,
            alternatives: Vec::new(),
        }
    }

    pub fn is_no_answer(&self) -> bool {
        self.best_question.is_empty() && self.answer == NO_ANSWER_MESSAGE
    }
}

/// Retrieval tunables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrieverConfig {
    /// Similarity gate for `is_confident` and alternatives.
    pub min_similarity: f32,
    /// Neighbours fetched by `find_best_answer`.
    pub top_k: usize,
    /// Upper bound on a single embedder call. `None` waits indefinitely.
    pub embed_timeout: Option<Duration>,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            min_similarity: DEFAULT_MIN_SIMILARITY,
            top_k: DEFAULT_TOP_K,
            embed_timeout: None,
        }
    }
}

impl RetrieverConfig {
    pub fn with_min_similarity(mut self, min_similarity: f32) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    pub fn with_embed_timeout(mut self, timeout: Duration) -> Self {
        self.embed_timeout = Some(timeout);
        self
    }
}
