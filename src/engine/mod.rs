//! End-to-end question answering.
//!
//! [`Engine::ask`] embeds the question once, predicts category probabilities,
//! classifies them with the [`ConfidenceScorer`] and retrieves the best answer
//! in the chosen category. The embedding cache is shared with retrieval, so the
//! embedder runs at most once per distinct question.

mod error;


pub use error::EngineError;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::cache::{CacheConfig, CacheStats};
use crate::dataset::FaqRecord;
use crate::embedding::Embedder;
use crate::model::ProbabilityModel;
use crate::retrieval::{AnswerCandidate, AnswerRetriever, RetrieverConfig};
use crate::scoring::{
    AmbiguityReport, ClassificationResult, ConfidenceScorer, ErrorReport, ScoringError,
};
use crate::vectordb::IndexStore;

/// Answer payload for one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriageResponse {
    pub question: String,
    pub category: String,
    pub probabilities: BTreeMap<String, f64>,
    pub confidence: f64,
    pub answer: String,
    pub similarity: f32,
    pub best_question: String,
    pub answer_is_confident: bool,
    pub answer_alternatives: Vec<AnswerCandidate>,
    pub classification: ClassificationResult,
}

pub struct Engine<E: Embedder, M: ProbabilityModel> {
    model: M,
    scorer: ConfidenceScorer,
    retriever: AnswerRetriever<E>,
}

impl<E: Embedder, M: ProbabilityModel> std::fmt::Debug for Engine<E, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("categories", &self.scorer.encoder().labels())
            .field("retriever", &self.retriever)
            .finish()
    }
}

impl<E: Embedder, M: ProbabilityModel> Engine<E, M> {
    /// Wires the components together. Every category the scorer can emit
    /// gets an index in `store` (empty if it had none).
    pub fn new(
        embedder: Arc<E>,
        model: M,
        scorer: ConfidenceScorer,
        store: IndexStore,
        cache_config: CacheConfig,
        retriever_config: RetrieverConfig,
    ) -> Result<Self, EngineError> {
        if model.encoder().labels() != scorer.encoder().labels() {
            return Err(EngineError::EncoderMismatch {
                model: model.encoder().labels().to_vec(),
                scorer: scorer.encoder().labels().to_vec(),
            });
        }

        let store = store.with_categories(scorer.referenced_categories());
        info!(
            categories = store.len(),
            entries = store.total_entries(),
            "Engine ready"
        );

        Ok(Self {
            retriever: AnswerRetriever::new(embedder, store, cache_config, retriever_config),
            model,
            scorer,
        })
    }

    pub fn scorer(&self) -> &ConfidenceScorer {
        &self.scorer
    }

    pub fn retriever(&self) -> &AnswerRetriever<E> {
        &self.retriever
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Classifies a question without retrieving an answer.
    pub async fn classify(&self, question: &str) -> Result<ClassificationResult, EngineError> {
        if question.trim().is_empty() {
            return Err(ScoringError::EmptyText.into());
        }
        let embedding = self.retriever.embed(question).await?;
        let probabilities = self.model.predict_proba(&embedding)?;
        Ok(self.scorer.classify(&probabilities, question)?)
    }

    /// Classifies `question` and returns the best answer in its category.
    #[instrument(skip(self, question), fields(question_len = question.len()))]
    pub async fn ask(&self, question: &str) -> Result<TriageResponse, EngineError> {
        let classification = self.classify(question).await?;
        let best = self
            .retriever
            .find_best_answer(question, &classification.category, None)
            .await?;

        debug!(
            category = %classification.category,
            confidence = classification.confidence,
            similarity = best.similarity,
            "Answered"
        );

        Ok(TriageResponse {
            question: question.to_string(),
            category: classification.category.clone(),
            probabilities: classification.probabilities.clone(),
            confidence: classification.confidence,
            answer: best.answer,
            similarity: best.similarity,
            best_question: best.best_question,
            answer_is_confident: best.is_confident,
            answer_alternatives: best.alternatives,
            classification,
        })
    }

    /// Classifies a batch and summarises its ambiguity.
    pub async fn analyze_ambiguity<S: AsRef<str>>(
        &self,
        questions: &[S],
    ) -> Result<AmbiguityReport, EngineError> {
        let mut results = Vec::with_capacity(questions.len());
        for question in questions {
            results.push(self.classify(question.as_ref()).await?);
        }
        Ok(AmbiguityReport::from_results(&results))
    }

    /// Classifies every record's question and compares with its category.
    pub async fn analyze_errors(&self, records: &[FaqRecord]) -> Result<ErrorReport, EngineError> {
        let mut results = Vec::with_capacity(records.len());
        for record in records {
            results.push(self.classify(&record.question).await?);
        }
        let expected: Vec<&str> = records.iter().map(|r| r.category.as_str()).collect();
        Ok(ErrorReport::from_predictions(&expected, &results)?)
    }

    /// Publishes a new store, keeping an index for every scorer category.
    pub fn replace_store(&self, store: IndexStore) -> u64 {
        self.retriever
            .replace_store(store.with_categories(self.scorer.referenced_categories()))
    }

    pub fn clear_caches(&self) {
        self.retriever.clear_caches();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.retriever.cache_stats()
    }
}
