use thiserror::Error;

use crate::model::ModelError;
use crate::retrieval::RetrievalError;
use crate::scoring::ScoringError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("model and scorer disagree on categories: {model:?} vs {scorer:?}")]
    EncoderMismatch {
        model: Vec<String>,
        scorer: Vec<String>,
    },
}
