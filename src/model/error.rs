use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("invalid embedding dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("model has no fitted categories")]
    NotFitted,

    #[error("category '{category}' has dimension {actual}, expected {expected}")]
    MixedDimensions {
        category: String,
        expected: usize,
        actual: usize,
    },
}
