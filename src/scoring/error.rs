use thiserror::Error;

/// Errors raised while mapping labels to probability indices.
#[derive(Debug, Error, PartialEq)]
pub enum EncoderError {
    #[error("unknown category: {label}")]
    UnknownCategory { label: String },

    #[error("duplicate category label: {label}")]
    Duplicate { label: String },

    #[error("encoder needs at least {min} categories, got {actual}")]
    TooFewCategories { min: usize, actual: usize },

    #[error("category label must not be blank")]
    BlankLabel,
}

/// Validation failures for a classification request.
///
/// Ambiguous or low-confidence outcomes are never errors; only malformed input is.
#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
    #[error("probability vector has {actual} entries, encoder expects {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("input text is empty")]
    EmptyText,

    #[error("probability at index {index} is invalid: {value}")]
    InvalidProbability { index: usize, value: f64 },

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error(transparent)]
    Encoder(#[from] EncoderError),
}
