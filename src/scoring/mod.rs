//! Confidence-aware classification decisions.
//!
//! [`ConfidenceScorer`] turns a model probability vector plus the raw question
//! into a [`ClassificationResult`]. Keyword rules are checked first and win
//! outright; otherwise probabilities are temperature-adjusted, and the
//! top-1/top-2 margin, entropy and per-category threshold decide whether the
//! answer is confident. Uncertain results carry ranked alternatives.
//!
//! The scorer is pure: it never blocks and holds no mutable state, so a single
//! instance is shared across requests.

mod analysis;
mod encoder;
pub mod error;
mod rules;
pub mod scorer;
pub mod types;


pub use analysis::{AmbiguityReport, ErrorReport, Misclassification};
pub use encoder::CategoryEncoder;
pub use error::{EncoderError, ScoringError};
pub use rules::{CategoryThresholds, KeywordMatch, KeywordRule, KeywordRules};
pub use scorer::{ConfidenceScorer, apply_temperature, entropy};
pub use types::{AlternativeCategory, Assessment, ClassificationResult, ScorerConfig};
