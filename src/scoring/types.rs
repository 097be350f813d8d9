use std::collections::BTreeMap;

use serde::Serialize;

use crate::constants::{
    ALTERNATIVE_GAP, ALTERNATIVE_THRESHOLD, DEFAULT_NEAR_AMBIGUOUS_THRESHOLD, DISTANCE_THRESHOLD,
    ENTROPY_THRESHOLD, TEMPERATURE,
};

/// A category close enough to the winner to be worth showing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlternativeCategory {
    pub category: String,
    pub confidence: f64,
}

/// Outcome of classifying one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    /// Winning category.
    pub category: String,
    /// Temperature-adjusted probability of the winner (1.0 on keyword override).
    pub confidence: f64,
    pub top2_category: String,
    pub top2_confidence: f64,
    /// Gap between top-1 and top-2; never below `MIN_MARGIN`.
    pub margin: f64,
    pub entropy: f64,
    pub is_confident: bool,
    pub is_near_ambiguous: bool,
    /// `true` when a keyword rule decided the category.
    pub keyword_override: bool,
    /// Ordered by confidence, highest first.
    pub alternatives: Vec<AlternativeCategory>,
    /// Per-category probabilities (scaled, or raw on keyword override).
    pub probabilities: BTreeMap<String, f64>,
}

impl ClassificationResult {
    /// Returns `true` if the result carries alternatives.
    pub fn has_alternatives(&self) -> bool {
        !self.alternatives.is_empty()
    }
}

impl std::fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = if self.keyword_override {
            "KEYWORD"
        } else if self.is_confident {
            "CONFIDENT"
        } else {
            "AMBIGUOUS"
        };
        write!(
            f,
            "{} ({:.4}, margin {:.4}, entropy {:.4}) {}",
            self.category, self.confidence, self.margin, self.entropy, status
        )
    }
}

/// Tunables of the decision layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScorerConfig {
    pub temperature: f64,
    pub distance_threshold: f64,
    pub entropy_threshold: f64,
    pub near_ambiguous_threshold: f64,
    pub alternative_threshold: f64,
    pub alternative_gap: f64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            temperature: TEMPERATURE,
            distance_threshold: DISTANCE_THRESHOLD,
            entropy_threshold: ENTROPY_THRESHOLD,
            near_ambiguous_threshold: DEFAULT_NEAR_AMBIGUOUS_THRESHOLD,
            alternative_threshold: ALTERNATIVE_THRESHOLD,
            alternative_gap: ALTERNATIVE_GAP,
        }
    }
}

impl ScorerConfig {
    pub fn with_near_ambiguous_threshold(mut self, threshold: f64) -> Self {
        self.near_ambiguous_threshold = threshold;
        self
    }
}

/// Ambiguity flags for one classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment {
    pub below_threshold: bool,
    pub narrow_margin: bool,
    pub high_entropy: bool,
    pub is_near_ambiguous: bool,
}

impl Assessment {
    /// Evaluates the ambiguity rules for a top-1 confidence against `threshold`.
    pub fn evaluate(
        config: &ScorerConfig,
        threshold: f64,
        confidence: f64,
        margin: f64,
        entropy: f64,
    ) -> Self {
        Self {
            below_threshold: confidence < threshold,
            narrow_margin: margin < config.distance_threshold,
            high_entropy: entropy > config.entropy_threshold,
            is_near_ambiguous: margin < config.near_ambiguous_threshold,
        }
    }

    #[inline]
    pub fn is_ambiguous(&self) -> bool {
        self.below_threshold || self.narrow_margin || self.high_entropy
    }

    #[inline]
    pub fn is_confident(&self) -> bool {
        !self.is_ambiguous()
    }
}
