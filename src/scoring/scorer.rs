use std::collections::BTreeMap;

use tracing::debug;

use crate::constants::{ENTROPY_EPSILON, MIN_MARGIN};

use super::encoder::CategoryEncoder;
use super::error::ScoringError;
use super::rules::{CategoryThresholds, KeywordRules};
use super::types::{AlternativeCategory, Assessment, ClassificationResult, ScorerConfig};

/// Temperature-scaled softmax over a probability vector.
///
/// The maximum is subtracted before exponentiating; the output is unchanged.
pub fn apply_temperature(probabilities: &[f64], temperature: f64) -> Vec<f64> {
    if probabilities.is_empty() {
        return Vec::new();
    }

    let max = probabilities
        .iter()
        .map(|p| p / temperature)
        .fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = probabilities
        .iter()
        .map(|p| (p / temperature - max).exp())
        .collect();
    let sum: f64 = exps.iter().sum();

    exps.into_iter().map(|e| e / sum).collect()
}

/// Shannon entropy (natural log), clamped at zero.
pub fn entropy(probabilities: &[f64]) -> f64 {
    let h: f64 = probabilities
        .iter()
        .map(|p| p * (p + ENTROPY_EPSILON).ln())
        .sum();
    (-h).max(0.0)
}

/// Indices ordered by value descending; equal values keep the lower index first.
fn rank_descending(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
    order
}

/// Turns a model probability vector into a [`ClassificationResult`].
///
/// Keyword rules are consulted first; otherwise the probabilities are
/// temperature-adjusted and checked against the category threshold, the
/// top-2 margin and the entropy.
#[derive(Debug, Clone)]
pub struct ConfidenceScorer {
    encoder: CategoryEncoder,
    rules: KeywordRules,
    thresholds: CategoryThresholds,
    config: ScorerConfig,
}

impl ConfidenceScorer {
    pub fn new(
        encoder: CategoryEncoder,
        rules: KeywordRules,
        thresholds: CategoryThresholds,
        config: ScorerConfig,
    ) -> Self {
        Self {
            encoder,
            rules,
            thresholds,
            config,
        }
    }

    /// Scorer with the French banking rules and thresholds.
    pub fn french_banking(encoder: CategoryEncoder, config: ScorerConfig) -> Self {
        Self::new(
            encoder,
            KeywordRules::french_banking(),
            CategoryThresholds::french_banking(),
            config,
        )
    }

    pub fn encoder(&self) -> &CategoryEncoder {
        &self.encoder
    }

    pub fn rules(&self) -> &KeywordRules {
        &self.rules
    }

    pub fn thresholds(&self) -> &CategoryThresholds {
        &self.thresholds
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Every category this scorer can emit or references.
    pub fn referenced_categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .encoder
            .labels()
            .iter()
            .cloned()
            .chain(self.rules.categories().map(str::to_string))
            .chain(self.thresholds.categories().map(str::to_string))
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }

    pub fn classify(
        &self,
        probabilities: &[f64],
        raw_text: &str,
    ) -> Result<ClassificationResult, ScoringError> {
        self.classify_with_threshold(probabilities, raw_text, None)
    }

    /// Like [`classify`](Self::classify), with `threshold` replacing the
    /// per-category threshold when given.
    pub fn classify_with_threshold(
        &self,
        probabilities: &[f64],
        raw_text: &str,
        threshold: Option<f64>,
    ) -> Result<ClassificationResult, ScoringError> {
        self.validate(probabilities, raw_text, threshold)?;

        if let Some(hit) = self.rules.find_match(raw_text) {
            debug!(
                category = hit.category,
                keyword = hit.keyword,
                "Keyword override"
            );
            return Ok(self.keyword_result(hit.category, probabilities));
        }

        let scaled = apply_temperature(probabilities, self.config.temperature);
        let order = rank_descending(&scaled);
        let (top1, top2) = (order[0], order[1]);

        let p1 = scaled[top1];
        let (p2, margin) = if (p1 - scaled[top2]).abs() < MIN_MARGIN {
            (p1 - MIN_MARGIN, MIN_MARGIN)
        } else {
            (scaled[top2], p1 - scaled[top2])
        };
        let entropy = entropy(&scaled);

        let category = &self.encoder.labels()[top1];
        let threshold = threshold.unwrap_or_else(|| self.thresholds.get(category));
        let assessment = Assessment::evaluate(&self.config, threshold, p1, margin, entropy);

        let alternatives = if assessment.is_ambiguous() || p2 > self.config.alternative_threshold
        {
            self.alternatives(&scaled, top1)
        } else {
            Vec::new()
        };

        debug!(
            category = %category,
            confidence = p1,
            margin,
            entropy,
            threshold,
            is_confident = assessment.is_confident(),
            alternatives = alternatives.len(),
            "Classified"
        );

        Ok(ClassificationResult {
            category: category.clone(),
            confidence: p1,
            top2_category: self.encoder.labels()[top2].clone(),
            top2_confidence: p2,
            margin,
            entropy,
            is_confident: assessment.is_confident(),
            is_near_ambiguous: assessment.is_near_ambiguous,
            keyword_override: false,
            alternatives,
            probabilities: self.label_map(&scaled),
        })
    }

    fn validate(
        &self,
        probabilities: &[f64],
        raw_text: &str,
        threshold: Option<f64>,
    ) -> Result<(), ScoringError> {
        if probabilities.len() != self.encoder.len() {
            return Err(ScoringError::LengthMismatch {
                expected: self.encoder.len(),
                actual: probabilities.len(),
            });
        }
        if raw_text.trim().is_empty() {
            return Err(ScoringError::EmptyText);
        }
        if let Some((index, &value)) = probabilities
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p < 0.0)
        {
            return Err(ScoringError::InvalidProbability { index, value });
        }
        if let Some(t) = threshold.filter(|t| !(0.0..=1.0).contains(t)) {
            return Err(ScoringError::InvalidInput {
                reason: format!("threshold must be within [0, 1], got {t}"),
            });
        }
        Ok(())
    }

    fn keyword_result(&self, category: &str, probabilities: &[f64]) -> ClassificationResult {
        let top = rank_descending(probabilities)[0];

        ClassificationResult {
            category: category.to_string(),
            confidence: 1.0,
            top2_category: self.encoder.labels()[top].clone(),
            top2_confidence: probabilities[top],
            margin: 1.0,
            entropy: 0.0,
            is_confident: true,
            is_near_ambiguous: false,
            keyword_override: true,
            alternatives: Vec::new(),
            probabilities: self.label_map(probabilities),
        }
    }

    fn alternatives(&self, scaled: &[f64], top1: usize) -> Vec<AlternativeCategory> {
        let best = scaled[top1];
        let mut alternatives: Vec<AlternativeCategory> = scaled
            .iter()
            .enumerate()
            .filter(|&(i, &q)| i != top1 && best - q < self.config.alternative_gap)
            .map(|(i, &q)| AlternativeCategory {
                category: self.encoder.labels()[i].clone(),
                confidence: q,
            })
            .collect();
        alternatives.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        alternatives
    }

    fn label_map(&self, values: &[f64]) -> BTreeMap<String, f64> {
        self.encoder
            .labels()
            .iter()
            .cloned()
            .zip(values.iter().copied())
            .collect()
    }
}
