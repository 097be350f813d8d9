use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use super::error::ScoringError;
use super::types::ClassificationResult;

const COMMON_ERRORS: usize = 5;

/// Batch summary of how uncertain the classifier is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmbiguityReport {
    pub samples: usize,
    pub mean_margin: f64,
    pub mean_entropy: f64,
    /// Share of results not marked confident.
    pub ambiguous_rate: f64,
    pub near_ambiguous_rate: f64,
}

impl AmbiguityReport {
    /// Summarises a batch. An empty batch yields all-zero rates.
    pub fn from_results(results: &[ClassificationResult]) -> Self {
        let samples = results.len();
        if samples == 0 {
            return Self {
                samples,
                mean_margin: 0.0,
                mean_entropy: 0.0,
                ambiguous_rate: 0.0,
                near_ambiguous_rate: 0.0,
            };
        }

        let n = samples as f64;
        let mean_margin = results.iter().map(|r| r.margin).sum::<f64>() / n;
        let mean_entropy = results.iter().map(|r| r.entropy).sum::<f64>() / n;
        let ambiguous = results.iter().filter(|r| !r.is_confident).count();
        let near = results.iter().filter(|r| r.is_near_ambiguous).count();

        let report = Self {
            samples,
            mean_margin,
            mean_entropy,
            ambiguous_rate: ambiguous as f64 / n,
            near_ambiguous_rate: near as f64 / n,
        };

        info!(
            samples,
            mean_margin = report.mean_margin,
            mean_entropy = report.mean_entropy,
            ambiguous_rate = report.ambiguous_rate,
            near_ambiguous_rate = report.near_ambiguous_rate,
            "Ambiguity analysis"
        );

        report
    }
}

/// One misclassified sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Misclassification {
    pub index: usize,
    pub expected: String,
    pub predicted: String,
    pub confidence: f64,
    pub margin: f64,
}

/// Batch summary of classification mistakes against known labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    pub samples: usize,
    pub total_errors: usize,
    pub error_rate: f64,
    /// Counts keyed by `"expected->predicted"`.
    pub confusion: BTreeMap<String, usize>,
    /// Most frequent confusions, highest count first (at most five).
    pub common_errors: Vec<(String, usize)>,
    pub errors: Vec<Misclassification>,
}

impl ErrorReport {
    /// Compares `results` against `expected` labels, pairwise.
    pub fn from_predictions<S: AsRef<str>>(
        expected: &[S],
        results: &[ClassificationResult],
    ) -> Result<Self, ScoringError> {
        if expected.len() != results.len() {
            return Err(ScoringError::LengthMismatch {
                expected: expected.len(),
                actual: results.len(),
            });
        }

        let mut confusion: BTreeMap<String, usize> = BTreeMap::new();
        let mut errors = Vec::new();

        for (index, (label, result)) in expected.iter().zip(results).enumerate() {
            let label = label.as_ref();
            if label == result.category {
                continue;
            }
            *confusion
                .entry(format!("{label}->{}", result.category))
                .or_default() += 1;
            errors.push(Misclassification {
                index,
                expected: label.to_string(),
                predicted: result.category.clone(),
                confidence: result.confidence,
                margin: result.margin,
            });
        }

        let mut common_errors: Vec<(String, usize)> =
            confusion.iter().map(|(k, v)| (k.clone(), *v)).collect();
        common_errors.sort_by(|a, b| b.1.cmp(&a.1));
        common_errors.truncate(COMMON_ERRORS);

        let samples = results.len();
        let total_errors = errors.len();
        let error_rate = if samples == 0 {
            0.0
        } else {
            total_errors as f64 / samples as f64
        };

        info!(samples, total_errors, error_rate, "Error analysis");

        Ok(Self {
            samples,
            total_errors,
            error_rate,
            confusion,
            common_errors,
            errors,
        })
    }
}
