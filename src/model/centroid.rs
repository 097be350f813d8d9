use tracing::{debug, info};

use super::ProbabilityModel;
use super::error::ModelError;
use crate::scoring::CategoryEncoder;
use crate::vectordb::IndexStore;

/// Softmax over negative squared distances to per-category centroids.
///
/// Categories without entries never receive probability mass.
#[derive(Debug, Clone)]
pub struct CentroidModel {
    encoder: CategoryEncoder,
    dimension: usize,
    /// One centroid per encoder index; `None` for empty categories.
    centroids: Vec<Option<Vec<f32>>>,
}

impl CentroidModel {
    pub fn fit(store: &IndexStore, encoder: CategoryEncoder) -> Result<Self, ModelError> {
        let mut dimension = 0;
        let mut centroids = Vec::with_capacity(encoder.len());

        for label in encoder.labels() {
            let Some(index) = store.get(label).filter(|i| !i.is_empty()) else {
                centroids.push(None);
                continue;
            };

            if dimension == 0 {
                dimension = index.dimension();
            } else if index.dimension() != dimension {
                return Err(ModelError::MixedDimensions {
                    category: label.clone(),
                    expected: dimension,
                    actual: index.dimension(),
                });
            }

            let mut centroid = vec![0.0_f32; dimension];
            for position in 0..index.len() {
                if let Some(row) = index.embedding(position) {
                    for (c, v) in centroid.iter_mut().zip(row) {
                        *c += v;
                    }
                }
            }
            let n = index.len() as f32;
            centroid.iter_mut().for_each(|c| *c /= n);
            centroids.push(Some(centroid));
        }

        if centroids.iter().all(Option::is_none) {
            return Err(ModelError::NotFitted);
        }

        info!(
            categories = encoder.len(),
            fitted = centroids.iter().filter(|c| c.is_some()).count(),
            dimension,
            "Fitted centroid model"
        );

        Ok(Self {
            encoder,
            dimension,
            centroids,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

impl ProbabilityModel for CentroidModel {
    fn encoder(&self) -> &CategoryEncoder {
        &self.encoder
    }

    fn predict_proba(&self, embedding: &[f32]) -> Result<Vec<f64>, ModelError> {
        if embedding.len() != self.dimension {
            return Err(ModelError::InvalidDimension {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }

        let scores: Vec<Option<f64>> = self
            .centroids
            .iter()
            .map(|centroid| {
                centroid.as_ref().map(|c| {
                    let d: f32 = c
                        .iter()
                        .zip(embedding)
                        .map(|(a, b)| (a - b) * (a - b))
                        .sum();
                    -f64::from(d)
                })
            })
            .collect();

        let max = scores
            .iter()
            .flatten()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = scores
            .iter()
            .map(|s| s.map_or(0.0, |s| (s - max).exp()))
            .collect();
        let sum: f64 = exps.iter().sum();
        let probabilities: Vec<f64> = exps.into_iter().map(|e| e / sum).collect();

        debug!(categories = probabilities.len(), "Predicted probabilities");
        Ok(probabilities)
    }
}
