//! Probability model seam.
//!
//! Training happens elsewhere; the engine only needs something that maps an
//! embedding to one probability per encoder category. [`CentroidModel`] is a
//! nearest-centroid baseline fitted from the index store itself.

mod centroid;
mod error;


pub use centroid::CentroidModel;
pub use error::ModelError;

use crate::scoring::CategoryEncoder;

/// Maps an embedding to category probabilities.
pub trait ProbabilityModel: Send + Sync {
    /// Label order of the returned probability vectors.
    fn encoder(&self) -> &CategoryEncoder;

    /// One non-negative value per [`encoder`](Self::encoder) category.
    fn predict_proba(&self, embedding: &[f32]) -> Result<Vec<f64>, ModelError>;
}
