use crate::constants::SIMILARITY_EPSILON;

/// Converts one batch of distances into similarities in `[0, 1]`.
///
/// `s = 1 - d / (max(d) + eps)`. The scale is relative to the batch, so the
/// farthest hit of a batch always scores close to 0.
pub fn distances_to_similarities(distances: &[f32]) -> Vec<f32> {
    let max = distances.iter().copied().fold(0.0_f32, f32::max);
    distances
        .iter()
        .map(|d| (1.0 - d / (max + SIMILARITY_EPSILON)).clamp(0.0, 1.0))
        .collect()
}
