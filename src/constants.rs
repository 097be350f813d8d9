//! Cross-cutting, shared constants.
//!
//! The decision-layer numbers below are part of the classification contract:
//! changing any of them changes which questions are reported as confident.

/// Temperature applied to model probabilities before renormalisation.
pub const TEMPERATURE: f64 = 1.2;

/// Minimum top-1/top-2 gap; exact ties are pushed apart by this amount.
pub const MIN_MARGIN: f64 = 1e-6;

/// Added inside the logarithm when computing entropy.
pub const ENTROPY_EPSILON: f64 = 1e-10;

/// Margins below this mark a classification as ambiguous.
pub const DISTANCE_THRESHOLD: f64 = 0.20;

/// Entropies above this mark a classification as ambiguous.
pub const ENTROPY_THRESHOLD: f64 = 0.5;

/// Default near-ambiguous margin (overridable via configuration).
pub const DEFAULT_NEAR_AMBIGUOUS_THRESHOLD: f64 = 0.05;

/// A runner-up above this confidence always triggers alternative enumeration.
pub const ALTERNATIVE_THRESHOLD: f64 = 0.6;

/// Categories within this gap of the winner are listed as alternatives.
pub const ALTERNATIVE_GAP: f64 = 0.1;

/// Threshold used for categories missing from the threshold table.
pub const DEFAULT_CATEGORY_THRESHOLD: f64 = 0.85;

/// Added to the batch maximum distance when converting distances to similarities.
pub const SIMILARITY_EPSILON: f32 = 1e-8;

/// Default similarity gate for retrieved answers.
pub const DEFAULT_MIN_SIMILARITY: f32 = 0.7;

/// Default neighbour count for best-answer and top-k retrieval.
pub const DEFAULT_TOP_K: usize = 3;

/// Default embedding cache capacity.
pub const DEFAULT_CACHE_SIZE: u64 = 1000;

/// Default embedding cache TTL, in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// Default dimension of the bundled hashing embedder.
pub const DEFAULT_EMBEDDING_DIM: usize = 256;

/// Answer returned when the predicted category has nothing to offer.
pub const NO_ANSWER_MESSAGE: &str = "Désolé, je n'ai pas de réponse dans cette catégorie.";
