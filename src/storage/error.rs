use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while persisting or loading per-category index artifacts.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("index blob for '{category}' has no sidecar")]
    MissingSidecar { category: String },

    #[error("sidecar for '{category}' has no index blob")]
    MissingBlob { category: String },

    #[error("artifacts for '{category}' are inconsistent: {reason}")]
    Inconsistent { category: String, reason: String },

    #[error("sidecar digest mismatch for '{category}'")]
    DigestMismatch { category: String },

    #[error("failed to deserialize '{path}': {reason}")]
    Deserialize { path: PathBuf, reason: String },

    #[error("failed to serialize '{category}': {reason}")]
    Serialize { category: String, reason: String },

    #[error("category name cannot be used as a file name: '{category}'")]
    InvalidCategoryName { category: String },
}

impl StorageError {
    /// Category the error refers to, when known.
    pub fn category(&self) -> Option<&str> {
        match self {
            StorageError::MissingSidecar { category }
            | StorageError::MissingBlob { category }
            | StorageError::Inconsistent { category, .. }
            | StorageError::DigestMismatch { category }
            | StorageError::Serialize { category, .. }
            | StorageError::InvalidCategoryName { category } => Some(category),
            StorageError::Io(_) | StorageError::Deserialize { .. } => None,
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
