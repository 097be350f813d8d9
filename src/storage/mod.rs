//! On-disk persistence for per-category vector indices.
//!
//! Each category is stored as an `rkyv` pair written atomically (temp file +
//! rename) and read back through a memory map. Loads fail fast on any
//! half-written or mismatched pair.

pub mod artifact;
pub mod error;

#[cfg(test)]
mod tests;

pub use artifact::{
    CategoryArtifact, FORMAT_VERSION, IndexBlob, IndexSidecar, index_path, load_category,
    persisted_categories, remove_category, save_category, sidecar_path,
};
pub use error::{StorageError, StorageResult};
