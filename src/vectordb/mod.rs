//! Per-category nearest-neighbour answer store.

pub mod error;
mod handle;
mod index;
mod similarity;
mod store;

#[cfg(test)]
mod tests;

pub use error::{IndexStoreError, VectorDbError};
pub use handle::{IndexStoreHandle, StoreSnapshot};
pub use index::{IndexEntry, SearchHit, VectorIndex};
pub use similarity::distances_to_similarities;
pub use store::IndexStore;
