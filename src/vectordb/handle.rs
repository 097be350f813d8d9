use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use super::store::IndexStore;

/// A published store together with its epoch.
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub epoch: u64,
    pub store: Arc<IndexStore>,
}

/// Shared handle to the currently published [`IndexStore`].
///
/// Readers clone the snapshot and search without holding the lock. Writers
/// swap in a whole new store and bump the epoch; stores are never mutated in
/// place.
#[derive(Debug, Clone)]
pub struct IndexStoreHandle {
    inner: Arc<RwLock<StoreSnapshot>>,
}

impl IndexStoreHandle {
    pub fn new(store: IndexStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreSnapshot {
                epoch: 0,
                store: Arc::new(store),
            })),
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> StoreSnapshot {
        self.inner.read().clone()
    }

    pub fn epoch(&self) -> u64 {
        self.inner.read().epoch
    }

    /// Publishes `store` and returns the new epoch.
    pub fn replace(&self, store: IndexStore) -> u64 {
        let mut guard = self.inner.write();
        guard.epoch += 1;
        guard.store = Arc::new(store);
        info!(epoch = guard.epoch, categories = guard.store.len(), "Published index store");
        guard.epoch
    }
}
