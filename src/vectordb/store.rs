use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::dataset::{FaqRecord, group_by_category, load_dataset};
use crate::embedding::{Embedder, validate_embedding};
use crate::storage::{load_category, persisted_categories, remove_category, save_category};

use super::error::{IndexStoreError, VectorDbError};
use super::index::{IndexEntry, SearchHit, VectorIndex};

/// One [`VectorIndex`] per category.
///
/// Built once and then shared read-only behind an `Arc`; updates build a new
/// store and publish it through [`IndexStoreHandle`](super::IndexStoreHandle).
#[derive(Debug, Clone, Default)]
pub struct IndexStore {
    indices: BTreeMap<String, Arc<VectorIndex>>,
}

impl IndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty index for every listed category that has none.
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for category in categories {
            let category = category.into();
            self.indices
                .entry(category.clone())
                .or_insert_with(|| Arc::new(VectorIndex::empty(category)));
        }
        self
    }

    /// Inserts or replaces the index for its category.
    pub fn insert(&mut self, index: VectorIndex) {
        self.indices
            .insert(index.category().to_string(), Arc::new(index));
    }

    pub fn get(&self, category: &str) -> Option<&Arc<VectorIndex>> {
        self.indices.get(category)
    }

    pub fn contains(&self, category: &str) -> bool {
        self.indices.contains_key(category)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.indices.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Total entries across all categories.
    pub fn total_entries(&self) -> usize {
        self.indices.values().map(|i| i.len()).sum()
    }

    /// Searches one category. `Ok(None)` when the category is unknown.
    pub fn search(
        &self,
        category: &str,
        query: &[f32],
        k: usize,
    ) -> Result<Option<Vec<SearchHit>>, VectorDbError> {
        match self.indices.get(category) {
            Some(index) => index.search(query, k).map(Some),
            None => Ok(None),
        }
    }

    /// Embeds every question and builds one index per category.
    pub async fn build_from_records<E: Embedder>(
        records: &[FaqRecord],
        embedder: &E,
    ) -> Result<Self, IndexStoreError> {
        let mut store = Self::new();
        for (category, members) in group_by_category(records) {
            let index = build_category(&category, &members, embedder).await?;
            store.insert(index);
        }

        info!(
            categories = store.len(),
            entries = store.total_entries(),
            "Built index store"
        );
        Ok(store)
    }

    /// Persists every category as an artifact pair under `dir` and deletes
    /// pairs for categories this store does not hold.
    pub fn save(&self, dir: &Path) -> Result<(), IndexStoreError> {
        for index in self.indices.values() {
            save_category(dir, &index.to_artifact())?;
        }
        for category in persisted_categories(dir)? {
            if !self.contains(&category) {
                remove_category(dir, &category)?;
                info!(category = %category, "Removed stale index");
            }
        }
        info!(dir = %dir.display(), categories = self.len(), "Saved index store");
        Ok(())
    }

    /// Loads every persisted category. Any broken pair fails the whole load.
    pub fn load(dir: &Path) -> Result<Self, IndexStoreError> {
        let mut store = Self::new();
        for category in persisted_categories(dir)? {
            let artifact = load_category(dir, &category)?;
            store.insert(VectorIndex::from_artifact(artifact)?);
        }
        info!(dir = %dir.display(), categories = store.len(), "Loaded index store");
        Ok(store)
    }

    /// Loads persisted indices, building what is missing or corrupt from the
    /// dataset at `dataset`.
    ///
    /// With nothing persisted, everything is built from the dataset and saved.
    /// When a dataset is given, every dataset category without a persisted
    /// pair is built and saved as well. Fails with
    /// [`IndexStoreError::DatasetUnavailable`] when a build is needed and the
    /// dataset cannot be read.
    pub async fn open_or_build<E: Embedder>(
        dir: &Path,
        dataset: Option<&Path>,
        embedder: &E,
    ) -> Result<Self, IndexStoreError> {
        let persisted = persisted_categories(dir)?;

        if persisted.is_empty() {
            info!(dir = %dir.display(), "No persisted indices, building from dataset");
            let records = read_dataset(dataset)?;
            let store = Self::build_from_records(&records, embedder).await?;
            store.save(dir)?;
            return Ok(store);
        }

        let mut store = Self::new();
        let mut pending = Vec::new();
        for category in &persisted {
            let loaded = load_category(dir, category)
                .map_err(IndexStoreError::from)
                .and_then(|a| VectorIndex::from_artifact(a).map_err(IndexStoreError::from));
            match loaded {
                Ok(index) => store.insert(index),
                Err(e) => {
                    warn!(category = %category, error = %e, "Corrupt index, scheduling rebuild");
                    pending.push(category.clone());
                }
            }
        }

        let records = dataset.map(|path| read_dataset(Some(path))).transpose()?;
        if let Some(records) = &records {
            for (category, _) in group_by_category(records) {
                if !persisted.contains(&category) {
                    warn!(category = %category, "No persisted index for dataset category, scheduling build");
                    pending.push(category);
                }
            }
        }

        if pending.is_empty() {
            info!(dir = %dir.display(), categories = store.len(), "Loaded index store");
            return Ok(store);
        }

        let records = match records {
            Some(records) => records,
            None => read_dataset(None)?,
        };
        let groups = group_by_category(&records);
        for category in pending {
            let members = groups
                .iter()
                .find(|(c, _)| *c == category)
                .map(|(_, m)| m.as_slice())
                .unwrap_or_default();
            let index = build_category(&category, members, embedder).await?;
            save_category(dir, &index.to_artifact())?;
            info!(category = %category, entries = index.len(), "Rebuilt index");
            store.insert(index);
        }

        Ok(store)
    }
}

async fn build_category<E: Embedder>(
    category: &str,
    members: &[&FaqRecord],
    embedder: &E,
) -> Result<VectorIndex, IndexStoreError> {
    let mut entries = Vec::with_capacity(members.len());
    for record in members {
        let embedding = embedder.embed(&record.question).await?;
        validate_embedding(&embedding, embedder.dimension())?;
        entries.push(IndexEntry {
            question: record.question.clone(),
            answer: record.answer.clone(),
            embedding,
        });
    }
    Ok(VectorIndex::build(category, entries)?)
}

fn read_dataset(path: Option<&Path>) -> Result<Vec<FaqRecord>, IndexStoreError> {
    let path = path.ok_or_else(|| IndexStoreError::DatasetUnavailable {
        reason: "no dataset path configured".to_string(),
    })?;
    load_dataset(path).map_err(|e| IndexStoreError::DatasetUnavailable {
        reason: e.to_string(),
    })
}
