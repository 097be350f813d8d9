use std::path::Path;

use tempfile::TempDir;

use super::*;
use crate::dataset::FaqRecord;
use crate::embedding::{HashingEmbedder, MockEmbedder};
use crate::storage::{StorageError, index_path, sidecar_path};

fn entry(question: &str, answer: &str, embedding: Vec<f32>) -> IndexEntry {
    IndexEntry {
        question: question.to_string(),
        answer: answer.to_string(),
        embedding,
    }
}

fn prepaid_index() -> VectorIndex {
    VectorIndex::build(
        "Prépayée",
        vec![
            entry("Comment recharger ma carte ?", "En ligne ou en agence.", vec![1.0, 0.0]),
            entry("Quel est le plafond ?", "500 euros.", vec![0.0, 1.0]),
            entry("Où recharger ?", "Dans toutes les agences.", vec![0.9, 0.1]),
        ],
    )
    .expect("build should succeed")
}

fn write_dataset(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("faq.jsonl");
    let rows = [
        FaqRecord::new("Prépayée", "Comment recharger ma carte ?", "En ligne."),
        FaqRecord::new("Prépayée", "Quel est le plafond ?", "500 euros."),
        FaqRecord::new("Compte", "Où trouver mon RIB ?", "Dans l'application."),
    ];
    let body: String = rows
        .iter()
        .map(|r| serde_json::to_string(r).unwrap() + "\n")
        .collect();
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_build_validates_dimensions() {
    let err = VectorIndex::build(
        "Compte",
        vec![entry("q1", "a1", vec![1.0, 0.0]), entry("q2", "a2", vec![1.0])],
    )
    .unwrap_err();
    assert_eq!(
        err,
        VectorDbError::InvalidDimension {
            expected: 2,
            actual: 1
        }
    );

    let err = VectorIndex::build("Compte", vec![entry("q", "a", vec![])]).unwrap_err();
    assert!(matches!(err, VectorDbError::InvalidDimension { actual: 0, .. }));
}

#[test]
fn test_build_rejects_non_finite() {
    let err = VectorIndex::build(
        "Compte",
        vec![entry("q1", "a1", vec![1.0, 0.0]), entry("q2", "a2", vec![f32::NAN, 0.0])],
    )
    .unwrap_err();
    assert_eq!(err, VectorDbError::NonFiniteValue { position: 1 });
}

#[test]
fn test_search_orders_by_distance() {
    let index = prepaid_index();
    let hits = index.search(&[1.0, 0.0], 3).unwrap();

    let positions: Vec<usize> = hits.iter().map(|h| h.position).collect();
    assert_eq!(positions, [0, 2, 1]);
    assert_eq!(hits[0].distance, 0.0);
    assert!((hits[1].distance - 0.02).abs() < 1e-6);
    assert!((hits[2].distance - 2.0).abs() < 1e-6);
}

#[test]
fn test_search_clamps_k_and_handles_zero() {
    let index = prepaid_index();
    assert_eq!(index.search(&[1.0, 0.0], 10).unwrap().len(), 3);
    assert!(index.search(&[1.0, 0.0], 0).unwrap().is_empty());
}

#[test]
fn test_search_ties_keep_insertion_order() {
    let index = VectorIndex::build(
        "Autre",
        vec![
            entry("a", "1", vec![1.0, 0.0]),
            entry("b", "2", vec![0.0, 1.0]),
            entry("c", "3", vec![1.0, 0.0]),
        ],
    )
    .unwrap();
    let hits = index.search(&[0.0, 0.0], 3).unwrap();
    let positions: Vec<usize> = hits.iter().map(|h| h.position).collect();
    assert_eq!(positions, [0, 1, 2]);
}

#[test]
fn test_search_dimension_mismatch() {
    let index = prepaid_index();
    assert_eq!(
        index.search(&[1.0, 0.0, 0.0], 3).unwrap_err(),
        VectorDbError::InvalidDimension {
            expected: 2,
            actual: 3
        }
    );
}

#[test]
fn test_empty_index_returns_nothing() {
    let index = VectorIndex::empty("Autre");
    assert!(index.is_empty());
    assert!(index.search(&[1.0, 2.0, 3.0], 3).unwrap().is_empty());
    assert!(VectorIndex::build("Autre", vec![]).unwrap().is_empty());
}

#[test]
fn test_entry_accessors() {
    let index = prepaid_index();
    assert_eq!(index.question(1), Some("Quel est le plafond ?"));
    assert_eq!(index.answer(1), Some("500 euros."));
    assert_eq!(index.embedding(2), Some(&[0.9_f32, 0.1][..]));
    assert_eq!(index.question(3), None);
    assert_eq!(index.embedding(3), None);
}

#[test]
fn test_store_search_missing_category_is_none() {
    let mut store = IndexStore::new();
    store.insert(prepaid_index());

    assert!(store.search("Compte", &[1.0, 0.0], 3).unwrap().is_none());
    assert_eq!(
        store.search("Prépayée", &[1.0, 0.0], 1).unwrap().unwrap()[0].position,
        0
    );
}

#[test]
fn test_with_categories_adds_empty_indices_only() {
    let mut store = IndexStore::new();
    store.insert(prepaid_index());
    let store = store.with_categories(["Prépayée", "Autre", "Salutation"]);

    assert_eq!(store.len(), 3);
    assert_eq!(store.get("Prépayée").unwrap().len(), 3);
    assert!(store.get("Autre").unwrap().is_empty());
}

#[test]
fn test_similarities_are_batch_relative() {
    let similarities = distances_to_similarities(&[0.0, 1.0, 2.0]);
    assert_eq!(similarities[0], 1.0);
    assert!((similarities[1] - 0.5).abs() < 1e-6);
    assert!(similarities[2].abs() < 1e-6);
    assert!(similarities.iter().all(|s| (0.0..=1.0).contains(s)));
}

#[test]
fn test_equal_distances_never_negative() {
    for s in distances_to_similarities(&[4.0, 4.0, 4.0]) {
        assert!((0.0..1e-6).contains(&s));
    }
    assert_eq!(distances_to_similarities(&[0.0, 0.0]), [1.0_f32, 1.0]);
    assert!(distances_to_similarities(&[]).is_empty());
}

#[test]
fn test_save_load_search_is_identical() {
    let dir = TempDir::new().unwrap();
    let mut store = IndexStore::new().with_categories(["Autre"]);
    store.insert(prepaid_index());

    store.save(dir.path()).unwrap();
    let loaded = IndexStore::load(dir.path()).unwrap();

    let probe = [0.7, 0.3];
    assert_eq!(
        loaded.search("Prépayée", &probe, 3).unwrap(),
        store.search("Prépayée", &probe, 3).unwrap()
    );
    assert!(loaded.get("Autre").unwrap().is_empty());
    assert_eq!(loaded.get("Prépayée").unwrap().as_ref(), &prepaid_index());
}

#[test]
fn test_save_removes_pairs_for_dropped_categories() {
    let dir = TempDir::new().unwrap();
    let mut store = IndexStore::new().with_categories(["Sécurité"]);
    store.insert(prepaid_index());
    store.save(dir.path()).unwrap();

    let mut rebuilt = IndexStore::new();
    rebuilt.insert(prepaid_index());
    rebuilt.save(dir.path()).unwrap();

    assert!(!index_path(dir.path(), "Sécurité").exists());
    assert!(!sidecar_path(dir.path(), "Sécurité").exists());
    let loaded = IndexStore::load(dir.path()).unwrap();
    assert_eq!(loaded.categories().collect::<Vec<_>>(), ["Prépayée"]);
}

#[test]
fn test_load_fails_fast_on_half_pair() {
    let dir = TempDir::new().unwrap();
    let mut store = IndexStore::new();
    store.insert(prepaid_index());
    store.save(dir.path()).unwrap();
    std::fs::remove_file(sidecar_path(dir.path(), "Prépayée")).unwrap();

    assert!(matches!(
        IndexStore::load(dir.path()),
        Err(IndexStoreError::Storage(StorageError::MissingSidecar { .. }))
    ));
}

#[tokio::test]
async fn test_build_from_records_groups_by_category() {
    let embedder = MockEmbedder::new(8);
    let records = vec![
        FaqRecord::new("Compte", "q1", "a1"),
        FaqRecord::new("Prépayée", "q2", "a2"),
        FaqRecord::new("Compte", "q3", "a3"),
    ];

    let store = IndexStore::build_from_records(&records, &embedder)
        .await
        .unwrap();

    assert_eq!(store.len(), 2);
    assert_eq!(store.get("Compte").unwrap().len(), 2);
    assert_eq!(store.get("Compte").unwrap().question(1), Some("q3"));
    assert_eq!(store.get("Prépayée").unwrap().dimension(), 8);
    assert_eq!(embedder.calls(), 3);
}

#[tokio::test]
async fn test_build_propagates_embedder_failure() {
    let embedder = MockEmbedder::new(4).failing();
    let records = vec![FaqRecord::new("Compte", "q1", "a1")];

    assert!(matches!(
        IndexStore::build_from_records(&records, &embedder).await,
        Err(IndexStoreError::Embedding(_))
    ));
}

#[tokio::test]
async fn test_open_or_build_builds_and_persists() {
    let dir = TempDir::new().unwrap();
    let dataset = write_dataset(dir.path());
    let index_dir = dir.path().join("indices");
    let embedder = HashingEmbedder::new(16).unwrap();

    let built = IndexStore::open_or_build(&index_dir, Some(&dataset), &embedder)
        .await
        .unwrap();
    assert_eq!(built.len(), 2);
    assert!(index_path(&index_dir, "Compte").exists());

    let reopened = IndexStore::open_or_build(&index_dir, None, &embedder)
        .await
        .unwrap();
    assert_eq!(
        reopened.get("Prépayée").unwrap().as_ref(),
        built.get("Prépayée").unwrap().as_ref()
    );
}

#[tokio::test]
async fn test_open_or_build_rebuilds_corrupt_category() {
    let dir = TempDir::new().unwrap();
    let dataset = write_dataset(dir.path());
    let index_dir = dir.path().join("indices");
    let embedder = HashingEmbedder::new(16).unwrap();

    let built = IndexStore::open_or_build(&index_dir, Some(&dataset), &embedder)
        .await
        .unwrap();
    std::fs::write(index_path(&index_dir, "Compte"), b"garbage").unwrap();

    let rebuilt = IndexStore::open_or_build(&index_dir, Some(&dataset), &embedder)
        .await
        .unwrap();
    assert_eq!(
        rebuilt.get("Compte").unwrap().as_ref(),
        built.get("Compte").unwrap().as_ref()
    );
    assert!(IndexStore::load(&index_dir).is_ok());
}

#[tokio::test]
async fn test_open_or_build_without_dataset_fails_loudly() {
    let dir = TempDir::new().unwrap();
    let embedder = HashingEmbedder::new(16).unwrap();

    let err = IndexStore::open_or_build(dir.path(), None, &embedder)
        .await
        .unwrap_err();
    assert!(matches!(err, IndexStoreError::DatasetUnavailable { .. }));

    let missing = dir.path().join("missing.jsonl");
    let err = IndexStore::open_or_build(dir.path(), Some(&missing), &embedder)
        .await
        .unwrap_err();
    assert!(matches!(err, IndexStoreError::DatasetUnavailable { .. }));
}

#[test]
fn test_handle_replace_bumps_epoch() {
    let handle = IndexStoreHandle::new(IndexStore::new());
    let before = handle.snapshot();
    assert_eq!(before.epoch, 0);

    let mut next = IndexStore::new();
    next.insert(prepaid_index());
    assert_eq!(handle.replace(next), 1);

    let after = handle.snapshot();
    assert_eq!(after.epoch, 1);
    assert!(after.store.contains("Prépayée"));
    assert!(!before.store.contains("Prépayée"));
}
