use super::*;
use tempfile::TempDir;

fn sample(category: &str) -> CategoryArtifact {
    CategoryArtifact {
        category: category.to_string(),
        dimension: 2,
        questions: vec!["Comment recharger ?".to_string(), "Quel plafond ?".to_string()],
        answers: vec!["En agence.".to_string(), "500 euros.".to_string()],
        embeddings: vec![0.1, 0.2, 0.3, 0.4],
    }
}

#[test]
fn test_save_then_load_returns_same_artifact() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let artifact = sample("Prépayée");

    save_category(dir.path(), &artifact).expect("save should succeed");
    let loaded = load_category(dir.path(), "Prépayée").expect("load should succeed");

    assert_eq!(loaded, artifact);
    assert!(index_path(dir.path(), "Prépayée").exists());
    assert!(sidecar_path(dir.path(), "Prépayée").exists());
}

#[test]
fn test_empty_category_roundtrip() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let artifact = CategoryArtifact {
        category: "Autre".to_string(),
        dimension: 0,
        questions: vec![],
        answers: vec![],
        embeddings: vec![],
    };

    save_category(dir.path(), &artifact).expect("save should succeed");
    assert_eq!(load_category(dir.path(), "Autre").unwrap(), artifact);
}

#[test]
fn test_no_temp_files_left_behind() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    save_category(dir.path(), &sample("Compte")).unwrap();

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.iter().all(|n| !n.starts_with(".tmp")));
}

#[test]
fn test_missing_sidecar_fails_fast() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    save_category(dir.path(), &sample("Compte")).unwrap();
    std::fs::remove_file(sidecar_path(dir.path(), "Compte")).unwrap();

    let err = load_category(dir.path(), "Compte").unwrap_err();
    assert!(matches!(err, StorageError::MissingSidecar { ref category } if category == "Compte"));
    assert_eq!(err.category(), Some("Compte"));
}

#[test]
fn test_missing_blob_fails_fast() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    save_category(dir.path(), &sample("Compte")).unwrap();
    std::fs::remove_file(index_path(dir.path(), "Compte")).unwrap();

    assert!(matches!(
        load_category(dir.path(), "Compte"),
        Err(StorageError::MissingBlob { .. })
    ));
}

#[test]
fn test_swapped_sidecar_detected() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    save_category(dir.path(), &sample("Compte")).unwrap();

    let mut other = sample("Compte");
    other.answers = vec!["Autre réponse.".to_string(), "500 euros.".to_string()];
    let other_dir = TempDir::new().expect("Failed to create temp dir");
    save_category(other_dir.path(), &other).unwrap();

    std::fs::copy(
        sidecar_path(other_dir.path(), "Compte"),
        sidecar_path(dir.path(), "Compte"),
    )
    .unwrap();

    assert!(matches!(
        load_category(dir.path(), "Compte"),
        Err(StorageError::DigestMismatch { .. })
    ));
}

#[test]
fn test_mismatched_embeddings_detected() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    save_category(dir.path(), &sample("Compte")).unwrap();

    let mut other = sample("Compte");
    other.embeddings = vec![0.9, 0.9, 0.9, 0.9];
    let other_dir = TempDir::new().expect("Failed to create temp dir");
    save_category(other_dir.path(), &other).unwrap();

    std::fs::copy(
        index_path(other_dir.path(), "Compte"),
        index_path(dir.path(), "Compte"),
    )
    .unwrap();

    assert!(matches!(
        load_category(dir.path(), "Compte"),
        Err(StorageError::Inconsistent { .. })
    ));
}

#[test]
fn test_renamed_pair_detected() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    save_category(dir.path(), &sample("Compte")).unwrap();

    std::fs::rename(
        index_path(dir.path(), "Compte"),
        index_path(dir.path(), "Transaction"),
    )
    .unwrap();
    std::fs::rename(
        sidecar_path(dir.path(), "Compte"),
        sidecar_path(dir.path(), "Transaction"),
    )
    .unwrap();

    assert!(matches!(
        load_category(dir.path(), "Transaction"),
        Err(StorageError::Inconsistent { .. })
    ));
}

#[test]
fn test_garbage_blob_is_deserialize_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    save_category(dir.path(), &sample("Compte")).unwrap();
    std::fs::write(index_path(dir.path(), "Compte"), b"not an archive").unwrap();

    assert!(matches!(
        load_category(dir.path(), "Compte"),
        Err(StorageError::Deserialize { .. })
    ));
}

#[test]
fn test_empty_file_is_deserialize_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    save_category(dir.path(), &sample("Compte")).unwrap();
    std::fs::write(sidecar_path(dir.path(), "Compte"), b"").unwrap();

    assert!(matches!(
        load_category(dir.path(), "Compte"),
        Err(StorageError::Deserialize { .. })
    ));
}

#[test]
fn test_unsafe_category_names_rejected() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    for name in ["", "../escape", "a/b", ".hidden"] {
        assert!(matches!(
            save_category(dir.path(), &sample(name)),
            Err(StorageError::InvalidCategoryName { .. })
        ));
    }
}

#[test]
fn test_persisted_categories_lists_union_sorted() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    save_category(dir.path(), &sample("Transaction")).unwrap();
    save_category(dir.path(), &sample("Compte")).unwrap();
    std::fs::write(dir.path().join("orphan.sidecar"), b"x").unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

    let categories = persisted_categories(dir.path()).unwrap();
    assert_eq!(categories, ["Compte", "Transaction", "orphan"]);
}

#[test]
fn test_persisted_categories_missing_dir_is_empty() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let missing = dir.path().join("nope");
    assert!(persisted_categories(&missing).unwrap().is_empty());
}

#[test]
fn test_remove_category_deletes_pair_and_tolerates_missing_files() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    save_category(dir.path(), &sample("Compte")).unwrap();
    save_category(dir.path(), &sample("Sécurité")).unwrap();
    std::fs::remove_file(sidecar_path(dir.path(), "Sécurité")).unwrap();

    remove_category(dir.path(), "Sécurité").expect("half pair should be removed");
    remove_category(dir.path(), "Transaction").expect("absent pair is a no-op");

    assert_eq!(persisted_categories(dir.path()).unwrap(), ["Compte"]);
}
