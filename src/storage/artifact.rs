//! Per-category artifact pair: `<category>.index` and `<category>.sidecar`.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use rkyv::rancor::Error as RkyvError;
use rkyv::{Archive, Deserialize, Serialize, from_bytes, to_bytes};
use tempfile::NamedTempFile;
use tracing::debug;

use super::error::{StorageError, StorageResult};
use crate::hashing::sidecar_digest;

pub const INDEX_EXTENSION: &str = "index";
pub const SIDECAR_EXTENSION: &str = "sidecar";

/// Bumped whenever the archived layout changes.
pub const FORMAT_VERSION: u32 = 1;

/// Search-side half of the pair.
#[derive(Archive, Deserialize, Serialize, Debug, PartialEq, Clone)]
pub struct IndexBlob {
    pub version: u32,
    pub category: String,
    pub dimension: u32,
    /// Row-major `len * dimension` arena.
    pub embeddings: Vec<f32>,
    /// Digest of the matching sidecar content.
    pub sidecar_digest: [u8; 32],
}

/// Content half of the pair.
#[derive(Archive, Deserialize, Serialize, Debug, PartialEq, Clone)]
pub struct IndexSidecar {
    pub version: u32,
    pub category: String,
    pub questions: Vec<String>,
    pub answers: Vec<String>,
    pub embeddings: Vec<f32>,
}

/// Everything needed to rebuild one category index.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryArtifact {
    pub category: String,
    pub dimension: usize,
    pub questions: Vec<String>,
    pub answers: Vec<String>,
    pub embeddings: Vec<f32>,
}

impl CategoryArtifact {
    fn digest(&self) -> [u8; 32] {
        sidecar_digest(
            &self.category,
            &self.questions,
            &self.answers,
            &self.embeddings,
        )
    }
}

/// Rejects names that would escape `dir` or collide with temp files.
fn check_category_name(category: &str) -> StorageResult<()> {
    let invalid = category.is_empty()
        || category.starts_with('.')
        || category.contains(['/', '\\', '\0']);
    if invalid {
        return Err(StorageError::InvalidCategoryName {
            category: category.to_string(),
        });
    }
    Ok(())
}

pub fn index_path(dir: &Path, category: &str) -> PathBuf {
    dir.join(format!("{category}.{INDEX_EXTENSION}"))
}

pub fn sidecar_path(dir: &Path, category: &str) -> PathBuf {
    dir.join(format!("{category}.{SIDECAR_EXTENSION}"))
}

fn write_atomic(path: &Path, bytes: &[u8]) -> StorageResult<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| StorageError::Io(e.error))?;
    Ok(())
}

fn map_file(path: &Path) -> StorageResult<Mmap> {
    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Err(StorageError::Deserialize {
            path: path.to_path_buf(),
            reason: "file is empty".to_string(),
        });
    }
    // SAFETY: artifacts are only ever replaced by rename, never modified in place.
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(mmap)
}

/// Writes the pair for one category. The sidecar goes first so a crash
/// between the two writes leaves a digest mismatch rather than a silent mix.
pub fn save_category(dir: &Path, artifact: &CategoryArtifact) -> StorageResult<()> {
    check_category_name(&artifact.category)?;
    fs::create_dir_all(dir)?;

    let serialize_err = |e: RkyvError| StorageError::Serialize {
        category: artifact.category.clone(),
        reason: format!("{e:?}"),
    };

    let sidecar = IndexSidecar {
        version: FORMAT_VERSION,
        category: artifact.category.clone(),
        questions: artifact.questions.clone(),
        answers: artifact.answers.clone(),
        embeddings: artifact.embeddings.clone(),
    };
    let blob = IndexBlob {
        version: FORMAT_VERSION,
        category: artifact.category.clone(),
        dimension: u32::try_from(artifact.dimension).map_err(|_| StorageError::Serialize {
            category: artifact.category.clone(),
            reason: format!("dimension {} does not fit in u32", artifact.dimension),
        })?,
        embeddings: artifact.embeddings.clone(),
        sidecar_digest: artifact.digest(),
    };

    let sidecar_bytes = to_bytes::<RkyvError>(&sidecar).map_err(serialize_err)?;
    let blob_bytes = to_bytes::<RkyvError>(&blob).map_err(serialize_err)?;

    write_atomic(&sidecar_path(dir, &artifact.category), &sidecar_bytes)?;
    write_atomic(&index_path(dir, &artifact.category), &blob_bytes)?;

    debug!(
        category = %artifact.category,
        entries = artifact.questions.len(),
        dimension = artifact.dimension,
        "Saved index artifacts"
    );
    Ok(())
}

/// Deletes both artifacts of `category`. Files that are already gone are ignored.
pub fn remove_category(dir: &Path, category: &str) -> StorageResult<()> {
    check_category_name(category)?;
    for path in [index_path(dir, category), sidecar_path(dir, category)] {
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    debug!(category, "Removed index artifacts");
    Ok(())
}

/// Reads and cross-checks the pair for one category.
pub fn load_category(dir: &Path, category: &str) -> StorageResult<CategoryArtifact> {
    check_category_name(category)?;

    let blob_path = index_path(dir, category);
    let side_path = sidecar_path(dir, category);

    match (blob_path.exists(), side_path.exists()) {
        (true, false) => {
            return Err(StorageError::MissingSidecar {
                category: category.to_string(),
            });
        }
        (false, true) => {
            return Err(StorageError::MissingBlob {
                category: category.to_string(),
            });
        }
        _ => {}
    }

    let blob = {
        let mmap = map_file(&blob_path)?;
        from_bytes::<IndexBlob, RkyvError>(&mmap[..]).map_err(|e| StorageError::Deserialize {
            path: blob_path.clone(),
            reason: format!("{e:?}"),
        })?
    };
    let sidecar = {
        let mmap = map_file(&side_path)?;
        from_bytes::<IndexSidecar, RkyvError>(&mmap[..]).map_err(|e| {
            StorageError::Deserialize {
                path: side_path.clone(),
                reason: format!("{e:?}"),
            }
        })?
    };

    let inconsistent = |reason: String| StorageError::Inconsistent {
        category: category.to_string(),
        reason,
    };

    if blob.version != FORMAT_VERSION || sidecar.version != FORMAT_VERSION {
        return Err(inconsistent(format!(
            "format version {}/{} (expected {FORMAT_VERSION})",
            blob.version, sidecar.version
        )));
    }
    if blob.category != category || sidecar.category != category {
        return Err(inconsistent(format!(
            "stored categories '{}'/'{}'",
            blob.category, sidecar.category
        )));
    }
    if sidecar.questions.len() != sidecar.answers.len() {
        return Err(inconsistent(format!(
            "{} questions but {} answers",
            sidecar.questions.len(),
            sidecar.answers.len()
        )));
    }

    let dimension = blob.dimension as usize;
    if blob.embeddings.len() != sidecar.questions.len() * dimension {
        return Err(inconsistent(format!(
            "arena holds {} values, expected {} x {dimension}",
            blob.embeddings.len(),
            sidecar.questions.len()
        )));
    }
    let same_arena = blob.embeddings.len() == sidecar.embeddings.len()
        && blob
            .embeddings
            .iter()
            .zip(&sidecar.embeddings)
            .all(|(a, b)| a.to_bits() == b.to_bits());
    if !same_arena {
        return Err(inconsistent("blob and sidecar embeddings differ".to_string()));
    }

    let artifact = CategoryArtifact {
        category: category.to_string(),
        dimension,
        questions: sidecar.questions,
        answers: sidecar.answers,
        embeddings: blob.embeddings,
    };

    if artifact.digest() != blob.sidecar_digest {
        return Err(StorageError::DigestMismatch {
            category: category.to_string(),
        });
    }

    Ok(artifact)
}

/// Categories with at least one artifact file in `dir`, sorted.
///
/// A category listed here may still be half-written; [`load_category`] reports that.
pub fn persisted_categories(dir: &Path) -> StorageResult<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut categories = BTreeSet::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();

        if path.is_file()
            && let Some(ext) = path.extension()
            && (ext == INDEX_EXTENSION || ext == SIDECAR_EXTENSION)
            && let Some(stem) = path.file_stem()
            && let Some(stem) = stem.to_str()
            && check_category_name(stem).is_ok()
        {
            categories.insert(stem.to_string());
        }
    }

    Ok(categories.into_iter().collect())
}
