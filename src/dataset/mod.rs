//! Offline FAQ dataset: one JSON object per line.
//!
//! ```text
//! {"category": "Prépayée", "question": "Comment recharger ma carte ?", "answer": "..."}
//! ```
//!
//! The column names `Categorie` and `Réponse` are accepted as aliases.

mod error;

#[cfg(test)]
mod tests;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

pub use error::DatasetError;

/// One question/answer pair and its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqRecord {
    #[serde(alias = "Categorie")]
    pub category: String,
    pub question: String,
    #[serde(alias = "Réponse")]
    pub answer: String,
}

impl FaqRecord {
    pub fn new(
        category: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Reads every record from a JSON Lines file.
pub fn load_dataset(path: &Path) -> Result<Vec<FaqRecord>, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let records = parse_records(BufReader::new(file)).map_err(|e| match e {
        DatasetError::Io { source, .. } => DatasetError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })?;

    if records.is_empty() {
        return Err(DatasetError::Empty {
            path: path.to_path_buf(),
        });
    }

    info!(path = %path.display(), records = records.len(), "Loaded dataset");
    Ok(records)
}

/// Parses JSON Lines from `reader`. Blank lines are skipped; line numbers are 1-based.
pub fn parse_records<R: BufRead>(reader: R) -> Result<Vec<FaqRecord>, DatasetError> {
    let mut records = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line.map_err(|source| DatasetError::Io {
            path: Default::default(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let mut record: FaqRecord = serde_json::from_str(&line).map_err(|source| {
            DatasetError::Parse {
                line: line_no,
                source,
            }
        })?;
        record.category = record.category.trim().to_string();

        for (field, value) in [
            ("category", &record.category),
            ("question", &record.question),
            ("answer", &record.answer),
        ] {
            if value.trim().is_empty() {
                return Err(DatasetError::InvalidRecord {
                    line: line_no,
                    reason: format!("{field} is blank"),
                });
            }
        }

        records.push(record);
    }

    Ok(records)
}

/// Groups records by category, keeping the first-seen category order and
/// the record order within each category.
pub fn group_by_category(records: &[FaqRecord]) -> Vec<(String, Vec<&FaqRecord>)> {
    let mut groups: Vec<(String, Vec<&FaqRecord>)> = Vec::new();

    for record in records {
        match groups.iter_mut().find(|(c, _)| *c == record.category) {
            Some((_, members)) => members.push(record),
            None => groups.push((record.category.clone(), vec![record])),
        }
    }

    groups
}
