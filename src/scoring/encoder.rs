use std::collections::HashMap;

use super::error::EncoderError;

/// Bidirectional mapping between category labels and probability-vector indices.
///
/// Fixed at model-load time. At least two categories are required so that a
/// runner-up always exists.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryEncoder {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl CategoryEncoder {
    const MIN_CATEGORIES: usize = 2;

    /// Builds an encoder that keeps the given label order.
    pub fn new<I, S>(labels: I) -> Result<Self, EncoderError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();

        if labels.len() < Self::MIN_CATEGORIES {
            return Err(EncoderError::TooFewCategories {
                min: Self::MIN_CATEGORIES,
                actual: labels.len(),
            });
        }

        let mut index = HashMap::with_capacity(labels.len());
        for (i, label) in labels.iter().enumerate() {
            if label.trim().is_empty() {
                return Err(EncoderError::BlankLabel);
            }
            if index.insert(label.clone(), i).is_some() {
                return Err(EncoderError::Duplicate {
                    label: label.clone(),
                });
            }
        }

        Ok(Self { labels, index })
    }

    /// Builds an encoder with labels in lexicographic order, deduplicated.
    ///
    /// Matches how a label encoder fitted on a training set numbers its classes.
    pub fn sorted<I, S>(labels: I) -> Result<Self, EncoderError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        labels.sort();
        labels.dedup();
        Self::new(labels)
    }

    /// Number of categories.
    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always `false`; construction rejects empty label sets.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label at `index`, if in range.
    #[inline]
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Index of `label`.
    pub fn index_of(&self, label: &str) -> Result<usize, EncoderError> {
        self.index
            .get(label)
            .copied()
            .ok_or_else(|| EncoderError::UnknownCategory {
                label: label.to_string(),
            })
    }

    /// Returns `true` if `label` is known.
    #[inline]
    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    /// All labels in index order.
    #[inline]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}
