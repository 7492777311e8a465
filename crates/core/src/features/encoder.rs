use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use super::season::Season;

/// Reserved label every categorical column can fall back to.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EncodingError {
    #[error("category `{value}` is not part of the fitted `{column}` vocabulary")]
    UnknownCategory { column: String, value: String },
}

/// Closed string -> integer mapping for one categorical column.
///
/// Codes follow the sorted order of the vocabulary, so two encoders fitted over
/// the same set of labels always agree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoricalEncoder {
    column: String,
    codes: BTreeMap<String, u32>,
}

impl CategoricalEncoder {
    pub fn fit<I, S>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let vocabulary: BTreeSet<String> =
            values.into_iter().map(|value| value.as_ref().to_string()).collect();
        let codes = vocabulary
            .into_iter()
            .enumerate()
            .map(|(code, label)| (label, code as u32))
            .collect();

        Self { column: column.into(), codes }
    }

    /// Fits over `values` plus the `Unknown` fallback label.
    pub fn fit_with_unknown<I, S>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let labels: Vec<String> = values
            .into_iter()
            .map(|value| value.as_ref().to_string())
            .chain(std::iter::once(UNKNOWN_CATEGORY.to_string()))
            .collect();
        Self::fit(column, labels)
    }

    /// Fits a season column: the canonical labels and `Unknown` are always present
    /// so a forced current-season override can be encoded whatever the catalog holds.
    pub fn fit_season<I, S>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let labels: Vec<String> = values
            .into_iter()
            .map(|value| value.as_ref().to_string())
            .chain(Season::ALL.iter().map(|season| season.as_str().to_string()))
            .collect();
        Self::fit_with_unknown(column, labels)
    }

    pub fn transform(&self, value: &str) -> Result<u32, EncodingError> {
        self.codes.get(value).copied().ok_or_else(|| EncodingError::UnknownCategory {
            column: self.column.clone(),
            value: value.to_string(),
        })
    }

    /// Encodes `value`, substituting `Unknown` for labels outside the vocabulary.
    pub fn transform_or_unknown(&self, value: &str) -> Result<u32, EncodingError> {
        if self.contains(value) {
            self.transform(value)
        } else {
            self.transform(UNKNOWN_CATEGORY)
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.codes.contains_key(value)
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.codes.keys().map(String::as_str)
    }
}
