//! Common type definitions and newtypes for Shelf.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};

/// The fixed, ordered set of logical dataset names tracked by the cache.
///
/// Names are kept in configuration order so that bundles and responses list
/// datasets the same way the operator declared them. Duplicates and blank
/// names are rejected.
///
/// # Example
///
/// ```
/// use shelf_core::DatasetSet;
///
/// let set = DatasetSet::new(["catalog", "pricing"]).unwrap();
/// assert_eq!(set.len(), 2);
/// assert!(set.contains("pricing"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct DatasetSet(Vec<String>);

impl DatasetSet {
    /// Creates a dataset set, validating that it is non-empty and duplicate free.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for name in names {
            let name: String = name.into();
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(CoreError::invalid_datasets("dataset names cannot be blank"));
            }
            if out.iter().any(|n| n == trimmed) {
                return Err(CoreError::invalid_datasets(format!(
                    "dataset '{}' is listed more than once",
                    trimmed
                )));
            }
            out.push(trimmed.to_string());
        }

        if out.is_empty() {
            return Err(CoreError::invalid_datasets(
                "at least one dataset must be configured",
            ));
        }

        Ok(Self(out))
    }

    /// Returns the names in configuration order.
    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Returns true if the set tracks the given dataset.
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    /// Returns the number of datasets.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a validated set; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for DatasetSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(","))
    }
}

impl TryFrom<Vec<String>> for DatasetSet {
    type Error = CoreError;

    fn try_from(value: Vec<String>) -> Result<Self> {
        Self::new(value)
    }
}

impl From<DatasetSet> for Vec<String> {
    fn from(set: DatasetSet) -> Self {
        set.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_set_keeps_order() {
        let set = DatasetSet::new(["pricing", "catalog", "categories"]).unwrap();
        assert_eq!(set.names(), &["pricing", "catalog", "categories"]);
        assert_eq!(set.to_string(), "pricing,catalog,categories");
    }

    #[test]
    fn test_dataset_set_trims_names() {
        let set = DatasetSet::new([" catalog "]).unwrap();
        assert!(set.contains("catalog"));
    }

    #[test]
    fn test_dataset_set_rejects_duplicates() {
        let err = DatasetSet::new(["catalog", "catalog"]).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_dataset_set_rejects_empty() {
        assert!(DatasetSet::new(Vec::<String>::new()).is_err());
        assert!(DatasetSet::new(["", "catalog"]).is_err());
    }

    #[test]
    fn test_dataset_set_deserialize_validates() {
        let ok: DatasetSet = serde_json::from_str(r#"["catalog","pricing"]"#).unwrap();
        assert_eq!(ok.len(), 2);

        let bad: std::result::Result<DatasetSet, _> = serde_json::from_str(r#"[]"#);
        assert!(bad.is_err());
    }
}
