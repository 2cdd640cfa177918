//! Batch result types.

use indexmap::IndexMap;
use shelf_core::Row;

/// The raw datasets returned by one batched fetch, before any validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    datasets: IndexMap<String, Vec<Row>>,
}

impl BatchResult {
    /// Creates an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the rows of a dataset.
    pub fn insert(&mut self, name: impl Into<String>, rows: Vec<Row>) {
        self.datasets.insert(name.into(), rows);
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with_dataset(mut self, name: impl Into<String>, rows: Vec<Row>) -> Self {
        self.insert(name, rows);
        self
    }

    /// Returns the rows of a dataset.
    pub fn get(&self, name: &str) -> Option<&[Row]> {
        self.datasets.get(name).map(Vec::as_slice)
    }

    /// Returns true if the dataset is present (possibly with zero rows).
    pub fn contains(&self, name: &str) -> bool {
        self.datasets.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// Removes a dataset, returning its rows.
    pub fn take(&mut self, name: &str) -> Option<Vec<Row>> {
        self.datasets.shift_remove(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_and_take() {
        let mut result = BatchResult::new()
            .with_dataset("catalog", vec![json!(["a"])])
            .with_dataset("pricing", Vec::new());

        assert_eq!(result.len(), 2);
        assert!(result.contains("pricing"));
        assert_eq!(result.get("pricing").map(<[Row]>::len), Some(0));

        let rows = result.take("catalog").unwrap();
        assert_eq!(rows, vec![json!(["a"])]);
        assert!(!result.contains("catalog"));
    }
}
