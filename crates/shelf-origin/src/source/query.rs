//! Batch query types.

use shelf_core::DatasetSet;

/// A request for every dataset in a set, answered in one round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BatchQuery {
    datasets: DatasetSet,
}

impl BatchQuery {
    /// Creates a new batch query.
    ///
    /// # Example
    ///
    /// ```
    /// use shelf_core::DatasetSet;
    /// use shelf_origin::BatchQuery;
    ///
    /// let query = BatchQuery::new(DatasetSet::new(["catalog", "pricing"]).unwrap());
    /// assert_eq!(query.len(), 2);
    /// assert_eq!(query.to_string(), "batch[catalog,pricing]");
    /// ```
    pub fn new(datasets: DatasetSet) -> Self {
        Self { datasets }
    }

    /// Returns the requested datasets.
    pub fn datasets(&self) -> &DatasetSet {
        &self.datasets
    }

    /// Returns the requested dataset names in order.
    pub fn names(&self) -> &[String] {
        self.datasets.names()
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

impl std::fmt::Display for BatchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "batch[{}]", self.datasets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_names() {
        let query = BatchQuery::new(DatasetSet::new(["catalog", "categories"]).unwrap());
        assert_eq!(query.names(), &["catalog", "categories"]);
        assert!(!query.is_empty());
    }
}
