//! Dataset bundles: complete snapshots of every tracked dataset.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single opaque row as delivered by the upstream.
///
/// The cache never inspects row contents.
pub type Row = serde_json::Value;

/// Metadata stamped on a bundle when it is fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleMeta {
    /// Unix timestamp in milliseconds of the fetch that produced the bundle.
    pub fetched_at: i64,

    /// Opaque token identifying this snapshot.
    pub version: String,
}

/// Snapshot of all tracked datasets as of one fetch.
///
/// Bundles are immutable once built. A refresh produces a new bundle; it never
/// patches an existing one. Callers share bundles behind `Arc`.
///
/// # Example
///
/// ```
/// use indexmap::IndexMap;
/// use serde_json::json;
/// use shelf_core::{BundleMeta, DatasetBundle};
///
/// let mut datasets = IndexMap::new();
/// datasets.insert("catalog".to_string(), vec![json!(["sku-1", "Mug"])]);
///
/// let bundle = DatasetBundle::new(
///     datasets,
///     BundleMeta { fetched_at: 1_700_000_000_000, version: "v1".into() },
/// );
///
/// assert_eq!(bundle.dataset("catalog").map(|rows| rows.len()), Some(1));
/// assert!(bundle.dataset("pricing").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetBundle {
    datasets: IndexMap<String, Vec<Row>>,
    meta: BundleMeta,
}

impl DatasetBundle {
    /// Creates a bundle from already-fetched datasets.
    pub fn new(datasets: IndexMap<String, Vec<Row>>, meta: BundleMeta) -> Self {
        Self { datasets, meta }
    }

    /// Returns every dataset, in fetch order.
    pub fn datasets(&self) -> &IndexMap<String, Vec<Row>> {
        &self.datasets
    }

    /// Returns the rows of a single dataset.
    pub fn dataset(&self, name: &str) -> Option<&[Row]> {
        self.datasets.get(name).map(Vec::as_slice)
    }

    /// Returns the dataset names, in fetch order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }

    pub fn meta(&self) -> &BundleMeta {
        &self.meta
    }

    pub fn fetched_at(&self) -> i64 {
        self.meta.fetched_at
    }

    pub fn version(&self) -> &str {
        &self.meta.version
    }

    /// Number of datasets in the bundle.
    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// Total number of rows across all datasets.
    pub fn row_count(&self) -> usize {
        self.datasets.values().map(Vec::len).sum()
    }

    /// Returns the expected names that this bundle does not carry.
    pub fn missing<'a>(&self, expected: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
        expected
            .into_iter()
            .filter(|name| !self.datasets.contains_key(*name))
            .collect()
    }

    /// Returns true if every expected dataset is present.
    pub fn is_complete<'a>(&self, expected: impl IntoIterator<Item = &'a str>) -> bool {
        self.missing(expected).is_empty()
    }

    /// Renders the `{ name: [rows...] }` payload consumed by front-end bootstrap.
    pub fn to_payload(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .datasets
            .iter()
            .map(|(name, rows)| (name.clone(), serde_json::Value::Array(rows.clone())))
            .collect();
        serde_json::Value::Object(map)
    }
}
