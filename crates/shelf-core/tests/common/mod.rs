#![allow(dead_code)]
use indexmap::IndexMap;
use serde_json::json;
use shelf_core::{BundleMeta, DatasetBundle};

/// Builds a bundle with the given row counts per dataset.
pub fn bundle_with(counts: &[(&str, usize)], fetched_at: i64, version: &str) -> DatasetBundle {
    let mut datasets = IndexMap::new();
    for (name, count) in counts {
        let rows = (0..*count)
            .map(|i| json!([format!("{}-{}", name, i), i]))
            .collect();
        datasets.insert(name.to_string(), rows);
    }
    DatasetBundle::new(
        datasets,
        BundleMeta {
            fetched_at,
            version: version.to_string(),
        },
    )
}

/// The bundle used throughout the cold-cache scenarios.
pub fn catalog_and_pricing() -> DatasetBundle {
    bundle_with(&[("catalog", 3), ("pricing", 2)], 1_700_000_000_000, "v-test")
}
