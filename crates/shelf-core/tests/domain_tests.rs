mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{bundle_with, catalog_and_pricing};
use shelf_core::{CacheEntry, Clock, DatasetSet, ManualClock, Provenance, ServeError, UpstreamError};

#[test]
fn test_entry_freshness_follows_clock() {
    let clock = ManualClock::new(0);
    let entry = CacheEntry::new(Arc::new(catalog_and_pricing()), clock.now_ms(), 60);

    assert!(entry.is_fresh(clock.now_ms()));

    clock.advance(Duration::from_secs(59));
    assert!(entry.is_fresh(clock.now_ms()));

    clock.advance(Duration::from_secs(2));
    assert!(!entry.is_fresh(clock.now_ms()));
    assert_eq!(entry.ttl_remaining(clock.now_ms()), Duration::ZERO);
}

#[test]
fn test_bundle_completeness_against_dataset_set() {
    let set = DatasetSet::new(["catalog", "pricing", "categories"]).unwrap();
    let bundle = catalog_and_pricing();

    assert!(!bundle.is_complete(set.iter()));
    assert_eq!(bundle.missing(set.iter()), vec!["categories"]);

    let full = bundle_with(&[("catalog", 1), ("pricing", 1), ("categories", 0)], 0, "v2");
    assert!(full.is_complete(set.iter()));
}

#[test]
fn test_entry_json_round_trip_keeps_rows() {
    let bundle = Arc::new(catalog_and_pricing());
    let entry = CacheEntry::new(Arc::clone(&bundle), 42, 1800);

    let encoded = serde_json::to_vec(&entry).expect("encode");
    let decoded: CacheEntry = serde_json::from_slice(&encoded).expect("decode");

    assert_eq!(decoded.bundle().as_ref(), bundle.as_ref());
    assert_eq!(decoded.bundle().dataset("catalog").map(|r| r.len()), Some(3));
    assert_eq!(decoded.bundle().dataset("pricing").map(|r| r.len()), Some(2));
}

#[test]
fn test_error_taxonomy() {
    let timeout = UpstreamError::timeout(Duration::from_millis(800));
    let unavailable = UpstreamError::unavailable("malformed payload");

    assert!(timeout.is_timeout());
    assert!(!unavailable.is_timeout());

    let terminal = ServeError::service_unavailable(unavailable.clone());
    let ServeError::ServiceUnavailable { cause } = terminal;
    assert_eq!(cause, unavailable);
}

#[test]
fn test_provenance_stale_categories() {
    let stale: Vec<Provenance> = Provenance::ALL
        .into_iter()
        .filter(Provenance::is_stale)
        .collect();
    assert_eq!(stale, vec![Provenance::MemStale, Provenance::KvStale]);
}
