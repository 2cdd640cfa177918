//! Both cache layers behind one handle.

use std::sync::Arc;
use std::time::{Duration, Instant};

use shelf_core::{CacheEntry, Clock, DatasetBundle};
use tracing::warn;

use super::keys::CacheKeys;
use super::local::ProcessLocalCache;
use super::shared::SharedCacheStore;
use crate::metrics::CacheMetrics;

/// The local cache and the shared store, plus the write-through used after
/// every successful origin fetch.
///
/// Shared store failures are logged and counted here, never returned: a
/// caller that can still serve data must not fail because of them.
#[derive(Debug, Clone)]
pub struct CacheLayers {
    local: ProcessLocalCache,
    shared: Arc<dyn SharedCacheStore>,
    keys: CacheKeys,
    shared_ttl_seconds: u64,
    clock: Arc<dyn Clock>,
    metrics: CacheMetrics,
}

impl CacheLayers {
    pub fn new(
        local: ProcessLocalCache,
        shared: Arc<dyn SharedCacheStore>,
        keys: CacheKeys,
        shared_ttl_seconds: u64,
        clock: Arc<dyn Clock>,
        metrics: CacheMetrics,
    ) -> Self {
        Self {
            local,
            shared,
            keys,
            shared_ttl_seconds,
            clock,
            metrics,
        }
    }

    pub fn local(&self) -> &ProcessLocalCache {
        &self.local
    }

    pub fn shared(&self) -> &Arc<dyn SharedCacheStore> {
        &self.shared
    }

    pub fn keys(&self) -> &CacheKeys {
        &self.keys
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn shared_ttl_seconds(&self) -> u64 {
        self.shared_ttl_seconds
    }

    /// Reads the shared bundle entry. Errors count as a miss.
    pub async fn shared_entry(&self) -> Option<CacheEntry> {
        let start = Instant::now();
        let result = self.shared.get(self.keys.bundle()).await;
        self.metrics
            .record_operation_duration("shared_get", start.elapsed());

        match result {
            Ok(entry) => entry,
            Err(e) => {
                warn!(store = self.shared.name(), error = %e, "Shared store read failed");
                self.metrics.record_store_error(self.shared.name(), "get");
                None
            },
        }
    }

    /// Remaining freshness of a shared entry.
    ///
    /// Asks the store first and falls back to the entry's own timestamps.
    pub async fn shared_ttl_remaining(&self, entry: &CacheEntry) -> Duration {
        match self.shared.ttl_remaining(self.keys.bundle()).await {
            Ok(Some(remaining)) => remaining,
            Ok(None) => entry.ttl_remaining(self.clock.now_ms()),
            Err(e) => {
                warn!(store = self.shared.name(), error = %e, "Shared store TTL lookup failed");
                self.metrics.record_store_error(self.shared.name(), "ttl");
                entry.ttl_remaining(self.clock.now_ms())
            },
        }
    }

    /// Writes a freshly fetched bundle to the shared layer, then the local one.
    ///
    /// Returns false if the shared write failed; the local write always happens.
    pub async fn populate(&self, bundle: Arc<DatasetBundle>) -> bool {
        let now = self.clock.now_ms();
        let entry = CacheEntry::new(bundle.clone(), now, self.shared_ttl_seconds);

        let start = Instant::now();
        let shared_ok = match self
            .shared
            .set(self.keys.bundle(), &entry, self.shared_ttl_seconds)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    store = self.shared.name(),
                    version = bundle.version(),
                    error = %e,
                    "Shared store write failed"
                );
                self.metrics.record_store_error(self.shared.name(), "set");
                false
            },
        };
        self.metrics
            .record_operation_duration("shared_set", start.elapsed());

        self.local.put(bundle).await;
        shared_ok
    }
}
