//! Cache entries shared by the process-local and shared layers.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::bundle::DatasetBundle;

/// A bundle together with when it was stored and how long it stays fresh.
///
/// The two cache layers hold their own `CacheEntry` for the same bundle; the
/// copies are not kept in lockstep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    bundle: Arc<DatasetBundle>,
    stored_at: i64,
    ttl_seconds: u64,
}

impl CacheEntry {
    /// Creates a new cache entry.
    ///
    /// # Arguments
    /// * `bundle` - The snapshot being cached
    /// * `stored_at` - Unix timestamp in milliseconds when the entry was written
    /// * `ttl_seconds` - Freshness window of this layer
    pub fn new(bundle: Arc<DatasetBundle>, stored_at: i64, ttl_seconds: u64) -> Self {
        Self {
            bundle,
            stored_at,
            ttl_seconds,
        }
    }

    pub fn bundle(&self) -> &Arc<DatasetBundle> {
        &self.bundle
    }

    /// Consumes the entry, returning the shared bundle.
    pub fn into_bundle(self) -> Arc<DatasetBundle> {
        self.bundle
    }

    pub fn stored_at(&self) -> i64 {
        self.stored_at
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Unix timestamp in milliseconds at which the entry stops being fresh.
    pub fn expires_at(&self) -> i64 {
        self.stored_at
            .saturating_add((self.ttl_seconds as i64).saturating_mul(1000))
    }

    /// Age of the entry at `now_ms`. Never negative.
    pub fn age(&self, now_ms: i64) -> Duration {
        Duration::from_millis(now_ms.saturating_sub(self.stored_at).max(0) as u64)
    }

    /// True while `now - stored_at < ttl`.
    pub fn is_fresh(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at()
    }

    /// Remaining freshness at `now_ms`, saturating at zero.
    pub fn ttl_remaining(&self, now_ms: i64) -> Duration {
        Duration::from_millis(self.expires_at().saturating_sub(now_ms).max(0) as u64)
    }

    /// Total freshness window.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}
