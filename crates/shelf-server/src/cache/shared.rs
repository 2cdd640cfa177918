//! The out-of-process layer shared by every worker.

use std::time::Duration;

use async_trait::async_trait;
use shelf_core::CacheEntry;
use thiserror::Error;

/// Failures of the shared store.
///
/// These are logged and counted; a read that still has data to serve never
/// fails because of one.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection failed: {0}")]
    Connection(String),

    #[error("store command {op} failed: {message}")]
    Command { op: &'static str, message: String },

    #[error("stored entry could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn command(op: &'static str, message: impl Into<String>) -> Self {
        Self::Command {
            op,
            message: message.into(),
        }
    }
}

/// Key/value store shared by all workers, also used as the lock service.
///
/// Entries written with a TTL disappear once it elapses. The lock is a plain
/// key created with an atomic set-if-absent and left to expire.
#[async_trait]
pub trait SharedCacheStore: Send + Sync {
    /// Short identifier for logs and metrics.
    fn name(&self) -> &'static str;

    /// Returns the entry stored at `key`, if it has not expired.
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, StoreError>;

    /// Stores `entry` at `key`, replacing any previous value.
    async fn set(&self, key: &str, entry: &CacheEntry, ttl_seconds: u64) -> Result<(), StoreError>;

    /// Remaining lifetime of `key`.
    ///
    /// `None` if the key does not exist, `Duration::MAX` if it never expires.
    async fn ttl_remaining(&self, key: &str) -> Result<Option<Duration>, StoreError>;

    /// Creates `lock_key` only if absent. True when this caller now holds it.
    async fn try_acquire_lock(
        &self,
        lock_key: &str,
        holder_id: &str,
        ttl_seconds: u64,
    ) -> Result<bool, StoreError>;

    /// Removes `key`. True if something was removed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Writes a plain string value with a TTL.
    async fn set_marker(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError>;
}

impl std::fmt::Debug for dyn SharedCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SharedCacheStore({})", self.name())
    }
}
