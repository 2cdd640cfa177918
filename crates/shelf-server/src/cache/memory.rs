//! In-process shared store.
//!
//! Stands in for Redis in single-node deployments and in tests, where several
//! simulated workers share one instance. Entries are kept JSON-encoded so a
//! read goes through the same round trip as the Redis store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use shelf_core::{CacheEntry, Clock};

use super::shared::{SharedCacheStore, StoreError};

#[derive(Debug)]
struct Slot {
    value: String,
    expires_at: i64,
}

/// A [`SharedCacheStore`] held in memory, expiring keys by the injected clock.
///
/// Set-if-absent is atomic within the process only.
#[derive(Debug)]
pub struct MemorySharedStore {
    slots: Mutex<HashMap<String, Slot>>,
    clock: Arc<dyn Clock>,
}

impl MemorySharedStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn expires_at(&self, ttl_seconds: u64) -> i64 {
        self.clock
            .now_ms()
            .saturating_add((ttl_seconds as i64).saturating_mul(1000))
    }

    /// Returns the live raw value at `key`, dropping it if expired.
    fn live(&self, slots: &mut HashMap<String, Slot>, key: &str) -> Option<(String, i64)> {
        let now = self.clock.now_ms();
        match slots.get(key) {
            Some(slot) if now < slot.expires_at => Some((slot.value.clone(), slot.expires_at)),
            Some(_) => {
                slots.remove(key);
                None
            },
            None => None,
        }
    }

    /// Raw string stored at `key`, if live.
    pub fn get_raw(&self, key: &str) -> Option<String> {
        let mut slots = self.slots.lock();
        self.live(&mut slots, key).map(|(value, _)| value)
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        let now = self.clock.now_ms();
        self.slots
            .lock()
            .values()
            .filter(|slot| now < slot.expires_at)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn put(&self, key: &str, value: String, ttl_seconds: u64) {
        let expires_at = self.expires_at(ttl_seconds);
        self.slots
            .lock()
            .insert(key.to_string(), Slot { value, expires_at });
    }
}

#[async_trait]
impl SharedCacheStore for MemorySharedStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, StoreError> {
        match self.get_raw(key) {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, entry: &CacheEntry, ttl_seconds: u64) -> Result<(), StoreError> {
        let payload = serde_json::to_string(entry)?;
        self.put(key, payload, ttl_seconds);
        Ok(())
    }

    async fn ttl_remaining(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        let now = self.clock.now_ms();
        let mut slots = self.slots.lock();
        Ok(self
            .live(&mut slots, key)
            .map(|(_, expires_at)| Duration::from_millis((expires_at - now).max(0) as u64)))
    }

    async fn try_acquire_lock(
        &self,
        lock_key: &str,
        holder_id: &str,
        ttl_seconds: u64,
    ) -> Result<bool, StoreError> {
        let expires_at = self.expires_at(ttl_seconds);
        let mut slots = self.slots.lock();
        if self.live(&mut slots, lock_key).is_some() {
            return Ok(false);
        }
        slots.insert(
            lock_key.to_string(),
            Slot {
                value: holder_id.to_string(),
                expires_at,
            },
        );
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut slots = self.slots.lock();
        let existed = self.live(&mut slots, key).is_some();
        slots.remove(key);
        Ok(existed)
    }

    async fn set_marker(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError> {
        self.put(key, value.to_string(), ttl_seconds);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use shelf_core::{BundleMeta, DatasetBundle, ManualClock};

    fn entry(stored_at: i64) -> CacheEntry {
        let bundle = DatasetBundle::new(
            IndexMap::new(),
            BundleMeta {
                fetched_at: stored_at,
                version: "v1".to_string(),
            },
        );
        CacheEntry::new(Arc::new(bundle), stored_at, 1800)
    }

    fn store() -> (MemorySharedStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        (MemorySharedStore::new(clock.clone()), clock)
    }

    #[tokio::test]
    async fn test_entries_expire_with_clock() {
        let (store, clock) = store();
        store.set("k", &entry(0), 10).await.unwrap();

        clock.advance(Duration::from_secs(9));
        assert!(store.get("k").await.unwrap().is_some());
        assert_eq!(
            store.ttl_remaining("k").await.unwrap(),
            Some(Duration::from_secs(1))
        );

        clock.advance(Duration::from_secs(1));
        assert!(store.get("k").await.unwrap().is_none());
        assert_eq!(store.ttl_remaining("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_lock_is_set_if_absent() {
        let (store, clock) = store();

        assert!(store.try_acquire_lock("lock", "a", 30).await.unwrap());
        assert!(!store.try_acquire_lock("lock", "b", 30).await.unwrap());
        assert_eq!(store.get_raw("lock").as_deref(), Some("a"));

        clock.advance(Duration::from_secs(30));
        assert!(store.try_acquire_lock("lock", "b", 30).await.unwrap());
        assert_eq!(store.get_raw("lock").as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_delete_reports_presence() {
        let (store, _) = store();
        store.set("k", &entry(0), 10).await.unwrap();

        assert!(store.delete("k").await.unwrap());
        assert!(!store.delete("k").await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_entry_round_trips() {
        let (store, _) = store();
        let e = entry(5);
        store.set("k", &e, 10).await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some(e));
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_serialization_error() {
        let (store, _) = store();
        store.set_marker("k", "not json", 10).await.unwrap();

        assert!(matches!(
            store.get("k").await,
            Err(StoreError::Serialization(_))
        ));
    }
}
