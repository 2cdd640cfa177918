//! Redis-backed shared store.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use shelf_core::CacheEntry;
use tracing::{debug, info};

use super::shared::{SharedCacheStore, StoreError};

/// A [`SharedCacheStore`] on a Redis server.
///
/// Entries are stored as JSON strings with `SET .. EX`; the lock is
/// `SET lock holder NX EX ttl`, so Redis provides the cross-process atomicity.
#[derive(Clone)]
pub struct RedisSharedStore {
    connection: MultiplexedConnection,
}

impl RedisSharedStore {
    /// Connects to `url` (`redis://[user:pass@]host[:port][/db]`).
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)
            .map_err(|e| StoreError::Connection(format!("invalid redis url: {}", e)))?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        info!("Connected to Redis shared store");
        Ok(Self { connection })
    }
}

/// Redis rejects `EX 0`.
fn expiry(ttl_seconds: u64) -> u64 {
    ttl_seconds.max(1)
}

/// Maps the `TTL` reply: -2 missing key, -1 no expiry.
fn remaining_from_reply(reply: i64) -> Option<Duration> {
    match reply {
        -2 => None,
        r if r < 0 => Some(Duration::MAX),
        r => Some(Duration::from_secs(r as u64)),
    }
}

#[async_trait]
impl SharedCacheStore for RedisSharedStore {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, StoreError> {
        let mut conn = self.connection.clone();
        let raw: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| StoreError::command("GET", e.to_string()))?;

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, entry: &CacheEntry, ttl_seconds: u64) -> Result<(), StoreError> {
        let payload = serde_json::to_string(entry)?;
        let mut conn = self.connection.clone();
        let _: () = conn
            .set_ex(key, payload, expiry(ttl_seconds))
            .await
            .map_err(|e| StoreError::command("SET", e.to_string()))?;
        Ok(())
    }

    async fn ttl_remaining(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        let mut conn = self.connection.clone();
        let reply: i64 = conn
            .ttl(key)
            .await
            .map_err(|e| StoreError::command("TTL", e.to_string()))?;
        Ok(remaining_from_reply(reply))
    }

    async fn try_acquire_lock(
        &self,
        lock_key: &str,
        holder_id: &str,
        ttl_seconds: u64,
    ) -> Result<bool, StoreError> {
        let mut conn = self.connection.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(lock_key)
            .arg(holder_id)
            .arg("NX")
            .arg("EX")
            .arg(expiry(ttl_seconds))
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::command("SET NX", e.to_string()))?;

        let acquired = reply.is_some();
        debug!(lock = lock_key, holder = holder_id, acquired, "Lock attempt");
        Ok(acquired)
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.connection.clone();
        let removed: i64 = conn
            .del(key)
            .await
            .map_err(|e| StoreError::command("DEL", e.to_string()))?;
        Ok(removed > 0)
    }

    async fn set_marker(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        let _: () = conn
            .set_ex(key, value, expiry(ttl_seconds))
            .await
            .map_err(|e| StoreError::command("SET", e.to_string()))?;
        Ok(())
    }
}
