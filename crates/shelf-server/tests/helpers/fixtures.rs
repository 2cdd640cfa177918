//! Fakes for the origin and the shared store, and worker builders.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use serde_json::json;
use shelf_core::{CacheEntry, DatasetSet, ManualClock};
use shelf_origin::{BatchQuery, BatchResult, DatasetSource, OriginFetcher, SourceError};
use shelf_server::cache::{
    CachePolicy, MemorySharedStore, ReadThroughHandler, SharedCacheStore, StoreError,
};
use shelf_server::metrics::setup::detached_handle;
use shelf_server::{AppState, create_router_with_state};

/// Start of logical time in every scenario.
pub const T0: i64 = 1_700_000_000_000;

pub fn datasets() -> DatasetSet {
    DatasetSet::new(["catalog", "pricing", "categories"]).unwrap()
}

pub fn policy() -> CachePolicy {
    CachePolicy::new(datasets()).with_key_prefix("test:bootstrap")
}

/// Upstream fake: counts calls, can fail or be slow on demand.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    calls: AtomicUsize,
    failing: AtomicBool,
    delay_ms: AtomicU64,
}

impl ScriptedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }
}

#[async_trait]
impl DatasetSource for ScriptedSource {
    async fn fetch_batch(&self, query: &BatchQuery) -> Result<BatchResult, SourceError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(SourceError::Http {
                status: 503,
                body: "backend error".to_string(),
            });
        }

        let mut result = BatchResult::new();
        for name in query.names() {
            result.insert(
                name.clone(),
                vec![json!(["id", "name"]), json!([call.to_string(), name])],
            );
        }
        Ok(result)
    }

    async fn health_check(&self) -> Result<(), SourceError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Shared store that fails every operation.
#[derive(Debug, Default)]
pub struct UnreachableStore;

#[async_trait]
impl SharedCacheStore for UnreachableStore {
    fn name(&self) -> &'static str {
        "unreachable"
    }

    async fn get(&self, _key: &str) -> Result<Option<CacheEntry>, StoreError> {
        Err(StoreError::Connection("connection refused".into()))
    }

    async fn set(&self, _key: &str, _entry: &CacheEntry, _ttl: u64) -> Result<(), StoreError> {
        Err(StoreError::Connection("connection refused".into()))
    }

    async fn ttl_remaining(&self, _key: &str) -> Result<Option<Duration>, StoreError> {
        Err(StoreError::Connection("connection refused".into()))
    }

    async fn try_acquire_lock(&self, _k: &str, _h: &str, _ttl: u64) -> Result<bool, StoreError> {
        Err(StoreError::Connection("connection refused".into()))
    }

    async fn delete(&self, _key: &str) -> Result<bool, StoreError> {
        Err(StoreError::Connection("connection refused".into()))
    }

    async fn set_marker(&self, _k: &str, _v: &str, _ttl: u64) -> Result<(), StoreError> {
        Err(StoreError::Connection("connection refused".into()))
    }
}

/// One simulated deployment: a clock, a shared store and an upstream.
pub struct Cluster {
    pub clock: Arc<ManualClock>,
    pub store: Arc<MemorySharedStore>,
    pub source: Arc<ScriptedSource>,
}

impl Cluster {
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::new(T0));
        Self {
            store: Arc::new(MemorySharedStore::new(clock.clone())),
            source: ScriptedSource::new(),
            clock,
        }
    }

    /// A new worker process with its own local cache.
    pub fn worker(&self, id: &str) -> ReadThroughHandler {
        self.worker_with_policy(id, policy())
    }

    pub fn worker_with_policy(&self, id: &str, policy: CachePolicy) -> ReadThroughHandler {
        let fetcher = OriginFetcher::new(self.source.clone(), self.clock.clone());
        ReadThroughHandler::new(
            fetcher,
            self.store.clone(),
            policy,
            self.clock.clone(),
            id,
        )
    }

    pub fn advance(&self, secs: u64) {
        self.clock.advance(Duration::from_secs(secs));
    }

    /// Entry currently in the shared store.
    pub async fn shared_entry(&self) -> Option<CacheEntry> {
        self.store.get("test:bootstrap:data").await.unwrap()
    }
}

impl Default for Cluster {
    fn default() -> Self {
        Self::new()
    }
}

/// Router over one worker of `cluster`.
pub fn app(cluster: &Cluster, admin_token: Option<&str>) -> Router {
    let state = AppState::new(cluster.worker("http"), admin_token.map(str::to_string));
    create_router_with_state(state, detached_handle())
}
