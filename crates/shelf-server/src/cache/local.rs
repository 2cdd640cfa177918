//! Process-local layer using Moka.

use std::sync::Arc;
use std::time::Instant;

use moka::future::Cache;
use shelf_core::{CacheEntry, Clock, DatasetBundle};

use crate::cache::policy::CachePolicy;
use crate::metrics::CacheMetrics;

/// Cache en memoria del proceso, con una sola entry: el bundle actual.
///
/// Moka sólo decide cuánto tiempo se retiene la entry (`local_retention`).
/// Si está fresca o no lo decide el [`CacheEntry`] con el reloj inyectado, así
/// una entry vencida sigue disponible para servir datos degradados.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use shelf_core::{DatasetSet, SystemClock};
/// use shelf_server::cache::{CachePolicy, ProcessLocalCache};
/// use shelf_server::metrics::CacheMetrics;
///
/// # #[tokio::main]
/// # async fn main() {
/// let policy = CachePolicy::new(DatasetSet::new(["catalog"]).unwrap());
/// let cache = ProcessLocalCache::new(&policy, Arc::new(SystemClock), CacheMetrics::new());
///
/// if let Some(entry) = cache.get().await {
///     println!("fresh: {}", cache.is_fresh(&entry));
/// }
/// # }
/// ```
#[derive(Clone)]
pub struct ProcessLocalCache {
    inner: Cache<&'static str, CacheEntry>,
    ttl_seconds: u64,
    clock: Arc<dyn Clock>,
    metrics: CacheMetrics,
}

const SLOT: &str = "bundle";

impl ProcessLocalCache {
    /// Crea el cache con la retención y TTL de la política.
    pub fn new(policy: &CachePolicy, clock: Arc<dyn Clock>, metrics: CacheMetrics) -> Self {
        let eviction_metrics = metrics.clone();
        let inner = Cache::builder()
            .time_to_live(policy.local_retention)
            .eviction_listener(move |_key, _value, cause| {
                let reason = match cause {
                    moka::notification::RemovalCause::Expired => "retention",
                    moka::notification::RemovalCause::Size => "capacity",
                    moka::notification::RemovalCause::Explicit => "manual",
                    moka::notification::RemovalCause::Replaced => "replaced",
                };
                eviction_metrics.record_eviction(reason);
            })
            .build();

        Self {
            inner,
            ttl_seconds: policy.local_ttl_seconds,
            clock,
            metrics,
        }
    }

    /// Retorna la entry actual, fresca o no.
    pub async fn get(&self) -> Option<CacheEntry> {
        let start = Instant::now();
        let entry = self.inner.get(SLOT).await;
        self.metrics
            .record_operation_duration("local_get", start.elapsed());
        entry
    }

    /// Guarda un bundle con el TTL local. La última escritura gana.
    pub async fn put(&self, bundle: Arc<DatasetBundle>) -> CacheEntry {
        let entry = CacheEntry::new(bundle, self.clock.now_ms(), self.ttl_seconds);
        self.put_entry(entry.clone()).await;
        entry
    }

    /// Guarda una entry ya construida.
    pub async fn put_entry(&self, entry: CacheEntry) {
        self.inner.insert(SLOT, entry).await;
        self.metrics.update_entry_count(self.inner.entry_count());
    }

    /// `now - storedAt < ttl`, según el reloj inyectado.
    pub fn is_fresh(&self, entry: &CacheEntry) -> bool {
        entry.is_fresh(self.clock.now_ms())
    }

    /// Retorna la entry sólo si está fresca, registrando hit o miss.
    pub async fn get_fresh(&self) -> Option<CacheEntry> {
        match self.get().await {
            Some(entry) if self.is_fresh(&entry) => {
                self.metrics.record_hit();
                Some(entry)
            },
            _ => {
                self.metrics.record_miss();
                None
            },
        }
    }

    /// Elimina la entry.
    pub async fn invalidate(&self) {
        self.inner.invalidate(SLOT).await;
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }
}

impl std::fmt::Debug for ProcessLocalCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessLocalCache")
            .field("ttl_seconds", &self.ttl_seconds)
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}
