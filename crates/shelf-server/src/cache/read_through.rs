//! Per-request entry point of the cache.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use shelf_core::{Clock, DatasetBundle, Provenance, ServeError, UpstreamError};
use shelf_origin::OriginFetcher;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use super::coordinator::RevalidationCoordinator;
use super::keys::CacheKeys;
use super::layers::CacheLayers;
use super::local::ProcessLocalCache;
use super::policy::CachePolicy;
use super::shared::SharedCacheStore;
use crate::metrics::CacheMetrics;

/// A served bundle and the layer it came from.
#[derive(Debug, Clone)]
pub struct ReadOutcome {
    pub bundle: Arc<DatasetBundle>,
    pub provenance: Provenance,
}

impl ReadOutcome {
    fn new(bundle: Arc<DatasetBundle>, provenance: Provenance) -> Self {
        Self { bundle, provenance }
    }
}

type FetchResult = Result<ReadOutcome, UpstreamError>;
type PendingFetch = Mutex<Option<watch::Receiver<Option<FetchResult>>>>;

enum Role {
    Leader(watch::Sender<Option<FetchResult>>),
    Follower(watch::Receiver<Option<FetchResult>>),
}

/// Frees the in-flight slot when the leading fetch ends or is dropped.
struct PendingGuard<'a>(&'a PendingFetch);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.lock().take();
    }
}

struct Inner {
    layers: CacheLayers,
    coordinator: RevalidationCoordinator,
    fetcher: OriginFetcher,
    policy: CachePolicy,
    /// Origin fetch currently running in this process, if any.
    pending: PendingFetch,
    metrics: CacheMetrics,
}

/// Walks local → shared → origin, and falls back to stale data on failure.
///
/// Concurrent origin fetches within a process are coalesced into one call.
///
/// One handler per process. Cloning is cheap and shares all state.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use shelf_core::{DatasetSet, SystemClock};
/// use shelf_origin::{OriginFetcher, SheetsConfig, SheetsSource};
/// use shelf_server::cache::{CachePolicy, MemorySharedStore, ReadThroughHandler};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let clock = Arc::new(SystemClock);
/// let source = SheetsSource::new(
///     SheetsConfig::builder().spreadsheet_id("1AbC").api_key("key").build()?,
/// )?;
/// let handler = ReadThroughHandler::new(
///     OriginFetcher::new(Arc::new(source), clock.clone()),
///     Arc::new(MemorySharedStore::new(clock.clone())),
///     CachePolicy::new(DatasetSet::new(["catalog", "pricing"])?),
///     clock,
///     "worker-1",
/// );
///
/// let outcome = handler.read(false).await?;
/// println!("{} from {}", outcome.bundle.version(), outcome.provenance);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ReadThroughHandler {
    inner: Arc<Inner>,
}

impl ReadThroughHandler {
    pub fn new(
        fetcher: OriginFetcher,
        store: Arc<dyn SharedCacheStore>,
        policy: CachePolicy,
        clock: Arc<dyn Clock>,
        worker_id: impl Into<String>,
    ) -> Self {
        let metrics = CacheMetrics::new();
        let local = ProcessLocalCache::new(&policy, clock.clone(), metrics.clone());
        let layers = CacheLayers::new(
            local,
            store,
            CacheKeys::new(policy.key_prefix.clone()),
            policy.shared_ttl_seconds,
            clock,
            metrics.clone(),
        );
        let coordinator = RevalidationCoordinator::new(
            layers.clone(),
            fetcher.clone(),
            &policy,
            worker_id,
            metrics.clone(),
        );

        Self {
            inner: Arc::new(Inner {
                layers,
                coordinator,
                fetcher,
                policy,
                pending: Mutex::new(None),
                metrics,
            }),
        }
    }

    pub fn layers(&self) -> &CacheLayers {
        &self.inner.layers
    }

    pub fn coordinator(&self) -> &RevalidationCoordinator {
        &self.inner.coordinator
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.inner.policy
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.inner.metrics
    }

    /// Returns the current bundle.
    ///
    /// With `force_refresh` both cache layers are skipped and the origin is
    /// called exactly once; stale data is still served if that call fails.
    ///
    /// # Errors
    ///
    /// [`ServeError::ServiceUnavailable`] only when the origin failed and no
    /// layer holds a bundle of any age.
    #[instrument(skip(self))]
    pub async fn read(&self, force_refresh: bool) -> Result<ReadOutcome, ServeError> {
        let outcome = self.read_inner(force_refresh).await?;
        self.inner.metrics.record_read(outcome.provenance);
        debug!(
            provenance = %outcome.provenance,
            version = outcome.bundle.version(),
            "Read served"
        );
        Ok(outcome)
    }

    async fn read_inner(&self, force_refresh: bool) -> Result<ReadOutcome, ServeError> {
        let layers = &self.inner.layers;

        if !force_refresh {
            if let Some(entry) = layers.local().get_fresh().await {
                return Ok(ReadOutcome::new(entry.into_bundle(), Provenance::MemHit));
            }

            if let Some(entry) = layers.shared_entry().await {
                let total = entry.ttl();
                let remaining = layers.shared_ttl_remaining(&entry).await;
                let aging = self.inner.coordinator.is_aging(remaining, total);

                let bundle = entry.into_bundle();
                layers.local().put(bundle.clone()).await;
                self.inner.coordinator.spawn(remaining, total);

                let provenance = if aging {
                    Provenance::KvStale
                } else {
                    Provenance::KvHit
                };
                return Ok(ReadOutcome::new(bundle, provenance));
            }
        }

        let error = match self.fetch_coalesced(force_refresh).await {
            Ok(outcome) => return Ok(outcome),
            Err(e) => e,
        };

        warn!(error = %error, forced = force_refresh, "Origin fetch failed; looking for stale data");

        if let Some(entry) = layers.local().get().await {
            return Ok(ReadOutcome::new(entry.into_bundle(), Provenance::MemStale));
        }
        if let Some(entry) = layers.shared_entry().await {
            return Ok(ReadOutcome::new(entry.into_bundle(), Provenance::KvStale));
        }

        warn!(error = %error, "No cached bundle of any age; service unavailable");
        Err(ServeError::service_unavailable(error))
    }

    /// Joins the fetch already running in this process, or starts one.
    ///
    /// Every caller receives the outcome of the same upstream call, so N
    /// concurrent cold reads cost one fetch and wait at most one timeout.
    async fn fetch_coalesced(&self, force_refresh: bool) -> FetchResult {
        let role = {
            let mut pending = self.inner.pending.lock();
            match pending.as_ref() {
                Some(rx) => Role::Follower(rx.clone()),
                None => {
                    let (tx, rx) = watch::channel(None);
                    *pending = Some(rx);
                    Role::Leader(tx)
                },
            }
        };

        match role {
            Role::Leader(tx) => {
                let _clear = PendingGuard(&self.inner.pending);
                let result = self.fetch_as_leader(force_refresh).await;
                tx.send_replace(Some(result.clone()));
                result
            },
            Role::Follower(mut rx) => {
                debug!("Joining in-flight origin fetch");
                let shared = rx
                    .wait_for(Option::is_some)
                    .await
                    .map(|result| result.clone());
                match shared {
                    Ok(Some(result)) => result,
                    // El lider se cancelo antes de terminar.
                    _ => Err(UpstreamError::unavailable("origin fetch was abandoned")),
                }
            },
        }
    }

    async fn fetch_as_leader(&self, force_refresh: bool) -> FetchResult {
        let layers = &self.inner.layers;

        if !force_refresh {
            if let Some(entry) = layers.local().get_fresh().await {
                debug!("Bundle stored by a fetch that just finished");
                return Ok(ReadOutcome::new(entry.into_bundle(), Provenance::MemHit));
            }
        }

        let start = Instant::now();
        match self
            .inner
            .fetcher
            .fetch_all(&self.inner.policy.datasets, self.inner.policy.fetch_timeout)
            .await
        {
            Ok(bundle) => {
                self.inner
                    .metrics
                    .record_origin_fetch("ok", start.elapsed());
                let bundle = Arc::new(bundle);
                layers.populate(bundle.clone()).await;
                info!(
                    version = bundle.version(),
                    forced = force_refresh,
                    "Served bundle from origin"
                );
                Ok(ReadOutcome::new(bundle, Provenance::Miss))
            },
            Err(e) => {
                self.inner
                    .metrics
                    .record_origin_fetch(e.kind(), start.elapsed());
                Err(e)
            },
        }
    }
}

impl std::fmt::Debug for ReadThroughHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadThroughHandler")
            .field("datasets", &self.inner.policy.datasets)
            .field("coordinator", &self.inner.coordinator)
            .finish()
    }
}
