//! Background revalidation.
//!
//! A refresh is attempted only when the shared entry is aging. Within a
//! process an in-flight flag keeps attempts from overlapping; across
//! processes the shared store lock does. Losing either race is a normal
//! outcome, not an error.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use shelf_core::{DatasetSet, UpstreamError};
use shelf_origin::OriginFetcher;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::layers::CacheLayers;
use super::policy::CachePolicy;
use crate::metrics::CacheMetrics;

const OUTCOME_CHANNEL_CAPACITY: usize = 64;

/// How a revalidation attempt ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RevalidationOutcome {
    /// Enough TTL remains; nothing to do.
    NotAging,
    /// Another attempt in this process is still running.
    InFlight,
    /// Another worker holds the lock (or the lock could not be taken).
    LockHeld,
    /// Both layers now hold the bundle with this version.
    Refreshed { version: String },
    /// The origin fetch failed; both layers were left untouched.
    Failed { error: UpstreamError },
}

impl RevalidationOutcome {
    /// Label used for metrics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotAging => "not_aging",
            Self::InFlight => "in_flight",
            Self::LockHeld => "lock_held",
            Self::Refreshed { .. } => "refreshed",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Clears the in-flight flag however the attempt ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct Inner {
    layers: CacheLayers,
    fetcher: OriginFetcher,
    datasets: DatasetSet,
    lock_ttl_seconds: u64,
    revalidate_ratio: f64,
    fetch_timeout: Duration,
    worker_id: String,
    in_flight: AtomicBool,
    outcomes: broadcast::Sender<RevalidationOutcome>,
    metrics: CacheMetrics,
}

/// Decides when a background refresh is needed and runs it.
#[derive(Clone)]
pub struct RevalidationCoordinator {
    inner: Arc<Inner>,
}

impl RevalidationCoordinator {
    pub fn new(
        layers: CacheLayers,
        fetcher: OriginFetcher,
        policy: &CachePolicy,
        worker_id: impl Into<String>,
        metrics: CacheMetrics,
    ) -> Self {
        let (outcomes, _) = broadcast::channel(OUTCOME_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                layers,
                fetcher,
                datasets: policy.datasets.clone(),
                lock_ttl_seconds: policy.lock_ttl_seconds,
                revalidate_ratio: policy.revalidate_ratio,
                fetch_timeout: policy.fetch_timeout,
                worker_id: worker_id.into(),
                in_flight: AtomicBool::new(false),
                outcomes,
                metrics,
            }),
        }
    }

    /// True once less than `ratio` of the total TTL remains.
    pub fn is_aging(&self, remaining: Duration, total: Duration) -> bool {
        remaining.as_secs_f64() < total.as_secs_f64() * self.inner.revalidate_ratio
    }

    /// Receives every outcome from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<RevalidationOutcome> {
        self.inner.outcomes.subscribe()
    }

    /// True while an attempt is running in this process.
    pub fn is_in_flight(&self) -> bool {
        self.inner.in_flight.load(Ordering::Acquire)
    }

    pub fn worker_id(&self) -> &str {
        &self.inner.worker_id
    }

    /// Runs [`maybe_revalidate`](Self::maybe_revalidate) on a detached task.
    pub fn spawn(&self, remaining: Duration, total: Duration) -> JoinHandle<RevalidationOutcome> {
        let this = self.clone();
        tokio::spawn(async move { this.maybe_revalidate(remaining, total).await })
    }

    /// Refreshes both layers if the entry is aging and nobody else is on it.
    #[instrument(skip(self), fields(worker = %self.inner.worker_id))]
    pub async fn maybe_revalidate(&self, remaining: Duration, total: Duration) -> RevalidationOutcome {
        let outcome = self.attempt(remaining, total).await;
        self.inner.metrics.record_revalidation(outcome.label());
        // No subscribers is fine.
        let _ = self.inner.outcomes.send(outcome.clone());
        outcome
    }

    async fn attempt(&self, remaining: Duration, total: Duration) -> RevalidationOutcome {
        let inner = &self.inner;

        if !self.is_aging(remaining, total) {
            return RevalidationOutcome::NotAging;
        }

        if inner
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Revalidation already in flight in this process");
            return RevalidationOutcome::InFlight;
        }
        let _guard = InFlightGuard(&inner.in_flight);

        let store = inner.layers.shared();
        let holder = format!("{}:{}", inner.worker_id, Uuid::now_v7());
        match store
            .try_acquire_lock(inner.layers.keys().lock(), &holder, inner.lock_ttl_seconds)
            .await
        {
            Ok(true) => {},
            Ok(false) => {
                debug!("Revalidation lock held by another worker");
                return RevalidationOutcome::LockHeld;
            },
            Err(e) => {
                warn!(store = store.name(), error = %e, "Could not take revalidation lock");
                inner.metrics.record_store_error(store.name(), "lock");
                return RevalidationOutcome::LockHeld;
            },
        }

        info!(
            remaining_secs = remaining.as_secs(),
            holder = %holder,
            "Revalidating aging bundle"
        );

        let start = Instant::now();
        match inner
            .fetcher
            .fetch_all(&inner.datasets, inner.fetch_timeout)
            .await
        {
            Ok(bundle) => {
                inner.metrics.record_origin_fetch("ok", start.elapsed());
                let version = bundle.version().to_string();
                inner.layers.populate(Arc::new(bundle)).await;
                info!(version = %version, "Revalidation refreshed both layers");
                RevalidationOutcome::Refreshed { version }
            },
            Err(error) => {
                inner.metrics.record_origin_fetch(error.kind(), start.elapsed());
                warn!(error = %error, "Revalidation failed; keeping cached bundle");
                RevalidationOutcome::Failed { error }
            },
        }
    }
}

impl std::fmt::Debug for RevalidationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevalidationCoordinator")
            .field("worker_id", &self.inner.worker_id)
            .field("in_flight", &self.is_in_flight())
            .finish()
    }
}
