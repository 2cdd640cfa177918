//! The single expensive operation: fetch every dataset and stamp a bundle.

use std::sync::Arc;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use shelf_core::{BundleMeta, Clock, DatasetBundle, DatasetSet, UpstreamError};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::SourceError;
use crate::source::{BatchQuery, DatasetSource};

/// Wraps a [`DatasetSource`] with a hard deadline and completeness check.
///
/// `fetch_all` either returns a bundle holding every requested dataset or an
/// [`UpstreamError`]. It never retries and never reads or writes a cache.
#[derive(Debug, Clone)]
pub struct OriginFetcher {
    source: Arc<dyn DatasetSource>,
    clock: Arc<dyn Clock>,
}

impl OriginFetcher {
    pub fn new(source: Arc<dyn DatasetSource>, clock: Arc<dyn Clock>) -> Self {
        Self { source, clock }
    }

    /// Returns the underlying source.
    pub fn source(&self) -> &Arc<dyn DatasetSource> {
        &self.source
    }

    /// Fetches all datasets in one batched round trip.
    ///
    /// The bundle lists datasets in `datasets` order, is stamped with the
    /// clock's current time and carries a fresh time-ordered version token.
    ///
    /// # Errors
    ///
    /// - [`UpstreamError::Timeout`] when the call exceeds `timeout`
    /// - [`UpstreamError::Unavailable`] on failure, malformed payload or a
    ///   batch missing any requested dataset
    #[instrument(skip(self), fields(source = self.source.name(), datasets = %datasets))]
    pub async fn fetch_all(
        &self,
        datasets: &DatasetSet,
        timeout: Duration,
    ) -> Result<DatasetBundle, UpstreamError> {
        let query = BatchQuery::new(datasets.clone());
        let start = Instant::now();

        let mut result = match tokio::time::timeout(timeout, self.source.fetch_batch(&query)).await
        {
            Ok(Ok(result)) => result,
            Ok(Err(SourceError::Timeout { .. })) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "Upstream client timed out");
                return Err(UpstreamError::timeout(timeout));
            },
            Ok(Err(e)) => {
                warn!(error = %e, "Upstream fetch failed");
                return Err(e.into());
            },
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "Upstream fetch timed out");
                return Err(UpstreamError::timeout(timeout));
            },
        };

        let missing: Vec<String> = datasets
            .iter()
            .filter(|name| !result.contains(name))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            let err = SourceError::IncompleteBatch { missing };
            warn!(error = %err, "Rejecting incomplete batch");
            return Err(err.into());
        }

        let mut ordered = IndexMap::with_capacity(datasets.len());
        for name in datasets.iter() {
            if let Some(rows) = result.take(name) {
                ordered.insert(name.to_string(), rows);
            }
        }
        if !result.is_empty() {
            debug!(extra = result.len(), "Ignoring datasets that were not requested");
        }

        let bundle = DatasetBundle::new(
            ordered,
            BundleMeta {
                fetched_at: self.clock.now_ms(),
                version: Uuid::now_v7().to_string(),
            },
        );

        info!(
            version = bundle.version(),
            rows = bundle.row_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Fetched bundle from upstream"
        );

        Ok(bundle)
    }

    /// Probes the upstream without fetching data.
    pub async fn health_check(&self) -> Result<(), UpstreamError> {
        self.source.health_check().await.map_err(UpstreamError::from)
    }
}
