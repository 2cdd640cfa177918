//! Shelf Server binary.

use std::sync::Arc;

use anyhow::Context;
use shelf_core::{Clock, SystemClock};
use shelf_origin::{OriginFetcher, SheetsSource};
use shelf_server::cache::{
    MemorySharedStore, ReadThroughHandler, RedisSharedStore, SharedCacheStore,
};
use shelf_server::metrics::init_metrics;
use shelf_server::{AppState, Settings, run_server_with_state};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load().context("loading settings")?;
    settings.validate().context("validating settings")?;

    let addr = settings.server.addr()?;
    let policy = settings.cache_policy()?;
    let worker_id = settings.server.worker_id();

    tracing::info!("Starting Shelf Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        worker = %worker_id,
        datasets = %policy.datasets,
        local_ttl = policy.local_ttl_seconds,
        shared_ttl = policy.shared_ttl_seconds,
        "Cache policy loaded"
    );

    let prometheus_handle = init_metrics().context("installing metrics recorder")?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let store: Arc<dyn SharedCacheStore> = match settings.redis.url() {
        Some(url) => Arc::new(
            RedisSharedStore::connect(url)
                .await
                .context("connecting to redis")?,
        ),
        None => {
            tracing::warn!(
                "No redis.url configured; using the in-memory shared store (single node only)"
            );
            Arc::new(MemorySharedStore::new(clock.clone()))
        },
    };

    let source = SheetsSource::new(settings.sheets_config()?)?;
    let fetcher = OriginFetcher::new(Arc::new(source), clock.clone());

    let reader = ReadThroughHandler::new(fetcher, store, policy, clock, worker_id);
    let state = AppState::new(reader, settings.admin.token().map(str::to_string));

    if state.admin_token().is_none() {
        tracing::warn!("No admin.token configured; cache invalidation endpoints are disabled");
    }

    run_server_with_state(addr, state, prometheus_handle).await?;

    Ok(())
}
