//! Application state.

use std::sync::Arc;

use axum::http::HeaderValue;

use crate::cache::{Invalidator, ReadThroughHandler};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The read path (both cache layers and the origin).
    reader: ReadThroughHandler,

    /// Administrative invalidation over the same layers.
    invalidator: Invalidator,

    /// Token required by the invalidation endpoints.
    admin_token: Option<Arc<str>>,

    /// Precomputed `cache-control` value for bootstrap responses.
    cache_control: HeaderValue,
}

impl AppState {
    /// Creates a new AppState around a read-through handler.
    pub fn new(reader: ReadThroughHandler, admin_token: Option<String>) -> Self {
        let policy = reader.policy();
        let cache_control = format!(
            "public, s-maxage={}, stale-while-revalidate={}",
            policy.local_ttl_seconds, policy.shared_ttl_seconds
        );
        let cache_control = HeaderValue::from_str(&cache_control)
            .unwrap_or_else(|_| HeaderValue::from_static("no-cache"));

        Self {
            invalidator: Invalidator::new(reader.layers().clone()),
            reader,
            admin_token: admin_token.map(Arc::from),
            cache_control,
        }
    }

    /// Returns the read-through handler.
    pub fn reader(&self) -> &ReadThroughHandler {
        &self.reader
    }

    pub fn invalidator(&self) -> &Invalidator {
        &self.invalidator
    }

    /// Returns the configured admin token, if any.
    pub fn admin_token(&self) -> Option<&str> {
        self.admin_token.as_deref()
    }

    pub fn cache_control(&self) -> &HeaderValue {
        &self.cache_control
    }
}
