//! # Shelf Server
//!
//! HTTP front for the catalog bootstrap cache: a stale-while-revalidate read
//! path over a process-local Moka cache and a shared store (Redis), with the
//! spreadsheet upstream as origin.
//!
//! ## Routes
//!
//! - `GET /api/bootstrap` - every dataset in one payload (`?forceRefresh`, `?debug`)
//! - `POST /api/bootstrap` - forced refresh, returns an ack
//! - `POST /api/cache/refresh`, `DELETE /api/cache` - admin invalidation
//! - `GET /health`, `GET /metrics`

pub mod cache;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod server;
pub mod settings;
pub mod state;

pub use error::AppError;
pub use server::{create_router, create_router_with_state, run_server_with_state};
pub use settings::{Settings, SettingsError};
pub use state::AppState;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
