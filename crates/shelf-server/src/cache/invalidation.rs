//! Administrative invalidation.

use serde::Serialize;
use tracing::{info, instrument};

use super::layers::CacheLayers;
use super::shared::StoreError;

/// Lifetime of the version marker written on invalidation.
pub const VERSION_MARKER_TTL_SECONDS: u64 = 86_400;

/// Resultado de una invalidacion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidationResult {
    /// Si habia un bundle en el store compartido.
    pub deleted: bool,
    /// Nuevo valor del marcador de version.
    pub version: String,
}

/// Drops the shared bundle so the next read goes back to the origin.
///
/// Local layers are left alone, including this process's: they expire on
/// their own and stay available as a fallback while the origin is down.
#[derive(Debug, Clone)]
pub struct Invalidator {
    layers: CacheLayers,
}

impl Invalidator {
    pub fn new(layers: CacheLayers) -> Self {
        Self { layers }
    }

    /// Deletes the shared entry and bumps the version marker.
    #[instrument(skip(self), fields(keys = %self.layers.keys()))]
    pub async fn invalidate(&self) -> Result<InvalidationResult, StoreError> {
        let keys = self.layers.keys();
        let store = self.layers.shared();

        let deleted = store.delete(keys.bundle()).await?;
        let version = self.layers.clock().now_ms().to_string();
        store
            .set_marker(keys.version(), &version, VERSION_MARKER_TTL_SECONDS)
            .await?;

        info!(deleted, version = %version, "Cache invalidated");
        Ok(InvalidationResult { deleted, version })
    }
}
