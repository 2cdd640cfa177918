//! Response bodies and headers.

use axum::http::{HeaderName, HeaderValue, header};
use axum::response::Response;
use serde::Serialize;
use shelf_core::Provenance;

use crate::cache::ReadOutcome;

/// Header con la capa que sirvio la respuesta.
pub static CACHE_HEADER: HeaderName = HeaderName::from_static("x-cache");

/// Header con la version del bundle servido.
pub static BUNDLE_VERSION_HEADER: HeaderName = HeaderName::from_static("x-bundle-version");

/// Objeto `_debug` agregado con `?debug=1`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub provenance: Provenance,
    pub fetched_at: i64,
    pub version: String,
    pub elapsed_ms: u64,
}

/// Respuesta de `POST /api/bootstrap`.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshAck {
    pub ok: bool,
    /// True si el bundle viene del origen en esta misma request.
    pub refreshed: bool,
    pub provenance: Provenance,
    pub version: String,
}

impl RefreshAck {
    pub fn from_outcome(outcome: &ReadOutcome) -> Self {
        Self {
            ok: true,
            refreshed: outcome.provenance == Provenance::Miss,
            provenance: outcome.provenance,
            version: outcome.bundle.version().to_string(),
        }
    }
}

/// Respuesta de las operaciones de invalidacion.
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    pub ok: bool,
    /// Nuevo valor del marcador de version.
    pub version: String,
    /// Mensaje descriptivo.
    pub message: String,
}

/// Agrega `x-cache`, `x-bundle-version` y, si se pasa, `cache-control`.
pub fn apply_read_headers(
    response: &mut Response,
    outcome: &ReadOutcome,
    cache_control: Option<&HeaderValue>,
) {
    let headers = response.headers_mut();
    headers.insert(
        CACHE_HEADER.clone(),
        HeaderValue::from_static(outcome.provenance.as_str()),
    );
    if let Ok(version) = HeaderValue::from_str(outcome.bundle.version()) {
        headers.insert(BUNDLE_VERSION_HEADER.clone(), version);
    }
    if let Some(value) = cache_control {
        headers.insert(header::CACHE_CONTROL, value.clone());
    }
}
