//! Bootstrap endpoint handlers.

use std::time::Instant;

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::instrument;

use super::response::{DebugInfo, RefreshAck, apply_read_headers};
use crate::error::AppError;
use crate::extractors::BootstrapQuery;
use crate::state::AppState;

/// GET /api/bootstrap
/// Retorna todos los datasets en un solo objeto `{ nombre: [filas...] }`.
#[instrument(skip_all, fields(force = query.force_refresh, debug = query.debug))]
pub async fn get_bootstrap(
    State(state): State<AppState>,
    Query(query): Query<BootstrapQuery>,
) -> Result<Response, AppError> {
    let start = Instant::now();
    let outcome = state.reader().read(query.force_refresh).await?;

    let mut body = outcome.bundle.to_payload();
    if query.debug {
        let debug = DebugInfo {
            provenance: outcome.provenance,
            fetched_at: outcome.bundle.fetched_at(),
            version: outcome.bundle.version().to_string(),
            elapsed_ms: start.elapsed().as_millis() as u64,
        };
        if let Value::Object(map) = &mut body {
            map.insert(
                "_debug".to_string(),
                serde_json::to_value(debug).map_err(|e| AppError::Internal(e.to_string()))?,
            );
        }
    }

    tracing::info!(
        provenance = %outcome.provenance,
        version = outcome.bundle.version(),
        "Bootstrap served"
    );

    let mut response = Json(body).into_response();
    apply_read_headers(&mut response, &outcome, Some(state.cache_control()));
    Ok(response)
}

/// POST /api/bootstrap
/// Fuerza un fetch al origen y retorna un ack en vez del payload.
#[instrument(skip_all)]
pub async fn refresh_bootstrap(State(state): State<AppState>) -> Result<Response, AppError> {
    let outcome = state.reader().read(true).await?;
    let ack = RefreshAck::from_outcome(&outcome);

    tracing::info!(
        provenance = %outcome.provenance,
        refreshed = ack.refreshed,
        "Forced refresh handled"
    );

    let mut response = Json(ack).into_response();
    apply_read_headers(&mut response, &outcome, None);
    Ok(response)
}
