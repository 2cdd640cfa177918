//! Cache invalidation endpoint handlers.

use axum::{extract::State, response::Json};
use tracing::instrument;

use super::response::InvalidateResponse;
use crate::error::AppError;
use crate::extractors::AdminToken;
use crate::state::AppState;

/// POST /api/cache/refresh, DELETE /api/cache
/// Elimina el bundle del store compartido y actualiza el marcador de version.
#[instrument(skip_all)]
pub async fn invalidate_cache(
    State(state): State<AppState>,
    token: AdminToken,
) -> Result<Json<InvalidateResponse>, AppError> {
    authorize(&state, &token)?;

    let result = state.invalidator().invalidate().await?;

    let message = if result.deleted {
        "Shared cache cleared; local copies refresh when their freshness window ends".to_string()
    } else {
        "No cached bundle to clear".to_string()
    };

    Ok(Json(InvalidateResponse {
        ok: true,
        version: result.version,
        message,
    }))
}

fn authorize(state: &AppState, token: &AdminToken) -> Result<(), AppError> {
    let Some(expected) = state.admin_token() else {
        tracing::warn!("Invalidation requested but no admin token is configured");
        return Err(AppError::Forbidden(
            "Cache invalidation is disabled".to_string(),
        ));
    };

    if !token.matches(expected) {
        tracing::warn!(
            presented = token.0.is_some(),
            "Rejected invalidation request"
        );
        return Err(AppError::Unauthorized);
    }

    Ok(())
}
