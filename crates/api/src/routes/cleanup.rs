//! Cleanup trigger for external schedulers.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use cart_store::CartStore;
use sweeper::CleanupReport;

use crate::error::ApiError;
use crate::routes::carts::AppState;

/// POST /cleanup — run one sweep invocation and report the counts.
///
/// Idempotent; an immediate re-invocation reports zero transitions.
#[tracing::instrument(skip(state))]
pub async fn run<S: CartStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<CleanupReport>, ApiError> {
    let report = state
        .sweeper
        .run_cleanup()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(report))
}
