// handlers/health.rs - GET /health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tracing::error;

use crate::app::AppState;
use crate::error::ApiError;

/// Liveness plus a store round-trip.
pub async fn get(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.health_check().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response(),
        Err(err) => {
            error!(error = %err, "Health check failed");
            ApiError::service_unavailable("database unavailable").into_response()
        }
    }
}
