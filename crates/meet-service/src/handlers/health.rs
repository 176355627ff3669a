//! Health check handler.

use crate::models::HealthResponse;
use crate::routes::AppState;
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::instrument;

/// Handler for GET /v1/health
///
/// Pings the database; reports 200 with `"healthy"` when it answers and 503
/// with `"unhealthy"` when it does not.
#[instrument(skip(state))]
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                database: Some("connected".to_string()),
            }),
        ),
        Err(e) => {
            tracing::error!(target: "meet.health", error = %e, "Database ping failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy".to_string(),
                    database: Some("disconnected".to_string()),
                }),
            )
        }
    }
}
