//! Authentication handlers.
//!
//! - `POST /v1/auth/register` - Create an account (public)
//! - `POST /v1/auth/login` - Exchange credentials for a token (public)

use crate::errors::ApiError;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest};
use crate::routes::AppState;
use crate::services::auth_service;
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::instrument;

/// Handler for POST /v1/auth/register
///
/// # Response
///
/// - 201 Created: Account created, auto-login token returned
/// - 400 Bad Request: Invalid email/password/username, or email taken
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let response = auth_service::register(&state.pool, &state.config, payload).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for POST /v1/auth/login
///
/// # Response
///
/// - 200 OK: Token returned
/// - 401 Unauthorized: Bad email or password (single message for both)
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let response = auth_service::login(&state.pool, &state.config, payload).await?;

    Ok(Json(response))
}
