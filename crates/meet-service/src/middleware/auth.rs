//! Authentication middleware for protected routes.
//!
//! Extracts the Bearer token from the Authorization header, validates it
//! against the configured signing secret, and injects claims into request
//! extensions.

use crate::auth::{self, Claims};
use crate::errors::ApiError;
use crate::routes::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::instrument;

/// Authentication middleware that validates API tokens.
///
/// # Authorization Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// # Response
///
/// - Returns 401 Unauthorized with a WWW-Authenticate header if the token is
///   missing or invalid
/// - Continues to the next handler with `Claims` in extensions otherwise
#[instrument(skip(state, req, next), name = "meet.middleware.auth")]
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    // Extract Authorization header
    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::debug!(target: "meet.middleware.auth", "Missing Authorization header");
            ApiError::InvalidToken("Missing Authorization header".to_string())
        })?;

    // Extract Bearer token
    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::debug!(target: "meet.middleware.auth", "Invalid Authorization header format");
        ApiError::InvalidToken("Invalid Authorization header format".to_string())
    })?;

    // Validate the token
    let claims = auth::validate_token(
        &state.config.jwt_secret,
        token,
        state.config.jwt_clock_skew_seconds,
    )?;

    // Store claims in request extensions for downstream handlers
    req.extensions_mut().insert(claims);

    // Continue to next handler
    Ok(next.run(req).await)
}

/// Extension trait for extracting claims from a request.
#[allow(dead_code)] // API for handlers that need claims outside an Extension extractor
pub trait ClaimsExt {
    /// Get the authenticated claims from request extensions.
    ///
    /// Returns `None` if the auth middleware was not applied to this request.
    fn claims(&self) -> Option<&Claims>;
}

#[allow(dead_code)]
impl<B> ClaimsExt for axum::extract::Request<B> {
    fn claims(&self) -> Option<&Claims> {
        self.extensions().get::<Claims>()
    }
}
