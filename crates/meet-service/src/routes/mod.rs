//! HTTP routes for the meet service.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use crate::middleware::auth::require_auth;
use crate::services::livekit::RoomClient;
use crate::services::storage::FileStore;
use crate::services::submission_service::MAX_FILE_SIZE_BYTES;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Request body cap: the submission limit plus multipart framing overhead.
const UPLOAD_BODY_LIMIT_BYTES: usize = MAX_FILE_SIZE_BYTES + 1024 * 1024;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: PgPool,

    /// Service configuration.
    pub config: Config,

    /// LiveKit RoomService client.
    pub rooms: RoomClient,

    /// Object storage for submission payloads.
    pub storage: Arc<dyn FileStore>,
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - Public routes: health check, register, login
/// - Protected routes (Bearer token): meetings and submissions
/// - TraceLayer for request logging
/// - 30 second request timeout
/// - CORS for the configured frontend origin
pub fn build_routes(state: Arc<AppState>) -> Router {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/v1/health", get(handlers::health_check))
        .route("/v1/auth/register", post(handlers::register))
        .route("/v1/auth/login", post(handlers::login));

    // Protected routes (Bearer token required)
    let protected_routes = Router::new()
        .route("/v1/meetings", post(handlers::create_meeting))
        .route("/v1/meetings/created", get(handlers::get_created_meetings))
        .route("/v1/meetings/join", put(handlers::join_meeting))
        .route("/v1/meetings/leave", put(handlers::leave_meeting))
        .route("/v1/meetings/:code", get(handlers::get_meeting))
        .route(
            "/v1/submissions/:meeting_id",
            post(handlers::create_submission),
        )
        .route(
            "/v1/submissions/meeting/:meeting_id",
            get(handlers::get_submissions_by_meeting),
        )
        .route("/v1/submissions/user", get(handlers::get_my_submissions))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let router = public_routes
        .merge(protected_routes)
        // Uploads are the largest accepted bodies
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT_BYTES))
        .with_state(state.clone());

    let router = match cors_layer(&state.config) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer - Timeout the request (innermost)
    // 2. TraceLayer - Log request details
    router
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
}

/// CORS layer for the configured frontend origin, when one is set.
fn cors_layer(config: &Config) -> Option<CorsLayer> {
    let origin = config.frontend_url.as_deref()?;

    let origin: HeaderValue = match origin.parse() {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(
                target: "meet.routes",
                error = %e,
                "FRONTEND_URL is not a valid origin; CORS layer disabled"
            );
            return None;
        }
    };

    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .allow_credentials(true),
    )
}
