//! Meeting handlers.
//!
//! All endpoints are authenticated:
//!
//! - `POST /v1/meetings` - Create a meeting
//! - `GET /v1/meetings/created` - List meetings the caller created
//! - `GET /v1/meetings/{code}` - Fetch a meeting with its roster
//! - `PUT /v1/meetings/join` - Join by code (returns a LiveKit token)
//! - `PUT /v1/meetings/leave` - Leave by code

use crate::auth::Claims;
use crate::errors::ApiError;
use crate::models::{
    CreateMeetingRequest, JoinMeetingResponse, MeetingCodeRequest, MeetingDetailResponse,
    MeetingResponse,
};
use crate::routes::AppState;
use crate::services::meeting_service;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::instrument;

/// Handler for POST /v1/meetings
///
/// # Response
///
/// - 201 Created: The meeting, including its join code
/// - 400 Bad Request: Invalid title or capacity
#[instrument(skip(state, claims, payload))]
pub async fn create_meeting(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateMeetingRequest>,
) -> Result<(StatusCode, Json<MeetingResponse>), ApiError> {
    let user_id = claims.user_id()?;

    let meeting =
        meeting_service::create_meeting(&state.pool, &state.rooms, &state.config, user_id, payload)
            .await?;

    Ok((StatusCode::CREATED, Json(meeting)))
}

/// Handler for GET /v1/meetings/created
#[instrument(skip(state, claims))]
pub async fn get_created_meetings(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<MeetingDetailResponse>>, ApiError> {
    let user_id = claims.user_id()?;

    let meetings = meeting_service::list_created(&state.pool, user_id).await?;

    Ok(Json(meetings))
}

/// Handler for GET /v1/meetings/{code}
///
/// # Response
///
/// - 200 OK: Meeting with roster
/// - 404 Not Found: Unknown code
#[instrument(skip(state), fields(meeting_code = %code))]
pub async fn get_meeting(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<MeetingDetailResponse>, ApiError> {
    let meeting = meeting_service::get_by_code(&state.pool, &code).await?;

    Ok(Json(meeting))
}

/// Handler for PUT /v1/meetings/join
///
/// # Response
///
/// - 200 OK: LiveKit token, signalling URL, participant row, meeting
/// - 404 Not Found: Unknown code
/// - 409 Conflict: Meeting is full
#[instrument(skip(state, claims, payload))]
pub async fn join_meeting(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<MeetingCodeRequest>,
) -> Result<Json<JoinMeetingResponse>, ApiError> {
    let user_id = claims.user_id()?;

    let response =
        meeting_service::join_meeting(&state.pool, &state.config, user_id, &payload.code).await?;

    Ok(Json(response))
}

/// Handler for PUT /v1/meetings/leave
///
/// # Response
///
/// - 204 No Content: Interval closed
/// - 404 Not Found: Unknown code, or the caller never joined
/// - 409 Conflict: The caller is not currently active
#[instrument(skip(state, claims, payload))]
pub async fn leave_meeting(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<MeetingCodeRequest>,
) -> Result<StatusCode, ApiError> {
    let user_id = claims.user_id()?;

    meeting_service::leave_meeting(&state.pool, &state.rooms, user_id, &payload.code).await?;

    Ok(StatusCode::NO_CONTENT)
}
