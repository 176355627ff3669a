//! Submission handlers.
//!
//! All endpoints are authenticated:
//!
//! - `POST /v1/submissions/{meeting_id}` - Upload a file (multipart, field `file`)
//! - `GET /v1/submissions/meeting/{meeting_id}` - List a meeting's submissions
//! - `GET /v1/submissions/user` - List the caller's submissions

use crate::auth::Claims;
use crate::errors::ApiError;
use crate::models::SubmissionResponse;
use crate::routes::AppState;
use crate::services::submission_service::{self, UploadedFile};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Handler for POST /v1/submissions/{meeting_id}
///
/// Accepts a multipart form with a single `file` part (PDF, JPG, or DOCX,
/// max 10MB).
///
/// # Response
///
/// - 201 Created: Submission recorded
/// - 400 Bad Request: Missing part, disallowed type, or oversized file
/// - 404 Not Found: Unknown meeting
#[instrument(skip(state, claims, multipart), fields(meeting_id = %meeting_id))]
pub async fn create_submission(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(meeting_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<SubmissionResponse>), ApiError> {
    let user_id = claims.user_id()?;

    let file = read_file_part(multipart).await?;

    let submission = submission_service::create_submission(
        &state.pool,
        state.storage.as_ref(),
        user_id,
        meeting_id,
        file,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(submission)))
}

/// Handler for GET /v1/submissions/meeting/{meeting_id}
#[instrument(skip(state), fields(meeting_id = %meeting_id))]
pub async fn get_submissions_by_meeting(
    State(state): State<Arc<AppState>>,
    Path(meeting_id): Path<Uuid>,
) -> Result<Json<Vec<SubmissionResponse>>, ApiError> {
    let submissions = submission_service::list_by_meeting(&state.pool, meeting_id).await?;

    Ok(Json(submissions))
}

/// Handler for GET /v1/submissions/user
#[instrument(skip(state, claims))]
pub async fn get_my_submissions(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<SubmissionResponse>>, ApiError> {
    let user_id = claims.user_id()?;

    let submissions = submission_service::list_by_user(&state.pool, user_id).await?;

    Ok(Json(submissions))
}

/// Pull the `file` part out of the multipart body.
///
/// The router caps the request body just above the submission size limit, so
/// a too-large upload surfaces here as a read error rather than filling
/// memory; the exact limit is enforced again in the service.
async fn read_file_part(mut multipart: Multipart) -> Result<UploadedFile, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::debug!(target: "meet.submissions", error = %e, "Malformed multipart body");
        ApiError::BadRequest("Invalid multipart body".to_string())
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(ToString::to_string)
            .unwrap_or_else(|| "upload".to_string());

        let content_type = field
            .content_type()
            .map(ToString::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let data = field.bytes().await.map_err(|e| {
            tracing::debug!(target: "meet.submissions", error = %e, "Failed to read file part");
            ApiError::BadRequest("File exceeds the 10MB size limit".to_string())
        })?;

        return Ok(UploadedFile {
            file_name,
            content_type,
            data,
        });
    }

    Err(ApiError::BadRequest("No file uploaded".to_string()))
}
