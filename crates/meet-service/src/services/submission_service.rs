//! File submissions: validation, storage, and listings.

use crate::errors::ApiError;
use crate::models::{MeetingSummary, SubmissionResponse, SubmitterInfo};
use crate::repositories::{meetings, submissions, users};
use crate::services::storage::FileStore;
use bytes::Bytes;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

/// Upload cap: 10 MiB.
pub const MAX_FILE_SIZE_BYTES: usize = 10 * 1024 * 1024;

/// Accepted MIME types: PDF, JPEG, DOCX.
pub const ALLOWED_FILE_TYPES: &[&str] = &[
    "application/pdf",
    "image/jpeg",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// An uploaded file, as assembled from the multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Create a submission for a meeting.
///
/// Validates the file (type allow-list, 10 MiB cap), verifies the meeting
/// exists, stores the payload, and records the row.
pub async fn create_submission(
    pool: &PgPool,
    store: &dyn FileStore,
    user_id: Uuid,
    meeting_id: Uuid,
    file: UploadedFile,
) -> Result<SubmissionResponse, ApiError> {
    if !ALLOWED_FILE_TYPES.contains(&file.content_type.as_str()) {
        return Err(ApiError::BadRequest(
            "Only PDF, JPG, and DOCX files are allowed".to_string(),
        ));
    }

    if file.data.is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
    }

    if file.data.len() > MAX_FILE_SIZE_BYTES {
        return Err(ApiError::BadRequest(
            "File exceeds the 10MB size limit".to_string(),
        ));
    }

    // Submissions must reference an existing meeting
    meetings::find_by_id(pool, meeting_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Meeting not found".to_string()))?;

    let user = users::get_by_id(pool, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let file_size = file.data.len() as i64;
    let key = format!(
        "submissions/{}/{}",
        Uuid::new_v4(),
        sanitize_file_name(&file.file_name)
    );

    let file_url = store.put(&key, &file.content_type, file.data).await?;

    let row = submissions::insert(
        pool,
        user_id,
        meeting_id,
        &file_url,
        &file.file_name,
        &file.content_type,
        file_size,
    )
    .await?;

    info!(
        target: "meet.submissions",
        submission_id = %row.submission_id,
        meeting_id = %meeting_id,
        user_id = %user_id,
        file_size,
        "Submission created"
    );

    Ok(SubmissionResponse {
        submission_id: row.submission_id,
        meeting_id: row.meeting_id,
        user_id: row.user_id,
        file_url: row.file_url,
        file_name: row.file_name,
        file_type: row.file_type,
        file_size: row.file_size,
        created_at: row.created_at,
        updated_at: row.updated_at,
        user: Some(SubmitterInfo {
            user_id: user.user_id,
            username: user.username,
            email: user.email,
        }),
        meeting: None,
    })
}

/// List a meeting's submissions with submitter identities, newest first.
pub async fn list_by_meeting(
    pool: &PgPool,
    meeting_id: Uuid,
) -> Result<Vec<SubmissionResponse>, ApiError> {
    meetings::find_by_id(pool, meeting_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Meeting not found".to_string()))?;

    let rows = submissions::list_by_meeting(pool, meeting_id).await?;

    Ok(rows
        .into_iter()
        .map(|row| SubmissionResponse {
            submission_id: row.submission_id,
            meeting_id: row.meeting_id,
            user_id: row.user_id,
            file_url: row.file_url,
            file_name: row.file_name,
            file_type: row.file_type,
            file_size: row.file_size,
            created_at: row.created_at,
            updated_at: row.updated_at,
            user: Some(SubmitterInfo {
                user_id: row.user_id,
                username: row.username,
                email: row.email,
            }),
            meeting: None,
        })
        .collect())
}

/// List the caller's submissions with meeting identities, newest first.
pub async fn list_by_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<SubmissionResponse>, ApiError> {
    let rows = submissions::list_by_user(pool, user_id).await?;

    Ok(rows
        .into_iter()
        .map(|row| SubmissionResponse {
            submission_id: row.submission_id,
            meeting_id: row.meeting_id,
            user_id: row.user_id,
            file_url: row.file_url,
            file_name: row.file_name,
            file_type: row.file_type,
            file_size: row.file_size,
            created_at: row.created_at,
            updated_at: row.updated_at,
            user: None,
            meeting: Some(MeetingSummary {
                meeting_id: row.meeting_id,
                title: row.title,
                code: row.code,
            }),
        })
        .collect())
}

/// Strip path components from a client-supplied file name.
fn sanitize_file_name(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
        .trim();

    if base.is_empty() {
        "upload".to_string()
    } else {
        base.to_string()
    }
}
