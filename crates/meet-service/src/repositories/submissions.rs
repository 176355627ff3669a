//! Submission repository module.

use crate::errors::ApiError;
use crate::models::SubmissionRow;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Submission row joined with the submitter's identity.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SubmissionWithUserRow {
    pub submission_id: Uuid,
    pub user_id: Uuid,
    pub meeting_id: Uuid,
    pub file_url: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub username: String,
    pub email: String,
}

/// Submission row joined with its meeting's identity.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SubmissionWithMeetingRow {
    pub submission_id: Uuid,
    pub user_id: Uuid,
    pub meeting_id: Uuid,
    pub file_url: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub code: String,
}

/// Insert a submission record.
pub async fn insert(
    pool: &PgPool,
    user_id: Uuid,
    meeting_id: Uuid,
    file_url: &str,
    file_name: &str,
    file_type: &str,
    file_size: i64,
) -> Result<SubmissionRow, ApiError> {
    let row = sqlx::query_as::<_, SubmissionRow>(
        r#"
        INSERT INTO submissions (user_id, meeting_id, file_url, file_name, file_type, file_size)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING
            submission_id, user_id, meeting_id, file_url, file_name,
            file_type, file_size, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(meeting_id)
    .bind(file_url)
    .bind(file_name)
    .bind(file_type)
    .bind(file_size)
    .fetch_one(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to create submission: {}", e)))?;

    Ok(row)
}

/// List a meeting's submissions with submitter identities, newest first.
pub async fn list_by_meeting(
    pool: &PgPool,
    meeting_id: Uuid,
) -> Result<Vec<SubmissionWithUserRow>, ApiError> {
    let rows = sqlx::query_as::<_, SubmissionWithUserRow>(
        r#"
        SELECT
            s.submission_id, s.user_id, s.meeting_id, s.file_url, s.file_name,
            s.file_type, s.file_size, s.created_at, s.updated_at,
            u.username, u.email
        FROM submissions s
        JOIN users u ON u.user_id = s.user_id
        WHERE s.meeting_id = $1
        ORDER BY s.created_at DESC
        "#,
    )
    .bind(meeting_id)
    .fetch_all(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to list submissions: {}", e)))?;

    Ok(rows)
}

/// List a user's submissions with meeting identities, newest first.
pub async fn list_by_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<SubmissionWithMeetingRow>, ApiError> {
    let rows = sqlx::query_as::<_, SubmissionWithMeetingRow>(
        r#"
        SELECT
            s.submission_id, s.user_id, s.meeting_id, s.file_url, s.file_name,
            s.file_type, s.file_size, s.created_at, s.updated_at,
            m.title, m.code
        FROM submissions s
        JOIN meetings m ON m.meeting_id = s.meeting_id
        WHERE s.user_id = $1
        ORDER BY s.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to list submissions: {}", e)))?;

    Ok(rows)
}
