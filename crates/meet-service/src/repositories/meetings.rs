//! Meeting repository module for database operations.

use crate::errors::ApiError;
use crate::models::MeetingRow;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// SQL fragment selecting all meeting columns.
const MEETING_SELECT_QUERY: &str = r#"
    SELECT
        meeting_id,
        title,
        description,
        code,
        created_by_user_id,
        status,
        scheduled_start_time,
        actual_start_time,
        actual_end_time,
        duration_secs,
        max_participants,
        room_name,
        room_url,
        created_at,
        updated_at
    FROM meetings
"#;

/// Outcome of a meeting insert attempt.
///
/// The caller retries with a fresh code on `CodeCollision`; the unique
/// constraint on `meetings.code` is what detects the race.
#[derive(Debug)]
pub enum InsertOutcome {
    Created(MeetingRow),
    CodeCollision,
}

/// Fields for a new meeting row.
#[derive(Debug, Clone)]
pub struct NewMeeting<'a> {
    pub meeting_id: Uuid,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub code: &'a str,
    pub created_by_user_id: Uuid,
    pub scheduled_start_time: Option<DateTime<Utc>>,
    pub max_participants: i32,
    pub room_name: &'a str,
    pub room_url: &'a str,
}

/// Insert a meeting, reporting a code collision instead of failing.
pub async fn insert_meeting(
    pool: &PgPool,
    meeting: &NewMeeting<'_>,
) -> Result<InsertOutcome, ApiError> {
    let result = sqlx::query_as::<_, MeetingRow>(
        r#"
        INSERT INTO meetings (
            meeting_id, title, description, code, created_by_user_id,
            scheduled_start_time, max_participants, room_name, room_url
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING
            meeting_id, title, description, code, created_by_user_id,
            status, scheduled_start_time, actual_start_time, actual_end_time,
            duration_secs, max_participants, room_name, room_url,
            created_at, updated_at
        "#,
    )
    .bind(meeting.meeting_id)
    .bind(meeting.title)
    .bind(meeting.description)
    .bind(meeting.code)
    .bind(meeting.created_by_user_id)
    .bind(meeting.scheduled_start_time)
    .bind(meeting.max_participants)
    .bind(meeting.room_name)
    .bind(meeting.room_url)
    .fetch_one(pool)
    .await;

    match result {
        Ok(row) => Ok(InsertOutcome::Created(row)),
        Err(e) if crate::errors::is_unique_violation(&e, "meetings_code_unique") => {
            Ok(InsertOutcome::CodeCollision)
        }
        Err(e) => Err(ApiError::Database(format!(
            "Failed to create meeting: {}",
            e
        ))),
    }
}

/// Find a meeting by its join code.
pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<MeetingRow>, ApiError> {
    let query = format!("{} WHERE code = $1", MEETING_SELECT_QUERY);

    let row = sqlx::query_as::<_, MeetingRow>(&query)
        .bind(code)
        .fetch_optional(pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to fetch meeting by code: {}", e)))?;

    Ok(row)
}

/// Find a meeting by its id.
pub async fn find_by_id(pool: &PgPool, meeting_id: Uuid) -> Result<Option<MeetingRow>, ApiError> {
    let query = format!("{} WHERE meeting_id = $1", MEETING_SELECT_QUERY);

    let row = sqlx::query_as::<_, MeetingRow>(&query)
        .bind(meeting_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to fetch meeting by id: {}", e)))?;

    Ok(row)
}

/// List meetings created by a user, newest first.
pub async fn list_by_creator(pool: &PgPool, user_id: Uuid) -> Result<Vec<MeetingRow>, ApiError> {
    let query = format!(
        "{} WHERE created_by_user_id = $1 ORDER BY created_at DESC",
        MEETING_SELECT_QUERY
    );

    let rows = sqlx::query_as::<_, MeetingRow>(&query)
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to list meetings: {}", e)))?;

    Ok(rows)
}

/// Mark a meeting active, stamping the start time on first activation.
///
/// Idempotent: subsequent joins (including rejoins after the room emptied)
/// keep the original start time, and a previously ended meeting loses its
/// end stamp when it comes back to life.
pub async fn mark_active(pool: &PgPool, meeting_id: Uuid) -> Result<(), ApiError> {
    sqlx::query(
        r#"
        UPDATE meetings
        SET
            status = 'active',
            actual_start_time = COALESCE(actual_start_time, NOW()),
            actual_end_time = NULL,
            updated_at = NOW()
        WHERE meeting_id = $1 AND status <> 'active'
        "#,
    )
    .bind(meeting_id)
    .execute(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to mark meeting active: {}", e)))?;

    Ok(())
}

/// Close out a meeting whose room just emptied: stamp the end time, set the
/// status, and recompute the wall-clock duration from the start time.
pub async fn mark_ended(pool: &PgPool, meeting_id: Uuid) -> Result<(), ApiError> {
    sqlx::query(
        r#"
        UPDATE meetings
        SET
            status = 'ended',
            actual_end_time = NOW(),
            duration_secs = FLOOR(EXTRACT(EPOCH FROM (NOW() - actual_start_time)))::BIGINT,
            updated_at = NOW()
        WHERE meeting_id = $1 AND actual_start_time IS NOT NULL
        "#,
    )
    .bind(meeting_id)
    .execute(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to mark meeting ended: {}", e)))?;

    Ok(())
}
