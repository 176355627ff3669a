//! Meeting participant repository module.
//!
//! The unique constraint on (user_id, meeting_id) guarantees at most one
//! row per user per meeting; joins upsert against it and leaves close the
//! open interval on the same row.

use crate::errors::ApiError;
use crate::models::{ParticipantRow, ParticipantWithUserRow};
use sqlx::PgPool;
use uuid::Uuid;

const PARTICIPANT_COLUMNS: &str = r#"
    participant_id, user_id, meeting_id, join_time, leave_time,
    is_active, duration_secs
"#;

/// Open a presence interval: insert the participant row, or reactivate the
/// existing one for a rejoin.
pub async fn upsert_join(
    pool: &PgPool,
    user_id: Uuid,
    meeting_id: Uuid,
) -> Result<ParticipantRow, ApiError> {
    let row = sqlx::query_as::<_, ParticipantRow>(&format!(
        r#"
        INSERT INTO meeting_participants (user_id, meeting_id, join_time, is_active)
        VALUES ($1, $2, NOW(), TRUE)
        ON CONFLICT (user_id, meeting_id) DO UPDATE
        SET join_time = NOW(), is_active = TRUE, leave_time = NULL
        RETURNING {}
        "#,
        PARTICIPANT_COLUMNS
    ))
    .bind(user_id)
    .bind(meeting_id)
    .fetch_one(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to upsert participant: {}", e)))?;

    Ok(row)
}

/// Find the participant row for a user in a meeting.
pub async fn find(
    pool: &PgPool,
    user_id: Uuid,
    meeting_id: Uuid,
) -> Result<Option<ParticipantRow>, ApiError> {
    let row = sqlx::query_as::<_, ParticipantRow>(&format!(
        r#"
        SELECT {}
        FROM meeting_participants
        WHERE user_id = $1 AND meeting_id = $2
        "#,
        PARTICIPANT_COLUMNS
    ))
    .bind(user_id)
    .bind(meeting_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to fetch participant: {}", e)))?;

    Ok(row)
}

/// Close the open presence interval for a participant.
///
/// Accumulates the elapsed time into `duration_secs` and clears the active
/// flag. The elapsed time is computed in SQL so the same clock produces
/// `join_time` and `leave_time`. Returns `None` when the row was not active,
/// which the service reports as a conflict.
pub async fn close_interval(
    pool: &PgPool,
    participant_id: Uuid,
) -> Result<Option<ParticipantRow>, ApiError> {
    let row = sqlx::query_as::<_, ParticipantRow>(&format!(
        r#"
        UPDATE meeting_participants
        SET
            duration_secs = duration_secs
                + GREATEST(0, FLOOR(EXTRACT(EPOCH FROM (NOW() - join_time))))::BIGINT,
            is_active = FALSE,
            leave_time = NOW()
        WHERE participant_id = $1 AND is_active
        RETURNING {}
        "#,
        PARTICIPANT_COLUMNS
    ))
    .bind(participant_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to close participant interval: {}", e)))?;

    Ok(row)
}

/// Count currently active participants in a meeting.
pub async fn count_active(pool: &PgPool, meeting_id: Uuid) -> Result<i64, ApiError> {
    let count: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)
        FROM meeting_participants
        WHERE meeting_id = $1 AND is_active
        "#,
    )
    .bind(meeting_id)
    .fetch_one(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to count active participants: {}", e)))?;

    Ok(count.0)
}

/// Fetch the roster for a meeting: every participant row joined with the
/// user's public identity, in join order.
pub async fn roster(
    pool: &PgPool,
    meeting_id: Uuid,
) -> Result<Vec<ParticipantWithUserRow>, ApiError> {
    let rows = sqlx::query_as::<_, ParticipantWithUserRow>(
        r#"
        SELECT
            p.participant_id, p.user_id, u.username, u.email,
            p.join_time, p.leave_time, p.is_active, p.duration_secs
        FROM meeting_participants p
        JOIN users u ON u.user_id = p.user_id
        WHERE p.meeting_id = $1
        ORDER BY p.join_time
        "#,
    )
    .bind(meeting_id)
    .fetch_all(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to fetch roster: {}", e)))?;

    Ok(rows)
}
