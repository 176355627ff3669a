//! Meet service models.
//!
//! Contains data types used across the service: database rows, request
//! bodies, and response payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum meeting title length.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Default meeting capacity.
pub const DEFAULT_MAX_PARTICIPANTS: i32 = 50;

/// Largest accepted meeting capacity.
pub const MAX_MAX_PARTICIPANTS: i32 = 500;

/// Meeting status enumeration.
///
/// Represents the lifecycle state of a meeting. `Ended` is bookkeeping, not
/// a tombstone: a meeting whose last participant left flips back to `Active`
/// when someone rejoins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    /// Meeting is created but nobody has joined yet.
    Scheduled,

    /// Meeting has at least one active participant.
    Active,

    /// Every participant has left.
    Ended,
}

impl MeetingStatus {
    /// Returns the string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingStatus::Scheduled => "scheduled",
            MeetingStatus::Active => "active",
            MeetingStatus::Ended => "ended",
        }
    }
}

/// Health check response.
///
/// Returned by the `/v1/health` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service health status ("healthy" or "unhealthy").
    pub status: String,

    /// Database connectivity status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

// ============================================================================
// Database Rows
// ============================================================================

/// Meeting database row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MeetingRow {
    /// Unique meeting identifier (also the LiveKit room name).
    pub meeting_id: Uuid,

    /// Meeting title.
    pub title: String,

    /// Optional meeting description.
    pub description: Option<String>,

    /// Short unique code for joining.
    pub code: String,

    /// User who created the meeting.
    pub created_by_user_id: Uuid,

    /// Current meeting status.
    pub status: String,

    /// Scheduled start time, when the creator provided one.
    pub scheduled_start_time: Option<DateTime<Utc>>,

    /// Stamped when the first participant joins.
    pub actual_start_time: Option<DateTime<Utc>>,

    /// Stamped when the last active participant leaves.
    pub actual_end_time: Option<DateTime<Utc>>,

    /// Meeting duration in seconds, recomputed each time the room empties.
    pub duration_secs: i64,

    /// Maximum number of simultaneously active participants.
    pub max_participants: i32,

    /// LiveKit room name.
    pub room_name: String,

    /// LiveKit signalling URL handed to clients.
    pub room_url: String,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Meeting participant database row.
///
/// One row per (user, meeting); rejoining reactivates the existing row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ParticipantRow {
    pub participant_id: Uuid,
    pub user_id: Uuid,
    pub meeting_id: Uuid,
    pub join_time: DateTime<Utc>,
    pub leave_time: Option<DateTime<Utc>>,
    pub is_active: bool,
    /// Accumulated presence in seconds across all intervals.
    pub duration_secs: i64,
}

/// Participant row joined with the user's public identity, for rosters.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ParticipantWithUserRow {
    pub participant_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub join_time: DateTime<Utc>,
    pub leave_time: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub duration_secs: i64,
}

/// Submission database row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SubmissionRow {
    pub submission_id: Uuid,
    pub user_id: Uuid,
    pub meeting_id: Uuid,
    pub file_url: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Auth API Models
// ============================================================================

/// Request body for `POST /v1/auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: common::secret::SecretString,
}

/// Request body for `POST /v1/auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: common::secret::SecretString,
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Response for register and login: user info plus an auto-login token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
}

// ============================================================================
// Meeting API Models
// ============================================================================

/// Request body for `POST /v1/meetings`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMeetingRequest {
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub scheduled_start_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub max_participants: Option<i32>,
}

impl CreateMeetingRequest {
    /// Validate the request body.
    ///
    /// # Errors
    ///
    /// Returns a human-readable description of the first violated rule.
    pub fn validate(&self) -> Result<(), String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Title cannot be empty".to_string());
        }
        if title.len() > MAX_TITLE_LENGTH {
            return Err(format!(
                "Title must not exceed {} characters",
                MAX_TITLE_LENGTH
            ));
        }
        if let Some(max) = self.max_participants {
            if !(2..=MAX_MAX_PARTICIPANTS).contains(&max) {
                return Err(format!(
                    "max_participants must be between 2 and {}",
                    MAX_MAX_PARTICIPANTS
                ));
            }
        }
        Ok(())
    }
}

/// Request body for `PUT /v1/meetings/join` and `PUT /v1/meetings/leave`.
#[derive(Debug, Clone, Deserialize)]
pub struct MeetingCodeRequest {
    pub code: String,
}

/// Serialized meeting, as returned by every meeting endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingResponse {
    pub meeting_id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub code: String,
    pub created_by_user_id: Uuid,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_end_time: Option<DateTime<Utc>>,
    pub duration_secs: i64,
    pub max_participants: i32,
    pub room_name: String,
    pub room_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MeetingRow> for MeetingResponse {
    fn from(row: MeetingRow) -> Self {
        Self {
            meeting_id: row.meeting_id,
            title: row.title,
            description: row.description,
            code: row.code,
            created_by_user_id: row.created_by_user_id,
            status: row.status,
            scheduled_start_time: row.scheduled_start_time,
            actual_start_time: row.actual_start_time,
            actual_end_time: row.actual_end_time,
            duration_secs: row.duration_secs,
            max_participants: row.max_participants,
            room_name: row.room_name,
            room_url: row.room_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Roster entry: a participant with public user identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantInfo {
    pub participant_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub join_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leave_time: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub duration_secs: i64,
}

impl From<ParticipantWithUserRow> for ParticipantInfo {
    fn from(row: ParticipantWithUserRow) -> Self {
        Self {
            participant_id: row.participant_id,
            user_id: row.user_id,
            username: row.username,
            email: row.email,
            join_time: row.join_time,
            leave_time: row.leave_time,
            is_active: row.is_active,
            duration_secs: row.duration_secs,
        }
    }
}

/// Meeting with its participant roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingDetailResponse {
    #[serde(flatten)]
    pub meeting: MeetingResponse,
    pub participants: Vec<ParticipantInfo>,
}

/// Serialized participant row (the caller's own interval bookkeeping).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantResponse {
    pub participant_id: Uuid,
    pub user_id: Uuid,
    pub meeting_id: Uuid,
    pub join_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leave_time: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub duration_secs: i64,
}

impl From<ParticipantRow> for ParticipantResponse {
    fn from(row: ParticipantRow) -> Self {
        Self {
            participant_id: row.participant_id,
            user_id: row.user_id,
            meeting_id: row.meeting_id,
            join_time: row.join_time,
            leave_time: row.leave_time,
            is_active: row.is_active,
            duration_secs: row.duration_secs,
        }
    }
}

/// Response for `PUT /v1/meetings/join`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinMeetingResponse {
    /// LiveKit access token for connecting to the room.
    pub token: String,

    /// LiveKit signalling URL.
    pub ws_url: String,

    /// LiveKit room name.
    pub room_name: String,

    /// The caller's participant row.
    pub participant: ParticipantResponse,

    /// The meeting with its roster.
    pub meeting: MeetingDetailResponse,
}

// ============================================================================
// Submission API Models
// ============================================================================

/// Minimal submitter identity embedded in submission listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitterInfo {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
}

/// Minimal meeting identity embedded in a user's submission listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingSummary {
    pub meeting_id: Uuid,
    pub title: String,
    pub code: String,
}

/// Serialized submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub submission_id: Uuid,
    pub meeting_id: Uuid,
    pub user_id: Uuid,
    pub file_url: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SubmitterInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting: Option<MeetingSummary>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_meeting_status_as_str() {
        assert_eq!(MeetingStatus::Scheduled.as_str(), "scheduled");
        assert_eq!(MeetingStatus::Active.as_str(), "active");
        assert_eq!(MeetingStatus::Ended.as_str(), "ended");
    }

    #[test]
    fn test_meeting_status_serialization() {
        let json = serde_json::to_string(&MeetingStatus::Active).unwrap();
        assert_eq!(json, "\"active\"");
    }

    #[test]
    fn test_create_meeting_request_valid() {
        let request = CreateMeetingRequest {
            title: "Weekly sync".to_string(),
            description: None,
            scheduled_start_time: None,
            max_participants: Some(10),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_meeting_request_empty_title() {
        let request = CreateMeetingRequest {
            title: "   ".to_string(),
            description: None,
            scheduled_start_time: None,
            max_participants: None,
        };
        let err = request.validate().unwrap_err();
        assert!(err.contains("Title"));
    }

    #[test]
    fn test_create_meeting_request_title_too_long() {
        let request = CreateMeetingRequest {
            title: "x".repeat(MAX_TITLE_LENGTH + 1),
            description: None,
            scheduled_start_time: None,
            max_participants: None,
        };
        let err = request.validate().unwrap_err();
        assert!(err.contains("exceed"));
    }

    #[test]
    fn test_create_meeting_request_capacity_bounds() {
        for max in [0, 1, MAX_MAX_PARTICIPANTS + 1] {
            let request = CreateMeetingRequest {
                title: "Capacity check".to_string(),
                description: None,
                scheduled_start_time: None,
                max_participants: Some(max),
            };
            assert!(
                request.validate().is_err(),
                "capacity {} should be rejected",
                max
            );
        }
    }

    #[test]
    fn test_register_request_debug_redacts_password() {
        let json = r#"{"username":"alice","email":"alice@example.com","password":"hunter22"}"#;
        let request: RegisterRequest = serde_json::from_str(json).unwrap();

        let debug = format!("{:?}", request);
        assert!(debug.contains("alice@example.com"));
        assert!(!debug.contains("hunter22"));
    }

    #[test]
    fn test_meeting_detail_response_flattens_meeting() {
        let now = Utc::now();
        let detail = MeetingDetailResponse {
            meeting: MeetingResponse {
                meeting_id: Uuid::nil(),
                title: "Flatten check".to_string(),
                description: None,
                code: "abc123def".to_string(),
                created_by_user_id: Uuid::nil(),
                status: "scheduled".to_string(),
                scheduled_start_time: None,
                actual_start_time: None,
                actual_end_time: None,
                duration_secs: 0,
                max_participants: 50,
                room_name: "room".to_string(),
                room_url: "ws://localhost:7880".to_string(),
                created_at: now,
                updated_at: now,
            },
            participants: vec![],
        };

        let json = serde_json::to_value(&detail).unwrap();
        // Meeting fields are hoisted to the top level alongside the roster
        assert_eq!(json["code"], "abc123def");
        assert!(json["participants"].as_array().unwrap().is_empty());
    }
}
