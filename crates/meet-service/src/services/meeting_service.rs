//! Meeting lifecycle: creation, join/leave bookkeeping, rosters.

use crate::config::Config;
use crate::crypto;
use crate::errors::ApiError;
use crate::models::{
    CreateMeetingRequest, JoinMeetingResponse, MeetingDetailResponse, MeetingResponse,
    DEFAULT_MAX_PARTICIPANTS,
};
use crate::repositories::{meetings, participants, users};
use crate::services::livekit::{AccessToken, RoomClient, VideoGrant};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

/// Attempts before the code allocator gives up.
///
/// With 36 bits of code space a retry is already rare; hitting the bound
/// means the RNG is broken or the table holds billions of rows.
const MAX_CODE_ATTEMPTS: u32 = 8;

/// LiveKit rooms are torn down after 10 minutes without participants.
const ROOM_EMPTY_TIMEOUT_SECS: u32 = 600;

/// Create a meeting.
///
/// The join code is allocated by rejection sampling: generate a random code
/// and attempt the insert; the unique constraint on `meetings.code` detects
/// collisions (including concurrent ones) and the loop retries with a fresh
/// code.
///
/// The LiveKit room is provisioned best-effort. Join tokens carry the
/// room-create grant, so the room comes up on first join even when
/// provisioning failed here.
pub async fn create_meeting(
    pool: &PgPool,
    rooms: &RoomClient,
    config: &Config,
    user_id: Uuid,
    request: CreateMeetingRequest,
) -> Result<MeetingResponse, ApiError> {
    request.validate().map_err(ApiError::BadRequest)?;

    let max_participants = request.max_participants.unwrap_or(DEFAULT_MAX_PARTICIPANTS);
    let meeting_id = Uuid::new_v4();
    let room_name = meeting_id.to_string();

    let mut created = None;
    for attempt in 1..=MAX_CODE_ATTEMPTS {
        let code = crypto::generate_meeting_code()?;

        let outcome = meetings::insert_meeting(
            pool,
            &meetings::NewMeeting {
                meeting_id,
                title: request.title.trim(),
                description: request.description.as_deref(),
                code: &code,
                created_by_user_id: user_id,
                scheduled_start_time: request.scheduled_start_time,
                max_participants,
                room_name: &room_name,
                room_url: &config.livekit_ws_url,
            },
        )
        .await?;

        match outcome {
            meetings::InsertOutcome::Created(row) => {
                created = Some(row);
                break;
            }
            meetings::InsertOutcome::CodeCollision => {
                warn!(
                    target: "meet.meetings",
                    attempt,
                    "Meeting code collision, retrying with a fresh code"
                );
            }
        }
    }

    let meeting = created.ok_or_else(|| {
        tracing::error!(
            target: "meet.meetings",
            attempts = MAX_CODE_ATTEMPTS,
            "Meeting code allocation exhausted its attempts"
        );
        ApiError::Internal
    })?;

    // Best-effort room provisioning; the join grant covers the failure case.
    if let Err(e) = rooms
        .create_room(&room_name, max_participants as u32, ROOM_EMPTY_TIMEOUT_SECS)
        .await
    {
        warn!(
            target: "meet.meetings",
            meeting_id = %meeting.meeting_id,
            error = %e,
            "LiveKit room provisioning failed; room will be created on first join"
        );
    }

    info!(
        target: "meet.meetings",
        meeting_id = %meeting.meeting_id,
        user_id = %user_id,
        "Meeting created"
    );

    Ok(MeetingResponse::from(meeting))
}

/// Fetch a meeting with its roster by join code.
pub async fn get_by_code(pool: &PgPool, code: &str) -> Result<MeetingDetailResponse, ApiError> {
    let meeting = meetings::find_by_code(pool, code)
        .await?
        .ok_or_else(|| ApiError::NotFound("Meeting not found".to_string()))?;

    detail_response(pool, meeting).await
}

/// List meetings created by a user, newest first, each with its roster.
pub async fn list_created(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<MeetingDetailResponse>, ApiError> {
    let rows = meetings::list_by_creator(pool, user_id).await?;

    let mut result = Vec::with_capacity(rows.len());
    for row in rows {
        result.push(detail_response(pool, row).await?);
    }

    Ok(result)
}

/// Join a meeting by code.
///
/// Signs a LiveKit access token for the caller, opens (or reactivates) their
/// participant row, and activates the meeting if this is the first join.
pub async fn join_meeting(
    pool: &PgPool,
    config: &Config,
    user_id: Uuid,
    code: &str,
) -> Result<JoinMeetingResponse, ApiError> {
    let meeting = meetings::find_by_code(pool, code)
        .await?
        .ok_or_else(|| ApiError::NotFound("Meeting not found".to_string()))?;

    let user = users::get_by_id(pool, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    // Capacity counts active participants; a rejoining participant is not
    // active at this point and takes a free slot like anyone else.
    let active = participants::count_active(pool, meeting.meeting_id).await?;
    let already_active = participants::find(pool, user_id, meeting.meeting_id)
        .await?
        .map(|p| p.is_active)
        .unwrap_or(false);

    if !already_active && active >= i64::from(meeting.max_participants) {
        return Err(ApiError::Conflict("Meeting is full".to_string()));
    }

    let token = AccessToken::new(&config.livekit_api_key, &config.livekit_api_secret)
        .with_identity(&user_id.to_string())
        .with_name(&user.username)
        .with_grant(VideoGrant::participant(&meeting.room_name))
        .to_jwt()?;

    let participant = participants::upsert_join(pool, user_id, meeting.meeting_id).await?;

    meetings::mark_active(pool, meeting.meeting_id).await?;

    info!(
        target: "meet.meetings",
        meeting_id = %meeting.meeting_id,
        user_id = %user_id,
        "User joined meeting"
    );

    let room_name = meeting.room_name.clone();
    let meeting_id = meeting.meeting_id;

    // Refetch for the post-join status and start time
    let meeting = meetings::find_by_id(pool, meeting_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Meeting not found".to_string()))?;

    Ok(JoinMeetingResponse {
        token,
        ws_url: config.livekit_ws_url.clone(),
        room_name,
        participant: participant.into(),
        meeting: detail_response(pool, meeting).await?,
    })
}

/// Leave a meeting by code.
///
/// Closes the caller's presence interval, accumulating its length into the
/// participant's duration. When the room empties, the meeting's own duration
/// is recomputed, the meeting is marked ended, and the LiveKit room is torn
/// down best-effort.
pub async fn leave_meeting(
    pool: &PgPool,
    rooms: &RoomClient,
    user_id: Uuid,
    code: &str,
) -> Result<(), ApiError> {
    let meeting = meetings::find_by_code(pool, code)
        .await?
        .ok_or_else(|| ApiError::NotFound("Meeting not found".to_string()))?;

    let participant = participants::find(pool, user_id, meeting.meeting_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Participant not found".to_string()))?;

    let closed = participants::close_interval(pool, participant.participant_id).await?;
    if closed.is_none() {
        return Err(ApiError::Conflict(
            "Participant is not active in this meeting".to_string(),
        ));
    }

    let remaining = participants::count_active(pool, meeting.meeting_id).await?;
    if remaining == 0 {
        meetings::mark_ended(pool, meeting.meeting_id).await?;

        if let Err(e) = rooms.delete_room(&meeting.room_name).await {
            warn!(
                target: "meet.meetings",
                meeting_id = %meeting.meeting_id,
                error = %e,
                "LiveKit room teardown failed"
            );
        }

        info!(
            target: "meet.meetings",
            meeting_id = %meeting.meeting_id,
            "Meeting ended, room emptied"
        );
    }

    info!(
        target: "meet.meetings",
        meeting_id = %meeting.meeting_id,
        user_id = %user_id,
        "User left meeting"
    );

    Ok(())
}

async fn detail_response(
    pool: &PgPool,
    meeting: crate::models::MeetingRow,
) -> Result<MeetingDetailResponse, ApiError> {
    let roster = participants::roster(pool, meeting.meeting_id).await?;

    Ok(MeetingDetailResponse {
        meeting: MeetingResponse::from(meeting),
        participants: roster.into_iter().map(Into::into).collect(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::MeetingStatus;

    fn test_config() -> Config {
        let vars = std::collections::HashMap::from([
            (
                "DATABASE_URL".to_string(),
                "postgresql://test/test".to_string(),
            ),
            ("JWT_SECRET".to_string(), "meeting-service-test".to_string()),
            // Nothing listens here; room calls exercise the best-effort path
            ("LIVEKIT_URL".to_string(), "http://127.0.0.1:1".to_string()),
        ]);
        Config::from_vars(&vars).unwrap()
    }

    fn room_client(config: &Config) -> RoomClient {
        RoomClient::new(
            &config.livekit_url,
            &config.livekit_api_key,
            &config.livekit_api_secret,
        )
        .unwrap()
    }

    async fn seed_user(pool: &PgPool, email: &str, username: &str) -> Uuid {
        let user = users::create_user(pool, email, username, "$2b$10$not-a-real-hash")
            .await
            .unwrap();
        user.user_id
    }

    fn create_request(title: &str, max_participants: Option<i32>) -> CreateMeetingRequest {
        CreateMeetingRequest {
            title: title.to_string(),
            description: Some("test meeting".to_string()),
            scheduled_start_time: None,
            max_participants,
        }
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_create_meeting_allocates_unique_codes(pool: PgPool) -> Result<(), ApiError> {
        let config = test_config();
        let rooms = room_client(&config);
        let user_id = seed_user(&pool, "host@example.com", "host").await;

        let mut codes = std::collections::HashSet::new();
        for i in 0..10 {
            let meeting = create_meeting(
                &pool,
                &rooms,
                &config,
                user_id,
                create_request(&format!("Meeting {}", i), None),
            )
            .await?;

            assert_eq!(meeting.code.len(), crypto::MEETING_CODE_LENGTH);
            assert_eq!(meeting.status, MeetingStatus::Scheduled.as_str());
            assert_eq!(meeting.max_participants, DEFAULT_MAX_PARTICIPANTS);
            assert_eq!(meeting.room_name, meeting.meeting_id.to_string());
            assert!(codes.insert(meeting.code), "codes must be unique");
        }

        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_create_meeting_rejects_invalid_body(pool: PgPool) -> Result<(), ApiError> {
        let config = test_config();
        let rooms = room_client(&config);
        let user_id = seed_user(&pool, "host@example.com", "host").await;

        let result = create_meeting(
            &pool,
            &rooms,
            &config,
            user_id,
            create_request("   ", None),
        )
        .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));

        let result = create_meeting(
            &pool,
            &rooms,
            &config,
            user_id,
            create_request("Capacity", Some(1)),
        )
        .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));

        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_join_meeting_issues_token_and_activates(pool: PgPool) -> Result<(), ApiError> {
        let config = test_config();
        let rooms = room_client(&config);
        let host = seed_user(&pool, "host@example.com", "host").await;
        let guest = seed_user(&pool, "guest@example.com", "guest").await;

        let meeting =
            create_meeting(&pool, &rooms, &config, host, create_request("Standup", None)).await?;

        let joined = join_meeting(&pool, &config, guest, &meeting.code).await?;

        assert!(!joined.token.is_empty());
        assert_eq!(joined.ws_url, config.livekit_ws_url);
        assert_eq!(joined.room_name, meeting.room_name);
        assert!(joined.participant.is_active);
        assert_eq!(joined.participant.duration_secs, 0);

        // First join activates the meeting and stamps the start time
        assert_eq!(joined.meeting.meeting.status, MeetingStatus::Active.as_str());
        assert!(joined.meeting.meeting.actual_start_time.is_some());

        // Roster carries the joined user
        assert_eq!(joined.meeting.participants.len(), 1);
        let entry = joined.meeting.participants.first().unwrap();
        assert_eq!(entry.user_id, guest);
        assert_eq!(entry.username, "guest");

        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_join_unknown_code_not_found(pool: PgPool) -> Result<(), ApiError> {
        let config = test_config();
        let user_id = seed_user(&pool, "a@example.com", "a").await;

        let result = join_meeting(&pool, &config, user_id, "doesnotex").await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));

        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_rejoin_reuses_participant_row(pool: PgPool) -> Result<(), ApiError> {
        let config = test_config();
        let rooms = room_client(&config);
        let host = seed_user(&pool, "host@example.com", "host").await;

        let meeting =
            create_meeting(&pool, &rooms, &config, host, create_request("Loop", None)).await?;

        let first = join_meeting(&pool, &config, host, &meeting.code).await?;
        leave_meeting(&pool, &rooms, host, &meeting.code).await?;
        let second = join_meeting(&pool, &config, host, &meeting.code).await?;

        // Same row, reactivated: the (user, meeting) unique constraint holds
        assert_eq!(
            first.participant.participant_id,
            second.participant.participant_id
        );
        assert!(second.participant.is_active);
        assert!(second.participant.leave_time.is_none());

        // One roster entry despite two joins
        assert_eq!(second.meeting.participants.len(), 1);

        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_join_full_meeting_conflicts(pool: PgPool) -> Result<(), ApiError> {
        let config = test_config();
        let rooms = room_client(&config);
        let host = seed_user(&pool, "host@example.com", "host").await;

        let meeting = create_meeting(
            &pool,
            &rooms,
            &config,
            host,
            create_request("Tiny", Some(2)),
        )
        .await?;

        let u1 = seed_user(&pool, "u1@example.com", "u1").await;
        let u2 = seed_user(&pool, "u2@example.com", "u2").await;
        let u3 = seed_user(&pool, "u3@example.com", "u3").await;

        join_meeting(&pool, &config, u1, &meeting.code).await?;
        join_meeting(&pool, &config, u2, &meeting.code).await?;

        let result = join_meeting(&pool, &config, u3, &meeting.code).await;
        assert!(matches!(result, Err(ApiError::Conflict(msg)) if msg.contains("full")));

        // An already-active participant can still re-join (token refresh)
        let refreshed = join_meeting(&pool, &config, u1, &meeting.code).await;
        assert!(refreshed.is_ok());

        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_leave_closes_interval_and_ends_meeting(pool: PgPool) -> Result<(), ApiError> {
        let config = test_config();
        let rooms = room_client(&config);
        let host = seed_user(&pool, "host@example.com", "host").await;

        let meeting =
            create_meeting(&pool, &rooms, &config, host, create_request("Short", None)).await?;

        join_meeting(&pool, &config, host, &meeting.code).await?;
        leave_meeting(&pool, &rooms, host, &meeting.code).await?;

        let detail = get_by_code(&pool, &meeting.code).await?;
        assert_eq!(detail.meeting.status, MeetingStatus::Ended.as_str());
        assert!(detail.meeting.actual_end_time.is_some());

        let entry = detail.participants.first().unwrap();
        assert!(!entry.is_active);
        assert!(entry.leave_time.is_some());

        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_leave_without_join_not_found(pool: PgPool) -> Result<(), ApiError> {
        let config = test_config();
        let rooms = room_client(&config);
        let host = seed_user(&pool, "host@example.com", "host").await;
        let other = seed_user(&pool, "other@example.com", "other").await;

        let meeting =
            create_meeting(&pool, &rooms, &config, host, create_request("Solo", None)).await?;

        let result = leave_meeting(&pool, &rooms, other, &meeting.code).await;
        assert!(matches!(result, Err(ApiError::NotFound(msg)) if msg.contains("Participant")));

        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_double_leave_conflicts(pool: PgPool) -> Result<(), ApiError> {
        let config = test_config();
        let rooms = room_client(&config);
        let host = seed_user(&pool, "host@example.com", "host").await;

        let meeting =
            create_meeting(&pool, &rooms, &config, host, create_request("Once", None)).await?;

        join_meeting(&pool, &config, host, &meeting.code).await?;
        leave_meeting(&pool, &rooms, host, &meeting.code).await?;

        let result = leave_meeting(&pool, &rooms, host, &meeting.code).await;
        assert!(matches!(result, Err(ApiError::Conflict(_))));

        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_rejoin_after_meeting_ended_reactivates(pool: PgPool) -> Result<(), ApiError> {
        let config = test_config();
        let rooms = room_client(&config);
        let host = seed_user(&pool, "host@example.com", "host").await;

        let meeting =
            create_meeting(&pool, &rooms, &config, host, create_request("Zombie", None)).await?;

        join_meeting(&pool, &config, host, &meeting.code).await?;
        leave_meeting(&pool, &rooms, host, &meeting.code).await?;

        let rejoined = join_meeting(&pool, &config, host, &meeting.code).await?;

        // Ended is bookkeeping: rejoin flips the meeting back to active and
        // keeps the original start time
        assert_eq!(
            rejoined.meeting.meeting.status,
            MeetingStatus::Active.as_str()
        );
        assert!(rejoined.meeting.meeting.actual_end_time.is_none());
        assert!(rejoined.meeting.meeting.actual_start_time.is_some());

        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_list_created_newest_first(pool: PgPool) -> Result<(), ApiError> {
        let config = test_config();
        let rooms = room_client(&config);
        let host = seed_user(&pool, "host@example.com", "host").await;
        let other = seed_user(&pool, "other@example.com", "other").await;

        for i in 0..3 {
            create_meeting(
                &pool,
                &rooms,
                &config,
                host,
                create_request(&format!("Mine {}", i), None),
            )
            .await?;
        }
        create_meeting(
            &pool,
            &rooms,
            &config,
            other,
            create_request("Theirs", None),
        )
        .await?;

        let listed = list_created(&pool, host).await?;
        assert_eq!(listed.len(), 3);
        assert!(listed
            .iter()
            .all(|m| m.meeting.created_by_user_id == host));

        // Newest first
        for pair in listed.windows(2) {
            if let [a, b] = pair {
                assert!(a.meeting.created_at >= b.meeting.created_at);
            }
        }

        Ok(())
    }
}
