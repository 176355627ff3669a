//! LiveKit pass-through: access-token signing and the RoomService client.
//!
//! The service never touches media. It signs the JWT shape LiveKit expects
//! (HS256, API key as issuer, grants under a `video` claim) and forwards
//! room management calls to the RoomService Twirp endpoints.
//!
//! # Security
//!
//! - The API secret never leaves the process; every outbound call carries a
//!   short-lived admin token signed locally
//! - Timeouts prevent hanging connections
//! - Errors are logged server-side with generic messages returned

use crate::errors::ApiError;
use common::secret::{ExposeSecret, SecretString};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, instrument, warn};

/// Default access-token lifetime (6 hours, the LiveKit SDK default).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(6 * 3600);

/// Lifetime of the admin tokens signed for RoomService calls.
const ADMIN_TOKEN_TTL: Duration = Duration::from_secs(600);

/// Timeout for RoomService requests in seconds.
const ROOM_REQUEST_TIMEOUT_SECS: u64 = 10;

fn is_false(value: &bool) -> bool {
    !*value
}

/// Video grant carried in a LiveKit access token.
///
/// Field names follow LiveKit's wire format (camelCase).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoGrant {
    /// Room the grant is scoped to, when not a server-wide grant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,

    /// Permission to join the room.
    #[serde(default, skip_serializing_if = "is_false")]
    pub room_join: bool,

    /// Permission to create the room when it does not exist yet.
    #[serde(default, skip_serializing_if = "is_false")]
    pub room_create: bool,

    /// Administrative control over the scoped room.
    #[serde(default, skip_serializing_if = "is_false")]
    pub room_admin: bool,

    /// Permission to list rooms.
    #[serde(default, skip_serializing_if = "is_false")]
    pub room_list: bool,

    /// Permission to publish audio/video tracks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_publish: Option<bool>,

    /// Permission to subscribe to other participants' tracks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_subscribe: Option<bool>,

    /// Permission to publish data messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_publish_data: Option<bool>,
}

impl VideoGrant {
    /// Grant for a participant joining (and lazily creating) a room.
    pub fn participant(room: &str) -> Self {
        Self {
            room: Some(room.to_string()),
            room_join: true,
            room_create: true,
            can_publish: Some(true),
            can_subscribe: Some(true),
            can_publish_data: Some(true),
            ..Self::default()
        }
    }

    /// Server-wide grant for creating rooms.
    fn create_rooms() -> Self {
        Self {
            room_create: true,
            ..Self::default()
        }
    }

    /// Administrative grant scoped to one room.
    fn admin(room: &str) -> Self {
        Self {
            room: Some(room.to_string()),
            room_admin: true,
            ..Self::default()
        }
    }

    /// Server-wide grant for listing rooms.
    fn list_rooms() -> Self {
        Self {
            room_list: true,
            ..Self::default()
        }
    }
}

/// Claims of a LiveKit access token.
#[derive(Debug, Serialize, Deserialize)]
struct AccessTokenClaims {
    /// Issuer: the API key.
    iss: String,

    /// Subject: the participant identity.
    sub: String,

    /// Token id, mirrors the identity.
    jti: String,

    /// Not-before timestamp.
    nbf: i64,

    /// Expiration timestamp.
    exp: i64,

    /// Participant display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,

    /// The video grant.
    video: VideoGrant,
}

/// Builder for LiveKit access tokens.
///
/// ```rust,ignore
/// let token = AccessToken::new(&api_key, &api_secret)
///     .with_identity(&user_id.to_string())
///     .with_name(&username)
///     .with_grant(VideoGrant::participant(&room_name))
///     .to_jwt()?;
/// ```
pub struct AccessToken {
    api_key: String,
    api_secret: SecretString,
    identity: String,
    name: Option<String>,
    ttl: Duration,
    grant: VideoGrant,
}

impl AccessToken {
    pub fn new(api_key: &str, api_secret: &SecretString) -> Self {
        Self {
            api_key: api_key.to_string(),
            api_secret: api_secret.clone(),
            identity: String::new(),
            name: None,
            ttl: DEFAULT_TOKEN_TTL,
            grant: VideoGrant::default(),
        }
    }

    pub fn with_identity(mut self, identity: &str) -> Self {
        self.identity = identity.to_string();
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_grant(mut self, grant: VideoGrant) -> Self {
        self.grant = grant;
        self
    }

    /// Sign the token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Internal` when signing fails; the cause is logged.
    pub fn to_jwt(self) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp();
        let claims = AccessTokenClaims {
            iss: self.api_key,
            sub: self.identity.clone(),
            jti: self.identity,
            nbf: now,
            exp: now + self.ttl.as_secs() as i64,
            name: self.name,
            video: self.grant,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.api_secret.expose_secret().as_bytes()),
        )
        .map_err(|e| {
            error!(target: "meet.livekit", error = %e, "Access token signing failed");
            ApiError::Internal
        })
    }
}

// ============================================================================
// RoomService client
// ============================================================================

/// Room description returned by the RoomService.
///
/// Only the fields this service reads are modelled; the wire format carries
/// more.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Room {
    pub sid: String,
    pub name: String,
    pub empty_timeout: u32,
    pub max_participants: u32,
    pub num_participants: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateRoomRequest<'a> {
    name: &'a str,
    empty_timeout: u32,
    max_participants: u32,
}

#[derive(Debug, Serialize)]
struct DeleteRoomRequest<'a> {
    room: &'a str,
}

#[derive(Debug, Serialize)]
struct ListRoomsRequest {
    names: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListRoomsResponse {
    rooms: Vec<Room>,
}

/// HTTP client for the LiveKit RoomService (Twirp over HTTP/JSON).
#[derive(Clone)]
pub struct RoomClient {
    client: Client,
    base_url: String,
    api_key: String,
    api_secret: SecretString,
}

impl RoomClient {
    /// Create a new RoomService client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Internal` if the HTTP client cannot be built.
    pub fn new(base_url: &str, api_key: &str, api_secret: &SecretString) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(ROOM_REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| {
                error!(target: "meet.livekit", error = %e, "Failed to build HTTP client");
                ApiError::Internal
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.clone(),
        })
    }

    /// Create (or fetch, when it already exists) a room.
    ///
    /// # Errors
    ///
    /// - `ApiError::ServiceUnavailable` if LiveKit is unreachable or 5xx
    /// - `ApiError::Internal` if credentials are rejected
    #[instrument(skip(self), fields(room = %name))]
    pub async fn create_room(
        &self,
        name: &str,
        max_participants: u32,
        empty_timeout: u32,
    ) -> Result<Room, ApiError> {
        let request = CreateRoomRequest {
            name,
            empty_timeout,
            max_participants,
        };

        self.call("CreateRoom", &VideoGrant::create_rooms(), &request)
            .await
    }

    /// Delete a room, disconnecting any connected participants.
    #[instrument(skip(self), fields(room = %name))]
    pub async fn delete_room(&self, name: &str) -> Result<(), ApiError> {
        let request = DeleteRoomRequest { room: name };

        // Twirp DeleteRoom returns an empty message
        let _: serde_json::Value = self.call("DeleteRoom", &VideoGrant::admin(name), &request).await?;
        Ok(())
    }

    /// List active rooms.
    #[instrument(skip(self))]
    pub async fn list_rooms(&self) -> Result<Vec<Room>, ApiError> {
        let request = ListRoomsRequest { names: Vec::new() };

        let response: ListRoomsResponse = self
            .call("ListRooms", &VideoGrant::list_rooms(), &request)
            .await?;
        Ok(response.rooms)
    }

    /// Issue a Twirp call with a freshly signed admin token.
    async fn call<Req, Resp>(&self, method: &str, grant: &VideoGrant, request: &Req) -> Result<Resp, ApiError>
    where
        Req: Serialize,
        Resp: serde::de::DeserializeOwned,
    {
        let token = AccessToken::new(&self.api_key, &self.api_secret)
            .with_identity("meet-service")
            .with_ttl(ADMIN_TOKEN_TTL)
            .with_grant(grant.clone())
            .to_jwt()?;

        let url = format!("{}/twirp/livekit.RoomService/{}", self.base_url, method);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(target: "meet.livekit", error = %e, method, "RoomService request failed");
                ApiError::ServiceUnavailable("LiveKit is unavailable".to_string())
            })?;

        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| {
                error!(target: "meet.livekit", error = %e, method, "Failed to parse RoomService response");
                ApiError::Internal
            })
        } else if status.is_server_error() {
            warn!(target: "meet.livekit", status = %status, method, "RoomService returned server error");
            Err(ApiError::ServiceUnavailable(
                "LiveKit is unavailable".to_string(),
            ))
        } else if status.as_u16() == 401 {
            error!(target: "meet.livekit", method, "LiveKit rejected service credentials");
            Err(ApiError::Internal)
        } else {
            let error_body = response.text().await.unwrap_or_default();
            warn!(target: "meet.livekit", status = %status, method, body = %error_body, "Unexpected RoomService response");
            Err(ApiError::Internal)
        }
    }
}
