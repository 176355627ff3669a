//! HS256 token signing and validation.

use super::Claims;
use crate::errors::ApiError;
use common::jwt::{check_token_size, validate_iat};
use common::secret::{ExposeSecret, SecretString};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::Duration;
use uuid::Uuid;

/// Token type returned in auth responses.
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// A freshly signed token plus its lifetime.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

/// Sign an API token for a user.
///
/// # Errors
///
/// Returns `ApiError::Internal` when encoding fails; the cause is logged.
pub fn issue_token(
    secret: &SecretString,
    user_id: Uuid,
    email: &str,
    ttl_seconds: i64,
) -> Result<IssuedToken, ApiError> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        iat: now,
        exp: now + ttl_seconds,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .map_err(|e| {
        tracing::error!(target: "meet.auth", error = %e, "Token signing failed");
        ApiError::Internal
    })?;

    Ok(IssuedToken {
        token,
        expires_in: ttl_seconds,
    })
}

/// Validate an API token and return its claims.
///
/// Checks, in order: token size cap, HS256 signature and `exp` (with the
/// configured leeway), then the `iat` clock-skew rule.
///
/// # Errors
///
/// Returns `ApiError::InvalidToken` with a generic message for every
/// rejection; the specific cause is logged at debug level.
pub fn validate_token(
    secret: &SecretString,
    token: &str,
    clock_skew_seconds: i64,
) -> Result<Claims, ApiError> {
    check_token_size(token).map_err(|e| ApiError::InvalidToken(e.to_string()))?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = clock_skew_seconds.max(0) as u64;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!(target: "meet.auth", error = %e, "Token rejected");
        ApiError::InvalidToken("The access token is invalid or expired".to_string())
    })?;

    validate_iat(
        data.claims.iat,
        Duration::from_secs(clock_skew_seconds.max(0) as u64),
    )
    .map_err(|e| ApiError::InvalidToken(e.to_string()))?;

    Ok(data.claims)
}
