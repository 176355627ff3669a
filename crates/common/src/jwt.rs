//! JWT hygiene shared by everything that touches bearer tokens.
//!
//! This module provides the checks that run around signature verification:
//! - Size limits for DoS prevention
//! - Clock skew constants and `iat` validation
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Generic error messages prevent information leakage; details are logged
//!   at debug level server-side

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum allowed JWT size in bytes (8KB).
///
/// This limit prevents denial-of-service attacks via oversized tokens.
/// JWTs larger than this are rejected BEFORE any base64 decoding or
/// signature verification.
///
/// Typical tokens issued by this service are 300-500 bytes; 8KB leaves
/// headroom without allowing multi-megabyte payloads to reach the parser.
pub const MAX_JWT_SIZE_BYTES: usize = 8192; // 8KB

/// Default JWT clock skew tolerance (5 minutes per NIST SP 800-63B).
///
/// Accounts for clock drift between servers. Tokens with `iat` (issued-at)
/// timestamps more than this amount in the future are rejected.
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(300);

/// Maximum allowed JWT clock skew tolerance (10 minutes).
///
/// Prevents misconfiguration that would weaken security by allowing an
/// excessively large tolerance.
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(600);

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during JWT validation.
///
/// Note: Display messages are intentionally identical to prevent information
/// leakage; the variant carries the detail for server-side logging.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token size exceeds maximum allowed.
    #[error("The access token is invalid or expired")]
    TokenTooLarge,

    /// Token format is invalid (not a valid JWT structure).
    #[error("The access token is invalid or expired")]
    MalformedToken,

    /// Token `iat` claim is too far in the future.
    #[error("The access token is invalid or expired")]
    IatTooFarInFuture,
}

// =============================================================================
// Functions
// =============================================================================

/// Check a token against [`MAX_JWT_SIZE_BYTES`] before any parsing.
///
/// # Errors
///
/// Returns `JwtValidationError::TokenTooLarge` when the token exceeds the cap.
pub fn check_token_size(token: &str) -> Result<(), JwtValidationError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtValidationError::TokenTooLarge);
    }
    Ok(())
}

/// Validate the `iat` (issued-at) claim with clock skew tolerance.
///
/// Rejects tokens with `iat` too far in the future, which could indicate
/// token pre-generation, clock synchronization issues, or manipulation.
///
/// # Arguments
///
/// * `iat` - The issued-at timestamp from the JWT claims (Unix epoch seconds)
/// * `clock_skew` - Maximum allowed clock skew tolerance
///
/// # Errors
///
/// Returns `JwtValidationError::IatTooFarInFuture` if the iat timestamp is
/// more than `clock_skew` in the future.
pub fn validate_iat(iat: i64, clock_skew: Duration) -> Result<(), JwtValidationError> {
    let now = chrono::Utc::now().timestamp();
    let skew = clock_skew.as_secs() as i64;

    if iat > now + skew {
        tracing::debug!(
            target: "common.jwt",
            iat,
            now,
            skew_seconds = skew,
            "Token rejected: iat too far in the future"
        );
        return Err(JwtValidationError::IatTooFarInFuture);
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_check_token_size_accepts_typical_token() {
        let token = "a".repeat(400);
        assert!(check_token_size(&token).is_ok());
    }

    #[test]
    fn test_check_token_size_accepts_exactly_max() {
        let token = "a".repeat(MAX_JWT_SIZE_BYTES);
        assert!(check_token_size(&token).is_ok());
    }

    #[test]
    fn test_check_token_size_rejects_oversized() {
        let token = "a".repeat(MAX_JWT_SIZE_BYTES + 1);
        assert_eq!(
            check_token_size(&token),
            Err(JwtValidationError::TokenTooLarge)
        );
    }

    #[test]
    fn test_validate_iat_accepts_past() {
        let iat = chrono::Utc::now().timestamp() - 3600;
        assert!(validate_iat(iat, DEFAULT_CLOCK_SKEW).is_ok());
    }

    #[test]
    fn test_validate_iat_accepts_within_skew() {
        let iat = chrono::Utc::now().timestamp() + 100;
        assert!(validate_iat(iat, DEFAULT_CLOCK_SKEW).is_ok());
    }

    #[test]
    fn test_validate_iat_rejects_far_future() {
        let iat = chrono::Utc::now().timestamp() + 3600;
        assert_eq!(
            validate_iat(iat, DEFAULT_CLOCK_SKEW),
            Err(JwtValidationError::IatTooFarInFuture)
        );
    }

    #[test]
    fn test_error_messages_are_uniform() {
        // All variants display the same generic message
        let messages: Vec<String> = [
            JwtValidationError::TokenTooLarge,
            JwtValidationError::MalformedToken,
            JwtValidationError::IatTooFarInFuture,
        ]
        .iter()
        .map(ToString::to_string)
        .collect();

        assert!(messages.iter().all(|m| m == "The access token is invalid or expired"));
    }

    #[test]
    fn test_skew_constants_ordering() {
        assert!(DEFAULT_CLOCK_SKEW < MAX_CLOCK_SKEW);
    }
}
