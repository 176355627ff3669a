//! API token claims.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::errors::ApiError;

/// JWT claims carried by API tokens.
///
/// The `sub` and `email` fields identify a user and are redacted in Debug
/// output so request logs never carry account identifiers.
#[derive(Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: String,

    /// Account email, for display purposes on the client.
    pub email: String,

    /// Issued-at timestamp (Unix epoch seconds).
    pub iat: i64,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,
}

impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("sub", &"[REDACTED]")
            .field("email", &"[REDACTED]")
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .finish()
    }
}

impl Claims {
    /// Parse the subject as a user id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidToken` when the subject is not a UUID.
    pub fn user_id(&self) -> Result<Uuid, ApiError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| ApiError::InvalidToken("Invalid user identifier in token".to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_identifiers() {
        let claims = Claims {
            sub: Uuid::nil().to_string(),
            email: "alice@example.com".to_string(),
            iat: 1,
            exp: 2,
        };

        let debug = format!("{:?}", claims);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("alice@example.com"));
    }

    #[test]
    fn test_user_id_parses_uuid() {
        let id = Uuid::new_v4();
        let claims = Claims {
            sub: id.to_string(),
            email: "a@b.co".to_string(),
            iat: 0,
            exp: 0,
        };
        assert_eq!(claims.user_id().unwrap(), id);
    }

    #[test]
    fn test_user_id_rejects_garbage() {
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            email: "a@b.co".to_string(),
            iat: 0,
            exp: 0,
        };
        assert!(claims.user_id().is_err());
    }
}
