//! Secret types for protecting sensitive values from accidental logging.
//!
//! This module re-exports types from the [`secrecy`] crate with Stellar
//! Meet-specific guidance. Use these types for all sensitive values like
//! passwords, API secrets, and signing keys.
//!
//! `SecretBox<T>` and `SecretString` implement `Debug` with redaction, so any
//! struct that derives `Debug` while holding one gets safe logging behavior
//! for free. Secrets are zeroized on drop.
//!
//! # Example
//!
//! ```rust
//! use common::secret::SecretString;
//! use secrecy::ExposeSecret;
//!
//! #[derive(Debug)]
//! struct LoginRequest {
//!     email: String,
//!     password: SecretString,  // Debug shows "[REDACTED]"
//! }
//!
//! let req = LoginRequest {
//!     email: "alice@example.com".to_string(),
//!     password: SecretString::from("hunter2"),
//! };
//!
//! // Safe: password is redacted
//! println!("{:?}", req);
//!
//! // Access requires an explicit expose_secret() call
//! let password: &str = req.password.expose_secret();
//! # let _ = password;
//! ```
//!
//! # Usage guidelines
//!
//! Use `SecretString` for user passwords, the API JWT secret, the LiveKit
//! API secret, and object-storage credentials. Use `SecretBox<T>` for custom
//! secret types (e.g., binary key material).

// Re-export the main types from secrecy
pub use secrecy::{ExposeSecret, SecretBox, SecretString};

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_debug_is_redacted() {
        let secret = SecretString::from("hunter2");
        let debug_str = format!("{secret:?}");

        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("hunter2"));
    }

    #[test]
    fn test_expose_secret_returns_inner_value() {
        let secret = SecretString::from("password123");
        assert_eq!(secret.expose_secret(), "password123");
    }

    #[test]
    fn test_struct_with_secret_is_safe() {
        #[allow(dead_code)]
        #[derive(Debug)]
        struct UserCredentials {
            email: String,
            password: SecretString,
        }

        let creds = UserCredentials {
            email: "alice@example.com".to_string(),
            password: SecretString::from("super-secret"),
        };

        let debug_str = format!("{creds:?}");

        assert!(debug_str.contains("alice@example.com"));
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("super-secret"));
    }

    #[test]
    fn test_deserialize() {
        #[allow(dead_code)]
        #[derive(Debug, Deserialize)]
        struct Credentials {
            email: String,
            password: SecretString,
        }

        let json = r#"{"email": "bob@example.com", "password": "my-secret-value"}"#;
        let creds: Credentials = serde_json::from_str(json).expect("deserialize");

        assert_eq!(creds.password.expose_secret(), "my-secret-value");

        let debug = format!("{creds:?}");
        assert!(!debug.contains("my-secret-value"));
        assert!(debug.contains("REDACTED"));
    }
}
