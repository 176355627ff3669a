//! Meet service configuration.
//!
//! Configuration is loaded from environment variables. All sensitive
//! fields are redacted in Debug output.

use common::jwt::{DEFAULT_CLOCK_SKEW, MAX_CLOCK_SKEW};
use common::secret::SecretString;
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default API token lifetime in seconds (7 days).
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 7 * 24 * 3600;

/// Maximum API token lifetime in seconds (30 days).
pub const MAX_TOKEN_TTL_SECONDS: i64 = 30 * 24 * 3600;

/// Default bcrypt cost for password hashing.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Minimum accepted bcrypt cost.
pub const MIN_BCRYPT_COST: u32 = 10;

/// Maximum accepted bcrypt cost (hashing time grows exponentially).
pub const MAX_BCRYPT_COST: u32 = 15;

/// Meet service configuration.
///
/// Loaded from environment variables with sensible defaults. The database
/// URL and all credentials are redacted in Debug output.
#[derive(Clone)]
pub struct Config {
    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// Allowed browser origin for CORS (the web client). No CORS layer is
    /// installed when unset.
    pub frontend_url: Option<String>,

    /// HMAC secret for signing API tokens.
    pub jwt_secret: SecretString,

    /// API token lifetime in seconds.
    pub jwt_ttl_seconds: i64,

    /// JWT clock skew tolerance in seconds for token validation.
    pub jwt_clock_skew_seconds: i64,

    /// bcrypt cost for password hashing.
    pub bcrypt_cost: u32,

    /// LiveKit API key.
    pub livekit_api_key: String,

    /// LiveKit API secret (signs access tokens and RoomService calls).
    pub livekit_api_secret: SecretString,

    /// LiveKit RoomService base URL (http/https).
    pub livekit_url: String,

    /// LiveKit signalling URL handed to clients (ws/wss).
    pub livekit_ws_url: String,

    /// S3-compatible storage endpoint for submission payloads.
    pub storage_endpoint: String,

    /// Storage bucket name.
    pub storage_bucket: String,

    /// Storage access key.
    pub storage_access_key: String,

    /// Storage secret key.
    pub storage_secret_key: SecretString,

    /// Public base URL under which stored objects are reachable.
    pub storage_public_url: String,
}

/// Custom Debug implementation that redacts sensitive fields.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("bind_address", &self.bind_address)
            .field("frontend_url", &self.frontend_url)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_ttl_seconds", &self.jwt_ttl_seconds)
            .field("jwt_clock_skew_seconds", &self.jwt_clock_skew_seconds)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("livekit_api_key", &self.livekit_api_key)
            .field("livekit_api_secret", &"[REDACTED]")
            .field("livekit_url", &self.livekit_url)
            .field("livekit_ws_url", &self.livekit_ws_url)
            .field("storage_endpoint", &self.storage_endpoint)
            .field("storage_bucket", &self.storage_bucket)
            .field("storage_access_key", &self.storage_access_key)
            .field("storage_secret_key", &"[REDACTED]")
            .field("storage_public_url", &self.storage_public_url)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid JWT clock skew configuration: {0}")]
    InvalidJwtClockSkew(String),

    #[error("Invalid JWT TTL configuration: {0}")]
    InvalidJwtTtl(String),

    #[error("Invalid bcrypt cost configuration: {0}")]
    InvalidBcryptCost(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?
            .clone();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| "0.0.0.0:8080".to_string());

        let frontend_url = vars.get("FRONTEND_URL").cloned();

        let jwt_secret = vars
            .get("JWT_SECRET")
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))?
            .clone();

        // Parse token TTL with validation
        let jwt_ttl_seconds = if let Some(value_str) = vars.get("JWT_TTL_SECONDS") {
            let value: i64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidJwtTtl(format!(
                    "JWT_TTL_SECONDS must be a valid integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value <= 0 {
                return Err(ConfigError::InvalidJwtTtl(format!(
                    "JWT_TTL_SECONDS must be positive, got {}",
                    value
                )));
            }

            if value > MAX_TOKEN_TTL_SECONDS {
                return Err(ConfigError::InvalidJwtTtl(format!(
                    "JWT_TTL_SECONDS must not exceed {} seconds, got {}",
                    MAX_TOKEN_TTL_SECONDS, value
                )));
            }

            value
        } else {
            DEFAULT_TOKEN_TTL_SECONDS
        };

        // Parse JWT clock skew tolerance with validation
        let jwt_clock_skew_seconds = if let Some(value_str) = vars.get("JWT_CLOCK_SKEW_SECONDS") {
            let value: i64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must be a valid integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value <= 0 {
                return Err(ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must be positive, got {}",
                    value
                )));
            }

            if value > MAX_CLOCK_SKEW.as_secs() as i64 {
                return Err(ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must not exceed {} seconds, got {}",
                    MAX_CLOCK_SKEW.as_secs(),
                    value
                )));
            }

            value
        } else {
            DEFAULT_CLOCK_SKEW.as_secs() as i64
        };

        // Parse bcrypt cost with validation
        let bcrypt_cost = if let Some(value_str) = vars.get("BCRYPT_COST") {
            let value: u32 = value_str.parse().map_err(|e| {
                ConfigError::InvalidBcryptCost(format!(
                    "BCRYPT_COST must be a valid positive integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&value) {
                return Err(ConfigError::InvalidBcryptCost(format!(
                    "BCRYPT_COST must be between {} and {}, got {}",
                    MIN_BCRYPT_COST, MAX_BCRYPT_COST, value
                )));
            }

            value
        } else {
            DEFAULT_BCRYPT_COST
        };

        // LiveKit credentials default to the LiveKit dev-mode pair so a local
        // `livekit-server --dev` works out of the box.
        let livekit_api_key = vars
            .get("LIVEKIT_API_KEY")
            .cloned()
            .unwrap_or_else(|| "devkey".to_string());

        let livekit_api_secret = vars
            .get("LIVEKIT_API_SECRET")
            .cloned()
            .unwrap_or_else(|| "secret".to_string());

        let livekit_url = vars
            .get("LIVEKIT_URL")
            .cloned()
            .unwrap_or_else(|| "http://localhost:7880".to_string());

        let livekit_ws_url = vars
            .get("LIVEKIT_WS_URL")
            .cloned()
            .unwrap_or_else(|| "ws://localhost:7880".to_string());

        let storage_endpoint = vars
            .get("STORAGE_ENDPOINT")
            .cloned()
            .unwrap_or_else(|| "http://localhost:9000".to_string());

        let storage_bucket = vars
            .get("STORAGE_BUCKET")
            .cloned()
            .unwrap_or_else(|| "submissions".to_string());

        let storage_access_key = vars
            .get("STORAGE_ACCESS_KEY")
            .cloned()
            .unwrap_or_else(|| "minioadmin".to_string());

        let storage_secret_key = vars
            .get("STORAGE_SECRET_KEY")
            .cloned()
            .unwrap_or_else(|| "minioadmin".to_string());

        let storage_public_url = vars
            .get("STORAGE_PUBLIC_URL")
            .cloned()
            .unwrap_or_else(|| storage_endpoint.clone());

        Ok(Config {
            database_url,
            bind_address,
            frontend_url,
            jwt_secret: SecretString::from(jwt_secret),
            jwt_ttl_seconds,
            jwt_clock_skew_seconds,
            bcrypt_cost,
            livekit_api_key,
            livekit_api_secret: SecretString::from(livekit_api_secret),
            livekit_url,
            livekit_ws_url,
            storage_endpoint,
            storage_bucket,
            storage_access_key,
            storage_secret_key: SecretString::from(storage_secret_key),
            storage_public_url,
        })
    }
}
