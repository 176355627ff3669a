//! Meet service error types.
//!
//! All errors map to appropriate HTTP status codes via the `IntoResponse`
//! impl. Error messages returned to clients are intentionally generic to
//! avoid leaking internal details. Actual errors are logged server-side.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Meet service error type.
///
/// Maps to appropriate HTTP status codes:
/// - Database, Internal: 500 Internal Server Error
/// - InvalidToken, InvalidCredentials: 401 Unauthorized
/// - NotFound: 404 Not Found
/// - Conflict: 409 Conflict
/// - Forbidden: 403 Forbidden
/// - BadRequest: 400 Bad Request
/// - ServiceUnavailable: 503 Service Unavailable
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Database(_) | ApiError::Internal => 500,
            ApiError::InvalidToken(_) | ApiError::InvalidCredentials => 401,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::Forbidden(_) => 403,
            ApiError::BadRequest(_) => 400,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Database(err) => {
                // Log actual error server-side, return generic message to client
                tracing::error!(target: "meet.database", error = %err, "Database operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "An internal database error occurred".to_string(),
                )
            }
            ApiError::InvalidToken(reason) => {
                (StatusCode::UNAUTHORIZED, "INVALID_TOKEN", reason.clone())
            }
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                // One message for unknown email and wrong password alike
                "Invalid email or password".to_string(),
            ),
            ApiError::NotFound(resource) => (StatusCode::NOT_FOUND, "NOT_FOUND", resource.clone()),
            ApiError::Conflict(reason) => (StatusCode::CONFLICT, "CONFLICT", reason.clone()),
            ApiError::Forbidden(reason) => (StatusCode::FORBIDDEN, "FORBIDDEN", reason.clone()),
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", reason.clone()),
            ApiError::ServiceUnavailable(reason) => {
                // Log actual reason server-side
                tracing::warn!(target: "meet.availability", reason = %reason, "Service unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "Service temporarily unavailable".to_string(),
                )
            }
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            ),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        let mut response = (status, Json(error_response)).into_response();

        // Add WWW-Authenticate header for 401 responses
        if status == StatusCode::UNAUTHORIZED {
            if let Ok(header_value) = "Bearer realm=\"stellar-meet-api\", error=\"invalid_token\"".parse()
            {
                response
                    .headers_mut()
                    .insert("WWW-Authenticate", header_value);
            }
        }

        response
    }
}

/// Convert sqlx errors to ApiError
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Database(err.to_string())
    }
}

/// True when the error is a unique-constraint violation on the named
/// constraint. Used by the meeting-code allocator to retry on collision.
pub fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation() && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;

    // Helper function to read the response body as JSON
    async fn read_body_json(body: Body) -> serde_json::Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_display_database_error() {
        let error = ApiError::Database("connection failed".to_string());
        assert_eq!(format!("{}", error), "Database error: connection failed");
    }

    #[test]
    fn test_display_invalid_credentials() {
        let error = ApiError::InvalidCredentials;
        assert_eq!(format!("{}", error), "Invalid email or password");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::Database("test".to_string()).status_code(), 500);
        assert_eq!(ApiError::InvalidToken("test".to_string()).status_code(), 401);
        assert_eq!(ApiError::InvalidCredentials.status_code(), 401);
        assert_eq!(ApiError::NotFound("test".to_string()).status_code(), 404);
        assert_eq!(ApiError::Conflict("test".to_string()).status_code(), 409);
        assert_eq!(ApiError::Forbidden("test".to_string()).status_code(), 403);
        assert_eq!(ApiError::BadRequest("test".to_string()).status_code(), 400);
        assert_eq!(
            ApiError::ServiceUnavailable("test".to_string()).status_code(),
            503
        );
        assert_eq!(ApiError::Internal.status_code(), 500);
    }

    #[tokio::test]
    async fn test_into_response_database_error() {
        let error = ApiError::Database("connection failed".to_string());
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "DATABASE_ERROR");
        assert_eq!(
            body_json["error"]["message"],
            "An internal database error occurred"
        );
    }

    #[tokio::test]
    async fn test_into_response_invalid_credentials() {
        let error = ApiError::InvalidCredentials;
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // Check WWW-Authenticate header
        let www_auth = response.headers().get("WWW-Authenticate");
        assert!(www_auth.is_some());

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "INVALID_CREDENTIALS");
        assert_eq!(body_json["error"]["message"], "Invalid email or password");
    }

    #[tokio::test]
    async fn test_into_response_not_found() {
        let error = ApiError::NotFound("Meeting not found".to_string());
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "NOT_FOUND");
        assert_eq!(body_json["error"]["message"], "Meeting not found");
    }

    #[tokio::test]
    async fn test_into_response_conflict() {
        let error = ApiError::Conflict("Meeting is full".to_string());
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "CONFLICT");
        assert_eq!(body_json["error"]["message"], "Meeting is full");
    }

    #[tokio::test]
    async fn test_into_response_service_unavailable() {
        let error = ApiError::ServiceUnavailable("livekit down".to_string());
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "SERVICE_UNAVAILABLE");
        // Generic message returned to client
        assert_eq!(
            body_json["error"]["message"],
            "Service temporarily unavailable"
        );
    }
}
