//! User repository module for database operations.

use crate::errors::ApiError;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// User model (maps to users table)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Get a user by email.
pub async fn get_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, ApiError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT
            user_id, email, username, password_hash,
            is_active, created_at, updated_at, last_login_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to fetch user by email: {}", e)))?;

    Ok(user)
}

/// Get a user by id.
pub async fn get_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<User>, ApiError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT
            user_id, email, username, password_hash,
            is_active, created_at, updated_at, last_login_at
        FROM users
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to fetch user by id: {}", e)))?;

    Ok(user)
}

/// Create a new user.
///
/// Returns the created user record. A concurrent registration with the same
/// email loses the race on the unique constraint and gets the same error the
/// pre-insert existence check would have produced.
pub async fn create_user(
    pool: &PgPool,
    email: &str,
    username: &str,
    password_hash: &str,
) -> Result<User, ApiError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, username, password_hash)
        VALUES ($1, $2, $3)
        RETURNING
            user_id, email, username, password_hash,
            is_active, created_at, updated_at, last_login_at
        "#,
    )
    .bind(email)
    .bind(username)
    .bind(password_hash)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if crate::errors::is_unique_violation(&e, "users_email_unique") {
            ApiError::BadRequest("An account with this email already exists".to_string())
        } else {
            ApiError::Database(format!("Failed to create user: {}", e))
        }
    })?;

    Ok(user)
}

/// Update the last_login_at timestamp for a user.
pub async fn update_last_login(pool: &PgPool, user_id: Uuid) -> Result<(), ApiError> {
    sqlx::query(
        r#"
        UPDATE users
        SET last_login_at = NOW(), updated_at = NOW()
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .execute(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to update last login: {}", e)))?;

    Ok(())
}

/// Check if an email is already registered.
pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, ApiError> {
    let exists: (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM users
            WHERE email = $1
        )
        "#,
    )
    .bind(email)
    .fetch_one(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to check email existence: {}", e)))?;

    Ok(exists.0)
}
