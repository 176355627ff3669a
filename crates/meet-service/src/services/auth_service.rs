//! Registration and login flows.

use crate::auth;
use crate::config::Config;
use crate::crypto;
use crate::errors::ApiError;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
use crate::repositories::users::{self, User};
use common::secret::ExposeSecret;
use sqlx::PgPool;

const MIN_PASSWORD_LENGTH: usize = 8;

fn to_user_response(user: &User) -> UserResponse {
    UserResponse {
        user_id: user.user_id,
        username: user.username.clone(),
        email: user.email.clone(),
        created_at: user.created_at,
        last_login_at: user.last_login_at,
    }
}

fn auth_response(config: &Config, user: &User) -> Result<AuthResponse, ApiError> {
    let issued = auth::issue_token(
        &config.jwt_secret,
        user.user_id,
        &user.email,
        config.jwt_ttl_seconds,
    )?;

    Ok(AuthResponse {
        user: to_user_response(user),
        token: issued.token,
        token_type: auth::TOKEN_TYPE_BEARER.to_string(),
        expires_in: issued.expires_in,
    })
}

/// Register a new user.
///
/// # Steps
///
/// 1. Validate email format
/// 2. Validate password (min 8 chars)
/// 3. Validate username (non-empty after trimming)
/// 4. Check the email is not taken
/// 5. Hash the password (bcrypt, configured cost)
/// 6. Insert the user
/// 7. Issue a token (auto-login)
///
/// A concurrent registration that loses the race on the email unique
/// constraint gets the same 400 as the pre-insert check produces.
pub async fn register(
    pool: &PgPool,
    config: &Config,
    request: RegisterRequest,
) -> Result<AuthResponse, ApiError> {
    if !is_valid_email(&request.email) {
        return Err(ApiError::BadRequest("Invalid email format".to_string()));
    }

    if request.password.expose_secret().len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    let username = request.username.trim();
    if username.is_empty() {
        return Err(ApiError::BadRequest(
            "Username cannot be empty".to_string(),
        ));
    }

    if users::email_exists(pool, &request.email).await? {
        return Err(ApiError::BadRequest(
            "An account with this email already exists".to_string(),
        ));
    }

    let password_hash = crypto::hash_password(request.password.expose_secret(), config.bcrypt_cost)?;

    let user = users::create_user(pool, &request.email, username, &password_hash).await?;

    tracing::info!(
        target: "meet.auth",
        user_id = %user.user_id,
        "User registered"
    );

    auth_response(config, &user)
}

/// Log a user in.
///
/// Unknown email and wrong password are indistinguishable: both return the
/// same 401, and a dummy bcrypt verification runs when the account does not
/// exist so the two paths take comparable time.
pub async fn login(
    pool: &PgPool,
    config: &Config,
    request: LoginRequest,
) -> Result<AuthResponse, ApiError> {
    let user = users::get_by_email(pool, &request.email).await?;

    // Always run bcrypt, against a dummy hash when the account is unknown
    let hash_to_verify = match &user {
        Some(u) => u.password_hash.as_str(),
        None => crypto::DUMMY_BCRYPT_HASH,
    };

    let is_valid = crypto::verify_password(request.password.expose_secret(), hash_to_verify)?;

    let user = user.ok_or(ApiError::InvalidCredentials)?;

    if !user.is_active || !is_valid {
        return Err(ApiError::InvalidCredentials);
    }

    users::update_last_login(pool, user.user_id).await?;

    tracing::info!(
        target: "meet.auth",
        user_id = %user.user_id,
        "User logged in"
    );

    auth_response(config, &user)
}

/// Simple email validation.
///
/// Checks for basic email format: something@something.something
fn is_valid_email(email: &str) -> bool {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return false;
    }

    let (local, domain) = match (parts.first(), parts.get(1)) {
        (Some(l), Some(d)) => (*l, *d),
        _ => return false,
    };

    if local.is_empty() {
        return false;
    }

    // Domain must have at least one dot and no empty parts
    let domain_parts: Vec<&str> = domain.split('.').collect();
    if domain_parts.len() < 2 {
        return false;
    }

    domain_parts.iter().all(|p| !p.is_empty())
}
