//! Database fixtures for tests.

use meet_service::crypto;
use meet_service::repositories::{meetings, users};
use sqlx::PgPool;
use uuid::Uuid;

/// bcrypt cost for fixture passwords; the minimum keeps tests fast.
const FIXTURE_BCRYPT_COST: u32 = 4;

/// A user created directly in the database.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Create a user row with a real (low-cost) bcrypt hash, so the account can
/// also log in through the HTTP surface.
pub async fn create_test_user(
    pool: &PgPool,
    email: &str,
    username: &str,
    password: &str,
) -> Result<TestUser, anyhow::Error> {
    let hash = bcrypt::hash(password, FIXTURE_BCRYPT_COST)
        .map_err(|e| anyhow::anyhow!("Failed to hash fixture password: {}", e))?;

    let user = users::create_user(pool, email, username, &hash)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create fixture user: {}", e))?;

    Ok(TestUser {
        user_id: user.user_id,
        email: email.to_string(),
        username: username.to_string(),
        password: password.to_string(),
    })
}

/// A meeting created directly in the database.
#[derive(Debug, Clone)]
pub struct TestMeeting {
    pub meeting_id: Uuid,
    pub code: String,
}

/// Create a meeting row with a freshly allocated code.
pub async fn create_test_meeting(
    pool: &PgPool,
    created_by: Uuid,
    title: &str,
) -> Result<TestMeeting, anyhow::Error> {
    let meeting_id = Uuid::new_v4();
    let code = crypto::generate_meeting_code()
        .map_err(|e| anyhow::anyhow!("Failed to generate code: {}", e))?;

    let outcome = meetings::insert_meeting(
        pool,
        &meetings::NewMeeting {
            meeting_id,
            title,
            description: None,
            code: &code,
            created_by_user_id: created_by,
            scheduled_start_time: None,
            max_participants: 50,
            room_name: &meeting_id.to_string(),
            room_url: "ws://127.0.0.1:1",
        },
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to create fixture meeting: {}", e))?;

    match outcome {
        meetings::InsertOutcome::Created(row) => Ok(TestMeeting {
            meeting_id: row.meeting_id,
            code: row.code,
        }),
        meetings::InsertOutcome::CodeCollision => {
            Err(anyhow::anyhow!("Fixture meeting code collided"))
        }
    }
}
