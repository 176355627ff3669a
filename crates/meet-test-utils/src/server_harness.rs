//! Test server harness for E2E testing
//!
//! Provides `TestServer` for spawning real meet-service instances in tests.

use meet_service::config::Config;
use meet_service::routes::{self, AppState};
use meet_service::services::livekit::RoomClient;
use meet_service::services::storage::MemoryFileStore;
use sqlx::PgPool;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// JWT secret the harness configures; token builders sign with the same one.
pub const TEST_JWT_SECRET: &str = "meet-test-jwt-secret";

/// Test harness for spawning the meet service in E2E tests.
///
/// The server binds to a random port, uses an in-memory file store, and
/// points its LiveKit client at a closed port so room calls exercise the
/// best-effort paths.
///
/// # Example
/// ```rust,ignore
/// #[sqlx::test(migrations = "../../migrations")]
/// async fn test_health_flow_e2e(pool: PgPool) -> Result<()> {
///     let server = TestServer::spawn(pool).await?;
///     let client = reqwest::Client::new();
///
///     let response = client
///         .get(&format!("{}/v1/health", server.url()))
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestServer {
    addr: SocketAddr,
    pool: PgPool,
    config: Config,
    storage: Arc<MemoryFileStore>,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Spawn a new test server instance with an isolated database.
    ///
    /// # Arguments
    /// * `pool` - Database connection pool (typically from `#[sqlx::test]`)
    ///
    /// # Returns
    /// * `Ok(TestServer)` - Running server instance
    /// * `Err(anyhow::Error)` - If server spawn fails
    pub async fn spawn(pool: PgPool) -> Result<Self, anyhow::Error> {
        // Build configuration for the test environment
        let vars = HashMap::from([
            (
                "DATABASE_URL".to_string(),
                "postgresql://test/test".to_string(),
            ),
            ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
            ("JWT_SECRET".to_string(), TEST_JWT_SECRET.to_string()),
            // Nothing listens here; room calls exercise the best-effort path
            ("LIVEKIT_URL".to_string(), "http://127.0.0.1:1".to_string()),
            ("LIVEKIT_WS_URL".to_string(), "ws://127.0.0.1:1".to_string()),
        ]);

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let rooms = RoomClient::new(
            &config.livekit_url,
            &config.livekit_api_key,
            &config.livekit_api_secret,
        )
        .map_err(|e| anyhow::anyhow!("Failed to create room client: {}", e))?;

        let storage = Arc::new(MemoryFileStore::new());

        // Create application state
        let state = Arc::new(AppState {
            pool: pool.clone(),
            config: config.clone(),
            rooms,
            storage: storage.clone(),
        });

        // Build routes using meet-service's real route builder
        let app = routes::build_routes(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        // Spawn server in background
        let handle = tokio::spawn(async move {
            let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, make_service).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            pool,
            config,
            storage,
            _handle: handle,
        })
    }

    /// Base URL of the running server (e.g., "http://127.0.0.1:49152").
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Reference to the database pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Reference to the server configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The in-memory file store backing submissions.
    pub fn storage(&self) -> &MemoryFileStore {
        &self.storage
    }

    /// Sign a valid API token for a user, as the server would.
    pub fn token_for(&self, user_id: Uuid, email: &str) -> Result<String, anyhow::Error> {
        let issued = meet_service::auth::issue_token(
            &self.config.jwt_secret,
            user_id,
            email,
            self.config.jwt_ttl_seconds,
        )
        .map_err(|e| anyhow::anyhow!("Failed to sign test token: {}", e))?;

        Ok(issued.token)
    }
}
