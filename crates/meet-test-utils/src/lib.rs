//! # Meet Test Utilities
//!
//! Shared test utilities for the meet service.
//!
//! This crate provides:
//! - Server test harness (`TestServer` for E2E tests)
//! - Database fixtures (users, meetings)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use meet_test_utils::*;
//!
//! #[sqlx::test(migrations = "../../migrations")]
//! async fn test_example(pool: PgPool) -> Result<()> {
//!     let server = TestServer::spawn(pool).await?;
//!     let client = reqwest::Client::new();
//!
//!     let response = client
//!         .get(&format!("{}/v1/health", server.url()))
//!         .send()
//!         .await?;
//!
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod fixtures;
pub mod server_harness;

// Re-export commonly used items
pub use fixtures::*;
pub use server_harness::*;
