//! Meet Service Library
//!
//! Core functionality for the Stellar Meet backend: a stateless HTTP API
//! responsible for:
//!
//! - Account registration and login (bcrypt + HS256 bearer tokens)
//! - Meeting lifecycle (unique join codes, join/leave bookkeeping)
//! - LiveKit pass-through (access-token signing, RoomService proxying)
//! - File submissions (validated uploads into object storage)
//!
//! # Architecture
//!
//! The service follows the Handler -> Service -> Repository pattern:
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> services/*.rs -> repositories/*.rs
//! ```
//!
//! # Modules
//!
//! - `auth` - API token claims, signing, validation
//! - `config` - Service configuration from environment
//! - `crypto` - Password hashing and meeting-code generation
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - Bearer-token authentication middleware
//! - `models` - Data models
//! - `repositories` - Database access
//! - `routes` - Axum router setup
//! - `services` - Business logic and external clients

pub mod auth;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
