//! Service layer.
//!
//! This module contains services that encapsulate business logic and talk to
//! external systems.
//!
//! # Components
//!
//! - `auth_service` - registration and login flows
//! - `meeting_service` - meeting lifecycle and participant bookkeeping
//! - `submission_service` - file submission validation and listings
//! - `livekit` - LiveKit access-token signing and RoomService client
//! - `storage` - object storage behind the `FileStore` trait

pub mod auth_service;
pub mod livekit;
pub mod meeting_service;
pub mod storage;
pub mod submission_service;

pub use livekit::{AccessToken, RoomClient, VideoGrant};
pub use storage::{FileStore, MemoryFileStore, S3FileStore};
