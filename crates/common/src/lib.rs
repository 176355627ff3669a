//! Common utilities shared across Stellar Meet components.

#![warn(clippy::pedantic)]

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for JWT hygiene (size limits, clock-skew validation)
pub mod jwt;
