//! API token authentication.
//!
//! Tokens are HS256 JWTs signed with the configured secret. Validation
//! layers the shared size and issued-at checks from `common::jwt` around
//! signature verification.

mod claims;
mod jwt;

pub use claims::Claims;
pub use jwt::{issue_token, validate_token, IssuedToken, TOKEN_TYPE_BEARER};
