//! Database access layer.
//!
//! Repositories are free async functions over a `PgPool`, one module per
//! table. Uniqueness races are settled by database constraints; repositories
//! surface them as typed errors for the services to act on.

pub mod meetings;
pub mod participants;
pub mod submissions;
pub mod users;
