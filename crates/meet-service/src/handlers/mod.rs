//! HTTP request handlers.

mod auth_handler;
mod health;
mod meetings;
mod submissions;

pub use auth_handler::{login, register};
pub use health::health_check;
pub use meetings::{create_meeting, get_created_meetings, get_meeting, join_meeting, leave_meeting};
pub use submissions::{create_submission, get_my_submissions, get_submissions_by_meeting};
