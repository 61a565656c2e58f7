//! HTTP request handlers.

mod admin;
pub mod api_auth;
mod health;
pub mod identity;
pub(crate) mod problem_details;
pub mod v1;
mod version;

pub use admin::{resync_exercise, run_job, shutdown};
pub use health::{livez, readyz};
pub use version::version;
