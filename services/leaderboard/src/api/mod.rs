//! HTTP boundary surface: thin handlers over the submission orchestrator,
//! the score store, and the connection registry.
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

pub mod connections;
pub mod error;
pub mod leaderboard;
pub mod scores;
pub mod types;

// Extract the bearer credential, if any, without validating it.
pub(crate) fn bearer_credential(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
