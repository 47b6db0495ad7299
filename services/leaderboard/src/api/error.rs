//! API error construction.
//!
//! Handlers return `ApiError` so every failure carries the same JSON shape:
//! a stable `code` and a human-readable `message`. Internal faults log their
//! detail server-side and return a generic message.
use crate::api::types::ErrorResponse;
use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

fn api_error(status: StatusCode, code: &str, message: &str) -> ApiError {
    ApiError {
        status,
        body: ErrorResponse {
            code: code.to_string(),
            message: message.to_string(),
            request_id: None,
        },
    }
}

// Client input failed validation; never logged at error level.
pub fn api_validation_error(message: &str) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, "validation_error", message)
}

// Authentication failed or missing.
pub fn api_unauthorized(message: &str) -> ApiError {
    api_error(StatusCode::UNAUTHORIZED, "unauthorized", message)
}

// Expired credential: same status as unauthorized, distinguishable code so
// clients know to re-authenticate rather than retry with other data.
pub fn api_credential_expired(message: &str) -> ApiError {
    api_error(StatusCode::UNAUTHORIZED, "credential_expired", message)
}

// Unknown route or resource.
pub fn api_not_found(message: &str) -> ApiError {
    api_error(StatusCode::NOT_FOUND, "not_found", message)
}

// Internal fault with a source error worth logging.
pub fn api_internal(message: &str, err: &dyn std::fmt::Debug) -> ApiError {
    tracing::error!(error = ?err, "leaderboard internal error");
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
}

// Internal fault without a concrete source error.
pub fn api_internal_message(message: &str) -> ApiError {
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
}
