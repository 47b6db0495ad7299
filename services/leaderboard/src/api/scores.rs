//! Score submission endpoint.
use crate::api::bearer_credential;
use crate::api::error::{
    ApiError, api_credential_expired, api_internal, api_unauthorized, api_validation_error,
};
use crate::api::types::{SubmitScoreRequest, SubmitScoreResponse};
use crate::app::AppState;
use crate::submission::SubmissionError;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use crest_identity::AuthError;

pub(crate) async fn submit_score(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SubmitScoreRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    // A malformed body is a validation failure, same shape as a bad score.
    let Json(body) = payload.map_err(|rejection| api_validation_error(&rejection.body_text()))?;
    let credential =
        bearer_credential(&headers).ok_or_else(|| api_unauthorized("missing bearer credential"))?;

    match state.submission.submit(credential, body.score).await {
        Ok(_) => Ok((
            StatusCode::CREATED,
            Json(SubmitScoreResponse {
                message: "Score submitted successfully!".to_string(),
            }),
        )),
        Err(err) => Err(submission_error_response(err)),
    }
}

fn submission_error_response(err: SubmissionError) -> ApiError {
    match err {
        SubmissionError::Validation(message) => api_validation_error(&message),
        SubmissionError::Auth(AuthError::Expired) => {
            api_credential_expired("credential expired; re-authenticate")
        }
        SubmissionError::Auth(err) => api_unauthorized(&err.to_string()),
        SubmissionError::Store(err) => api_internal("failed to record score", &err),
        SubmissionError::Timeout(stage) => {
            api_internal("submission step timed out", &stage)
        }
    }
}
