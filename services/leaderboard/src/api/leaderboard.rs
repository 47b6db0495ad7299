//! Leaderboard leader endpoint.
use crate::api::error::{ApiError, api_internal, api_internal_message};
use crate::api::types::LeaderResponse;
use crate::app::AppState;
use axum::Json;
use axum::extract::State;
use crest_store::ScoreStore;

pub(crate) async fn leaderboard_leader(
    State(state): State<AppState>,
) -> Result<Json<LeaderResponse>, ApiError> {
    let leader = tokio::time::timeout(state.store_timeout(), state.scores.current_leader())
        .await
        .map_err(|_| api_internal_message("leaderboard read timed out"))?
        .map_err(|err| api_internal("failed to read leaderboard leader", &err))?;

    // An empty board is a success with a null payload, not an error.
    let body = match leader {
        Some(record) => LeaderResponse {
            user_id: Some(record.user_id.to_string()),
            display_name: Some(record.display_name),
            score: Some(record.score),
        },
        None => LeaderResponse::default(),
    };
    Ok(Json(body))
}
