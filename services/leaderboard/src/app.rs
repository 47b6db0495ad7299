//! Application state and router wiring.
use crate::api;
use crate::config::LeaderboardConfig;
use crate::submission::ScoreSubmission;
use axum::Router;
use axum::routing::{delete, get, post};
use crest_identity::IdentityProvider;
use crest_registry::ConnectionRegistry;
use crest_store::ScoreStore;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<LeaderboardConfig>,
    pub identity: Arc<dyn IdentityProvider>,
    pub scores: Arc<dyn ScoreStore>,
    pub registry: Arc<dyn ConnectionRegistry>,
    pub submission: Arc<ScoreSubmission>,
}

impl AppState {
    pub fn identity_timeout(&self) -> Duration {
        Duration::from_millis(self.config.identity_timeout_ms)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.config.store_timeout_ms)
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/scores", post(api::scores::submit_score))
        .route(
            "/v1/leaderboard/leader",
            get(api::leaderboard::leaderboard_leader),
        )
        .route("/v1/connections", post(api::connections::connect))
        .route(
            "/v1/connections/:channel_address",
            delete(api::connections::disconnect),
        )
        .fallback(|| async { api::error::api_not_found("no such route") })
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
