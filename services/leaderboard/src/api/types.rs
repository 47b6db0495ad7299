// Request and response bodies for the leaderboard API.
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitScoreRequest {
    pub score: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitScoreResponse {
    pub message: String,
}

/// Current leaderboard leader; all fields null when the board is empty.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LeaderResponse {
    pub user_id: Option<String>,
    pub display_name: Option<String>,
    pub score: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectRequest {
    pub channel_address: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectResponse {
    pub message: String,
    pub channel_address: String,
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DisconnectResponse {
    pub message: String,
}

/// Uniform error body: a stable `code` plus a human-readable message.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}
