//! Push-channel lifecycle endpoints.
//!
//! Connect validates the bearer credential, then hands the pre-validated
//! identity to the registry; the registry itself never authenticates.
//! Disconnect carries only the channel address, exactly like the transport's
//! close event.
use crate::api::bearer_credential;
use crate::api::error::{
    ApiError, api_credential_expired, api_internal, api_internal_message, api_unauthorized,
    api_validation_error,
};
use crate::api::types::{ConnectRequest, ConnectResponse, DisconnectResponse};
use crate::app::AppState;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use crest_common::ChannelAddress;
use crest_identity::{AuthError, IdentityProvider};
use crest_registry::{ConnectionRegistry, RegistryError};

pub(crate) async fn connect(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ConnectRequest>, JsonRejection>,
) -> Result<Json<ConnectResponse>, ApiError> {
    let Json(body) = payload.map_err(|rejection| api_validation_error(&rejection.body_text()))?;
    let credential =
        bearer_credential(&headers).ok_or_else(|| api_unauthorized("missing bearer credential"))?;

    let identity = tokio::time::timeout(
        state.identity_timeout(),
        state.identity.validate(credential),
    )
    .await
    .map_err(|_| api_internal_message("identity check timed out"))?
    .map_err(|err| match err {
        AuthError::Expired => api_credential_expired("credential expired; re-authenticate"),
        other => api_unauthorized(&other.to_string()),
    })?;

    let channel = ChannelAddress::new(body.channel_address);
    state
        .registry
        .on_connect(identity.user_id.clone(), channel.clone())
        .await
        .map_err(|err| match err {
            RegistryError::EmptyUserId => api_unauthorized("empty user id"),
            other => api_internal("failed to record connection", &other),
        })?;

    Ok(Json(ConnectResponse {
        message: "Connected successfully".to_string(),
        channel_address: channel.to_string(),
        user_id: identity.user_id.to_string(),
    }))
}

pub(crate) async fn disconnect(
    State(state): State<AppState>,
    Path(channel_address): Path<String>,
) -> Result<Json<DisconnectResponse>, ApiError> {
    let channel = ChannelAddress::new(channel_address);
    match state.registry.on_disconnect(&channel).await {
        Ok(record) => {
            tracing::info!(user_id = %record.user_id, channel = %channel, "channel closed");
        }
        Err(RegistryError::NotFound(_)) => {
            // Disconnects can arrive for channels never recorded (a failed
            // connect, a replay); the transport-level close already happened
            // either way, so this stays a no-op.
            tracing::warn!(channel = %channel, "disconnect for unknown channel");
        }
        Err(err) => return Err(api_internal("failed to close connection", &err)),
    }
    Ok(Json(DisconnectResponse {
        message: "Disconnected".to_string(),
    }))
}
