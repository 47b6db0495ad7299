// Authoritative mapping of users to live push-channel addresses.
use async_trait::async_trait;
use crest_common::{ChannelAddress, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod memory;

pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("user id must not be empty")]
    EmptyUserId,
    #[error("no connection record for address {0}")]
    NotFound(ChannelAddress),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Lifecycle state of one channel owned by one user.
///
/// Soft state: a disconnect flips `is_connected` and refreshes `last_seen`
/// but never removes the record, so the last-seen history stays auditable.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub user_id: UserId,
    pub channel: ChannelAddress,
    pub is_connected: bool,
    pub last_seen: i64,
}

/// Connection lifecycle operations.
///
/// Each `(user, channel)` pair moves absent -> live -> closed; closed is
/// terminal for that lifecycle instance. A later connect with the same
/// address starts a fresh instance rather than resurrecting the old one.
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// Record a live channel for an already-authenticated user.
    ///
    /// Idempotent under retry: a second connect for the same pair leaves one
    /// live record, last-write-wins on `last_seen`.
    async fn on_connect(
        &self,
        user_id: UserId,
        channel: ChannelAddress,
    ) -> RegistryResult<()>;

    /// Close the record owning `channel`, located by address alone.
    ///
    /// Disconnect events from the transport do not carry a user id, so
    /// lookup-by-address is a first-class operation here. An unknown address
    /// yields `RegistryError::NotFound`; callers treat that as a no-op.
    async fn on_disconnect(&self, channel: &ChannelAddress) -> RegistryResult<ConnectionRecord>;

    /// Addresses of every currently-live channel for `user_id`.
    ///
    /// Order is unspecified; fan-out treats the result as a set.
    async fn live_channels_for(&self, user_id: &UserId) -> RegistryResult<Vec<ChannelAddress>>;
}
