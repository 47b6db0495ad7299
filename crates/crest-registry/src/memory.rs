//! In-memory implementation of the connection registry.
//!
//! State lives in `HashMap`s behind one `tokio::sync::RwLock`; the write lock
//! gives the per-key mutual exclusion an in-process store needs so concurrent
//! connect/disconnect for the same address cannot lose updates. Races on the
//! same address resolve last-write-wins on the record's `last_seen` stamp,
//! not by network arrival order.
//!
//! The `by_address` map is the secondary index for disconnect-by-address; it
//! holds exactly the live channels. Closed records stay in `records` until a
//! retention sweep that this backend does not implement — correctness never
//! depends on deletion.
use crate::{ConnectionRecord, ConnectionRegistry, RegistryError, RegistryResult};
use async_trait::async_trait;
use crest_common::{ChannelAddress, UserId, now_epoch_seconds};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<(UserId, ChannelAddress), ConnectionRecord>,
    // Live channels only: address -> owning user.
    by_address: HashMap<ChannelAddress, UserId>,
}

/// In-memory connection registry.
///
/// ```
/// use crest_common::{ChannelAddress, UserId};
/// use crest_registry::ConnectionRegistry;
/// use crest_registry::memory::MemoryConnectionRegistry;
///
/// let registry = MemoryConnectionRegistry::new();
/// let rt = tokio::runtime::Runtime::new().expect("rt");
/// rt.block_on(async {
///     registry
///         .on_connect(UserId::new("u1"), ChannelAddress::new("c1"))
///         .await
///         .expect("connect");
///     let live = registry.live_channels_for(&UserId::new("u1")).await.expect("live");
///     assert_eq!(live, vec![ChannelAddress::new("c1")]);
/// });
/// ```
#[derive(Debug, Default)]
pub struct MemoryConnectionRegistry {
    inner: RwLock<Inner>,
}

impl MemoryConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the stored record for one `(user, channel)` pair, live or
    /// closed. Closed records are retained for last-seen auditability.
    pub async fn record_for(
        &self,
        user_id: &UserId,
        channel: &ChannelAddress,
    ) -> Option<ConnectionRecord> {
        let guard = self.inner.read().await;
        guard
            .records
            .get(&(user_id.clone(), channel.clone()))
            .cloned()
    }
}

#[async_trait]
impl ConnectionRegistry for MemoryConnectionRegistry {
    async fn on_connect(
        &self,
        user_id: UserId,
        channel: ChannelAddress,
    ) -> RegistryResult<()> {
        // Identity is validated upstream; only emptiness is rejected here.
        if user_id.is_empty() {
            return Err(RegistryError::EmptyUserId);
        }
        let now = now_epoch_seconds();
        let mut guard = self.inner.write().await;
        // A transport may reassign an address only after the previous owner
        // is gone; close the stale record before writing the fresh one.
        if let Some(previous) = guard.by_address.get(&channel).cloned()
            && previous != user_id
        {
            if let Some(stale) = guard.records.get_mut(&(previous, channel.clone())) {
                stale.is_connected = false;
                stale.last_seen = now;
            }
        }
        guard.records.insert(
            (user_id.clone(), channel.clone()),
            ConnectionRecord {
                user_id: user_id.clone(),
                channel: channel.clone(),
                is_connected: true,
                last_seen: now,
            },
        );
        guard.by_address.insert(channel, user_id);
        metrics::gauge!("crest_registry_live_channels").set(guard.by_address.len() as f64);
        Ok(())
    }

    async fn on_disconnect(&self, channel: &ChannelAddress) -> RegistryResult<ConnectionRecord> {
        let now = now_epoch_seconds();
        let mut guard = self.inner.write().await;
        let user_id = guard
            .by_address
            .remove(channel)
            .ok_or_else(|| RegistryError::NotFound(channel.clone()))?;
        let record = guard
            .records
            .get_mut(&(user_id, channel.clone()))
            .ok_or_else(|| RegistryError::NotFound(channel.clone()))?;
        record.is_connected = false;
        record.last_seen = now;
        let record = record.clone();
        metrics::gauge!("crest_registry_live_channels").set(guard.by_address.len() as f64);
        Ok(record)
    }

    async fn live_channels_for(&self, user_id: &UserId) -> RegistryResult<Vec<ChannelAddress>> {
        let guard = self.inner.read().await;
        let channels = guard
            .by_address
            .iter()
            .filter(|(_, owner)| **owner == *user_id)
            .map(|(channel, _)| channel.clone())
            .collect();
        Ok(channels)
    }
}
