// Best-effort push notifications for high scores: a transport abstraction
// and a fan-out that delivers one event to every live channel of a user.
use async_trait::async_trait;
use bytes::Bytes;
use crest_common::{ChannelAddress, UserId};
use crest_rank::HIGH_SCORE_THRESHOLD;
use crest_registry::ConnectionRegistry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;

pub mod inprocess;

pub use inprocess::InProcessHub;

pub type TransportResult<T> = Result<T, TransportError>;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("channel closed: {0}")]
    ChannelClosed(ChannelAddress),
    #[error("delivery timed out")]
    Timeout,
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Delivers a payload to a single addressed channel.
///
/// Addresses are opaque and transport-assigned; a failed send says nothing
/// about whether the channel is still registered.
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn send(&self, channel: &ChannelAddress, payload: Bytes) -> TransportResult<()>;
}

/// Event pushed to a user's live channels when a submission ranks.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEvent {
    pub display_name: String,
    pub score: i64,
    pub message: String,
}

impl HighScoreEvent {
    pub fn new(display_name: impl Into<String>, score: i64) -> Self {
        Self {
            display_name: display_name.into(),
            score,
            message: format!(
                "Congratulations! Your score of {score} is over {HIGH_SCORE_THRESHOLD}!"
            ),
        }
    }

    /// Serialize the wire envelope clients consume.
    pub fn to_payload(&self) -> serde_json::Result<Bytes> {
        let envelope = PushEnvelope {
            message: "realtime-update",
            data: PushData {
                user_name: &self.display_name,
                score: self.score,
                notification: &self.message,
            },
        };
        serde_json::to_vec(&envelope).map(Bytes::from)
    }
}

#[derive(Serialize)]
struct PushEnvelope<'a> {
    message: &'static str,
    data: PushData<'a>,
}

#[derive(Serialize)]
struct PushData<'a> {
    user_name: &'a str,
    score: i64,
    notification: &'a str,
}

/// Per-event delivery outcome across one user's live channels.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DeliveryReport {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: Vec<ChannelAddress>,
}

impl DeliveryReport {
    fn empty() -> Self {
        Self::default()
    }
}

/// Fans one event out to every live channel of a user.
///
/// One delivery attempt per channel per event, dispatched concurrently with
/// no cross-channel ordering. A failed or timed-out channel never blocks a
/// sibling, never fails the caller, and never mutates the registry; only an
/// explicit disconnect event closes a channel.
pub struct Notifier {
    registry: Arc<dyn ConnectionRegistry>,
    transport: Arc<dyn PushTransport>,
    per_channel_timeout: Duration,
}

impl Notifier {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        transport: Arc<dyn PushTransport>,
        per_channel_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            transport,
            per_channel_timeout,
        }
    }

    pub async fn notify_user(&self, user_id: &UserId, event: &HighScoreEvent) -> DeliveryReport {
        let channels = match self.registry.live_channels_for(user_id).await {
            Ok(channels) => channels,
            Err(err) => {
                // Best-effort path: a registry read fault degrades to a
                // zero-attempt report rather than failing the caller.
                tracing::warn!(error = %err, user_id = %user_id, "live channel lookup failed");
                return DeliveryReport::empty();
            }
        };
        // A user with no live channel simply misses the push.
        if channels.is_empty() {
            return DeliveryReport::empty();
        }
        let payload = match event.to_payload() {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(error = %err, user_id = %user_id, "event payload encoding failed");
                return DeliveryReport::empty();
            }
        };

        let mut tasks = JoinSet::new();
        for channel in channels {
            let transport = Arc::clone(&self.transport);
            let payload = payload.clone();
            let per_channel_timeout = self.per_channel_timeout;
            tasks.spawn(async move {
                let outcome =
                    tokio::time::timeout(per_channel_timeout, transport.send(&channel, payload))
                        .await;
                let result = match outcome {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(err)) => Err(err),
                    Err(_) => Err(TransportError::Timeout),
                };
                (channel, result)
            });
        }

        let mut report = DeliveryReport::empty();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(()))) => {
                    report.attempted += 1;
                    report.delivered += 1;
                }
                Ok((channel, Err(err))) => {
                    report.attempted += 1;
                    tracing::warn!(error = %err, channel = %channel, "push delivery failed");
                    report.failed.push(channel);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "push delivery task aborted");
                }
            }
        }
        metrics::counter!("crest_notify_delivered_total").increment(report.delivered as u64);
        metrics::counter!("crest_notify_failed_total").increment(report.failed.len() as u64);
        if !report.failed.is_empty() {
            tracing::warn!(
                user_id = %user_id,
                failed = ?report.failed,
                "failed to deliver to some channels"
            );
        }
        report
    }
}
