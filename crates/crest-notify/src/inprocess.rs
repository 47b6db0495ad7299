// In-process push transport backed by per-channel queues.
use crate::{PushTransport, TransportError, TransportResult};
use async_trait::async_trait;
use bytes::Bytes;
use crest_common::ChannelAddress;
use dashmap::DashMap;
use tokio::sync::mpsc;

/// Push transport delivering payloads to receivers inside this process.
///
/// The reference transport for the service binary, demos, and tests; a
/// deployment fronted by an external push gateway swaps in its own
/// [`PushTransport`] implementation instead.
///
/// ```
/// use bytes::Bytes;
/// use crest_common::ChannelAddress;
/// use crest_notify::{InProcessHub, PushTransport};
///
/// let hub = InProcessHub::new();
/// let rt = tokio::runtime::Runtime::new().expect("rt");
/// rt.block_on(async {
///     let mut rx = hub.open(ChannelAddress::new("c1"));
///     hub.send(&ChannelAddress::new("c1"), Bytes::from_static(b"hello"))
///         .await
///         .expect("send");
///     assert_eq!(rx.recv().await, Some(Bytes::from_static(b"hello")));
/// });
/// ```
#[derive(Debug, Default)]
pub struct InProcessHub {
    channels: DashMap<ChannelAddress, mpsc::UnboundedSender<Bytes>>,
}

impl InProcessHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a channel and hand back its receiving end.
    ///
    /// Re-opening an address replaces the previous queue; the old receiver
    /// stops getting payloads.
    pub fn open(&self, channel: ChannelAddress) -> mpsc::UnboundedReceiver<Bytes> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.channels.insert(channel, tx);
        rx
    }

    /// Drop a channel; subsequent sends fail with `ChannelClosed`.
    pub fn close(&self, channel: &ChannelAddress) {
        self.channels.remove(channel);
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[async_trait]
impl PushTransport for InProcessHub {
    async fn send(&self, channel: &ChannelAddress, payload: Bytes) -> TransportResult<()> {
        let Some(sender) = self.channels.get(channel) else {
            return Err(TransportError::ChannelClosed(channel.clone()));
        };
        // A dropped receiver means the peer went away without a close.
        sender
            .send(payload)
            .map_err(|_| TransportError::ChannelClosed(channel.clone()))
    }
}
