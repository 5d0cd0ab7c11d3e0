use crate::{InternalPacket, ProtocolError, ProtocolResult};
use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::trace;

/// Where encoded outbound packets go. Implemented by the host's connection layer.
pub trait PacketSink: Send + Sync {
    fn send_packet(&self, name: &'static str, payload: Bytes) -> ProtocolResult<()>;
}

/// The host's per-player handler for decoded inbound packets.
pub trait PlayerSession: Send + Sync {
    fn receive_packet(&self, packet: InternalPacket) -> ProtocolResult<()>;
}

/// An encoded packet body queued by a [`ChannelSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingPacket {
    pub name: &'static str,
    pub payload: Bytes,
}

/// A [`PacketSink`] that forwards packets into an unbounded tokio channel,
/// for a writer task to drain.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<OutgoingPacket>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OutgoingPacket>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl PacketSink for ChannelSink {
    fn send_packet(&self, name: &'static str, payload: Bytes) -> ProtocolResult<()> {
        trace!(packet = name, bytes = payload.len(), "queue");
        self.tx
            .send(OutgoingPacket { name, payload })
            .map_err(|_| ProtocolError::Transport("packet channel closed".into()))
    }
}
