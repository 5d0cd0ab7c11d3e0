mod inbound;
mod outbound;

pub use inbound::*;
pub use outbound::*;

use crate::{Direction, PacketSink, PlayerSession, ProtocolError, ProtocolResult};
use lodestone_buffer::PacketBuffer;
use std::fmt;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{trace, warn};

/// A typed play-state packet. Struct field order is wire order.
pub trait Packet: Sized + fmt::Debug {
    /// Wire message identifier, e.g. `PacketPlayInTransaction`.
    const NAME: &'static str;
    const DIRECTION: Direction;

    /// Read the packet body. May leave the cursor mid-packet on error; use
    /// [`decode`] for an atomic read.
    fn read(buf: &mut PacketBuffer) -> ProtocolResult<Self>;

    fn write(&self, buf: &mut PacketBuffer) -> ProtocolResult<()>;
}

/// Decode one packet body. On failure the cursor is restored and the error
/// names the packet.
pub fn decode<P: Packet>(buf: &mut PacketBuffer) -> ProtocolResult<P> {
    let mark = buf.mark();
    match P::read(buf) {
        Ok(packet) => {
            trace!(packet = P::NAME, bytes = buf.position() - mark, "decoded");
            Ok(packet)
        }
        Err(e) => {
            buf.reset_to(mark);
            Err(ProtocolError::PacketDecodeFailure {
                packet: P::NAME,
                source: Box::new(e),
            })
        }
    }
}

/// Append one packet body. On failure nothing is left in `buf`.
pub fn encode_into<P: Packet>(packet: &P, buf: &mut PacketBuffer) -> ProtocolResult<()> {
    let start = buf.len();
    if let Err(e) = packet.write(buf) {
        buf.truncate(start);
        return Err(e);
    }
    trace!(packet = P::NAME, bytes = buf.len() - start, "encoded");
    Ok(())
}

pub fn encode<P: Packet>(packet: &P) -> ProtocolResult<PacketBuffer> {
    let mut buf = PacketBuffer::new();
    encode_into(packet, &mut buf)?;
    Ok(buf)
}

/// A client-to-server packet that can be handed to a player session.
pub trait InboundPacket: Packet + Clone + Into<InternalPacket> + Send + 'static {
    fn receive(&self, session: &dyn PlayerSession) -> ProtocolResult<()> {
        session.receive_packet(self.clone().into())
    }

    /// Run [`receive`](Self::receive) on the runtime's blocking pool.
    /// No ordering is guaranteed between two async receives.
    fn receive_async(
        self,
        session: Arc<dyn PlayerSession>,
        handle: &Handle,
    ) -> JoinHandle<ProtocolResult<()>> {
        handle.spawn_blocking(move || {
            let result = self.receive(session.as_ref());
            if let Err(e) = &result {
                warn!(packet = Self::NAME, "Async receive failed: {}", e);
            }
            result
        })
    }
}

/// A server-to-client packet that can be sent through a sink.
pub trait OutboundPacket: Packet {
    fn send(&self, sink: &dyn PacketSink) -> ProtocolResult<()> {
        let buf = encode(self)?;
        sink.send_packet(Self::NAME, buf.freeze())
    }
}

/// Version-independent packet representation.
/// Protocol adapters convert between wire format and these.
#[derive(Debug, Clone, PartialEq)]
pub enum InternalPacket {
    // === Inbound ===
    InKeepAlive(PacketInKeepAlive),
    InKeepAliveLegacy(PacketInKeepAliveLegacy),
    InTransaction(PacketInTransaction),
    InClientStatus(PacketInClientStatus),
    InBlockPlace(PacketInBlockPlace),
    InBlockPlaceLegacy(PacketInBlockPlaceLegacy),
    InHeldItemSlot(PacketInHeldItemSlot),

    // === Outbound ===
    OutKeepAlive(PacketOutKeepAlive),
    OutKeepAliveLegacy(PacketOutKeepAliveLegacy),
    OutTransaction(PacketOutTransaction),
    OutBlockChange(PacketOutBlockChange),
    OutMultiBlockChange(PacketOutMultiBlockChange),
    OutEntityDestroy(PacketOutEntityDestroy),
    OutExplosion(PacketOutExplosion),
    OutHeldItemSlot(PacketOutHeldItemSlot),

    /// A packet id the adapter does not model; the body is kept as-is.
    Unknown {
        direction: Direction,
        id: i32,
        data: Vec<u8>,
    },
}

macro_rules! internal_packets {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        impl InternalPacket {
            pub fn name(&self) -> &'static str {
                match self {
                    $(InternalPacket::$variant(_) => <$ty as Packet>::NAME,)*
                    InternalPacket::Unknown { .. } => "Unknown",
                }
            }

            pub fn direction(&self) -> Direction {
                match self {
                    $(InternalPacket::$variant(_) => <$ty as Packet>::DIRECTION,)*
                    InternalPacket::Unknown { direction, .. } => *direction,
                }
            }

            /// Write the packet body, without an id.
            pub fn write_body(&self, buf: &mut PacketBuffer) -> ProtocolResult<()> {
                match self {
                    $(InternalPacket::$variant(p) => encode_into(p, buf),)*
                    InternalPacket::Unknown { data, .. } => {
                        buf.write_bytes(data);
                        Ok(())
                    }
                }
            }
        }

        $(
            impl From<$ty> for InternalPacket {
                fn from(packet: $ty) -> Self {
                    InternalPacket::$variant(packet)
                }
            }
        )*
    };
}

internal_packets! {
    InKeepAlive(PacketInKeepAlive),
    InKeepAliveLegacy(PacketInKeepAliveLegacy),
    InTransaction(PacketInTransaction),
    InClientStatus(PacketInClientStatus),
    InBlockPlace(PacketInBlockPlace),
    InBlockPlaceLegacy(PacketInBlockPlaceLegacy),
    InHeldItemSlot(PacketInHeldItemSlot),
    OutKeepAlive(PacketOutKeepAlive),
    OutKeepAliveLegacy(PacketOutKeepAliveLegacy),
    OutTransaction(PacketOutTransaction),
    OutBlockChange(PacketOutBlockChange),
    OutMultiBlockChange(PacketOutMultiBlockChange),
    OutEntityDestroy(PacketOutEntityDestroy),
    OutExplosion(PacketOutExplosion),
    OutHeldItemSlot(PacketOutHeldItemSlot),
}
