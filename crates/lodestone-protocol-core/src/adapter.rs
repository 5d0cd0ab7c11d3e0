use crate::{Direction, InternalPacket, ProtocolResult};
use lodestone_buffer::PacketBuffer;

/// Trait for version-specific protocol adapters.
/// Each supported protocol number implements this trait.
pub trait ProtocolAdapter: Send + Sync {
    /// The protocol version number this adapter handles.
    fn protocol_version(&self) -> i32;

    /// Decode a packet body whose id has already been read.
    /// Ids the adapter does not model become [`InternalPacket::Unknown`].
    fn decode_packet(
        &self,
        direction: Direction,
        id: i32,
        data: &mut PacketBuffer,
    ) -> ProtocolResult<InternalPacket>;

    /// The wire id of `packet` in this protocol.
    fn packet_id(&self, packet: &InternalPacket) -> ProtocolResult<i32>;

    /// Decode a VarInt id followed by the packet body.
    fn decode_frame(
        &self,
        direction: Direction,
        data: &mut PacketBuffer,
    ) -> ProtocolResult<InternalPacket> {
        let mark = data.mark();
        let id = data.read_varint()?;
        self.decode_packet(direction, id, data).inspect_err(|_| data.reset_to(mark))
    }

    /// Encode a packet as a VarInt id followed by its body.
    fn encode_packet(&self, packet: &InternalPacket) -> ProtocolResult<PacketBuffer> {
        let mut buf = PacketBuffer::new();
        buf.write_varint(self.packet_id(packet)?);
        packet.write_body(&mut buf)?;
        Ok(buf)
    }
}
