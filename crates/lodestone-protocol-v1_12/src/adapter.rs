use lodestone_buffer::PacketBuffer;
use lodestone_protocol_core::*;
use lodestone_types::ProtocolVersion;
use tracing::debug;

/// Protocol 340, release 1.12.2.
#[derive(Debug, Clone, Copy)]
pub struct V1_12Adapter {
    context: VersionContext,
}

impl V1_12Adapter {
    pub fn new() -> Self {
        Self {
            context: VersionContext::for_version(ProtocolVersion::V1_12_2),
        }
    }

    pub fn context(&self) -> &VersionContext {
        &self.context
    }
}

impl Default for V1_12Adapter {
    fn default() -> Self {
        Self::new()
    }
}

// Serverbound play packet ids
const IN_CLIENT_STATUS: i32 = 0x03;
const IN_TRANSACTION: i32 = 0x05;
const IN_KEEP_ALIVE: i32 = 0x0B;
const IN_HELD_ITEM_SLOT: i32 = 0x1A;
const IN_BLOCK_PLACE: i32 = 0x20;

// Clientbound play packet ids
const OUT_BLOCK_CHANGE: i32 = 0x0B;
const OUT_MULTI_BLOCK_CHANGE: i32 = 0x10;
const OUT_TRANSACTION: i32 = 0x11;
const OUT_EXPLOSION: i32 = 0x1C;
const OUT_KEEP_ALIVE: i32 = 0x1F;
const OUT_ENTITY_DESTROY: i32 = 0x32;
const OUT_HELD_ITEM_SLOT: i32 = 0x3A;

impl ProtocolAdapter for V1_12Adapter {
    fn protocol_version(&self) -> i32 {
        self.context.protocol()
    }

    fn decode_packet(
        &self,
        direction: Direction,
        id: i32,
        data: &mut PacketBuffer,
    ) -> ProtocolResult<InternalPacket> {
        let mark = data.mark();
        let packet = match direction {
            Direction::Inbound => decode_inbound(id, data)?,
            Direction::Outbound => decode_outbound(id, data)?,
        };
        if let Err(source) = self.context.check_packet(&packet) {
            data.reset_to(mark);
            return Err(ProtocolError::PacketDecodeFailure {
                packet: packet.name(),
                source: Box::new(source),
            });
        }
        Ok(packet)
    }

    fn packet_id(&self, packet: &InternalPacket) -> ProtocolResult<i32> {
        self.context.check_packet(packet)?;
        Ok(match packet {
            InternalPacket::InClientStatus(_) => IN_CLIENT_STATUS,
            InternalPacket::InTransaction(_) => IN_TRANSACTION,
            InternalPacket::InKeepAlive(_) => IN_KEEP_ALIVE,
            InternalPacket::InHeldItemSlot(_) => IN_HELD_ITEM_SLOT,
            InternalPacket::InBlockPlace(_) => IN_BLOCK_PLACE,
            InternalPacket::OutBlockChange(_) => OUT_BLOCK_CHANGE,
            InternalPacket::OutMultiBlockChange(_) => OUT_MULTI_BLOCK_CHANGE,
            InternalPacket::OutTransaction(_) => OUT_TRANSACTION,
            InternalPacket::OutExplosion(_) => OUT_EXPLOSION,
            InternalPacket::OutKeepAlive(_) => OUT_KEEP_ALIVE,
            InternalPacket::OutEntityDestroy(_) => OUT_ENTITY_DESTROY,
            InternalPacket::OutHeldItemSlot(_) => OUT_HELD_ITEM_SLOT,
            InternalPacket::Unknown { id, .. } => *id,
            other => {
                return Err(ProtocolError::UnsupportedPacket {
                    packet: other.name(),
                    protocol: self.protocol_version(),
                })
            }
        })
    }
}

fn decode_inbound(id: i32, data: &mut PacketBuffer) -> ProtocolResult<InternalPacket> {
    Ok(match id {
        IN_CLIENT_STATUS => decode::<PacketInClientStatus>(data)?.into(),
        IN_TRANSACTION => decode::<PacketInTransaction>(data)?.into(),
        IN_KEEP_ALIVE => decode::<PacketInKeepAlive>(data)?.into(),
        IN_HELD_ITEM_SLOT => decode::<PacketInHeldItemSlot>(data)?.into(),
        IN_BLOCK_PLACE => decode::<PacketInBlockPlace>(data)?.into(),
        _ => {
            debug!("Unknown inbound packet 0x{:02X}", id);
            InternalPacket::Unknown {
                direction: Direction::Inbound,
                id,
                data: data.read_remaining(),
            }
        }
    })
}

fn decode_outbound(id: i32, data: &mut PacketBuffer) -> ProtocolResult<InternalPacket> {
    Ok(match id {
        OUT_BLOCK_CHANGE => decode::<PacketOutBlockChange>(data)?.into(),
        OUT_MULTI_BLOCK_CHANGE => decode::<PacketOutMultiBlockChange>(data)?.into(),
        OUT_TRANSACTION => decode::<PacketOutTransaction>(data)?.into(),
        OUT_EXPLOSION => decode::<PacketOutExplosion>(data)?.into(),
        OUT_KEEP_ALIVE => decode::<PacketOutKeepAlive>(data)?.into(),
        OUT_ENTITY_DESTROY => decode::<PacketOutEntityDestroy>(data)?.into(),
        OUT_HELD_ITEM_SLOT => decode::<PacketOutHeldItemSlot>(data)?.into(),
        _ => {
            debug!("Unknown outbound packet 0x{:02X}", id);
            InternalPacket::Unknown {
                direction: Direction::Outbound,
                id,
                data: data.read_remaining(),
            }
        }
    })
}
