use lodestone_buffer::PacketBuffer;
use lodestone_protocol_core::*;
use lodestone_types::ProtocolVersion;
use tracing::debug;

/// Protocol 47, releases 1.8 through 1.8.9.
#[derive(Debug, Clone, Copy)]
pub struct V1_8Adapter {
    context: VersionContext,
}

impl V1_8Adapter {
    pub fn new() -> Self {
        Self {
            context: VersionContext::for_version(ProtocolVersion::V1_8),
        }
    }

    pub fn context(&self) -> &VersionContext {
        &self.context
    }
}

impl Default for V1_8Adapter {
    fn default() -> Self {
        Self::new()
    }
}

// Serverbound play packet ids
const IN_KEEP_ALIVE: i32 = 0x00;
const IN_BLOCK_PLACE: i32 = 0x08;
const IN_HELD_ITEM_SLOT: i32 = 0x09;
const IN_TRANSACTION: i32 = 0x0F;
const IN_CLIENT_STATUS: i32 = 0x16;

// Clientbound play packet ids
const OUT_KEEP_ALIVE: i32 = 0x00;
const OUT_HELD_ITEM_SLOT: i32 = 0x09;
const OUT_ENTITY_DESTROY: i32 = 0x13;
const OUT_MULTI_BLOCK_CHANGE: i32 = 0x22;
const OUT_BLOCK_CHANGE: i32 = 0x23;
const OUT_EXPLOSION: i32 = 0x27;
const OUT_TRANSACTION: i32 = 0x32;

impl ProtocolAdapter for V1_8Adapter {
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
            InternalPacket::InKeepAliveLegacy(_) => IN_KEEP_ALIVE,
            InternalPacket::InBlockPlaceLegacy(_) => IN_BLOCK_PLACE,
            InternalPacket::InHeldItemSlot(_) => IN_HELD_ITEM_SLOT,
            InternalPacket::InTransaction(_) => IN_TRANSACTION,
            InternalPacket::InClientStatus(_) => IN_CLIENT_STATUS,
            InternalPacket::OutKeepAliveLegacy(_) => OUT_KEEP_ALIVE,
            InternalPacket::OutHeldItemSlot(_) => OUT_HELD_ITEM_SLOT,
            InternalPacket::OutEntityDestroy(_) => OUT_ENTITY_DESTROY,
            InternalPacket::OutMultiBlockChange(_) => OUT_MULTI_BLOCK_CHANGE,
            InternalPacket::OutBlockChange(_) => OUT_BLOCK_CHANGE,
            InternalPacket::OutExplosion(_) => OUT_EXPLOSION,
            InternalPacket::OutTransaction(_) => OUT_TRANSACTION,
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
        IN_KEEP_ALIVE => decode::<PacketInKeepAliveLegacy>(data)?.into(),
        IN_BLOCK_PLACE => decode::<PacketInBlockPlaceLegacy>(data)?.into(),
        IN_HELD_ITEM_SLOT => decode::<PacketInHeldItemSlot>(data)?.into(),
        IN_TRANSACTION => decode::<PacketInTransaction>(data)?.into(),
        IN_CLIENT_STATUS => decode::<PacketInClientStatus>(data)?.into(),
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
        OUT_KEEP_ALIVE => decode::<PacketOutKeepAliveLegacy>(data)?.into(),
        OUT_HELD_ITEM_SLOT => decode::<PacketOutHeldItemSlot>(data)?.into(),
        OUT_ENTITY_DESTROY => decode::<PacketOutEntityDestroy>(data)?.into(),
        OUT_MULTI_BLOCK_CHANGE => decode::<PacketOutMultiBlockChange>(data)?.into(),
        OUT_BLOCK_CHANGE => decode::<PacketOutBlockChange>(data)?.into(),
        OUT_EXPLOSION => decode::<PacketOutExplosion>(data)?.into(),
        OUT_TRANSACTION => decode::<PacketOutTransaction>(data)?.into(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use lodestone_types::{BlockPos, ChunkPos, Vec3f};

    #[test]
    fn test_keep_alive_is_varint() {
        let adapter = V1_8Adapter::new();
        let mut buf = PacketBuffer::from(vec![0x00, 0xAC, 0x02]);
        let packet = adapter.decode_frame(Direction::Inbound, &mut buf).unwrap();
        assert_eq!(packet, InternalPacket::from(PacketInKeepAliveLegacy { id: 300 }));
        assert!(!buf.has_remaining());
    }

    #[test]
    fn test_every_modeled_packet_roundtrips() {
        let adapter = V1_8Adapter::new();
        let stone = BlockData::new(1, 0).unwrap();
        let packets: Vec<InternalPacket> = vec![
            PacketInKeepAliveLegacy { id: 9 }.into(),
            PacketInBlockPlaceLegacy {
                position: BlockPos::new(4, 5, 6),
                direction: 2,
                item: Some(ItemStack::new(1, 1, 0)),
                cursor_x: 4,
                cursor_y: 8,
                cursor_z: 12,
            }
            .into(),
            PacketInHeldItemSlot { slot: 3 }.into(),
            PacketInTransaction {
                window_id: 1,
                action: 1,
                accepted: true,
            }
            .into(),
            PacketInClientStatus {
                status: ClientStatus::OpenInventoryAchievement,
            }
            .into(),
            PacketOutKeepAliveLegacy { id: 77 }.into(),
            PacketOutHeldItemSlot::new(8).unwrap().into(),
            PacketOutEntityDestroy {
                entity_ids: vec![1],
            }
            .into(),
            PacketOutMultiBlockChange::new(
                ChunkPos::new(0, 0),
                vec![BlockChangeRecord::new(1, 2, 3, stone).unwrap()],
            )
            .into(),
            PacketOutBlockChange {
                position: BlockPos::new(0, 0, 0),
                block: stone,
            }
            .into(),
            PacketOutExplosion {
                x: 0.0,
                y: 0.0,
                z: 0.0,
                radius: 1.0,
                records: vec![(1, 1, 1)],
                motion: Vec3f::default(),
            }
            .into(),
            PacketOutTransaction {
                window_id: 0,
                action: 0,
                accepted: true,
            }
            .into(),
        ];
        for packet in packets {
            let mut buf = adapter.encode_packet(&packet).unwrap();
            let back = adapter
                .decode_frame(packet.direction(), &mut buf)
                .unwrap();
            assert_eq!(back, packet, "{}", packet.name());
            assert!(!buf.has_remaining());
        }
    }

    #[test]
    fn test_ids_match_table() {
        let adapter = V1_8Adapter::new();
        let id = |p: InternalPacket| adapter.packet_id(&p).unwrap();
        assert_eq!(
            id(PacketInTransaction { window_id: 0, action: 0, accepted: false }.into()),
            0x0F
        );
        assert_eq!(
            id(PacketOutTransaction { window_id: 0, action: 0, accepted: false }.into()),
            0x32
        );
        assert_eq!(id(PacketOutEntityDestroy { entity_ids: vec![] }.into()), 0x13);
        assert_eq!(id(PacketOutHeldItemSlot { slot: 0 }.into()), 0x09);
    }

    #[test]
    fn test_modern_layouts_are_rejected() {
        let adapter = V1_8Adapter::new();
        for packet in [
            InternalPacket::from(PacketInKeepAlive { id: 1 }),
            InternalPacket::from(PacketInBlockPlace {
                hand: lodestone_types::Hand::Main,
            }),
            InternalPacket::from(PacketOutKeepAlive { id: 1 }),
        ] {
            assert!(matches!(
                adapter.packet_id(&packet),
                Err(ProtocolError::UnsupportedPacket { protocol: 47, .. })
            ));
        }
    }

    #[test]
    fn test_unknown_id_keeps_bytes() {
        let adapter = V1_8Adapter::new();
        let mut buf = PacketBuffer::from(vec![0x40, 0x01, 0x02, 0x03]);
        let packet = adapter.decode_frame(Direction::Inbound, &mut buf).unwrap();
        assert_eq!(
            packet,
            InternalPacket::Unknown {
                direction: Direction::Inbound,
                id: 0x40,
                data: vec![1, 2, 3],
            }
        );
    }

    #[test]
    fn test_blocks_from_later_releases_are_rejected() {
        let adapter = V1_8Adapter::new();
        let mut buf = PacketBuffer::new();
        buf.write_varint(0x23);
        buf.write_block_pos(&BlockPos::new(0, 64, 0));
        buf.write_varint(251 << 4);
        let err = adapter.decode_frame(Direction::Outbound, &mut buf).unwrap_err();
        let ProtocolError::PacketDecodeFailure { packet, source } = err else {
            panic!("expected a decode failure");
        };
        assert_eq!(packet, "PacketPlayOutBlockChange");
        assert!(matches!(*source, ProtocolError::UnknownBlockType(251)));
        assert_eq!(buf.position(), 0);

        let concrete = BlockData::new(251, 0).unwrap();
        let records = vec![BlockChangeRecord::new(0, 1, 0, concrete).unwrap()];
        let packet: InternalPacket =
            PacketOutMultiBlockChange::new(ChunkPos::new(2, 3), records).into();
        assert!(matches!(
            adapter.encode_packet(&packet),
            Err(ProtocolError::UnknownBlockType(251))
        ));
    }
}
