use super::{OutboundPacket, Packet};
use crate::{BlockChangeRecord, BlockData, Direction, ProtocolError, ProtocolResult};
use lodestone_buffer::{BufferError, PacketBuffer};
use lodestone_types::{BlockPos, ChunkPos, Vec3f};

/// Keep alive, 1.12.2 and later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PacketOutKeepAlive {
    pub id: i64,
}

impl Packet for PacketOutKeepAlive {
    const NAME: &'static str = "PacketPlayOutKeepAlive";
    const DIRECTION: Direction = Direction::Outbound;

    fn read(buf: &mut PacketBuffer) -> ProtocolResult<Self> {
        Ok(Self { id: buf.read_i64()? })
    }

    fn write(&self, buf: &mut PacketBuffer) -> ProtocolResult<()> {
        buf.write_i64(self.id);
        Ok(())
    }
}

impl OutboundPacket for PacketOutKeepAlive {}

/// Keep alive before 1.12.2, with a VarInt id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PacketOutKeepAliveLegacy {
    pub id: i32,
}

impl Packet for PacketOutKeepAliveLegacy {
    const NAME: &'static str = "PacketPlayOutKeepAlive";
    const DIRECTION: Direction = Direction::Outbound;

    fn read(buf: &mut PacketBuffer) -> ProtocolResult<Self> {
        Ok(Self {
            id: buf.read_varint()?,
        })
    }

    fn write(&self, buf: &mut PacketBuffer) -> ProtocolResult<()> {
        buf.write_varint(self.id);
        Ok(())
    }
}

impl OutboundPacket for PacketOutKeepAliveLegacy {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PacketOutTransaction {
    pub window_id: i8,
    pub action: i16,
    pub accepted: bool,
}

impl Packet for PacketOutTransaction {
    const NAME: &'static str = "PacketPlayOutTransaction";
    const DIRECTION: Direction = Direction::Outbound;

    fn read(buf: &mut PacketBuffer) -> ProtocolResult<Self> {
        Ok(Self {
            window_id: buf.read_i8()?,
            action: buf.read_i16()?,
            accepted: buf.read_bool()?,
        })
    }

    fn write(&self, buf: &mut PacketBuffer) -> ProtocolResult<()> {
        buf.write_i8(self.window_id);
        buf.write_i16(self.action);
        buf.write_bool(self.accepted);
        Ok(())
    }
}

impl OutboundPacket for PacketOutTransaction {}

/// Single block update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PacketOutBlockChange {
    pub position: BlockPos,
    pub block: BlockData,
}

impl Packet for PacketOutBlockChange {
    const NAME: &'static str = "PacketPlayOutBlockChange";
    const DIRECTION: Direction = Direction::Outbound;

    fn read(buf: &mut PacketBuffer) -> ProtocolResult<Self> {
        Ok(Self {
            position: buf.read_block_pos()?,
            block: BlockData::from_id(buf.read_varint()?)?,
        })
    }

    fn write(&self, buf: &mut PacketBuffer) -> ProtocolResult<()> {
        buf.write_block_pos(&self.position);
        buf.write_varint(self.block.to_id());
        Ok(())
    }
}

impl OutboundPacket for PacketOutBlockChange {}

/// Several block updates inside one chunk column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PacketOutMultiBlockChange {
    pub chunk_x: i32,
    pub chunk_z: i32,
    pub records: Vec<BlockChangeRecord>,
}

impl PacketOutMultiBlockChange {
    pub fn new(chunk: ChunkPos, records: Vec<BlockChangeRecord>) -> Self {
        Self {
            chunk_x: chunk.x,
            chunk_z: chunk.z,
            records,
        }
    }

    pub fn chunk(&self) -> ChunkPos {
        ChunkPos::new(self.chunk_x, self.chunk_z)
    }
}

impl Packet for PacketOutMultiBlockChange {
    const NAME: &'static str = "PacketPlayOutMultiBlockChange";
    const DIRECTION: Direction = Direction::Outbound;

    fn read(buf: &mut PacketBuffer) -> ProtocolResult<Self> {
        let chunk_x = buf.read_i32()?;
        let chunk_z = buf.read_i32()?;
        let count = buf.read_varint()?;
        let count = check_count(buf, count, 3)?;
        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            let offset = buf.read_i16()?;
            let block = BlockData::from_id(buf.read_varint()?)?;
            records.push(BlockChangeRecord::from_offset(offset, block));
        }
        Ok(Self {
            chunk_x,
            chunk_z,
            records,
        })
    }

    fn write(&self, buf: &mut PacketBuffer) -> ProtocolResult<()> {
        buf.write_i32(self.chunk_x);
        buf.write_i32(self.chunk_z);
        buf.write_varint(count_to_i32(self.records.len())?);
        for record in &self.records {
            buf.write_i16(record.offset());
            buf.write_varint(record.block().to_id());
        }
        Ok(())
    }
}

impl OutboundPacket for PacketOutMultiBlockChange {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PacketOutEntityDestroy {
    pub entity_ids: Vec<i32>,
}

impl Packet for PacketOutEntityDestroy {
    const NAME: &'static str = "PacketPlayOutEntityDestroy";
    const DIRECTION: Direction = Direction::Outbound;

    fn read(buf: &mut PacketBuffer) -> ProtocolResult<Self> {
        Ok(Self {
            entity_ids: buf.read_varint_array()?,
        })
    }

    fn write(&self, buf: &mut PacketBuffer) -> ProtocolResult<()> {
        buf.write_varint_array(&self.entity_ids)?;
        Ok(())
    }
}

impl OutboundPacket for PacketOutEntityDestroy {}

/// Explosion effect. Records are block offsets relative to the center.
#[derive(Debug, Clone, PartialEq)]
pub struct PacketOutExplosion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub radius: f32,
    pub records: Vec<(i8, i8, i8)>,
    pub motion: Vec3f,
}

impl Packet for PacketOutExplosion {
    const NAME: &'static str = "PacketPlayOutExplosion";
    const DIRECTION: Direction = Direction::Outbound;

    fn read(buf: &mut PacketBuffer) -> ProtocolResult<Self> {
        let x = buf.read_f32()?;
        let y = buf.read_f32()?;
        let z = buf.read_f32()?;
        let radius = buf.read_f32()?;
        let count = buf.read_i32()?;
        let count = check_count(buf, count, 3)?;
        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            records.push((buf.read_i8()?, buf.read_i8()?, buf.read_i8()?));
        }
        let motion = Vec3f::new(buf.read_f32()?, buf.read_f32()?, buf.read_f32()?);
        Ok(Self {
            x,
            y,
            z,
            radius,
            records,
            motion,
        })
    }

    fn write(&self, buf: &mut PacketBuffer) -> ProtocolResult<()> {
        buf.write_f32(self.x);
        buf.write_f32(self.y);
        buf.write_f32(self.z);
        buf.write_f32(self.radius);
        buf.write_i32(count_to_i32(self.records.len())?);
        for &(dx, dy, dz) in &self.records {
            buf.write_i8(dx);
            buf.write_i8(dy);
            buf.write_i8(dz);
        }
        buf.write_f32(self.motion.x);
        buf.write_f32(self.motion.y);
        buf.write_f32(self.motion.z);
        Ok(())
    }
}

impl OutboundPacket for PacketOutExplosion {}

/// Forces the client's hotbar selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PacketOutHeldItemSlot {
    pub slot: i8,
}

impl PacketOutHeldItemSlot {
    /// `slot` must be a hotbar index, 0 through 8.
    pub fn new(slot: i32) -> ProtocolResult<Self> {
        if !(0..=8).contains(&slot) {
            return Err(ProtocolError::OutOfRange {
                field: "held item slot",
                value: slot,
            });
        }
        Ok(Self { slot: slot as i8 })
    }
}

impl Packet for PacketOutHeldItemSlot {
    const NAME: &'static str = "PacketPlayOutHeldItemSlot";
    const DIRECTION: Direction = Direction::Outbound;

    fn read(buf: &mut PacketBuffer) -> ProtocolResult<Self> {
        Ok(Self {
            slot: buf.read_i8()?,
        })
    }

    fn write(&self, buf: &mut PacketBuffer) -> ProtocolResult<()> {
        buf.write_i8(self.slot);
        Ok(())
    }
}

impl OutboundPacket for PacketOutHeldItemSlot {}

/// Check an element count against the unread bytes before allocating.
fn check_count(buf: &PacketBuffer, count: i32, min_element_size: usize) -> ProtocolResult<usize> {
    if count < 0 {
        return Err(BufferError::NegativeLength(count).into());
    }
    let count = count as usize;
    let needed = count.saturating_mul(min_element_size);
    if needed > buf.remaining() {
        return Err(BufferError::BufferUnderrun {
            needed,
            remaining: buf.remaining(),
        }
        .into());
    }
    Ok(count)
}

fn count_to_i32(len: usize) -> ProtocolResult<i32> {
    i32::try_from(len).map_err(|_| {
        BufferError::ArrayTooLong {
            len,
            max: i32::MAX as usize,
        }
        .into()
    })
}
