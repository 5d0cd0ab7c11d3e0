use super::{InboundPacket, Packet};
use crate::{read_slot, write_slot, Direction, ItemStack, ProtocolError, ProtocolResult};
use lodestone_buffer::PacketBuffer;
use lodestone_types::{BlockPos, Hand, ProtocolVersion, Vec3f};

/// Keep alive response, 1.12.2 and later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PacketInKeepAlive {
    pub id: i64,
}

impl Packet for PacketInKeepAlive {
    const NAME: &'static str = "PacketPlayInKeepAlive";
    const DIRECTION: Direction = Direction::Inbound;

    fn read(buf: &mut PacketBuffer) -> ProtocolResult<Self> {
        Ok(Self { id: buf.read_i64()? })
    }

    fn write(&self, buf: &mut PacketBuffer) -> ProtocolResult<()> {
        buf.write_i64(self.id);
        Ok(())
    }
}

impl InboundPacket for PacketInKeepAlive {}

/// Keep alive response before 1.12.2, with a VarInt id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PacketInKeepAliveLegacy {
    pub id: i32,
}

impl Packet for PacketInKeepAliveLegacy {
    const NAME: &'static str = "PacketPlayInKeepAlive";
    const DIRECTION: Direction = Direction::Inbound;

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

impl InboundPacket for PacketInKeepAliveLegacy {}

/// Window transaction confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PacketInTransaction {
    pub window_id: i8,
    pub action: i16,
    pub accepted: bool,
}

impl Packet for PacketInTransaction {
    const NAME: &'static str = "PacketPlayInTransaction";
    const DIRECTION: Direction = Direction::Inbound;

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

impl InboundPacket for PacketInTransaction {}

/// Client command sent from the death screen and the statistics menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientStatus {
    PerformRespawn = 0,
    RequestStats = 1,
    /// Only sent by 1.8 clients.
    OpenInventoryAchievement = 2,
}

impl ClientStatus {
    pub fn id(self) -> i32 {
        self as i32
    }

    /// Whether clients of `version` can send this status.
    pub fn is_supported_by(self, version: ProtocolVersion) -> bool {
        self != ClientStatus::OpenInventoryAchievement || !version.is_combat_or_later()
    }

    /// Accepts every status any supported release sends.
    pub fn from_id(id: i32) -> ProtocolResult<Self> {
        match id {
            0 => Ok(ClientStatus::PerformRespawn),
            1 => Ok(ClientStatus::RequestStats),
            2 => Ok(ClientStatus::OpenInventoryAchievement),
            _ => Err(ProtocolError::InvalidEnumValue {
                kind: "client status",
                value: id,
            }),
        }
    }

    pub fn from_id_for(id: i32, version: ProtocolVersion) -> ProtocolResult<Self> {
        match Self::from_id(id)? {
            status if status.is_supported_by(version) => Ok(status),
            _ => Err(ProtocolError::InvalidEnumValue {
                kind: "client status",
                value: id,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PacketInClientStatus {
    pub status: ClientStatus,
}

impl Packet for PacketInClientStatus {
    const NAME: &'static str = "PacketPlayInClientCommand";
    const DIRECTION: Direction = Direction::Inbound;

    fn read(buf: &mut PacketBuffer) -> ProtocolResult<Self> {
        Ok(Self {
            status: ClientStatus::from_id(buf.read_varint()?)?,
        })
    }

    fn write(&self, buf: &mut PacketBuffer) -> ProtocolResult<()> {
        buf.write_varint(self.status.id());
        Ok(())
    }
}

impl InboundPacket for PacketInClientStatus {}

/// Use item, 1.9 and later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PacketInBlockPlace {
    pub hand: Hand,
}

impl Packet for PacketInBlockPlace {
    const NAME: &'static str = "PacketPlayInBlockPlace";
    const DIRECTION: Direction = Direction::Inbound;

    fn read(buf: &mut PacketBuffer) -> ProtocolResult<Self> {
        let id = buf.read_varint()?;
        let hand = Hand::from_id(id).ok_or(ProtocolError::InvalidEnumValue {
            kind: "hand",
            value: id,
        })?;
        Ok(Self { hand })
    }

    fn write(&self, buf: &mut PacketBuffer) -> ProtocolResult<()> {
        buf.write_varint(self.hand.id());
        Ok(())
    }
}

impl InboundPacket for PacketInBlockPlace {}

/// 1.8 block placement. The cursor is where on the face the player clicked,
/// in sixteenths of a block, exactly as it travels on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct PacketInBlockPlaceLegacy {
    pub position: BlockPos,
    pub direction: i8,
    pub item: Option<ItemStack>,
    pub cursor_x: u8,
    pub cursor_y: u8,
    pub cursor_z: u8,
}

fn cursor_sixteenths(field: &'static str, value: f32) -> ProtocolResult<u8> {
    let scaled = value * 16.0;
    if !scaled.is_finite() || scaled.fract() != 0.0 || !(0.0..=255.0).contains(&scaled) {
        return Err(ProtocolError::OutOfRange {
            field,
            value: scaled as i32,
        });
    }
    Ok(scaled as u8)
}

impl PacketInBlockPlaceLegacy {
    /// Each cursor coordinate must be a whole number of sixteenths in `0.0..=15.9375`.
    pub fn new(
        position: BlockPos,
        direction: i8,
        item: Option<ItemStack>,
        cursor: Vec3f,
    ) -> ProtocolResult<Self> {
        Ok(Self {
            position,
            direction,
            item,
            cursor_x: cursor_sixteenths("cursor x", cursor.x)?,
            cursor_y: cursor_sixteenths("cursor y", cursor.y)?,
            cursor_z: cursor_sixteenths("cursor z", cursor.z)?,
        })
    }

    /// The cursor in blocks.
    pub fn cursor(&self) -> Vec3f {
        Vec3f::new(
            self.cursor_x as f32 / 16.0,
            self.cursor_y as f32 / 16.0,
            self.cursor_z as f32 / 16.0,
        )
    }
}

impl Packet for PacketInBlockPlaceLegacy {
    const NAME: &'static str = "PacketPlayInBlockPlace";
    const DIRECTION: Direction = Direction::Inbound;

    fn read(buf: &mut PacketBuffer) -> ProtocolResult<Self> {
        Ok(Self {
            position: buf.read_block_pos()?,
            direction: buf.read_i8()?,
            item: read_slot(buf)?,
            cursor_x: buf.read_u8()?,
            cursor_y: buf.read_u8()?,
            cursor_z: buf.read_u8()?,
        })
    }

    fn write(&self, buf: &mut PacketBuffer) -> ProtocolResult<()> {
        buf.write_block_pos(&self.position);
        buf.write_i8(self.direction);
        write_slot(buf, self.item.as_ref())?;
        buf.write_u8(self.cursor_x);
        buf.write_u8(self.cursor_y);
        buf.write_u8(self.cursor_z);
        Ok(())
    }
}

impl InboundPacket for PacketInBlockPlaceLegacy {}

/// Hotbar selection change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PacketInHeldItemSlot {
    pub slot: i16,
}

impl Packet for PacketInHeldItemSlot {
    const NAME: &'static str = "PacketPlayInHeldItemSlot";
    const DIRECTION: Direction = Direction::Inbound;

    fn read(buf: &mut PacketBuffer) -> ProtocolResult<Self> {
        Ok(Self {
            slot: buf.read_i16()?,
        })
    }

    fn write(&self, buf: &mut PacketBuffer) -> ProtocolResult<()> {
        buf.write_i16(self.slot);
        Ok(())
    }
}

impl InboundPacket for PacketInHeldItemSlot {}
