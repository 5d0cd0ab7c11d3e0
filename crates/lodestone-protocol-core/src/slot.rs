use crate::ProtocolResult;
use lodestone_buffer::PacketBuffer;
use lodestone_nbt::{NamedTag, NbtCompound, NbtFormat};

/// An item stack in the pre-1.13 slot format.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemStack {
    pub item_id: i16,
    pub count: i8,
    pub damage: i16,
    pub tag: Option<NbtCompound>,
}

impl ItemStack {
    pub fn new(item_id: i16, count: i8, damage: i16) -> Self {
        Self {
            item_id,
            count,
            damage,
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: NbtCompound) -> Self {
        self.tag = Some(tag);
        self
    }
}

/// Read a slot: `i16 id` (-1 for empty), then `i8 count, i16 damage, root NBT`
/// where a single End byte means no tag.
pub fn read_slot(buf: &mut PacketBuffer) -> ProtocolResult<Option<ItemStack>> {
    let item_id = buf.read_i16()?;
    if item_id == -1 {
        return Ok(None);
    }
    let count = buf.read_i8()?;
    let damage = buf.read_i16()?;
    let tag = match NamedTag::read(buf, NbtFormat::JAVA)? {
        Some(root) => Some(root.into_compound()?),
        None => None,
    };
    Ok(Some(ItemStack {
        item_id,
        count,
        damage,
        tag,
    }))
}

pub fn write_slot(buf: &mut PacketBuffer, item: Option<&ItemStack>) -> ProtocolResult<()> {
    let Some(item) = item else {
        buf.write_i16(-1);
        return Ok(());
    };
    buf.write_i16(item.item_id);
    buf.write_i8(item.count);
    buf.write_i16(item.damage);
    match &item.tag {
        Some(tag) => NamedTag::new("", tag.clone()).write(buf, NbtFormat::JAVA)?,
        None => NamedTag::write_optional(None, buf, NbtFormat::JAVA)?,
    }
    Ok(())
}
