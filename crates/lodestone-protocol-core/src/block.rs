use crate::{ProtocolError, ProtocolResult};
use lodestone_data::{legacy_block_exists_in, legacy_block_id, legacy_block_name};
use lodestone_types::{BlockPos, ChunkPos, ProtocolVersion};

/// Highest metadata value that fits in the low nibble of a block id.
pub const MAX_METADATA: i32 = 0xF;

/// Lookup of the block types a game release knows about.
pub trait BlockRegistry {
    fn contains(&self, block_type: i32) -> bool;

    fn name(&self, block_type: i32) -> Option<&'static str>;

    fn block_type(&self, name: &str) -> Option<i32>;
}

/// The pre-flattening numeric block registry, restricted to one release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyBlockRegistry {
    version: ProtocolVersion,
}

impl LegacyBlockRegistry {
    pub fn for_version(version: ProtocolVersion) -> Self {
        Self { version }
    }

    /// Registry of the newest supported release.
    pub fn latest() -> Self {
        Self::for_version(ProtocolVersion::V1_12_2)
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }
}

impl Default for LegacyBlockRegistry {
    fn default() -> Self {
        Self::latest()
    }
}

impl BlockRegistry for LegacyBlockRegistry {
    fn contains(&self, block_type: i32) -> bool {
        legacy_block_exists_in(block_type, self.version.protocol())
    }

    fn name(&self, block_type: i32) -> Option<&'static str> {
        if self.contains(block_type) {
            legacy_block_name(block_type)
        } else {
            None
        }
    }

    fn block_type(&self, name: &str) -> Option<i32> {
        legacy_block_id(name).filter(|&id| self.contains(id))
    }
}

/// A block type with its 4-bit metadata, packed on the wire as `(type << 4) | meta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockData {
    block_type: i32,
    metadata: u8,
}

impl BlockData {
    pub const AIR: BlockData = BlockData {
        block_type: 0,
        metadata: 0,
    };

    /// Validate against the newest registry.
    pub fn new(block_type: i32, metadata: i32) -> ProtocolResult<Self> {
        Self::new_in(block_type, metadata, &LegacyBlockRegistry::latest())
    }

    pub fn new_in(
        block_type: i32,
        metadata: i32,
        registry: &impl BlockRegistry,
    ) -> ProtocolResult<Self> {
        if !(0..=MAX_METADATA).contains(&metadata) {
            return Err(ProtocolError::InvalidBlockData {
                block_type,
                metadata,
            });
        }
        if !registry.contains(block_type) {
            return Err(ProtocolError::UnknownBlockType(block_type));
        }
        Ok(Self {
            block_type,
            metadata: metadata as u8,
        })
    }

    /// Look a block up by registry name, e.g. `"wool"`.
    pub fn from_name(name: &str, metadata: i32) -> ProtocolResult<Self> {
        let registry = LegacyBlockRegistry::latest();
        let block_type = registry
            .block_type(name)
            .ok_or_else(|| ProtocolError::UnknownBlockName(name.to_owned()))?;
        Self::new_in(block_type, metadata, &registry)
    }

    pub fn from_id(id: i32) -> ProtocolResult<Self> {
        Self::from_id_in(id, &LegacyBlockRegistry::latest())
    }

    pub fn from_id_in(id: i32, registry: &impl BlockRegistry) -> ProtocolResult<Self> {
        Self::new_in(id >> 4, id & MAX_METADATA, registry)
    }

    pub fn to_id(&self) -> i32 {
        (self.block_type << 4) | self.metadata as i32
    }

    pub fn block_type(&self) -> i32 {
        self.block_type
    }

    pub fn metadata(&self) -> u8 {
        self.metadata
    }

    pub fn name(&self) -> Option<&'static str> {
        legacy_block_name(self.block_type)
    }
}

impl Default for BlockData {
    fn default() -> Self {
        BlockData::AIR
    }
}

/// One entry of a multi block change: a position inside a chunk column and its new block.
///
/// The offset packs `x` into bits 12-15, `z` into bits 8-11 and `y` into bits 0-7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockChangeRecord {
    offset: u16,
    block: BlockData,
}

impl BlockChangeRecord {
    pub fn new(local_x: u8, y: u8, local_z: u8, block: BlockData) -> ProtocolResult<Self> {
        if local_x > 0xF {
            return Err(ProtocolError::OutOfRange {
                field: "local x",
                value: local_x as i32,
            });
        }
        if local_z > 0xF {
            return Err(ProtocolError::OutOfRange {
                field: "local z",
                value: local_z as i32,
            });
        }
        let offset = (local_x as u16) << 12 | (local_z as u16) << 8 | y as u16;
        Ok(Self { offset, block })
    }

    /// Build a record for a world position, which must lie inside `chunk`.
    pub fn at(pos: BlockPos, chunk: ChunkPos, block: BlockData) -> ProtocolResult<Self> {
        let found = pos.chunk_pos();
        if found != chunk {
            return Err(ProtocolError::WrongChunk {
                expected: chunk,
                found,
            });
        }
        if !(0..=0xFF).contains(&pos.y) {
            return Err(ProtocolError::OutOfRange {
                field: "y",
                value: pos.y,
            });
        }
        Self::new((pos.x & 0xF) as u8, pos.y as u8, (pos.z & 0xF) as u8, block)
    }

    pub fn from_offset(offset: i16, block: BlockData) -> Self {
        Self {
            offset: offset as u16,
            block,
        }
    }

    pub fn offset(&self) -> i16 {
        self.offset as i16
    }

    pub fn local_x(&self) -> u8 {
        (self.offset >> 12) as u8 & 0xF
    }

    pub fn local_z(&self) -> u8 {
        (self.offset >> 8) as u8 & 0xF
    }

    pub fn y(&self) -> u8 {
        (self.offset & 0xFF) as u8
    }

    pub fn block(&self) -> BlockData {
        self.block
    }

    pub fn position_in(&self, chunk: ChunkPos) -> BlockPos {
        chunk.block_at(self.local_x(), self.y(), self.local_z())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_id_bijection() {
        let registry = LegacyBlockRegistry::latest();
        let mut valid = 0;
        for id in 0..4096 {
            match BlockData::from_id(id) {
                Ok(block) => {
                    assert_eq!(block.to_id(), id);
                    assert!(registry.contains(id >> 4));
                    valid += 1;
                }
                Err(ProtocolError::UnknownBlockType(t)) => {
                    assert_eq!(t, id >> 4);
                    assert!(!registry.contains(t));
                }
                Err(e) => panic!("unexpected error for {}: {}", id, e),
            }
        }
        assert_eq!(valid, lodestone_data::LEGACY_BLOCK_COUNT * 16);
    }

    #[test]
    fn test_new_validates_metadata() {
        assert!(matches!(
            BlockData::new(1, 16),
            Err(ProtocolError::InvalidBlockData {
                block_type: 1,
                metadata: 16
            })
        ));
        assert!(BlockData::new(1, -1).is_err());
        let wool = BlockData::new(35, 14).unwrap();
        assert_eq!(wool.to_id(), 35 << 4 | 14);
        assert_eq!(wool.name(), Some("wool"));
    }

    #[test]
    fn test_unknown_type() {
        assert!(matches!(
            BlockData::new(253, 0),
            Err(ProtocolError::UnknownBlockType(253))
        ));
        assert!(matches!(
            BlockData::from_id(4096),
            Err(ProtocolError::UnknownBlockType(256))
        ));
    }

    #[test]
    fn test_registry_per_version() {
        let old = LegacyBlockRegistry::for_version(ProtocolVersion::V1_8);
        assert!(BlockData::from_id_in(251 << 4, &old).is_err()); // concrete
        assert!(BlockData::from_id_in(251 << 4, &LegacyBlockRegistry::latest()).is_ok());
        assert_eq!(old.name(251), None);
        assert_eq!(old.block_type("stone"), Some(1));
    }

    #[test]
    fn test_from_name() {
        let block = BlockData::from_name("stone", 3).unwrap();
        assert_eq!(block.block_type(), 1);
        assert_eq!(block.metadata(), 3);
        assert!(BlockData::from_name("not_a_block", 0).is_err());
    }

    #[test]
    fn test_record_offset_layout() {
        let record = BlockChangeRecord::new(15, 255, 15, BlockData::AIR).unwrap();
        assert_eq!(record.offset() as u16, 0xFFFF);
        assert_eq!(record.offset(), -1);

        let record = BlockChangeRecord::new(1, 64, 2, BlockData::AIR).unwrap();
        assert_eq!(record.offset(), 0x1240);
        assert_eq!((record.local_x(), record.y(), record.local_z()), (1, 64, 2));

        let zero = BlockChangeRecord::new(0, 0, 0, BlockData::AIR).unwrap();
        assert_eq!(zero.offset(), 0);

        assert!(BlockChangeRecord::new(16, 0, 0, BlockData::AIR).is_err());
        assert!(BlockChangeRecord::new(0, 0, 16, BlockData::AIR).is_err());
    }

    #[test]
    fn test_record_offset_roundtrip() {
        for x in 0..16u8 {
            for z in 0..16u8 {
                for y in [0u8, 1, 127, 128, 255] {
                    let record = BlockChangeRecord::new(x, y, z, BlockData::AIR).unwrap();
                    let back = BlockChangeRecord::from_offset(record.offset(), BlockData::AIR);
                    assert_eq!((back.local_x(), back.y(), back.local_z()), (x, y, z));
                }
            }
        }
    }

    #[test]
    fn test_record_world_position() {
        let chunk = ChunkPos::new(-1, 2);
        let pos = BlockPos::new(-3, 70, 37);
        let record = BlockChangeRecord::at(pos, chunk, BlockData::AIR).unwrap();
        assert_eq!(record.position_in(chunk), pos);
        assert!(BlockChangeRecord::at(BlockPos::new(0, 70, 37), chunk, BlockData::AIR).is_err());
        assert!(BlockChangeRecord::at(BlockPos::new(-3, 256, 37), chunk, BlockData::AIR).is_err());
    }

    #[test]
    fn test_record_wrong_chunk_reports_both_axes() {
        let chunk = ChunkPos::new(-1, 2);
        // x is inside the chunk, z is not
        let err =
            BlockChangeRecord::at(BlockPos::new(-3, 70, 5), chunk, BlockData::AIR).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::WrongChunk { expected, found }
                if expected == chunk && found == ChunkPos::new(-1, 0)
        ));
    }
}
