use lodestone_buffer::BufferError;
use lodestone_nbt::NbtError;
use lodestone_types::ChunkPos;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error(transparent)]
    Nbt(#[from] NbtError),
    #[error("Unknown block type: {0}")]
    UnknownBlockType(i32),
    #[error("Unknown block name: {0}")]
    UnknownBlockName(String),
    #[error("Invalid block data: type {block_type}, metadata {metadata}")]
    InvalidBlockData { block_type: i32, metadata: i32 },
    #[error("Invalid {kind} value: {value}")]
    InvalidEnumValue { kind: &'static str, value: i32 },
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: i32 },
    #[error("Block position is in chunk {found:?}, expected {expected:?}")]
    WrongChunk { expected: ChunkPos, found: ChunkPos },
    #[error("Unsupported protocol version: {0}")]
    UnsupportedProtocolVersion(i32),
    #[error("{packet} is in {active} mode and cannot write the other variant")]
    InactiveVariant {
        packet: &'static str,
        active: &'static str,
    },
    #[error("{packet} has no packet id in protocol {protocol}")]
    UnsupportedPacket { packet: &'static str, protocol: i32 },
    #[error("Failed to decode {packet}: {source}")]
    PacketDecodeFailure {
        packet: &'static str,
        #[source]
        source: Box<ProtocolError>,
    },
    #[error("Transport error: {0}")]
    Transport(String),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
