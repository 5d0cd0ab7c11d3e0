use crate::NbtType;
use lodestone_buffer::BufferError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NbtError {
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error("Unknown NBT tag type: {0}")]
    UnknownTagType(u8),
    #[error("Cannot add {found} to a list of {expected}")]
    TypeMismatch { expected: NbtType, found: NbtType },
    #[error("List of {len} elements has no element type")]
    MissingListType { len: usize },
    #[error("Index {index} out of bounds for list of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("NBT nested deeper than {0} levels")]
    DepthLimit(usize),
    #[error("Root tag is {0}, expected TAG_Compound")]
    UnexpectedRootType(NbtType),
    #[error("Decompressed NBT exceeds {limit} bytes")]
    DecompressedTooLarge { limit: u64 },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type NbtResult<T> = Result<T, NbtError>;
