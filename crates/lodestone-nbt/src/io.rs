use crate::{NamedTag, NbtError, NbtFormat, NbtResult, NbtType};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use lodestone_buffer::PacketBuffer;
use std::io::{Read, Write};
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Largest decompressed document accepted by [`from_gzip_bytes`] and the file readers.
pub const MAX_DECOMPRESSED_LEN: u64 = 64 * 1024 * 1024;

/// Returns true if the bytes start with the gzip magic number.
pub fn is_gzip(bytes: &[u8]) -> bool {
    bytes.starts_with(&GZIP_MAGIC)
}

/// Decode a named root tag from uncompressed bytes.
pub fn from_bytes(bytes: &[u8], format: NbtFormat) -> NbtResult<NamedTag> {
    let mut buf = PacketBuffer::from(bytes);
    NamedTag::read(&mut buf, format)?.ok_or(NbtError::UnexpectedRootType(NbtType::End))
}

/// Encode a named root tag to uncompressed bytes.
pub fn to_bytes(tag: &NamedTag, format: NbtFormat) -> NbtResult<Vec<u8>> {
    let mut buf = PacketBuffer::new();
    tag.write(&mut buf, format)?;
    Ok(buf.to_vec())
}

pub fn from_gzip_bytes(bytes: &[u8], format: NbtFormat) -> NbtResult<NamedTag> {
    from_gzip_bytes_limited(bytes, format, MAX_DECOMPRESSED_LEN)
}

/// Like [`from_gzip_bytes`], failing once more than `limit` bytes come out of the decoder.
pub fn from_gzip_bytes_limited(bytes: &[u8], format: NbtFormat, limit: u64) -> NbtResult<NamedTag> {
    let mut out = Vec::new();
    GzDecoder::new(bytes)
        .take(limit.saturating_add(1))
        .read_to_end(&mut out)?;
    if out.len() as u64 > limit {
        return Err(NbtError::DecompressedTooLarge { limit });
    }
    from_bytes(&out, format)
}

pub fn to_gzip_bytes(tag: &NamedTag, format: NbtFormat) -> NbtResult<Vec<u8>> {
    let raw = to_bytes(tag, format)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw)?;
    Ok(encoder.finish()?)
}

/// Read an NBT file, decompressing it first if it is gzipped.
pub fn read_file(path: impl AsRef<Path>, format: NbtFormat) -> NbtResult<NamedTag> {
    let bytes = std::fs::read(path)?;
    if is_gzip(&bytes) {
        from_gzip_bytes(&bytes, format)
    } else {
        from_bytes(&bytes, format)
    }
}

pub fn read_gzip_file(path: impl AsRef<Path>, format: NbtFormat) -> NbtResult<NamedTag> {
    let bytes = std::fs::read(path)?;
    from_gzip_bytes(&bytes, format)
}

pub fn write_gzip_file(path: impl AsRef<Path>, tag: &NamedTag, format: NbtFormat) -> NbtResult<()> {
    let bytes = to_gzip_bytes(tag, format)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nbt_compound;

    fn sample() -> NamedTag {
        NamedTag::new(
            "hello world",
            nbt_compound! { "name" => "Bananrama", "level" => 3 },
        )
    }

    #[test]
    fn test_gzip_roundtrip() {
        let bytes = to_gzip_bytes(&sample(), NbtFormat::JAVA).unwrap();
        assert!(is_gzip(&bytes));
        assert_eq!(from_gzip_bytes(&bytes, NbtFormat::JAVA).unwrap(), sample());
    }

    #[test]
    fn test_gzip_decompressed_size_is_capped() {
        let bytes = to_gzip_bytes(&sample(), NbtFormat::JAVA).unwrap();
        let raw_len = to_bytes(&sample(), NbtFormat::JAVA).unwrap().len() as u64;
        assert_eq!(
            from_gzip_bytes_limited(&bytes, NbtFormat::JAVA, raw_len).unwrap(),
            sample()
        );
        assert!(matches!(
            from_gzip_bytes_limited(&bytes, NbtFormat::JAVA, raw_len - 1),
            Err(NbtError::DecompressedTooLarge { limit }) if limit == raw_len - 1
        ));

        // a megabyte of zeros compresses to about a kilobyte
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&vec![0u8; 1 << 20]).unwrap();
        let bomb = encoder.finish().unwrap();
        assert!(matches!(
            from_gzip_bytes_limited(&bomb, NbtFormat::JAVA, 4096),
            Err(NbtError::DecompressedTooLarge { limit: 4096 })
        ));
    }

    #[test]
    fn test_file_autodetect() {
        let dir = tempfile::tempdir().unwrap();
        let gz = dir.path().join("level.dat");
        write_gzip_file(&gz, &sample(), NbtFormat::JAVA).unwrap();
        assert_eq!(read_file(&gz, NbtFormat::JAVA).unwrap(), sample());
        assert_eq!(read_gzip_file(&gz, NbtFormat::JAVA).unwrap(), sample());

        let raw = dir.path().join("raw.nbt");
        std::fs::write(&raw, to_bytes(&sample(), NbtFormat::JAVA).unwrap()).unwrap();
        assert_eq!(read_file(&raw, NbtFormat::JAVA).unwrap(), sample());
    }

    #[test]
    fn test_empty_root_is_an_error() {
        assert!(matches!(
            from_bytes(&[0x00], NbtFormat::JAVA),
            Err(NbtError::UnexpectedRootType(NbtType::End))
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_file(dir.path().join("nope"), NbtFormat::JAVA),
            Err(NbtError::Io(_))
        ));
    }
}
