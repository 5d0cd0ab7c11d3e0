use crate::{NamedTag, NbtCompound, NbtError, NbtList, NbtResult, NbtType, NbtValue};
use lodestone_buffer::{BufferError, PacketBuffer};
use serde::{Deserialize, Serialize};

/// Maximum nesting of lists and compounds accepted by the decoder.
pub const MAX_DEPTH: usize = 512;

/// How a string length or list count is prefixed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthPrefix {
    U16,
    I32,
    VarInt,
}

/// Length encodings for one NBT dialect. Byte and int arrays always use an i32 count.
///
/// Strings are read and written as standard UTF-8 in every format. Java writes
/// modified UTF-8, which encodes NUL as `C0 80` and characters outside the Basic
/// Multilingual Plane as surrogate pairs, so strings containing either will not
/// match a Java encoder byte for byte. Plain ASCII and other BMP text are identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NbtFormat {
    pub string_prefix: LengthPrefix,
    pub list_prefix: LengthPrefix,
}

impl NbtFormat {
    /// Standard Java Edition NBT: u16 string lengths, i32 list counts.
    pub const JAVA: NbtFormat = NbtFormat {
        string_prefix: LengthPrefix::U16,
        list_prefix: LengthPrefix::I32,
    };

    /// VarInt string lengths and list counts.
    pub const VARINT: NbtFormat = NbtFormat {
        string_prefix: LengthPrefix::VarInt,
        list_prefix: LengthPrefix::VarInt,
    };

    pub fn new(string_prefix: LengthPrefix, list_prefix: LengthPrefix) -> Self {
        Self {
            string_prefix,
            list_prefix,
        }
    }
}

impl Default for NbtFormat {
    fn default() -> Self {
        NbtFormat::JAVA
    }
}

fn read_length(buf: &mut PacketBuffer, prefix: LengthPrefix) -> NbtResult<usize> {
    let len = match prefix {
        LengthPrefix::U16 => return Ok(buf.read_u16()? as usize),
        LengthPrefix::I32 => buf.read_i32()?,
        LengthPrefix::VarInt => buf.read_varint()?,
    };
    if len < 0 {
        return Err(BufferError::NegativeLength(len).into());
    }
    Ok(len as usize)
}

fn write_length(buf: &mut PacketBuffer, prefix: LengthPrefix, len: usize) -> NbtResult<()> {
    match prefix {
        LengthPrefix::U16 => {
            let len = u16::try_from(len).map_err(|_| BufferError::StringTooLong {
                len,
                max: u16::MAX as usize,
            })?;
            buf.write_u16(len);
        }
        LengthPrefix::I32 | LengthPrefix::VarInt => {
            let len = i32::try_from(len).map_err(|_| BufferError::ArrayTooLong {
                len,
                max: i32::MAX as usize,
            })?;
            if prefix == LengthPrefix::I32 {
                buf.write_i32(len);
            } else {
                buf.write_varint(len);
            }
        }
    }
    Ok(())
}

/// Guard a count against the unread bytes before allocating for it.
fn check_count(buf: &PacketBuffer, count: usize, min_size: usize) -> NbtResult<()> {
    let needed = count.saturating_mul(min_size);
    if needed > buf.remaining() {
        return Err(BufferError::BufferUnderrun {
            needed,
            remaining: buf.remaining(),
        }
        .into());
    }
    Ok(())
}

fn read_string(buf: &mut PacketBuffer, format: NbtFormat) -> NbtResult<String> {
    let len = read_length(buf, format.string_prefix)?;
    let bytes = buf.read_bytes(len)?;
    String::from_utf8(bytes).map_err(|_| BufferError::InvalidUtf8.into())
}

fn write_string(buf: &mut PacketBuffer, s: &str, format: NbtFormat) -> NbtResult<()> {
    write_length(buf, format.string_prefix, s.len())?;
    buf.write_bytes(s.as_bytes());
    Ok(())
}

fn read_type(buf: &mut PacketBuffer) -> NbtResult<NbtType> {
    NbtType::try_from(buf.read_u8()?)
}

fn read_array_len(buf: &mut PacketBuffer) -> NbtResult<usize> {
    let len = buf.read_i32()?;
    if len < 0 {
        return Err(BufferError::NegativeLength(len).into());
    }
    Ok(len as usize)
}

impl NbtValue {
    /// Read the payload of a tag whose type byte has already been consumed.
    ///
    /// The cursor is left wherever decoding stopped on error; [`NamedTag::read`]
    /// restores it.
    pub fn read(tag: NbtType, buf: &mut PacketBuffer, format: NbtFormat) -> NbtResult<NbtValue> {
        read_payload(tag, buf, format, 0)
    }

    /// Write the payload only, without type byte or name.
    pub fn write(&self, buf: &mut PacketBuffer, format: NbtFormat) -> NbtResult<()> {
        match self {
            NbtValue::Byte(v) => buf.write_i8(*v),
            NbtValue::Short(v) => buf.write_i16(*v),
            NbtValue::Int(v) => buf.write_i32(*v),
            NbtValue::Long(v) => buf.write_i64(*v),
            NbtValue::Float(v) => buf.write_f32(*v),
            NbtValue::Double(v) => buf.write_f64(*v),
            NbtValue::ByteArray(v) => {
                write_length(buf, LengthPrefix::I32, v.len())?;
                for b in v {
                    buf.write_i8(*b);
                }
            }
            NbtValue::String(v) => write_string(buf, v, format)?,
            NbtValue::List(list) => {
                buf.write_u8(list.element_type().id());
                write_length(buf, format.list_prefix, list.len())?;
                for item in list {
                    item.write(buf, format)?;
                }
            }
            NbtValue::Compound(compound) => {
                for (name, value) in compound {
                    buf.write_u8(value.tag_type().id());
                    write_string(buf, name, format)?;
                    value.write(buf, format)?;
                }
                buf.write_u8(NbtType::End.id());
            }
            NbtValue::IntArray(v) => {
                write_length(buf, LengthPrefix::I32, v.len())?;
                for i in v {
                    buf.write_i32(*i);
                }
            }
        }
        Ok(())
    }
}

fn read_payload(
    tag: NbtType,
    buf: &mut PacketBuffer,
    format: NbtFormat,
    depth: usize,
) -> NbtResult<NbtValue> {
    Ok(match tag {
        NbtType::End => return Err(NbtError::UnknownTagType(NbtType::End.id())),
        NbtType::Byte => NbtValue::Byte(buf.read_i8()?),
        NbtType::Short => NbtValue::Short(buf.read_i16()?),
        NbtType::Int => NbtValue::Int(buf.read_i32()?),
        NbtType::Long => NbtValue::Long(buf.read_i64()?),
        NbtType::Float => NbtValue::Float(buf.read_f32()?),
        NbtType::Double => NbtValue::Double(buf.read_f64()?),
        NbtType::ByteArray => {
            let len = read_array_len(buf)?;
            let bytes = buf.read_bytes(len)?;
            NbtValue::ByteArray(bytes.into_iter().map(|b| b as i8).collect())
        }
        NbtType::String => NbtValue::String(read_string(buf, format)?),
        NbtType::List => {
            if depth >= MAX_DEPTH {
                return Err(NbtError::DepthLimit(MAX_DEPTH));
            }
            let element_type = read_type(buf)?;
            let len = read_length(buf, format.list_prefix)?;
            if element_type == NbtType::End && len > 0 {
                return Err(NbtError::MissingListType { len });
            }
            check_count(buf, len, 1)?;
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(read_payload(element_type, buf, format, depth + 1)?);
            }
            NbtValue::List(NbtList::from_parts(element_type, items))
        }
        NbtType::Compound => {
            if depth >= MAX_DEPTH {
                return Err(NbtError::DepthLimit(MAX_DEPTH));
            }
            let mut compound = NbtCompound::new();
            loop {
                let child = read_type(buf)?;
                if child == NbtType::End {
                    break;
                }
                let name = read_string(buf, format)?;
                let value = read_payload(child, buf, format, depth + 1)?;
                compound.insert(name, value);
            }
            NbtValue::Compound(compound)
        }
        NbtType::IntArray => {
            let len = read_array_len(buf)?;
            check_count(buf, len, 4)?;
            let mut values = Vec::with_capacity(len);
            for _ in 0..len {
                values.push(buf.read_i32()?);
            }
            NbtValue::IntArray(values)
        }
    })
}

impl NamedTag {
    /// Read a full named tag: type byte, name, payload.
    ///
    /// Returns `None` when the type byte is End, which is how an absent tag is
    /// written. On error the read cursor is restored.
    pub fn read(buf: &mut PacketBuffer, format: NbtFormat) -> NbtResult<Option<NamedTag>> {
        let mark = buf.mark();
        let result = Self::read_inner(buf, format);
        if result.is_err() {
            buf.reset_to(mark);
        }
        result
    }

    fn read_inner(buf: &mut PacketBuffer, format: NbtFormat) -> NbtResult<Option<NamedTag>> {
        let tag = read_type(buf)?;
        if tag == NbtType::End {
            return Ok(None);
        }
        let name = read_string(buf, format)?;
        let value = read_payload(tag, buf, format, 0)?;
        Ok(Some(NamedTag { name, value }))
    }

    /// Write type byte, name and payload. Nothing is left behind on error.
    pub fn write(&self, buf: &mut PacketBuffer, format: NbtFormat) -> NbtResult<()> {
        let start = buf.len();
        let result = self.write_inner(buf, format);
        if result.is_err() {
            buf.truncate(start);
        }
        result
    }

    fn write_inner(&self, buf: &mut PacketBuffer, format: NbtFormat) -> NbtResult<()> {
        buf.write_u8(self.value.tag_type().id());
        write_string(buf, &self.name, format)?;
        self.value.write(buf, format)
    }

    /// Convenience for writing an optional tag, using a lone End byte for `None`.
    pub fn write_optional(
        tag: Option<&NamedTag>,
        buf: &mut PacketBuffer,
        format: NbtFormat,
    ) -> NbtResult<()> {
        match tag {
            Some(tag) => tag.write(buf, format),
            None => {
                buf.write_u8(NbtType::End.id());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{nbt_compound, nbt_list};

    fn roundtrip(tag: &NamedTag, format: NbtFormat) -> NamedTag {
        let mut buf = PacketBuffer::new();
        tag.write(&mut buf, format).unwrap();
        let back = NamedTag::read(&mut buf, format).unwrap().unwrap();
        assert!(!buf.has_remaining());
        back
    }

    #[test]
    fn test_simple_compound_bytes() {
        let tag = NamedTag::new("", nbt_compound! { "name" => "Steve" });
        let mut buf = PacketBuffer::new();
        tag.write(&mut buf, NbtFormat::JAVA).unwrap();
        let expected: Vec<u8> = vec![
            0x0A, 0x00, 0x00, // compound, empty name
            0x08, 0x00, 0x04, b'n', b'a', b'm', b'e', // string "name"
            0x00, 0x05, b'S', b't', b'e', b'v', b'e', // "Steve"
            0x00, // end
        ];
        assert_eq!(buf.to_vec(), expected);

        let back = NamedTag::read(&mut buf, NbtFormat::JAVA).unwrap().unwrap();
        assert_eq!(back, tag);
    }

    #[test]
    fn test_strings_are_standard_utf8() {
        let value = NbtValue::from("\u{0}\u{1F600}");
        let mut buf = PacketBuffer::new();
        value.write(&mut buf, NbtFormat::JAVA).unwrap();
        // NUL is one byte and the emoji is four, not C0 80 and a surrogate pair
        assert_eq!(buf.to_vec(), vec![0x00, 0x05, 0x00, 0xF0, 0x9F, 0x98, 0x80]);
        assert_eq!(NbtValue::read(NbtType::String, &mut buf, NbtFormat::JAVA).unwrap(), value);
    }

    #[test]
    fn test_empty_list_bytes() {
        let tag = NamedTag::new("", nbt_compound! { "l" => NbtList::new() });
        let mut buf = PacketBuffer::new();
        tag.write(&mut buf, NbtFormat::JAVA).unwrap();
        assert_eq!(
            buf.to_vec(),
            vec![0x0A, 0x00, 0x00, 0x09, 0x00, 0x01, b'l', 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
        let back = NamedTag::read(&mut buf, NbtFormat::JAVA).unwrap().unwrap();
        let list = back.value.as_compound().unwrap().get_list("l").unwrap();
        assert!(list.is_empty());
        assert_eq!(list.element_type(), NbtType::End);
    }

    #[test]
    fn test_typed_empty_list_keeps_type() {
        let tag = NamedTag::new("x", NbtList::with_type(NbtType::Int));
        let back = roundtrip(&tag, NbtFormat::JAVA);
        assert_eq!(back.value.as_list().unwrap().element_type(), NbtType::Int);
    }

    #[test]
    fn test_nested_roundtrip_both_formats() {
        let tag = NamedTag::new(
            "level",
            nbt_compound! {
                "b" => 1i8,
                "s" => -2i16,
                "i" => 300,
                "l" => i64::MIN,
                "f" => 1.25f32,
                "d" => -0.5f64,
                "ba" => vec![1i8, -1],
                "ia" => vec![7i32, 8, 9],
                "list" => nbt_list![
                    nbt_compound! { "id" => "minecraft:stone" },
                    nbt_compound! {},
                ].unwrap(),
                "nested" => nbt_list![nbt_list![1, 2].unwrap(), nbt_list![].unwrap()].unwrap(),
            },
        );
        assert_eq!(roundtrip(&tag, NbtFormat::JAVA), tag);
        assert_eq!(roundtrip(&tag, NbtFormat::VARINT), tag);
    }

    #[test]
    fn test_varint_format_prefixes() {
        let tag = NamedTag::new("ab", nbt_list![1i8].unwrap());
        let mut buf = PacketBuffer::new();
        tag.write(&mut buf, NbtFormat::VARINT).unwrap();
        assert_eq!(buf.to_vec(), vec![0x09, 0x02, b'a', b'b', 0x01, 0x01, 0x01]);
    }

    #[test]
    fn test_lone_end_reads_as_none() {
        let mut buf = PacketBuffer::from(vec![0x00]);
        assert_eq!(NamedTag::read(&mut buf, NbtFormat::JAVA).unwrap(), None);
        assert!(!buf.has_remaining());

        let mut buf = PacketBuffer::new();
        NamedTag::write_optional(None, &mut buf, NbtFormat::JAVA).unwrap();
        assert_eq!(buf.to_vec(), vec![0x00]);
    }

    #[test]
    fn test_untyped_nonempty_list_is_rejected() {
        // list named "" of type End with one element
        let mut buf = PacketBuffer::from(vec![0x09, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01]);
        let err = NamedTag::read(&mut buf, NbtFormat::JAVA).unwrap_err();
        assert!(matches!(err, NbtError::MissingListType { len: 1 }));
        assert_eq!(buf.position(), 0);
    }

    #[test]
    fn test_unknown_tag_type() {
        let mut buf = PacketBuffer::from(vec![0x0C, 0x00, 0x00]);
        assert!(matches!(
            NamedTag::read(&mut buf, NbtFormat::JAVA),
            Err(NbtError::UnknownTagType(12))
        ));
        assert_eq!(buf.position(), 0);
    }

    #[test]
    fn test_truncated_input_restores_cursor() {
        let tag = NamedTag::new("", nbt_compound! { "name" => "Steve" });
        let mut full = PacketBuffer::new();
        tag.write(&mut full, NbtFormat::JAVA).unwrap();
        let bytes = full.to_vec();
        let mut buf = PacketBuffer::from(&bytes[..bytes.len() - 1]);
        assert!(matches!(
            NamedTag::read(&mut buf, NbtFormat::JAVA),
            Err(NbtError::Buffer(BufferError::BufferUnderrun { .. }))
        ));
        assert_eq!(buf.position(), 0);
    }

    #[test]
    fn test_negative_array_length() {
        let mut buf = PacketBuffer::from(vec![0xFF, 0xFF, 0xFF, 0xFF]);
        assert!(matches!(
            NbtValue::read(NbtType::IntArray, &mut buf, NbtFormat::JAVA),
            Err(NbtError::Buffer(BufferError::NegativeLength(-1)))
        ));
    }

    #[test]
    fn test_huge_list_count_does_not_allocate() {
        let mut buf = PacketBuffer::from(vec![0x03, 0x7F, 0xFF, 0xFF, 0xFF]);
        assert!(matches!(
            NbtValue::read(NbtType::List, &mut buf, NbtFormat::JAVA),
            Err(NbtError::Buffer(BufferError::BufferUnderrun { .. }))
        ));
    }

    #[test]
    fn test_depth_limit() {
        let mut bytes = Vec::new();
        for _ in 0..=MAX_DEPTH {
            // list of one list
            bytes.extend_from_slice(&[0x09, 0x00, 0x00, 0x00, 0x01]);
        }
        let mut buf = PacketBuffer::from(bytes);
        assert!(matches!(
            NbtValue::read(NbtType::List, &mut buf, NbtFormat::JAVA),
            Err(NbtError::DepthLimit(MAX_DEPTH))
        ));
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let mut buf = PacketBuffer::new();
        for v in [1, 2] {
            buf.write_u8(NbtType::Int.id());
            buf.write_u16(1);
            buf.write_bytes(b"a");
            buf.write_i32(v);
        }
        buf.write_u8(0);
        let value = NbtValue::read(NbtType::Compound, &mut buf, NbtFormat::JAVA).unwrap();
        assert_eq!(value.as_compound().unwrap().get_int("a"), Some(2));
        assert_eq!(value.as_compound().unwrap().len(), 1);
    }

    #[test]
    fn test_write_failure_truncates() {
        let long = "x".repeat(u16::MAX as usize + 1);
        let tag = NamedTag::new("", nbt_compound! { "k" => long });
        let mut buf = PacketBuffer::new();
        buf.write_u8(0xAB);
        assert!(tag.write(&mut buf, NbtFormat::JAVA).is_err());
        assert_eq!(buf.to_vec(), vec![0xAB]);
    }
}
