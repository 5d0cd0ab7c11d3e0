use crate::codec::*;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use lodestone_types::BlockPos;
use uuid::Uuid;

/// Maximum length of a protocol string, in UTF-16 code units on read and UTF-8 bytes on write.
pub const MAX_STRING_LEN: usize = 32767;

/// A cursor-based reader/writer over a growable byte store.
///
/// Reads consume from the read cursor and fail with [`BufferError::BufferUnderrun`]
/// instead of panicking. Writes always append after the last written byte.
/// Not synchronized: callers serialize access to one buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PacketBuffer {
    data: BytesMut,
    pos: usize,
}

impl PacketBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(capacity),
            pos: 0,
        }
    }

    /// Offset of the read cursor from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    /// Total number of bytes written, read or not.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn unread(&self) -> &[u8] {
        &self.data[self.pos..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.data.to_vec()
    }

    pub fn into_inner(self) -> BytesMut {
        self.data
    }

    pub fn freeze(self) -> Bytes {
        self.data.freeze()
    }

    /// Remember the read cursor so a failed decode can be rolled back.
    pub fn mark(&self) -> usize {
        self.pos
    }

    /// Move the read cursor back to a position returned by [`mark`](Self::mark).
    pub fn reset_to(&mut self, mark: usize) {
        debug_assert!(mark <= self.pos, "reset_to must not skip unread bytes");
        self.pos = mark.min(self.data.len());
    }

    /// Drop written bytes past `len`. Used to discard a partially encoded packet.
    pub fn truncate(&mut self, len: usize) {
        self.data.truncate(len);
        self.pos = self.pos.min(self.data.len());
    }

    fn take(&mut self, n: usize) -> BufferResult<&[u8]> {
        let remaining = self.remaining();
        if remaining < n {
            return Err(BufferError::BufferUnderrun {
                needed: n,
                remaining,
            });
        }
        let start = self.pos;
        self.pos += n;
        Ok(&self.data[start..start + n])
    }

    /// Run a slice-based decoder over the unread bytes and advance by what it consumed.
    /// The cursor does not move if the decoder fails.
    fn read_with<T>(&mut self, f: impl FnOnce(&mut &[u8]) -> BufferResult<T>) -> BufferResult<T> {
        let mut unread = &self.data[self.pos..];
        let before = unread.len();
        let value = f(&mut unread)?;
        self.pos += before - unread.len();
        Ok(value)
    }

    fn read_length(&mut self) -> BufferResult<usize> {
        let len = self.read_varint()?;
        if len < 0 {
            return Err(BufferError::NegativeLength(len));
        }
        Ok(len as usize)
    }

    // === Fixed-width reads ===

    pub fn read_u8(&mut self) -> BufferResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> BufferResult<i8> {
        Ok(self.take(1)?[0] as i8)
    }

    pub fn read_bool(&mut self) -> BufferResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_i16(&mut self) -> BufferResult<i16> {
        Ok(self.take(2)?.get_i16())
    }

    pub fn read_u16(&mut self) -> BufferResult<u16> {
        Ok(self.take(2)?.get_u16())
    }

    pub fn read_i32(&mut self) -> BufferResult<i32> {
        Ok(self.take(4)?.get_i32())
    }

    pub fn read_i64(&mut self) -> BufferResult<i64> {
        Ok(self.take(8)?.get_i64())
    }

    pub fn read_u64(&mut self) -> BufferResult<u64> {
        Ok(self.take(8)?.get_u64())
    }

    pub fn read_f32(&mut self) -> BufferResult<f32> {
        Ok(self.take(4)?.get_f32())
    }

    pub fn read_f64(&mut self) -> BufferResult<f64> {
        Ok(self.take(8)?.get_f64())
    }

    // === Variable-width reads ===

    pub fn read_varint(&mut self) -> BufferResult<i32> {
        self.read_with(|buf| read_varint(buf))
    }

    pub fn read_varlong(&mut self) -> BufferResult<i64> {
        self.read_with(|buf| read_varlong(buf))
    }

    /// Read a protocol string (VarInt byte length + UTF-8), at most `max_len` characters.
    pub fn read_string(&mut self, max_len: usize) -> BufferResult<String> {
        let len = self.read_length()?;
        if len > max_len * 4 {
            return Err(BufferError::StringTooLong {
                len,
                max: max_len * 4,
            });
        }
        let bytes = self.take(len)?;
        let s = std::str::from_utf8(bytes)
            .map_err(|_| BufferError::InvalidUtf8)?
            .to_owned();
        let chars = s.encode_utf16().count();
        if chars > max_len {
            return Err(BufferError::StringTooLong {
                len: chars,
                max: max_len,
            });
        }
        Ok(s)
    }

    /// Read a byte array with VarInt length prefix.
    pub fn read_byte_array(&mut self) -> BufferResult<Vec<u8>> {
        let len = self.read_length()?;
        Ok(self.take(len)?.to_vec())
    }

    /// Read an array of big-endian ints with VarInt count prefix.
    pub fn read_int_array(&mut self) -> BufferResult<Vec<i32>> {
        let count = self.read_length()?;
        let needed = count.saturating_mul(4);
        let mut bytes = self.take(needed)?;
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(bytes.get_i32());
        }
        Ok(out)
    }

    /// Read an array of VarInts with VarInt count prefix.
    pub fn read_varint_array(&mut self) -> BufferResult<Vec<i32>> {
        let count = self.read_length()?;
        // every VarInt takes at least one byte
        if count > self.remaining() {
            return Err(BufferError::BufferUnderrun {
                needed: count,
                remaining: self.remaining(),
            });
        }
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.read_varint()?);
        }
        Ok(out)
    }

    /// Read exactly `n` raw bytes.
    pub fn read_bytes(&mut self, n: usize) -> BufferResult<Vec<u8>> {
        Ok(self.take(n)?.to_vec())
    }

    /// Consume everything left in the buffer.
    pub fn read_remaining(&mut self) -> Vec<u8> {
        let rest = self.unread().to_vec();
        self.pos = self.data.len();
        rest
    }

    /// Read a UUID (128 bits, big endian).
    pub fn read_uuid(&mut self) -> BufferResult<Uuid> {
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(self.take(16)?);
        Ok(Uuid::from_bytes(bytes))
    }

    /// Read a packed block position.
    pub fn read_block_pos(&mut self) -> BufferResult<BlockPos> {
        Ok(BlockPos::decode(self.read_u64()?))
    }

    // === Writes ===

    pub fn write_u8(&mut self, value: u8) {
        self.data.put_u8(value);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.data.put_i8(value);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.data.put_u8(value as u8);
    }

    pub fn write_i16(&mut self, value: i16) {
        self.data.put_i16(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.data.put_u16(value);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.data.put_i32(value);
    }

    pub fn write_i64(&mut self, value: i64) {
        self.data.put_i64(value);
    }

    pub fn write_u64(&mut self, value: u64) {
        self.data.put_u64(value);
    }

    pub fn write_f32(&mut self, value: f32) {
        self.data.put_f32(value);
    }

    pub fn write_f64(&mut self, value: f64) {
        self.data.put_f64(value);
    }

    pub fn write_varint(&mut self, value: i32) {
        write_varint(&mut self.data, value);
    }

    pub fn write_varlong(&mut self, value: i64) {
        write_varlong(&mut self.data, value);
    }

    fn write_length(&mut self, len: usize) -> BufferResult<()> {
        let len = i32::try_from(len).map_err(|_| BufferError::ArrayTooLong {
            len,
            max: i32::MAX as usize,
        })?;
        self.write_varint(len);
        Ok(())
    }

    /// Write a protocol string. Fails if the UTF-8 encoding exceeds [`MAX_STRING_LEN`] bytes.
    pub fn write_string(&mut self, s: &str) -> BufferResult<()> {
        let bytes = s.as_bytes();
        if bytes.len() > MAX_STRING_LEN {
            return Err(BufferError::StringTooLong {
                len: bytes.len(),
                max: MAX_STRING_LEN,
            });
        }
        self.write_varint(bytes.len() as i32);
        self.data.put_slice(bytes);
        Ok(())
    }

    pub fn write_byte_array(&mut self, data: &[u8]) -> BufferResult<()> {
        self.write_length(data.len())?;
        self.data.put_slice(data);
        Ok(())
    }

    pub fn write_int_array(&mut self, values: &[i32]) -> BufferResult<()> {
        self.write_length(values.len())?;
        for v in values {
            self.data.put_i32(*v);
        }
        Ok(())
    }

    pub fn write_varint_array(&mut self, values: &[i32]) -> BufferResult<()> {
        self.write_length(values.len())?;
        for v in values {
            self.write_varint(*v);
        }
        Ok(())
    }

    /// Append raw bytes with no length prefix.
    pub fn write_bytes(&mut self, data: &[u8]) {
        self.data.put_slice(data);
    }

    pub fn write_uuid(&mut self, uuid: &Uuid) {
        self.data.put_slice(uuid.as_bytes());
    }

    pub fn write_block_pos(&mut self, pos: &BlockPos) {
        self.data.put_u64(pos.encode());
    }
}

impl From<Vec<u8>> for PacketBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self {
            data: BytesMut::from(&data[..]),
            pos: 0,
        }
    }
}

impl From<&[u8]> for PacketBuffer {
    fn from(data: &[u8]) -> Self {
        Self {
            data: BytesMut::from(data),
            pos: 0,
        }
    }
}

impl From<BytesMut> for PacketBuffer {
    fn from(data: BytesMut) -> Self {
        Self { data, pos: 0 }
    }
}

impl From<Bytes> for PacketBuffer {
    fn from(data: Bytes) -> Self {
        Self {
            data: BytesMut::from(&data[..]),
            pos: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_width_roundtrip() {
        let mut buf = PacketBuffer::new();
        buf.write_u8(0xAB);
        buf.write_i8(-5);
        buf.write_bool(true);
        buf.write_i16(-12345);
        buf.write_u16(54321);
        buf.write_i32(i32::MIN);
        buf.write_i64(0x0123_4567_89AB_CDEF);
        buf.write_f32(1.5);
        buf.write_f64(-0.25);

        assert_eq!(buf.read_u8().unwrap(), 0xAB);
        assert_eq!(buf.read_i8().unwrap(), -5);
        assert!(buf.read_bool().unwrap());
        assert_eq!(buf.read_i16().unwrap(), -12345);
        assert_eq!(buf.read_u16().unwrap(), 54321);
        assert_eq!(buf.read_i32().unwrap(), i32::MIN);
        assert_eq!(buf.read_i64().unwrap(), 0x0123_4567_89AB_CDEF);
        assert_eq!(buf.read_f32().unwrap(), 1.5);
        assert_eq!(buf.read_f64().unwrap(), -0.25);
        assert_eq!(buf.remaining(), 0);
    }

    #[test]
    fn test_big_endian_layout() {
        let mut buf = PacketBuffer::new();
        buf.write_i16(12);
        buf.write_i32(1);
        assert_eq!(buf.as_bytes(), &[0x00, 0x0C, 0x00, 0x00, 0x00, 0x01]);
    }

    #[test]
    fn test_underrun_does_not_move_cursor() {
        let mut buf = PacketBuffer::from(vec![0x01, 0x02, 0x03]);
        assert_eq!(
            buf.read_i32(),
            Err(BufferError::BufferUnderrun {
                needed: 4,
                remaining: 3
            })
        );
        assert_eq!(buf.position(), 0);
        assert_eq!(buf.read_i16().unwrap(), 0x0102);
        assert_eq!(buf.position(), 2);
    }

    #[test]
    fn test_malformed_varint_does_not_move_cursor() {
        let mut buf = PacketBuffer::from(vec![0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00]);
        assert_eq!(buf.read_varint(), Err(BufferError::MalformedVarInt));
        assert_eq!(buf.position(), 0);
    }

    #[test]
    fn test_string_roundtrip() {
        let test_str = "Hello, Minecraft! \u{00e9}\u{4e16}";
        let mut buf = PacketBuffer::new();
        buf.write_string(test_str).unwrap();
        let result = buf.read_string(MAX_STRING_LEN).unwrap();
        assert_eq!(result, test_str);
    }

    #[test]
    fn test_string_limits() {
        let mut buf = PacketBuffer::new();
        let long = "a".repeat(MAX_STRING_LEN + 1);
        assert!(matches!(
            buf.write_string(&long),
            Err(BufferError::StringTooLong { .. })
        ));
        assert!(buf.is_empty());

        buf.write_string("abcdefghij").unwrap();
        assert!(matches!(
            buf.read_string(5),
            Err(BufferError::StringTooLong { len: 10, max: 5 })
        ));
    }

    #[test]
    fn test_string_rejects_bad_prefix_and_utf8() {
        let mut buf = PacketBuffer::new();
        buf.write_varint(-1);
        assert_eq!(buf.read_string(16), Err(BufferError::NegativeLength(-1)));

        let mut buf = PacketBuffer::from(vec![0x02, 0xC3, 0x28]);
        assert_eq!(buf.read_string(16), Err(BufferError::InvalidUtf8));
    }

    #[test]
    fn test_arrays_roundtrip() {
        let mut buf = PacketBuffer::new();
        buf.write_byte_array(&[1, 2, 3]).unwrap();
        buf.write_int_array(&[-1, 0, 70000]).unwrap();
        buf.write_varint_array(&[5, 300, -7]).unwrap();
        assert_eq!(buf.read_byte_array().unwrap(), vec![1, 2, 3]);
        assert_eq!(buf.read_int_array().unwrap(), vec![-1, 0, 70000]);
        assert_eq!(buf.read_varint_array().unwrap(), vec![5, 300, -7]);
        assert!(!buf.has_remaining());
    }

    #[test]
    fn test_varint_array_count_exceeds_data() {
        let mut buf = PacketBuffer::new();
        buf.write_varint(1_000_000);
        buf.write_varint(1);
        assert!(matches!(
            buf.read_varint_array(),
            Err(BufferError::BufferUnderrun { .. })
        ));
    }

    #[test]
    fn test_uuid_and_position_roundtrip() {
        let uuid = Uuid::new_v4();
        let pos = BlockPos::new(-30_000, 64, 12_345);
        let mut buf = PacketBuffer::new();
        buf.write_uuid(&uuid);
        buf.write_block_pos(&pos);
        assert_eq!(buf.read_uuid().unwrap(), uuid);
        assert_eq!(buf.read_block_pos().unwrap(), pos);
    }

    #[test]
    fn test_mark_reset_and_truncate() {
        let mut buf = PacketBuffer::new();
        buf.write_i32(7);
        let mark = buf.mark();
        assert_eq!(buf.read_i16().unwrap(), 0);
        buf.reset_to(mark);
        assert_eq!(buf.read_i32().unwrap(), 7);

        let len = buf.len();
        buf.write_i64(99);
        buf.truncate(len);
        assert_eq!(buf.len(), 4);
        assert_eq!(buf.read_remaining(), Vec::<u8>::new());
    }
}
