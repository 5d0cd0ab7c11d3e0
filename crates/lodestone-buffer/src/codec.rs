use bytes::{Buf, BufMut};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("Buffer underrun: needed {needed} bytes, {remaining} remaining")]
    BufferUnderrun { needed: usize, remaining: usize },
    #[error("Malformed VarInt: continuation bit set on byte 5")]
    MalformedVarInt,
    #[error("Malformed VarLong: continuation bit set on byte 10")]
    MalformedVarLong,
    #[error("String too long: {len} > {max}")]
    StringTooLong { len: usize, max: usize },
    #[error("Negative length prefix: {0}")]
    NegativeLength(i32),
    #[error("Array too long: {len} > {max}")]
    ArrayTooLong { len: usize, max: usize },
    #[error("Invalid UTF-8 in string")]
    InvalidUtf8,
}

pub type BufferResult<T> = Result<T, BufferError>;

/// Maximum number of bytes in a VarInt.
pub const MAX_VARINT_LEN: usize = 5;

/// Maximum number of bytes in a VarLong.
pub const MAX_VARLONG_LEN: usize = 10;

fn read_var(buf: &mut impl Buf, max_len: usize, malformed: BufferError) -> BufferResult<u64> {
    let mut value = 0u64;
    for shift in (0..max_len).map(|i| 7 * i) {
        if !buf.has_remaining() {
            return Err(BufferError::BufferUnderrun {
                needed: 1,
                remaining: 0,
            });
        }
        let byte = buf.get_u8();
        value |= u64::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(malformed)
}

fn write_var(buf: &mut impl BufMut, mut value: u64) {
    while value >= 0x80 {
        buf.put_u8((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

fn var_len(value: u64) -> usize {
    (64 - value.leading_zeros() as usize).max(1).div_ceil(7)
}

/// Read a VarInt from the buffer. Bits past the 32nd in a fifth byte are dropped.
pub fn read_varint(buf: &mut impl Buf) -> BufferResult<i32> {
    read_var(buf, MAX_VARINT_LEN, BufferError::MalformedVarInt).map(|v| v as i32)
}

/// Negative values always take five bytes.
pub fn write_varint(buf: &mut impl BufMut, value: i32) {
    write_var(buf, u64::from(value as u32));
}

pub fn varint_len(value: i32) -> usize {
    var_len(u64::from(value as u32))
}

pub fn read_varlong(buf: &mut impl Buf) -> BufferResult<i64> {
    read_var(buf, MAX_VARLONG_LEN, BufferError::MalformedVarLong).map(|v| v as i64)
}

pub fn write_varlong(buf: &mut impl BufMut, value: i64) {
    write_var(buf, value as u64);
}

pub fn varlong_len(value: i64) -> usize {
    var_len(value as u64)
}
