//! Provides the wire framing for the streaming API as well as utilities
//! for locating complete frames in a read buffer.
//!
//! Every message on the wire is a ULEB128 length prefix followed by that
//! many payload bytes. Short frames are padded with zero bytes up to a
//! minimum total size; the padding sits outside the declared length and
//! is consumed later as zero-length frames, which decode to empty
//! payloads the session drops.

use bytes::{Buf, BufMut, BytesMut};
use core::fmt;
use std::io::Cursor;

/// Minimum total size of an encoded frame, reached by zero padding.
pub const MIN_FRAME_LEN: usize = 4;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// Not enough buffered data to complete a length prefix or frame body
    Incomplete,

    /// Length prefix does not fit in a `u64`
    Overflow,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Incomplete => f.write_str("incomplete frame"),
            Error::Overflow => f.write_str("frame length prefix overflows u64"),
        }
    }
}

impl std::error::Error for Error {}

/// Append `value` to `dst` as a ULEB128 varint.
pub fn put_uvarint(dst: &mut BytesMut, mut value: u64) {
    while value >= 0x80 {
        dst.put_u8((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    dst.put_u8(value as u8);
}

/// Decode a ULEB128 varint, advancing the cursor past it.
///
/// A buffer exhausted mid-varint yields `Incomplete`; callers read more
/// bytes and retry from the refreshed buffer.
pub fn get_uvarint(src: &mut Cursor<&[u8]>) -> Result<u64, Error> {
    let mut value = 0u64;
    let mut shift = 0u32;
    loop {
        if !src.has_remaining() {
            return Err(Error::Incomplete);
        }
        let byte = src.get_u8();
        if shift == 63 && (byte & 0x7f) > 1 {
            return Err(Error::Overflow);
        }
        value |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
        if shift > 63 {
            return Err(Error::Overflow);
        }
    }
}

/// Number of bytes `put_uvarint` emits for `value`.
pub fn uvarint_len(value: u64) -> usize {
    let bits = 64 - value.max(1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// Frame one payload: length prefix, payload bytes, zero padding.
pub fn encode(payload: &[u8], dst: &mut BytesMut) {
    let padding = (MIN_FRAME_LEN - 1).saturating_sub(payload.len());
    dst.reserve(uvarint_len(payload.len() as u64) + payload.len() + padding);
    put_uvarint(dst, payload.len() as u64);
    dst.put_slice(payload);
    dst.put_bytes(0, padding);
}

/// Checks if an entire frame can be decoded from `src`.
///
/// On success the cursor sits at the first body byte and the body length
/// is returned; the caller consumes exactly that many bytes and leaves
/// any remainder buffered for the next frame.
pub fn check(src: &mut Cursor<&[u8]>) -> Result<usize, Error> {
    let declared = get_uvarint(src)?;
    let len = usize::try_from(declared).map_err(|_| Error::Overflow)?;
    if src.remaining() < len {
        return Err(Error::Incomplete);
    }
    Ok(len)
}
