// SETO payload codec - separates the wire encoding from the payload model
//
// The session consumes serialisation through the `PayloadCodec` seam, so
// swapping in a schema-generated codec only means implementing that
// trait. `SetoCodec` is the crate's default implementation; each payload
// datatype implements `Encodable`/`Decodable` and the codec delegates.

use crate::datatypes::Payload;
use crate::frame;
use bytes::{Buf, BufMut, BytesMut};
use std::io::Cursor;
use thiserror::Error;

/// Serialisation boundary between the session and the payload encoding.
pub trait PayloadCodec {
    /// Serialise `payload` into `dst`.
    fn encode(&self, payload: &Payload, dst: &mut BytesMut) -> Result<(), CodecError>;

    /// Parse `src` into `payload`, replacing its previous contents.
    ///
    /// Empty input parses as an all-defaults payload; zero-length frames
    /// produced by wire padding rely on this.
    fn decode(&self, src: &[u8], payload: &mut Payload) -> Result<(), CodecError>;
}

/// Types that can write themselves into a buffer.
pub trait Encodable {
    /// Append this value's encoding to `dst`.
    fn encode(&self, dst: &mut BytesMut) -> Result<(), CodecError>;
}

/// Types that can be read back out of a buffer.
pub trait Decodable: Sized {
    /// Decode one value, advancing the cursor past it.
    fn decode(src: &mut Cursor<&[u8]>) -> Result<Self, CodecError>;
}

/// Codec errors with enough context to point at the offending field.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("truncated payload: need more data")]
    Truncated,

    #[error("invalid transport payload type: {0:#x}")]
    InvalidEtoKind(u8),

    #[error("length prefix overflows u64")]
    Overflow,

    #[error("UTF-8 decoding error in field '{field}': {source}")]
    Utf8 {
        field: &'static str,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// The crate's default payload codec.
///
/// Stands in for the codec generated from the exchange's schema
/// definitions; the session never looks past the [`PayloadCodec`] trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetoCodec;

impl PayloadCodec for SetoCodec {
    fn encode(&self, payload: &Payload, dst: &mut BytesMut) -> Result<(), CodecError> {
        Encodable::encode(payload, dst)
    }

    fn decode(&self, src: &[u8], payload: &mut Payload) -> Result<(), CodecError> {
        if src.is_empty() {
            payload.clear();
            return Ok(());
        }
        let mut cursor = Cursor::new(src);
        *payload = Payload::decode(&mut cursor)?;
        Ok(())
    }
}

// Field helpers shared by the datatype impls.

pub(crate) fn put_string(dst: &mut BytesMut, value: &str) {
    frame::put_uvarint(dst, value.len() as u64);
    dst.put_slice(value.as_bytes());
}

pub(crate) fn get_string(
    src: &mut Cursor<&[u8]>,
    field: &'static str,
) -> Result<String, CodecError> {
    let len = usize::try_from(get_uvarint(src)?).map_err(|_| CodecError::Overflow)?;
    if src.remaining() < len {
        return Err(CodecError::Truncated);
    }
    let bytes = src.copy_to_bytes(len);
    String::from_utf8(bytes.into()).map_err(|source| CodecError::Utf8 { field, source })
}

pub(crate) fn get_uvarint(src: &mut Cursor<&[u8]>) -> Result<u64, CodecError> {
    frame::get_uvarint(src).map_err(|e| match e {
        frame::Error::Incomplete => CodecError::Truncated,
        frame::Error::Overflow => CodecError::Overflow,
    })
}

pub(crate) fn get_u8(src: &mut Cursor<&[u8]>) -> Result<u8, CodecError> {
    if !src.has_remaining() {
        return Err(CodecError::Truncated);
    }
    Ok(src.get_u8())
}
