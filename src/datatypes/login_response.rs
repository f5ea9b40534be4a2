use crate::codec::{self, CodecError, Decodable, Encodable};
use crate::frame;
use bytes::BytesMut;
use std::io::Cursor;

/// Server response to a login.
///
/// Received once per connection, after the login (or resume) payload has
/// been accepted.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct LoginResponse {
    /// Token identifying the logical session; presented on resume.
    pub session_id: String,
    /// Outbound sequence number the client must continue from. The
    /// server is authoritative here after resume negotiation.
    pub reset: u64,
}

impl Encodable for LoginResponse {
    fn encode(&self, dst: &mut BytesMut) -> Result<(), CodecError> {
        codec::put_string(dst, &self.session_id);
        frame::put_uvarint(dst, self.reset);
        Ok(())
    }
}

impl Decodable for LoginResponse {
    fn decode(src: &mut Cursor<&[u8]>) -> Result<LoginResponse, CodecError> {
        Ok(LoginResponse {
            session_id: codec::get_string(src, "session_id")?,
            reset: codec::get_uvarint(src)?,
        })
    }
}
