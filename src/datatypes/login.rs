use crate::codec::{self, CodecError, Decodable, Encodable};
use bytes::BytesMut;
use std::io::Cursor;

/// Login credentials carried in the application body.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Login {
    pub username: String,
    pub password: String,
}

/// Resume token carried in the transport envelope when re-opening a
/// logical session on a new connection.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct SessionLogin {
    pub session_id: String,
}

impl Encodable for Login {
    fn encode(&self, dst: &mut BytesMut) -> Result<(), CodecError> {
        codec::put_string(dst, &self.username);
        codec::put_string(dst, &self.password);
        Ok(())
    }
}

impl Decodable for Login {
    fn decode(src: &mut Cursor<&[u8]>) -> Result<Login, CodecError> {
        Ok(Login {
            username: codec::get_string(src, "username")?,
            password: codec::get_string(src, "password")?,
        })
    }
}

impl Encodable for SessionLogin {
    fn encode(&self, dst: &mut BytesMut) -> Result<(), CodecError> {
        codec::put_string(dst, &self.session_id);
        Ok(())
    }
}

impl Decodable for SessionLogin {
    fn decode(src: &mut Cursor<&[u8]>) -> Result<SessionLogin, CodecError> {
        Ok(SessionLogin {
            session_id: codec::get_string(src, "session_id")?,
        })
    }
}
