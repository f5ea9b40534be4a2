// ABOUTME: Transport-layer envelope carried by every payload on the wire
// ABOUTME: The envelope owns the sequence number plus any control-message body

use crate::codec::{self, CodecError, Decodable, Encodable};
use crate::datatypes::{LoginResponse, Replay, SessionLogin};
use crate::frame;
use bytes::{BufMut, BytesMut};
use num_enum::TryFromPrimitive;
use std::io::Cursor;

/// Transport-layer payload discriminators (wire values).
#[derive(TryFromPrimitive)]
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EtoKind {
    /// Sequenced message with no transport body
    None = 0,
    /// Resume token presented alongside login credentials
    Login = 1,
    /// Server acknowledgement of a login
    LoginResponse = 2,
    /// Retransmission request
    Replay = 3,
    /// Liveness probe
    Heartbeat = 4,
}

/// Transport envelope carried by every payload.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct EtoPayload {
    /// Transport sequence number; stamped on send, validated on receive.
    pub seq: u64,
    /// Transport-layer body, when the message is a control message.
    pub body: EtoBody,
}

/// Transport-layer body of the envelope.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum EtoBody {
    /// The envelope carries only the sequence number.
    #[default]
    None,
    /// Resume token presented on reconnect.
    Login(SessionLogin),
    /// Server acknowledgement of a login; authoritative for the
    /// outbound sequence.
    LoginResponse(LoginResponse),
    /// Request to retransmit every sequenced message from a point on.
    Replay(Replay),
    /// Liveness probe; the receiving side echoes one back.
    Heartbeat,
}

impl EtoBody {
    /// Wire discriminator for this body.
    pub fn kind(&self) -> EtoKind {
        match self {
            EtoBody::None => EtoKind::None,
            EtoBody::Login(_) => EtoKind::Login,
            EtoBody::LoginResponse(_) => EtoKind::LoginResponse,
            EtoBody::Replay(_) => EtoKind::Replay,
            EtoBody::Heartbeat => EtoKind::Heartbeat,
        }
    }
}

impl Encodable for EtoPayload {
    fn encode(&self, dst: &mut BytesMut) -> Result<(), CodecError> {
        dst.put_u8(self.body.kind() as u8);
        frame::put_uvarint(dst, self.seq);
        match &self.body {
            EtoBody::None | EtoBody::Heartbeat => {}
            EtoBody::Login(login) => login.encode(dst)?,
            EtoBody::LoginResponse(response) => response.encode(dst)?,
            EtoBody::Replay(replay) => replay.encode(dst)?,
        }
        Ok(())
    }
}

impl Decodable for EtoPayload {
    fn decode(src: &mut Cursor<&[u8]>) -> Result<EtoPayload, CodecError> {
        let raw = codec::get_u8(src)?;
        let kind = EtoKind::try_from(raw).map_err(|_| CodecError::InvalidEtoKind(raw))?;
        let seq = codec::get_uvarint(src)?;
        let body = match kind {
            EtoKind::None => EtoBody::None,
            EtoKind::Login => EtoBody::Login(SessionLogin::decode(src)?),
            EtoKind::LoginResponse => EtoBody::LoginResponse(LoginResponse::decode(src)?),
            EtoKind::Replay => EtoBody::Replay(Replay::decode(src)?),
            EtoKind::Heartbeat => EtoBody::Heartbeat,
        };
        Ok(EtoPayload { seq, body })
    }
}
