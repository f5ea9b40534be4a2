// ABOUTME: Top-level payload model pairing the transport envelope with the application body
// ABOUTME: Application messages beyond the login flow stay opaque to the session core

use crate::codec::{self, CodecError, Decodable, Encodable};
use crate::datatypes::{EtoPayload, Login, Message};
use bytes::{Buf, BufMut, BytesMut};
use num_enum::TryFromPrimitive;
use std::io::Cursor;

/// Application-layer payload discriminators the session itself understands.
///
/// Any other wire value is an application message that passes through
/// the session untouched.
#[derive(TryFromPrimitive)]
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadKind {
    /// Transport-only message; nothing beyond the envelope
    Eto = 1,
    /// Login credentials, the first sequenced message of a session
    Login = 2,
}

/// One decoded message: transport envelope plus application body.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Payload {
    /// Transport envelope; carries the sequence number and any
    /// transport-layer body.
    pub eto: EtoPayload,
    /// Application body.
    pub body: Body,
}

impl Payload {
    /// Reset both layers to their defaults so the buffer can be reused.
    pub fn clear(&mut self) {
        self.eto = EtoPayload::default();
        self.body = Body::Eto;
    }
}

/// Application body of a payload.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Body {
    /// No application body; the envelope is the whole message.
    #[default]
    Eto,
    /// Credentials presented on login.
    Login(Login),
    /// An application message the session does not interpret.
    Message(Message),
}

impl Encodable for Payload {
    fn encode(&self, dst: &mut BytesMut) -> Result<(), CodecError> {
        match &self.body {
            Body::Eto => {
                dst.put_u8(PayloadKind::Eto as u8);
                self.eto.encode(dst)?;
            }
            Body::Login(login) => {
                dst.put_u8(PayloadKind::Login as u8);
                self.eto.encode(dst)?;
                login.encode(dst)?;
            }
            Body::Message(message) => {
                dst.put_u8(message.kind);
                self.eto.encode(dst)?;
                dst.put_slice(&message.data);
            }
        }
        Ok(())
    }
}

impl Decodable for Payload {
    fn decode(src: &mut Cursor<&[u8]>) -> Result<Payload, CodecError> {
        let kind = codec::get_u8(src)?;
        let eto = EtoPayload::decode(src)?;
        let body = match PayloadKind::try_from(kind) {
            Ok(PayloadKind::Eto) => Body::Eto,
            Ok(PayloadKind::Login) => Body::Login(Login::decode(src)?),
            Err(_) => Body::Message(Message {
                kind,
                data: src.copy_to_bytes(src.remaining()),
            }),
        };
        Ok(Payload { eto, body })
    }
}
