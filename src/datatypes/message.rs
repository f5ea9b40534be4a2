use bytes::Bytes;

/// An application message the session core passes through untouched.
///
/// `kind` is the application-layer discriminator; values 1 and 2 are
/// reserved for the transport-only and login payloads. `data` is the
/// caller-owned encoding of the message body.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Message {
    pub kind: u8,
    pub data: Bytes,
}
