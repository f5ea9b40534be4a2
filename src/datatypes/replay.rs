use crate::codec::{self, CodecError, Decodable, Encodable};
use crate::frame;
use bytes::BytesMut;
use std::io::Cursor;

/// Request for retransmission of every sequenced message from `seq` on.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Replay {
    pub seq: u64,
}

impl Encodable for Replay {
    fn encode(&self, dst: &mut BytesMut) -> Result<(), CodecError> {
        frame::put_uvarint(dst, self.seq);
        Ok(())
    }
}

impl Decodable for Replay {
    fn decode(src: &mut Cursor<&[u8]>) -> Result<Replay, CodecError> {
        Ok(Replay {
            seq: codec::get_uvarint(src)?,
        })
    }
}
