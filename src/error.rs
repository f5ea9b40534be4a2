// ABOUTME: Crate-wide error taxonomy for socket and codec failures
// ABOUTME: Connection diagnostics include the OS error number when the kernel reports one

use crate::codec::CodecError;
use std::io;
use thiserror::Error;

/// Errors surfaced by the session and its socket channel.
///
/// The session recovers nothing locally: any I/O failure closes the
/// socket before the error reaches the caller, so a subsequent send may
/// implicitly reconnect and succeed or fail on its own.
#[derive(Debug, Error)]
pub enum Error {
    /// OS-level socket failure during connect, send, or receive.
    #[error("connection error: {0}")]
    Connection(String),

    /// The read side could not complete a frame (peer closed the stream)
    /// or the channel was already down.
    #[error("socket disconnected")]
    Disconnected,

    /// Payload codec failure, surfaced unchanged.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl Error {
    pub(crate) fn connect_failed(host: &str, port: u16, source: &io::Error) -> Error {
        Error::Connection(match source.raw_os_error() {
            Some(errno) => format!("Error {errno} connecting {host}:{port}. {source}."),
            None => format!("Error connecting to {host}:{port}. {source}."),
        })
    }

    pub(crate) fn write_failed(source: &io::Error) -> Error {
        Error::Connection(match source.raw_os_error() {
            Some(errno) => format!("Error {errno} while writing to socket. {source}."),
            None => format!("Error UNKNOWN while writing to socket. {source}."),
        })
    }

    pub(crate) fn read_failed(source: &io::Error) -> Error {
        Error::Connection(match source.raw_os_error() {
            Some(errno) => format!("Error {errno} while reading from socket. {source}."),
            None => format!("Error UNKNOWN while reading from socket. {source}."),
        })
    }
}

/// A specialized `Result` type for session operations.
pub type Result<T> = std::result::Result<T, Error>;
