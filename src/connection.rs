// ABOUTME: Owns the TCP socket to the exchange and its lifecycle
// ABOUTME: Frames outbound payload bytes and reassembles inbound frames from buffered reads

use crate::error::{Error, Result};
use crate::frame;
use bytes::{Buf, Bytes, BytesMut};
use std::future::Future;
use std::io::{self, Cursor};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::{self, TcpStream};
use tokio::time;
use tracing::{debug, info, trace, warn};

/// Framed TCP channel to the streaming API.
///
/// The socket is held lazily: it opens on the first `connect` (or
/// implicitly on the first `send`) and drops on `disconnect` or on any
/// I/O failure. Die fast: after an error the channel is always
/// disconnected before the error reaches the caller, so the socket state
/// is never ambiguous.
#[derive(Debug)]
pub struct Connection {
    host: String,
    port: u16,
    socket_timeout: Option<Duration>,

    // `None` whenever the channel is disconnected.
    stream: Option<BufWriter<TcpStream>>,

    // Unconsumed framing bytes. Never holds a partial frame across a
    // successful recv; cleared on disconnect.
    buffer: BytesMut,
}

impl Connection {
    /// Create a disconnected channel for `(host, port)`.
    ///
    /// `socket_timeout` bounds connect and every subsequent blocking
    /// read or write.
    pub fn new(host: impl Into<String>, port: u16, socket_timeout: Option<Duration>) -> Connection {
        Connection {
            host: host.into(),
            port,
            socket_timeout,
            stream: None,
            buffer: BytesMut::with_capacity(4 * 1024),
        }
    }

    /// Whether the socket is currently connected.
    pub fn connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Open the TCP socket.
    ///
    /// Returns `true` if the socket needed connecting, `false` if it was
    /// already up.
    pub async fn connect(&mut self) -> Result<bool> {
        if self.stream.is_some() {
            debug!("connect() called, but already connected");
            return Ok(false);
        }
        info!(host = %self.host, port = self.port, "connecting with new socket");
        let addr = self.resolve().await?;
        let stream = io_timeout(self.socket_timeout, TcpStream::connect(addr))
            .await
            .map_err(|e| Error::connect_failed(&self.host, self.port, &e))?;
        self.stream = Some(BufWriter::new(stream));
        Ok(true)
    }

    // The exchange endpoint is IPv4; filter the lookup accordingly.
    async fn resolve(&self) -> Result<SocketAddr> {
        let mut addrs = net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|e| Error::connect_failed(&self.host, self.port, &e))?;
        addrs.find(|addr| addr.is_ipv4()).ok_or_else(|| {
            Error::Connection(format!(
                "Error connecting to {}:{}. No IPv4 address found.",
                self.host, self.port
            ))
        })
    }

    /// Close the TCP socket. Idempotent; close errors cannot surface.
    pub fn disconnect(&mut self) {
        if self.stream.is_none() {
            debug!("disconnect() called with no socket, ignoring");
            return;
        }
        info!("closing socket");
        self.stream = None;
        // A partial frame is useless without its connection.
        self.buffer.clear();
    }

    /// Frame and transmit one payload.
    ///
    /// Connects first when the channel is down; that succeeds, but is
    /// logged as a caller-misuse signal.
    pub async fn send(&mut self, payload: &[u8]) -> Result<()> {
        if self.connect().await? {
            warn!("send() called while disconnected, connecting");
        }
        let mut framed = BytesMut::with_capacity(payload.len() + frame::MIN_FRAME_LEN + 8);
        frame::encode(payload, &mut framed);
        trace!(bytes = framed.len(), "sending frame");

        let timeout = self.socket_timeout;
        let written = match self.stream.as_mut() {
            Some(stream) => {
                io_timeout(timeout, async {
                    stream.write_all(&framed).await?;
                    stream.flush().await
                })
                .await
            }
            None => return Err(Error::Disconnected),
        };
        if let Err(e) = written {
            self.disconnect();
            return Err(Error::write_failed(&e));
        }
        Ok(())
    }

    /// Read one frame and return its payload bytes.
    ///
    /// Any trailing bytes already read stay buffered for the next call.
    pub async fn recv(&mut self) -> Result<Bytes> {
        loop {
            if let Some(body) = self.try_parse_frame()? {
                trace!(bytes = body.len(), "received frame");
                return Ok(body);
            }

            let timeout = self.socket_timeout;
            let read = match self.stream.as_mut() {
                Some(stream) => io_timeout(timeout, stream.read_buf(&mut self.buffer)).await,
                None => return Err(Error::Disconnected),
            };
            match read {
                Ok(0) => {
                    // Peer closed. A close between frames and a close
                    // mid-frame both kill the channel.
                    if !self.buffer.is_empty() {
                        warn!(
                            buffered = self.buffer.len(),
                            "socket disconnected while receiving"
                        );
                    }
                    self.disconnect();
                    return Err(Error::Disconnected);
                }
                Ok(n) => trace!(bytes = n, "read from socket"),
                Err(e) => {
                    self.disconnect();
                    return Err(Error::read_failed(&e));
                }
            }
        }
    }

    // One complete frame body from the buffer, or `None` when more
    // bytes are needed.
    fn try_parse_frame(&mut self) -> Result<Option<Bytes>> {
        let mut cursor = Cursor::new(&self.buffer[..]);
        match frame::check(&mut cursor) {
            Ok(len) => {
                let prefix = cursor.position() as usize;
                self.buffer.advance(prefix);
                Ok(Some(self.buffer.split_to(len).freeze()))
            }
            Err(frame::Error::Incomplete) => Ok(None),
            Err(frame::Error::Overflow) => {
                // An unrepresentable length means the stream can never
                // be reframed.
                self.disconnect();
                Err(Error::Connection(
                    "frame length prefix overflows u64".to_owned(),
                ))
            }
        }
    }
}

async fn io_timeout<T>(
    timeout: Option<Duration>,
    op: impl Future<Output = io::Result<T>>,
) -> io::Result<T> {
    match timeout {
        Some(limit) => time::timeout(limit, op)
            .await
            .map_err(|_| io::Error::from(io::ErrorKind::TimedOut))?,
        None => op.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn listener() -> (TcpListener, Connection) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, Connection::new("127.0.0.1", port, None))
    }

    #[tokio::test]
    async fn connect_is_idempotent() {
        let (listener, mut conn) = listener().await;
        assert!(!conn.connected());
        assert!(conn.connect().await.unwrap());
        assert!(conn.connected());
        assert!(!conn.connect().await.unwrap());
        drop(listener);
    }

    #[tokio::test]
    async fn disconnect_is_idempotent() {
        let (listener, mut conn) = listener().await;
        conn.disconnect();
        conn.connect().await.unwrap();
        conn.disconnect();
        assert!(!conn.connected());
        conn.disconnect();
        drop(listener);
    }

    #[tokio::test]
    async fn connect_refused_is_a_connection_error() {
        let (listener, mut conn) = listener().await;
        // Free the port before connecting to it.
        drop(listener);
        let err = conn.connect().await.unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
        assert!(!conn.connected());
    }

    #[tokio::test]
    async fn send_connects_lazily() {
        let (listener, mut conn) = listener().await;
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut read = Vec::new();
            stream.read_to_end(&mut read).await.unwrap();
            read
        });

        conn.send(b"hello").await.unwrap();
        assert!(conn.connected());
        conn.disconnect();

        let read = server.await.unwrap();
        let mut expected = vec![0x05u8];
        expected.extend_from_slice(b"hello");
        assert_eq!(read, expected);
    }

    #[tokio::test]
    async fn recv_returns_frames_and_keeps_the_remainder() {
        let (listener, mut conn) = listener().await;
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            // Two frames in a single write.
            let mut wire = BytesMut::new();
            frame::encode(b"first frame", &mut wire);
            frame::encode(b"second", &mut wire);
            stream.write_all(&wire).await.unwrap();
            stream.flush().await.unwrap();
            // Hold the socket open until the client is done.
            let mut scratch = [0u8; 1];
            let _ = stream.read(&mut scratch).await;
        });

        conn.connect().await.unwrap();
        assert_eq!(conn.recv().await.unwrap().as_ref(), b"first frame");
        assert_eq!(conn.recv().await.unwrap().as_ref(), b"second");
        conn.disconnect();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn recv_zero_length_frame() {
        let (listener, mut conn) = listener().await;
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut wire = BytesMut::new();
            frame::encode(b"", &mut wire);
            stream.write_all(&wire).await.unwrap();
            let mut scratch = [0u8; 1];
            let _ = stream.read(&mut scratch).await;
        });

        conn.connect().await.unwrap();
        // The declared frame is empty; the three padding bytes behind it
        // parse as further empty frames.
        assert!(conn.recv().await.unwrap().is_empty());
        assert!(conn.recv().await.unwrap().is_empty());
        conn.disconnect();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn recv_when_disconnected() {
        let (listener, mut conn) = listener().await;
        let err = conn.recv().await.unwrap_err();
        assert!(matches!(err, Error::Disconnected));
        drop(listener);
    }

    #[tokio::test]
    async fn peer_close_mid_frame_disconnects() {
        let (listener, mut conn) = listener().await;
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            // Declare 32 bytes, deliver 10, close.
            let mut wire = BytesMut::new();
            frame::put_uvarint(&mut wire, 32);
            wire.extend_from_slice(&[0xaa; 10]);
            stream.write_all(&wire).await.unwrap();
        });

        conn.connect().await.unwrap();
        let err = conn.recv().await.unwrap_err();
        assert!(matches!(err, Error::Disconnected));
        assert!(!conn.connected());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn read_timeout_is_a_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let mut conn = Connection::new("127.0.0.1", port, Some(Duration::from_millis(50)));

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            // Send nothing; let the client time out.
            time::sleep(Duration::from_millis(500)).await;
            drop(stream);
        });

        conn.connect().await.unwrap();
        let err = conn.recv().await.unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
        assert!(!conn.connected());
        server.await.unwrap();
    }
}
