// ABOUTME: Sequenced-message session over the framed TCP channel
// ABOUTME: Handles login/resume, sequence bookkeeping, replay requests, and heartbeat echo

//! Session management for the streaming API.
//!
//! A [`Session`] keeps one authenticated, sequenced message stream alive
//! over a single TCP connection. Outbound payloads are stamped with a
//! strictly increasing transport sequence; inbound frames are validated
//! against the expected sequence, with gaps answered by a replay request
//! and control messages (login response, heartbeat) intercepted before
//! the caller sees them.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use smk::{Session, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> smk::Result<()> {
//!     let config = SessionConfig::new("username", "password")
//!         .with_host("stream.example.net");
//!     let mut session = Session::new(config);
//!     session.connect().await?;
//!
//!     loop {
//!         if let Some(payload) = session.next_frame().await? {
//!             println!("in-order payload: {payload:?}");
//!         }
//!     }
//! }
//! ```
//!
//! A session is not safe for concurrent use; the `&mut self` receivers
//! make one caller at a time a compile-time guarantee.

mod config;

pub use config::{DEFAULT_HOST, DEFAULT_PORT, SessionConfig};

use crate::codec::{PayloadCodec, SetoCodec};
use crate::connection::Connection;
use crate::datatypes::{Body, EtoBody, Login, Payload, Replay, SessionLogin};
use crate::error::Result;
use bytes::BytesMut;
use tracing::{debug, info};

/// Manages TCP communication via the exchange's streaming API.
///
/// One value per connection. The session owns its socket channel, the
/// two reusable payload buffers, and the sequence counters; in the
/// steady state no allocation happens per message.
pub struct Session<C = SetoCodec> {
    username: String,
    password: String,

    // Issued by the server in a login response; stable until the next
    // explicit login.
    session_id: Option<String>,

    // Next expected inbound / next assigned outbound sequence.
    in_seq: u64,
    out_seq: u64,

    connection: Connection,
    codec: C,

    in_payload: Payload,
    out_payload: Payload,
    out_buf: BytesMut,
}

impl Session<SetoCodec> {
    /// Create a session with the crate's default payload codec.
    pub fn new(config: SessionConfig) -> Session<SetoCodec> {
        Session::with_codec(config, SetoCodec)
    }
}

impl<C: PayloadCodec> Session<C> {
    /// Create a session that serialises through `codec`.
    pub fn with_codec(config: SessionConfig, codec: C) -> Session<C> {
        Session {
            connection: Connection::new(config.host, config.port, config.socket_timeout),
            username: config.username,
            password: config.password,
            session_id: config.session,
            in_seq: config.inseq,
            out_seq: config.outseq,
            codec,
            in_payload: Payload::default(),
            out_payload: Payload::default(),
            out_buf: BytesMut::with_capacity(256),
        }
    }

    /// Whether the underlying socket is currently connected.
    pub fn connected(&self) -> bool {
        self.connection.connected()
    }

    /// Resume token issued by the server, once one has been seen.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Next expected inbound sequence number.
    pub fn in_seq(&self) -> u64 {
        self.in_seq
    }

    /// Next outbound sequence number to assign.
    pub fn out_seq(&self) -> u64 {
        self.out_seq
    }

    /// Outbound payload buffer.
    ///
    /// Populate it, then call [`send`](Self::send); the exclusive borrow
    /// makes populate-then-send atomic.
    pub fn out_payload_mut(&mut self) -> &mut Payload {
        &mut self.out_payload
    }

    /// Connect to the API and log in if not already connected.
    ///
    /// When a resume token is held (from the configuration or a previous
    /// login response), the login also presents it to re-open the
    /// logical session.
    pub async fn connect(&mut self) -> Result<()> {
        if !self.connection.connect().await? {
            return Ok(());
        }
        let login = &mut self.out_payload;
        login.clear();
        login.body = Body::Login(Login {
            username: self.username.clone(),
            password: self.password.clone(),
        });
        info!("sending login payload");
        if let Some(session) = &self.session_id {
            info!(session = %session, "attempting to resume session");
            login.eto.body = EtoBody::Login(SessionLogin {
                session_id: session.clone(),
            });
        }
        self.send().await
    }

    /// Disconnect from the API.
    pub fn disconnect(&mut self) {
        self.connection.disconnect();
    }

    /// Serialise, sequence, and transmit the outbound payload buffer.
    pub async fn send(&mut self) -> Result<()> {
        debug!(seq = self.out_seq, "sending payload");
        self.out_payload.eto.seq = self.out_seq;
        self.out_buf.clear();
        self.codec.encode(&self.out_payload, &mut self.out_buf)?;
        self.connection.send(&self.out_buf).await?;
        self.out_seq += 1;
        Ok(())
    }

    /// Read one frame and run it through the sequence state machine.
    ///
    /// Returns the payload when it was the next in-order message, and
    /// `None` when the frame was absorbed: a replay marker, a gap that
    /// triggered a replay request, or a stale duplicate.
    pub async fn next_frame(&mut self) -> Result<Option<&Payload>> {
        let bytes = self.connection.recv().await?;
        self.codec.decode(&bytes, &mut self.in_payload)?;
        self.handle_in_payload().await?;

        let seq = self.in_payload.eto.seq;
        if seq == self.in_seq {
            debug!(seq, "received in-order sequence");
            self.in_seq += 1;
            return Ok(Some(&self.in_payload));
        }
        if let EtoBody::Replay(replay) = &self.in_payload.eto.body {
            // Replayed frames re-carry historical sequence numbers;
            // classifying them by sequence would request replays of
            // replays forever.
            debug!(seq = replay.seq, "received a replay message");
            return Ok(None);
        }
        if seq > self.in_seq {
            info!(
                received = seq,
                expected = self.in_seq,
                "incoming sequence gap, requesting replay"
            );
            let replay = &mut self.out_payload;
            replay.clear();
            replay.eto.body = EtoBody::Replay(Replay { seq: self.in_seq });
            self.send().await?;
            return Ok(None);
        }
        // Behind the expected sequence: already seen, drop silently.
        Ok(None)
    }

    // Pre-consume control messages before sequence classification.
    async fn handle_in_payload(&mut self) -> Result<()> {
        if let EtoBody::LoginResponse(response) = &self.in_payload.eto.body {
            info!(
                session = %response.session_id,
                reset = response.reset,
                "received login_response"
            );
            self.session_id = Some(response.session_id.clone());
            self.out_seq = response.reset;
        } else if matches!(self.in_payload.eto.body, EtoBody::Heartbeat) {
            debug!("received heartbeat message, responding");
            let heartbeat = &mut self.out_payload;
            heartbeat.clear();
            heartbeat.eto.body = EtoBody::Heartbeat;
            self.send().await?;
        }
        Ok(())
    }
}
