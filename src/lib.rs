//! Client library for the Smarkets streaming API.
//!
//! Maintains a long-lived, authenticated, sequenced message session over
//! a single TCP connection, exchanging length-prefixed binary payloads.
//! The layers, leaves first:
//!
//! * [`frame`] - the wire framing: a ULEB128 length prefix followed by
//!   the payload bytes.
//! * [`connection`] - the socket channel: lazy connect, framed
//!   send/recv, die-fast error handling.
//! * [`session`] - the sequenced-message state machine: login/resume
//!   handshake, sequence validation, replay requests, heartbeat echo.
//!
//! Payload serialisation sits behind the [`codec::PayloadCodec`] seam;
//! [`codec::SetoCodec`] is the default implementation and
//! [`datatypes`] holds the payload model it encodes.
//!
//! # Examples
//!
//! ```rust,no_run
//! use smk::datatypes::Body;
//! use smk::{Session, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> smk::Result<()> {
//!     let config = SessionConfig::new("username", "password")
//!         .with_host("stream.example.net")
//!         .with_socket_timeout(std::time::Duration::from_secs(30));
//!     let mut session = Session::new(config);
//!
//!     // Connects the socket and sends the login payload.
//!     session.connect().await?;
//!
//!     loop {
//!         // `None` means the frame was absorbed by the session (a
//!         // control message, a replay marker, or an out-of-order
//!         // frame); anything else is the next in-order payload.
//!         let Some(payload) = session.next_frame().await? else {
//!             continue;
//!         };
//!         if let Body::Message(message) = &payload.body {
//!             println!("application message kind {}", message.kind);
//!         }
//!     }
//! }
//! ```
//!
//! Resuming a previous logical session only needs the token from the
//! last login response:
//!
//! ```rust,no_run
//! # use smk::{Session, SessionConfig};
//! # async fn example() -> smk::Result<()> {
//! let config = SessionConfig::new("username", "password")
//!     .with_session("session-token");
//! let mut session = Session::new(config);
//! session.connect().await?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod connection;
pub mod datatypes;
pub mod error;
pub mod frame;
pub mod session;


// Re-export the codec seam for callers supplying their own codec.
pub use codec::{CodecError, Decodable, Encodable, PayloadCodec, SetoCodec};

// Re-export the main session API for easy access.
pub use datatypes::Payload;
pub use error::{Error, Result};
pub use session::{Session, SessionConfig};
