// ABOUTME: Recognized session settings with the streaming API's defaults
// ABOUTME: Built in a consuming builder style so call sites read as one expression

use std::time::Duration;

/// Default API host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default API port.
pub const DEFAULT_PORT: u16 = 3701;

/// Settings recognized by [`Session`](crate::session::Session).
///
/// Only the credentials are required; everything else has the API's
/// defaults.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Account username.
    pub username: String,
    /// Account password.
    pub password: String,
    /// API host.
    pub host: String,
    /// API port.
    pub port: u16,
    /// Resume token from a previous session; triggers a resume login on
    /// connect.
    pub session: Option<String>,
    /// First expected inbound sequence number.
    pub inseq: u64,
    /// First outbound sequence number to assign.
    pub outseq: u64,
    /// Timeout applied to connect and to blocking socket I/O.
    pub socket_timeout: Option<Duration>,
}

impl SessionConfig {
    /// New configuration with the given credentials and every other
    /// setting at its default.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            session: None,
            inseq: 1,
            outseq: 1,
            socket_timeout: None,
        }
    }

    /// Set the API host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the API port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Resume the identified session on connect.
    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    /// Override the starting sequence numbers.
    pub fn with_sequences(mut self, inseq: u64, outseq: u64) -> Self {
        self.inseq = inseq;
        self.outseq = outseq;
        self
    }

    /// Bound connect and blocking socket I/O by `timeout`.
    pub fn with_socket_timeout(mut self, timeout: Duration) -> Self {
        self.socket_timeout = Some(timeout);
        self
    }
}
