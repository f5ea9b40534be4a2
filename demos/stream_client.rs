// ABOUTME: Runnable streaming client that logs in and follows the sequenced feed
// ABOUTME: Demonstrates session construction, resume, and the read loop

//! # Streaming read-loop client
//!
//! Logs in to the streaming API and prints every in-order payload until
//! interrupted.
//!
//! ## Usage
//!
//! ```bash
//! # Fresh login against a local endpoint
//! cargo run --example stream_client -- --username alice --password hunter2
//!
//! # Resume a previous session on another host
//! cargo run --example stream_client -- \
//!   --username alice --password hunter2 \
//!   --host stream.example.net --session sess-xyz \
//!   --socket-timeout 30
//! ```

use argh::FromArgs;
use smk::datatypes::Body;
use smk::{Session, SessionConfig};
use std::error::Error;
use std::time::Duration;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

/// Log in to the streaming API and print every in-order payload.
#[derive(FromArgs)]
struct CliArgs {
    /// whether or not to enable debugging
    #[argh(switch, short = 'd')]
    debugging: bool,

    /// the account username
    #[argh(option)]
    username: String,

    /// the account password
    #[argh(option)]
    password: String,

    /// the hostname or IP address of the API (default: localhost)
    #[argh(option)]
    host: Option<String>,

    /// the port to use when connecting (default: 3701)
    #[argh(option, short = 'p')]
    port: Option<u16>,

    /// resume token from a previous session
    #[argh(option)]
    session: Option<String>,

    /// socket timeout in seconds
    #[argh(option)]
    socket_timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args: CliArgs = argh::from_env();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.debugging {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = SessionConfig::new(args.username, args.password);
    if let Some(host) = args.host {
        config = config.with_host(host);
    }
    if let Some(port) = args.port {
        config = config.with_port(port);
    }
    if let Some(session) = args.session {
        config = config.with_session(session);
    }
    if let Some(secs) = args.socket_timeout {
        config = config.with_socket_timeout(Duration::from_secs(secs));
    }

    let mut session = Session::new(config);
    session.connect().await?;
    info!("logged in, following the feed");

    loop {
        let Some(payload) = session.next_frame().await? else {
            continue;
        };
        match &payload.body {
            Body::Eto => {
                info!(seq = payload.eto.seq, eto = ?payload.eto.body, "transport message");
            }
            Body::Login(_) => {}
            Body::Message(message) => {
                info!(
                    seq = payload.eto.seq,
                    kind = message.kind,
                    bytes = message.data.len(),
                    "application message"
                );
            }
        }
    }
}
