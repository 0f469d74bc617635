//! Tracker session server: accepts device connections, decodes the stream,
//! and writes acknowledgements.
//!
//! Usage: `vl03d [bind-addr]` (default `0.0.0.0:21100`). `RUST_LOG`
//! overrides the log filter.

use std::net::TcpListener;
use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use jmvl03::decoder::{Decoder, DecoderConfig};
use jmvl03::session::{serve, LogHandler, SessionConfig, SessionMap};

fn main() -> std::io::Result<()> {
    // Lenient decoding warns once per undecodable frame, which gets loud on
    // flaky cellular links; keep those at warn and let the session lifecycle
    // events through at info.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("jmvl03=warn,jmvl03::session=info"));
    fmt().with_env_filter(filter).with_target(true).init();

    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "0.0.0.0:21100".to_string());
    let listener = TcpListener::bind(&addr)?;

    // Field traffic is messy: keep decoding past bad frames and surface
    // unknown protocol bytes for the handler to inspect.
    let decoder = Arc::new(Decoder::with_config(DecoderConfig {
        strict_mode: false,
        allow_unknown_protocols: true,
        ..DecoderConfig::default()
    }));
    let sessions = Arc::new(SessionMap::new());

    serve(
        listener,
        decoder,
        sessions,
        Arc::new(LogHandler),
        SessionConfig::default(),
    )
}
