//! Session layer: per-connection state, IMEI binding and acknowledgement
//! selection.
//!
//! One OS thread serves one TCP connection. The decoder and encoder are
//! immutable values shared across sessions; the only process-wide state is
//! the IMEI → session map, guarded by a reader-writer lock. Within a
//! connection, packets decode in byte-arrival order and acknowledgements
//! are emitted in the same order as their triggering packets.

use std::collections::HashMap;
use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex, RwLock};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::{DecodeError, SessionError};
use crate::packet::Packet;
use crate::types::{DateTime, Imei};

/// Session-layer knobs.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Hard cap on the per-connection read buffer. `None` derives
    /// 4 × the decoder's max packet size.
    pub max_buffer: Option<usize>,
    /// Socket read timeout; an expired timer closes the connection.
    pub read_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            max_buffer: None,
            read_timeout: Some(Duration::from_secs(300)),
        }
    }
}

/// Receives every decoded packet. Implementations must be cheap or hand
/// off; the session thread calls them inline.
pub trait PacketHandler: Send + Sync {
    fn handle(&self, peer: SocketAddr, imei: Option<&Imei>, packet: &Packet);
}

/// Handler that only logs, for servers that just acknowledge.
pub struct LogHandler;

impl PacketHandler for LogHandler {
    fn handle(&self, peer: SocketAddr, imei: Option<&Imei>, packet: &Packet) {
        info!(
            %peer,
            imei = imei.map(Imei::as_str).unwrap_or("-"),
            kind = packet.kind_name(),
            serial = packet.serial(),
            "packet"
        );
    }
}

/// What one buffer feed produced.
#[derive(Debug)]
pub struct SessionOutput {
    pub packets: Vec<Packet>,
    /// Acknowledgement frames to write back, in trigger order.
    pub responses: Vec<Vec<u8>>,
    /// First decode failure when the decoder runs strict.
    pub error: Option<DecodeError>,
}

/// Mutable per-connection state.
pub struct Session {
    peer: SocketAddr,
    decoder: Arc<Decoder>,
    encoder: Encoder,
    buffer: Vec<u8>,
    imei: Option<Imei>,
    last_seen: Instant,
    packet_count: u64,
    max_buffer: usize,
}

impl Session {
    pub fn new(
        peer: SocketAddr,
        decoder: Arc<Decoder>,
        encoder: Encoder,
        config: &SessionConfig,
    ) -> Self {
        let max_buffer = config
            .max_buffer
            .unwrap_or(decoder.config().max_packet_size as usize * 4);
        Session {
            peer,
            decoder,
            encoder,
            buffer: Vec::new(),
            imei: None,
            last_seen: Instant::now(),
            packet_count: 0,
            max_buffer,
        }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// IMEI learned from the login packet, if one arrived yet.
    pub fn imei(&self) -> Option<&Imei> {
        self.imei.as_ref()
    }

    pub fn packet_count(&self) -> u64 {
        self.packet_count
    }

    pub fn last_seen(&self) -> Instant {
        self.last_seen
    }

    /// Bytes currently buffered waiting for a complete frame.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Append freshly read bytes, decode every complete frame, and select
    /// acknowledgements. The residue stays buffered for the next read.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<SessionOutput, SessionError> {
        if self.buffer.len() + bytes.len() > self.max_buffer {
            return Err(SessionError::BufferOverflow {
                len: self.buffer.len() + bytes.len(),
                cap: self.max_buffer,
            });
        }
        self.buffer.extend_from_slice(bytes);

        let (packets, residue_len, error) = {
            let outcome = self.decoder.decode_stream(&self.buffer);
            for violation in &outcome.violations {
                warn!(
                    peer = %self.peer,
                    offset = violation.offset,
                    skipped = violation.skipped,
                    kind = ?violation.kind,
                    "corrupt bytes in stream"
                );
            }
            (outcome.packets, outcome.residue.len(), outcome.error)
        };
        // The residue is always the buffer tail.
        let consumed = self.buffer.len() - residue_len;
        self.buffer.drain(..consumed);

        self.last_seen = Instant::now();
        self.packet_count += packets.len() as u64;

        let mut responses = Vec::new();
        for packet in &packets {
            if let Packet::Login(login) = packet {
                info!(peer = %self.peer, imei = %login.imei, "device identified");
                self.imei = Some(login.imei.clone());
            }
            if let Some(response) = self.response_for(packet) {
                responses.push(response);
            }
        }
        if let Some(err) = &error {
            warn!(peer = %self.peer, error = %err, "frame failed to decode");
        }

        Ok(SessionOutput {
            packets,
            responses,
            error,
        })
    }

    /// Acknowledgement for packets whose protocol requires one.
    fn response_for(&self, packet: &Packet) -> Option<Vec<u8>> {
        match packet {
            Packet::Login(p) => Some(self.encoder.login_ack(p.meta.serial)),
            Packet::Heartbeat(p) => Some(self.encoder.heartbeat_ack(p.meta.serial)),
            Packet::Alarm(p) => Some(self.encoder.alarm_ack(p.meta.serial)),
            Packet::AlarmMultiFence(p) => Some(self.encoder.alarm_multi_fence_ack(p.meta.serial)),
            Packet::Alarm4G(p) => Some(self.encoder.alarm_4g_ack(p.meta.serial)),
            Packet::TimeCalibration(p) => match DateTime::now_utc() {
                Ok(utc) => Some(self.encoder.time_calibration_ack(p.meta.serial, utc)),
                Err(err) => {
                    error!(error = %err, "system clock outside wire range");
                    None
                }
            },
            Packet::GpsLocation(_)
            | Packet::GpsLocation4G(_)
            | Packet::LbsMultiBase(_)
            | Packet::Lbs4G(_)
            | Packet::InfoTransfer(_)
            | Packet::AddressResponseChinese(_)
            | Packet::AddressResponseEnglish(_)
            | Packet::OnlineCommand(_)
            | Packet::CommandResponse(_)
            | Packet::GpsAddressRequest(_)
            | Packet::Unparsed(_) => None,
        }
    }
}

/// Process-wide IMEI → session map.
///
/// Written on login and disconnect, read everywhere else. A session is
/// addressable only by peer address until its login arrives.
#[derive(Default)]
pub struct SessionMap {
    inner: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an IMEI to a session, replacing any stale binding from a
    /// previous connection of the same device.
    pub fn bind(&self, imei: &Imei, session: Arc<Mutex<Session>>) {
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if map.insert(imei.as_str().to_string(), session).is_some() {
            debug!(%imei, "replaced stale session binding");
        }
    }

    /// Drop a binding, but only if it still points at the given session.
    pub fn unbind(&self, imei: &Imei, session: &Arc<Mutex<Session>>) {
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if let Some(bound) = map.get(imei.as_str()) {
            if Arc::ptr_eq(bound, session) {
                map.remove(imei.as_str());
            }
        }
    }

    pub fn get(&self, imei: &str) -> Option<Arc<Mutex<Session>>> {
        let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
        map.get(imei).cloned()
    }

    pub fn len(&self) -> usize {
        let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
        map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// IMEIs of currently bound sessions.
    pub fn imeis(&self) -> Vec<String> {
        let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
        map.keys().cloned().collect()
    }
}

/// Accept loop: one thread per connection.
pub fn serve(
    listener: TcpListener,
    decoder: Arc<Decoder>,
    sessions: Arc<SessionMap>,
    handler: Arc<dyn PacketHandler>,
    config: SessionConfig,
) -> std::io::Result<()> {
    info!(addr = %listener.local_addr()?, "listening");
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let decoder = Arc::clone(&decoder);
                let sessions = Arc::clone(&sessions);
                let handler = Arc::clone(&handler);
                let config = config.clone();
                thread::spawn(move || {
                    if let Err(err) = handle_connection(stream, decoder, sessions, handler, config)
                    {
                        warn!(error = %err, "connection ended with error");
                    }
                });
            }
            Err(err) => warn!(error = %err, "accept failed"),
        }
    }
    Ok(())
}

/// Read loop for one connection: feed the session, write acknowledgements,
/// invoke the handler, maintain the IMEI binding.
pub fn handle_connection(
    mut stream: TcpStream,
    decoder: Arc<Decoder>,
    sessions: Arc<SessionMap>,
    handler: Arc<dyn PacketHandler>,
    config: SessionConfig,
) -> Result<(), SessionError> {
    let peer = stream.peer_addr().map_err(|source| SessionError::Io { source })?;
    stream
        .set_read_timeout(config.read_timeout)
        .map_err(|source| SessionError::Io { source })?;
    info!(%peer, "connected");

    let session = Arc::new(Mutex::new(Session::new(
        peer,
        decoder,
        Encoder::new(),
        &config,
    )));
    let mut read_buf = [0u8; 4096];
    let result = loop {
        let n = match stream.read(&mut read_buf) {
            Ok(0) => break Ok(()),
            Ok(n) => n,
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                info!(%peer, "read timeout, closing");
                break Ok(());
            }
            Err(source) => break Err(SessionError::Io { source }),
        };

        let mut guard = session.lock().unwrap_or_else(|e| e.into_inner());
        let had_imei = guard.imei().is_some();
        let output = match guard.feed(&read_buf[..n]) {
            Ok(output) => output,
            Err(err) => break Err(err),
        };
        if !had_imei {
            if let Some(imei) = guard.imei().cloned() {
                sessions.bind(&imei, Arc::clone(&session));
            }
        }
        for packet in &output.packets {
            handler.handle(peer, guard.imei(), packet);
        }
        let responses = output.responses;
        drop(guard);

        for response in responses {
            if let Err(source) = stream.write_all(&response) {
                return cleanup(&sessions, &session, Err(SessionError::Io { source }));
            }
        }
    };

    cleanup(&sessions, &session, result)
}

fn cleanup(
    sessions: &Arc<SessionMap>,
    session: &Arc<Mutex<Session>>,
    result: Result<(), SessionError>,
) -> Result<(), SessionError> {
    let guard = session.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(imei) = guard.imei() {
        sessions.unbind(imei, session);
    }
    info!(
        peer = %guard.peer(),
        packets = guard.packet_count(),
        "disconnected"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::DecoderConfig;

    const LOGIN_FRAME: [u8; 22] = [
        0x78, 0x78, 0x11, 0x01, 0x01, 0x23, 0x45, 0x67, 0x89, 0x01, 0x23, 0x48, 0x04, 0x4D, 0x32,
        0x00, 0x00, 0x01, 0x13, 0xB4, 0x0D, 0x0A,
    ];
    const HB1: [u8; 13] = [
        0x78, 0x78, 0x08, 0x13, 0x04, 0x03, 0x00, 0x00, 0x01, 0x05, 0x05, 0x0D, 0x0A,
    ];
    const TC_REQUEST: [u8; 10] = [0x78, 0x78, 0x05, 0x8A, 0x00, 0x01, 0xFC, 0x96, 0x0D, 0x0A];

    fn test_session() -> Session {
        let peer: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        Session::new(
            peer,
            Arc::new(Decoder::new()),
            Encoder::new(),
            &SessionConfig::default(),
        )
    }

    #[test]
    fn test_login_binds_imei_and_acks() {
        let mut session = test_session();
        assert!(session.imei().is_none());
        let output = session.feed(&LOGIN_FRAME).unwrap();
        assert_eq!(output.packets.len(), 1);
        assert_eq!(session.imei().unwrap().as_str(), "123456789012348");
        assert_eq!(output.responses.len(), 1);
        // Login ack echoes the serial.
        assert_eq!(
            output.responses[0],
            vec![0x78, 0x78, 0x05, 0x01, 0x00, 0x01, 0xD9, 0xDC, 0x0D, 0x0A]
        );
        assert_eq!(session.packet_count(), 1);
    }

    #[test]
    fn test_fragmented_reads_keep_residue() {
        let mut session = test_session();

        let output = session.feed(&HB1[..3]).unwrap();
        assert!(output.packets.is_empty());
        assert_eq!(session.buffered(), 3);

        let mut second = HB1[3..].to_vec();
        second.extend_from_slice(&HB1[..2]);
        let output = session.feed(&second).unwrap();
        assert_eq!(output.packets.len(), 1);
        assert_eq!(output.responses.len(), 1);
        assert_eq!(session.buffered(), 2);

        let output = session.feed(&HB1[2..]).unwrap();
        assert_eq!(output.packets.len(), 1);
        assert_eq!(session.buffered(), 0);
        assert_eq!(session.packet_count(), 2);
    }

    #[test]
    fn test_time_calibration_ack_emitted() {
        let mut session = test_session();
        let output = session.feed(&TC_REQUEST).unwrap();
        assert_eq!(output.responses.len(), 1);
        let ack = &output.responses[0];
        assert_eq!(ack[3], 0x8A);
        // Six content bytes of UTC time.
        assert_eq!(ack.len(), 16);
        assert_eq!(u16::from_be_bytes([ack[10], ack[11]]), 1);
    }

    #[test]
    fn test_location_gets_no_ack() {
        let mut content = vec![24u8, 6, 15, 14, 30, 45, 0xC8];
        content.extend_from_slice(&40_582_800u32.to_be_bytes());
        content.extend_from_slice(&205_304_040u32.to_be_bytes());
        content.push(40);
        content.extend_from_slice(&[0x15, 0x4C]);
        content.extend_from_slice(&[0x01, 0xCC, 0x00, 0x28, 0x7D, 0x00, 0x1F, 0x71]);
        content.extend_from_slice(&[0x01, 0x00, 0x00]);
        let mut body = vec![(1 + content.len() + 4) as u8, 0x22];
        body.extend_from_slice(&content);
        body.extend_from_slice(&[0x00, 0x09]);
        let crc = crate::crc::crc_itu(&body);
        let mut frame = vec![0x78, 0x78];
        frame.extend_from_slice(&body);
        frame.extend_from_slice(&crc.to_be_bytes());
        frame.extend_from_slice(&[0x0D, 0x0A]);

        let mut session = test_session();
        let output = session.feed(&frame).unwrap();
        assert_eq!(output.packets.len(), 1);
        assert!(matches!(output.packets[0], Packet::GpsLocation(_)));
        assert!(output.responses.is_empty());
    }

    #[test]
    fn test_buffer_overflow_is_fatal() {
        let peer: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        let decoder = Arc::new(Decoder::with_config(DecoderConfig {
            max_packet_size: 64,
            ..DecoderConfig::default()
        }));
        let mut session = Session::new(
            peer,
            decoder,
            Encoder::new(),
            &SessionConfig {
                max_buffer: Some(16),
                read_timeout: None,
            },
        );
        assert!(session.feed(&[0x78u8; 8]).is_ok());
        assert!(matches!(
            session.feed(&[0x78u8; 16]),
            Err(SessionError::BufferOverflow { cap: 16, .. })
        ));
    }

    #[test]
    fn test_session_map_bind_unbind() {
        let map = SessionMap::new();
        let imei = Imei::new("123456789012348").unwrap();
        let session = Arc::new(Mutex::new(test_session()));
        map.bind(&imei, Arc::clone(&session));
        assert_eq!(map.len(), 1);
        assert!(map.get("123456789012348").is_some());

        // A newer session for the same IMEI replaces the binding; the old
        // session's unbind must not evict the newcomer.
        let newer = Arc::new(Mutex::new(test_session()));
        map.bind(&imei, Arc::clone(&newer));
        map.unbind(&imei, &session);
        assert_eq!(map.len(), 1);
        map.unbind(&imei, &newer);
        assert!(map.is_empty());
    }
}
