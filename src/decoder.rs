//! Decoder façade: structure checks, CRC verification and dispatch.

use tracing::{debug, warn};

use crate::crc::frame_crc;
use crate::error::DecodeError;
use crate::frame::{self, FrameView};
use crate::packet::{Packet, UnparsedPacket};
use crate::parsers::{ParserFn, ParserRegistry};
use crate::splitter::{self, SplitResult, StreamViolation};

/// Decode policy flags.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderConfig {
    /// Abort on the first per-frame failure. When false, failed frames are
    /// skipped in stream decodes and surfaced as unparsed packets where
    /// policy allows.
    pub strict_mode: bool,
    /// Skip CRC verification. Development only.
    pub skip_crc: bool,
    /// Skip stop-marker, length-agreement and size-cap validation.
    pub skip_structure: bool,
    /// Hard cap on a single frame.
    pub max_packet_size: u32,
    /// In lenient mode, surface frames with unregistered protocol bytes as
    /// [`UnparsedPacket`]s instead of failing.
    pub allow_unknown_protocols: bool,
    /// Check the IMEI Luhn digit during login parsing. Format validation
    /// always runs; the checksum is off the hot path by default.
    pub validate_imei_checksum: bool,
    /// Tolerate a length field that disagrees with the actual delimited
    /// frame size.
    pub auto_correct: bool,
    /// Fallback applied when a login carries an undecodable timezone field.
    pub default_timezone_offset_minutes: Option<i32>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        DecoderConfig {
            strict_mode: true,
            skip_crc: false,
            skip_structure: false,
            max_packet_size: frame::MAX_FRAME as u32,
            allow_unknown_protocols: false,
            validate_imei_checksum: false,
            auto_correct: false,
            default_timezone_offset_minutes: None,
        }
    }
}

/// Outcome of decoding one accumulated stream buffer.
#[derive(Debug)]
pub struct StreamDecode<'a> {
    /// Successfully decoded packets, in byte-arrival order.
    pub packets: Vec<Packet>,
    /// Bytes to prepend to the next read.
    pub residue: &'a [u8],
    /// Corrupt regions the splitter skipped.
    pub violations: Vec<StreamViolation>,
    /// First decode failure, strict mode only.
    pub error: Option<DecodeError>,
}

/// Immutable decoding pipeline; build once, share across sessions.
pub struct Decoder {
    config: DecoderConfig,
    registry: ParserRegistry,
}

impl Decoder {
    /// Decoder with default config and every built-in parser.
    pub fn new() -> Self {
        Decoder {
            config: DecoderConfig::default(),
            registry: ParserRegistry::with_defaults(),
        }
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        Decoder {
            config,
            registry: ParserRegistry::with_defaults(),
        }
    }

    pub fn builder() -> DecoderBuilder {
        DecoderBuilder::new()
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode one complete frame.
    pub fn decode(&self, frame: &[u8]) -> Result<Packet, DecodeError> {
        let view = FrameView::new(frame)?;
        if !self.config.skip_structure {
            view.validate(self.config.max_packet_size, self.config.auto_correct)?;
        }
        if !self.config.skip_crc {
            let (computed, received) = frame_crc(frame);
            if computed != received {
                return Err(DecodeError::CrcMismatch { computed, received });
            }
        }

        let protocol = view.protocol();
        match self.registry.get(protocol) {
            Some(parser) => match parser(&view, &self.config) {
                Ok(packet) => Ok(packet),
                Err(err) if !self.config.strict_mode => {
                    warn!(
                        protocol,
                        serial = view.serial(),
                        error = %err,
                        "parse failed, surfacing unparsed packet"
                    );
                    Ok(Packet::Unparsed(UnparsedPacket {
                        meta: view.meta(),
                        parse_error: Some(err.to_string()),
                    }))
                }
                Err(err) => Err(err),
            },
            None if !self.config.strict_mode && self.config.allow_unknown_protocols => {
                debug!(protocol, "unknown protocol surfaced unparsed");
                Ok(Packet::Unparsed(UnparsedPacket {
                    meta: view.meta(),
                    parse_error: None,
                }))
            }
            None => Err(DecodeError::UnknownProtocol { protocol }),
        }
    }

    /// Split an accumulated buffer and decode every complete frame.
    ///
    /// Strict mode stops at the first failure and reports what succeeded
    /// plus the residue; lenient mode skips failed frames.
    pub fn decode_stream<'a>(&self, buffer: &'a [u8]) -> StreamDecode<'a> {
        let split = splitter::split(buffer);
        let mut packets = Vec::with_capacity(split.frames.len());
        let mut error = None;
        for frame in &split.frames {
            match self.decode(frame) {
                Ok(packet) => packets.push(packet),
                Err(err) => {
                    if self.config.strict_mode {
                        error = Some(err);
                        break;
                    }
                    debug!(error = %err, "skipping undecodable frame");
                }
            }
        }
        StreamDecode {
            packets,
            residue: split.residue,
            violations: split.violations,
            error,
        }
    }

    /// Frame boundaries without any CRC cost.
    pub fn split<'a>(&self, buffer: &'a [u8]) -> SplitResult<'a> {
        splitter::split(buffer)
    }

    pub fn has_complete_packet(&self, buffer: &[u8]) -> bool {
        splitter::has_complete_packet(buffer)
    }

    pub fn estimate_packet_count(&self, buffer: &[u8]) -> usize {
        splitter::estimate_packet_count(buffer)
    }

    pub fn get_protocol_number(&self, frame: &[u8]) -> Option<u8> {
        frame::get_protocol_number(frame)
    }

    pub fn get_serial_number(&self, frame: &[u8]) -> Option<u16> {
        frame::get_serial_number(frame)
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a decoder with custom configuration and parser wiring.
///
/// The registry is frozen when [`build`](DecoderBuilder::build) runs;
/// nothing registers at runtime.
pub struct DecoderBuilder {
    config: DecoderConfig,
    registry: ParserRegistry,
}

impl DecoderBuilder {
    pub fn new() -> Self {
        DecoderBuilder {
            config: DecoderConfig::default(),
            registry: ParserRegistry::with_defaults(),
        }
    }

    /// Start from an empty registry instead of the built-in parsers.
    pub fn without_default_parsers(mut self) -> Self {
        self.registry = ParserRegistry::empty();
        self
    }

    pub fn config(mut self, config: DecoderConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a parser for a protocol byte. Duplicate registration fails
    /// here, at initialization.
    pub fn register_parser(mut self, protocol: u8, parser: ParserFn) -> Result<Self, DecodeError> {
        self.registry.register(protocol, parser)?;
        Ok(self)
    }

    pub fn build(self) -> Decoder {
        Decoder {
            config: self.config,
            registry: self.registry,
        }
    }
}

impl Default for DecoderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
