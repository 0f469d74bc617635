//! Frame structure: markers, offsets, and the borrowed frame view.
//!
//! Layout: `start(2) | length(1|2) | protocol(1) | content(N) | serial(2) |
//! crc(2) | stop(2)`. The length field counts the protocol byte, content,
//! serial and CRC (`1 + N + 2 + 2`). Short frames (start 0x7878) carry a
//! one-byte length; long frames (0x7979) a two-byte length.

use crate::codec::read_u16_be;
use crate::error::DecodeError;

pub const START_SHORT: [u8; 2] = [0x78, 0x78];
pub const START_LONG: [u8; 2] = [0x79, 0x79];
pub const STOP: [u8; 2] = [0x0D, 0x0A];

/// Smallest possible short frame: empty content.
pub const MIN_FRAME_SHORT: usize = 10;
/// Smallest possible long frame: empty content.
pub const MIN_FRAME_LONG: usize = 11;
/// Largest possible frame: long start, maximal length field.
pub const MAX_FRAME: usize = 2 + 2 + 65535 + 2;

/// Common fields copied out of a decoded frame; every packet variant
/// embeds one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameMeta {
    pub protocol: u8,
    pub serial: u16,
    /// The complete raw frame, kept for logging and diagnostics.
    pub raw: Vec<u8>,
}

/// Borrowed view over one complete frame with field accessors.
///
/// Construction performs the minimal delimiting checks (known start marker,
/// minimum size); full structure validation (stop marker, length agreement,
/// size cap) lives in [`validate`](FrameView::validate) so the decoder can
/// gate it on policy flags.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    bytes: &'a [u8],
    long: bool,
}

impl<'a> FrameView<'a> {
    pub fn new(bytes: &'a [u8]) -> Result<Self, DecodeError> {
        if bytes.len() < 2 {
            return Err(DecodeError::FrameTooSmall {
                len: bytes.len(),
                min: MIN_FRAME_SHORT,
            });
        }
        let long = match [bytes[0], bytes[1]] {
            START_SHORT => false,
            START_LONG => true,
            _ => {
                return Err(DecodeError::InvalidStartMarker {
                    found: u16::from_be_bytes([bytes[0], bytes[1]]),
                })
            }
        };
        let min = if long { MIN_FRAME_LONG } else { MIN_FRAME_SHORT };
        if bytes.len() < min {
            return Err(DecodeError::FrameTooSmall {
                len: bytes.len(),
                min,
            });
        }
        Ok(FrameView { bytes, long })
    }

    /// Stop marker, length agreement, and the size cap.
    ///
    /// With `auto_correct`, a disagreeing length field is tolerated and the
    /// actual delimited size is used; all other checks still apply.
    pub fn validate(&self, max_packet_size: u32, auto_correct: bool) -> Result<(), DecodeError> {
        let len = self.bytes.len();
        if len > max_packet_size as usize {
            return Err(DecodeError::FrameTooLarge {
                len,
                max: max_packet_size,
            });
        }
        let stop = [self.bytes[len - 2], self.bytes[len - 1]];
        if stop != STOP {
            return Err(DecodeError::InvalidStopMarker {
                found: u16::from_be_bytes(stop),
            });
        }
        let declared = self.declared_total();
        if declared != len && !auto_correct {
            return Err(DecodeError::LengthMismatch {
                declared,
                actual: len,
            });
        }
        Ok(())
    }

    pub fn is_long(&self) -> bool {
        self.long
    }

    pub fn raw(&self) -> &'a [u8] {
        self.bytes
    }

    /// Value of the length field.
    pub fn declared_length(&self) -> usize {
        if self.long {
            // Two bytes guaranteed by the minimum-size check.
            read_u16_be(self.bytes, 2).unwrap_or(0) as usize
        } else {
            self.bytes[2] as usize
        }
    }

    /// Total frame size implied by the length field.
    pub fn declared_total(&self) -> usize {
        let width = if self.long { 2 } else { 1 };
        2 + width + self.declared_length() + 2
    }

    fn header_len(&self) -> usize {
        if self.long {
            5
        } else {
            4
        }
    }

    pub fn protocol(&self) -> u8 {
        self.bytes[self.header_len() - 1]
    }

    /// Protocol-specific payload between the protocol byte and the serial.
    pub fn content(&self) -> &'a [u8] {
        &self.bytes[self.header_len()..self.bytes.len() - 6]
    }

    pub fn serial(&self) -> u16 {
        let len = self.bytes.len();
        u16::from_be_bytes([self.bytes[len - 6], self.bytes[len - 5]])
    }

    /// Copy the common fields into an owned meta.
    pub fn meta(&self) -> FrameMeta {
        FrameMeta {
            protocol: self.protocol(),
            serial: self.serial(),
            raw: self.bytes.to_vec(),
        }
    }
}

/// Protocol byte of a raw frame without full validation.
pub fn get_protocol_number(frame: &[u8]) -> Option<u8> {
    FrameView::new(frame).ok().map(|v| v.protocol())
}

/// Serial number of a raw frame without full validation.
pub fn get_serial_number(frame: &[u8]) -> Option<u16> {
    FrameView::new(frame).ok().map(|v| v.serial())
}
