//! CRC-ITU implementation for JM-VL03 frames.
//!
//! The protocol checks every frame with CRC-16/X-25: polynomial 0x1021,
//! reflected input and output, initial value 0xFFFF, final XOR 0xFFFF. The
//! checked region runs from the length field through the serial number, and
//! the 16-bit result is transmitted big-endian in the two bytes before the
//! stop marker.

use crc::{Algorithm, Crc};

/// CRC-16/X-25 parameterization used by the JM-VL03 protocol.
const CRC_ITU_ALG: Algorithm<u16> = Algorithm {
    width: 16,
    poly: 0x1021,
    init: 0xFFFF,
    refin: true,
    refout: true,
    xorout: 0xFFFF,
    check: 0x906E,
    residue: 0xF0B8,
};

/// CRC instance backed by the crate's 256-entry lookup table.
const CRC_ITU: Crc<u16> = Crc::<u16>::new(&CRC_ITU_ALG);

/// Calculate the CRC-ITU checksum of a byte slice.
pub fn crc_itu(data: &[u8]) -> u16 {
    CRC_ITU.checksum(data)
}

/// Check a complete frame's CRC trailer.
///
/// `frame` must be a whole frame including start and stop markers; the
/// checked region is `frame[2..len-4]` and the received value sits
/// big-endian at `frame[len-4..len-2]`. Returns `(computed, received)`.
///
/// # Panics
///
/// Panics if the frame is shorter than 6 bytes; callers validate frame
/// structure first.
pub fn frame_crc(frame: &[u8]) -> (u16, u16) {
    let len = frame.len();
    let computed = crc_itu(&frame[2..len - 4]);
    let received = u16::from_be_bytes([frame[len - 4], frame[len - 3]]);
    (computed, received)
}
