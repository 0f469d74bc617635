//! Codec primitives: big-endian integer I/O, BCD, and a bit reader.
//!
//! Everything multibyte on the JM-VL03 wire is big-endian. Readers take a
//! buffer and an offset and fail with a typed error on underrun instead of
//! panicking; writers append to a growable buffer.

mod bcd;
mod bits;
mod bytes;

pub use bcd::{decode_bcd, encode_bcd};
pub use bits::BitReader;
pub use bytes::{
    read_u16_be, read_u24_be, read_u32_be, read_u64_be, write_u16_be, write_u24_be, write_u32_be,
    write_u64_be,
};
