//! MSB-first bit reader over a byte slice.

use bitvec::prelude::*;

use crate::error::FieldError;

/// Reads MSB-first bit fields of up to 64 bits from a byte slice.
///
/// Used for the bit-packed status bytes (course/status, terminal info)
/// where fields straddle nibble and byte boundaries.
pub struct BitReader<'a> {
    bits: &'a BitSlice<u8, Msb0>,
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bits: bytes.view_bits::<Msb0>(),
            pos: 0,
        }
    }

    /// Read a `width`-bit field, MSB first.
    pub fn read(&mut self, width: usize) -> Result<u64, FieldError> {
        if width == 0 || width > 64 {
            return Err(FieldError::BitWidth { width });
        }
        if self.pos + width > self.bits.len() {
            return Err(FieldError::BitOverrun {
                wanted: width,
                remaining: self.remaining(),
            });
        }
        let mut value = 0u64;
        for bit in &self.bits[self.pos..self.pos + width] {
            value = (value << 1) | (*bit as u64);
        }
        self.pos += width;
        Ok(value)
    }

    /// Read a single bit as a flag.
    pub fn read_bool(&mut self) -> Result<bool, FieldError> {
        Ok(self.read(1)? == 1)
    }

    /// Discard `width` bits.
    pub fn skip(&mut self, width: usize) -> Result<(), FieldError> {
        if self.pos + width > self.bits.len() {
            return Err(FieldError::BitOverrun {
                wanted: width,
                remaining: self.remaining(),
            });
        }
        self.pos += width;
        Ok(())
    }

    /// Bits left to read.
    pub fn remaining(&self) -> usize {
        self.bits.len() - self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msb_first_fields() {
        // 0b1011_0110 0b0100_0000
        let mut reader = BitReader::new(&[0xB6, 0x40]);
        assert_eq!(reader.read(1).unwrap(), 1);
        assert_eq!(reader.read(3).unwrap(), 0b011);
        assert_eq!(reader.read(4).unwrap(), 0b0110);
        assert_eq!(reader.read(2).unwrap(), 0b01);
        assert_eq!(reader.remaining(), 6);
    }

    #[test]
    fn test_field_across_byte_boundary() {
        let mut reader = BitReader::new(&[0x01, 0x80]);
        assert_eq!(reader.read(9).unwrap(), 0b000000011);
    }

    #[test]
    fn test_wide_field() {
        let bytes = [0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF];
        let mut reader = BitReader::new(&bytes);
        assert_eq!(reader.read(64).unwrap(), 0x0123456789ABCDEF);
    }

    #[test]
    fn test_overrun() {
        let mut reader = BitReader::new(&[0xFF]);
        assert_eq!(reader.read(8).unwrap(), 0xFF);
        assert_eq!(
            reader.read(1),
            Err(FieldError::BitOverrun {
                wanted: 1,
                remaining: 0
            })
        );
    }

    #[test]
    fn test_bad_width() {
        let mut reader = BitReader::new(&[0xFF; 16]);
        assert!(matches!(reader.read(0), Err(FieldError::BitWidth { .. })));
        assert!(matches!(reader.read(65), Err(FieldError::BitWidth { .. })));
    }

    #[test]
    fn test_skip() {
        let mut reader = BitReader::new(&[0x0F]);
        reader.skip(4).unwrap();
        assert_eq!(reader.read(4).unwrap(), 0x0F);
        assert!(reader.skip(1).is_err());
    }
}
