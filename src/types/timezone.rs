//! Packed timezone/language field from the login packet.

use crate::codec::BitReader;
use crate::error::FieldError;
use crate::protocol::Language;

/// Decoded timezone offset plus language selector.
///
/// Wire form (2 bytes): bits 15..4 hold the offset encoded decimally as
/// `hours * 100 + minutes` (UTC+8:00 is 800), bit 3 is 0 for East and 1 for
/// West of UTC, bits 1..0 select the language. Bit 2 is unused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimezoneLanguage {
    /// Signed offset from UTC in minutes.
    pub offset_minutes: i32,
    pub language: Language,
}

impl TimezoneLanguage {
    pub fn from_u16(raw: u16) -> Result<Self, FieldError> {
        let bytes = raw.to_be_bytes();
        let mut bits = BitReader::new(&bytes);
        // Width checked above the data, reads cannot fail on 16 bits.
        let value = bits.read(12).unwrap_or(0) as u16;
        let west = bits.read_bool().unwrap_or(false);
        let _ = bits.read(1);
        let language = Language::from_byte(bits.read(2).unwrap_or(0) as u8);

        let hours = value / 100;
        let minutes = value % 100;
        if minutes > 59 {
            return Err(FieldError::InvalidTimezone { raw, minutes });
        }
        let magnitude = hours as i32 * 60 + minutes as i32;
        Ok(TimezoneLanguage {
            offset_minutes: if west { -magnitude } else { magnitude },
            language,
        })
    }

    pub fn to_u16(self) -> u16 {
        let magnitude = self.offset_minutes.unsigned_abs();
        let value = (magnitude / 60) * 100 + magnitude % 60;
        let mut raw = (value as u16) << 4;
        if self.offset_minutes < 0 {
            raw |= 0x0008;
        }
        raw | self.language.to_byte() as u16
    }
}
