//! IMEI handling: BCD wire form, 15-digit logical form, optional Luhn check.

use std::fmt;

use crate::codec::{decode_bcd, encode_bcd};
use crate::error::FieldError;

/// 15-digit device identifier.
///
/// The wire carries 8 BCD bytes (16 digits); devices pad with a leading
/// zero nibble, so the logical IMEI is the last 15 digits. Format (15
/// decimal digits) is always validated; the Luhn checksum check is separate
/// and gated by decoder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Imei(String);

impl Imei {
    /// Parse a 15-digit string.
    pub fn new(digits: &str) -> Result<Self, FieldError> {
        if digits.len() != 15 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FieldError::InvalidImei {
                digits: digits.to_string(),
            });
        }
        Ok(Imei(digits.to_string()))
    }

    /// Decode the 8-byte BCD wire form.
    pub fn from_bcd(bytes: &[u8]) -> Result<Self, FieldError> {
        if bytes.len() != 8 {
            return Err(FieldError::OutOfBounds {
                offset: 0,
                needed: 8,
                available: bytes.len(),
            });
        }
        let digits = decode_bcd(bytes)?;
        // First nibble is padding.
        Imei::new(&digits[1..])
    }

    /// Encode as the 8-byte BCD wire form with the leading pad nibble.
    pub fn to_bcd(&self) -> [u8; 8] {
        let padded = format!("0{}", self.0);
        let mut out = [0u8; 8];
        // The padded string is 16 decimal digits, encode cannot fail.
        if let Ok(bytes) = encode_bcd(&padded) {
            out.copy_from_slice(&bytes);
        }
        out
    }

    /// Verify the 15th digit is the Luhn check digit of the first 14.
    pub fn validate_luhn(&self) -> Result<(), FieldError> {
        let expected = luhn_check_digit(&self.0[..14]);
        let actual = self.0.as_bytes()[14] - b'0';
        if actual == expected {
            Ok(())
        } else {
            Err(FieldError::ImeiChecksum {
                imei: self.0.clone(),
                expected,
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Imei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Luhn check digit over a decimal digit string.
pub fn luhn_check_digit(digits: &str) -> u8 {
    let mut sum = 0u32;
    for (i, byte) in digits.bytes().rev().enumerate() {
        let mut digit = (byte - b'0') as u32;
        if i % 2 == 0 {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
    }
    ((10 - sum % 10) % 10) as u8
}
