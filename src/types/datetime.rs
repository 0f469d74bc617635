//! Wire date-time: six plain binary bytes, UTC.

use std::fmt;

use crate::error::FieldError;

/// UTC timestamp as carried on the wire: `YY MM DD HH MM SS`, year 2000+YY.
///
/// The bytes are plain binary values, not BCD. Ranges are validated
/// inclusively on construction; a value that decodes is always re-encodable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTime {
    /// Build a validated timestamp from components. `year` is the full year.
    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, FieldError> {
        let dt = DateTime {
            year,
            month,
            day,
            hour,
            minute,
            second,
        };
        dt.validate()?;
        Ok(dt)
    }

    /// Decode six wire bytes starting at `buf[offset]`.
    pub fn from_slice(buf: &[u8], offset: usize) -> Result<Self, FieldError> {
        if offset + 6 > buf.len() {
            return Err(FieldError::OutOfBounds {
                offset,
                needed: 6,
                available: buf.len(),
            });
        }
        let b = &buf[offset..offset + 6];
        DateTime::new(2000 + b[0] as u16, b[1], b[2], b[3], b[4], b[5])
    }

    /// Encode as the six wire bytes.
    pub fn to_wire(self) -> [u8; 6] {
        [
            (self.year - 2000) as u8,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
        ]
    }

    /// Current UTC time in wire form. Fails only outside the 2000-2099
    /// window the wire format can carry.
    pub fn now_utc() -> Result<Self, FieldError> {
        use chrono::{Datelike, Timelike, Utc};
        let now = Utc::now();
        DateTime::new(
            now.year().clamp(0, u16::MAX as i32) as u16,
            now.month() as u8,
            now.day() as u8,
            now.hour() as u8,
            now.minute() as u8,
            now.second() as u8,
        )
    }

    fn validate(&self) -> Result<(), FieldError> {
        let ok = (2000..=2099).contains(&self.year)
            && (1..=12).contains(&self.month)
            && (1..=31).contains(&self.day)
            && self.hour <= 23
            && self.minute <= 59
            && self.second <= 59;
        if ok {
            Ok(())
        } else {
            Err(FieldError::InvalidDateTime {
                year: self.year,
                month: self.month,
                day: self.day,
                hour: self.hour,
                minute: self.minute,
                second: self.second,
            })
        }
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}Z",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}
