//! Shared field-extraction helpers for the parser family.

use crate::codec::read_u32_be;
use crate::error::{DecodeError, FieldError};
use crate::types::{Coordinates, CourseStatus, DateTime};

/// Reject content shorter than the protocol's fixed minimum.
pub(super) fn ensure_content(protocol: u8, content: &[u8], min: usize) -> Result<(), DecodeError> {
    if content.len() < min {
        return Err(DecodeError::ContentTooShort {
            protocol,
            len: content.len(),
            min,
        });
    }
    Ok(())
}

/// Wrap a field-level failure with protocol context.
pub(super) fn field<T>(
    protocol: u8,
    name: &'static str,
    offset: usize,
    result: Result<T, FieldError>,
) -> Result<T, DecodeError> {
    result.map_err(|source| DecodeError::InvalidField {
        protocol,
        field: name,
        offset,
        source,
    })
}

/// Read an ASCII text field, trimming space and NUL padding.
pub(super) fn ascii_trimmed(
    protocol: u8,
    name: &'static str,
    offset: usize,
    bytes: &[u8],
) -> Result<String, DecodeError> {
    if !bytes.is_ascii() {
        return Err(DecodeError::InvalidField {
            protocol,
            field: name,
            offset,
            source: FieldError::InvalidText { encoding: "ascii" },
        });
    }
    let text = String::from_utf8_lossy(bytes);
    Ok(text.trim_matches(|c| c == ' ' || c == '\0').to_string())
}

/// Common head of the GPS-bearing packets:
/// `DateTime(6) | GPSInfo(1) | lat(4) | lon(4) | speed(1) | course+status(2)`.
///
/// The satellite count lives in the high nibble of the GPS-info byte for
/// 0x22/0xA0 and in the low nibble for the alarm family and 0x2A; the
/// per-protocol convention is preserved, not unified.
pub(super) struct GpsHead {
    pub datetime: DateTime,
    pub satellites: u8,
    pub coordinates: Coordinates,
    pub speed: u8,
    pub course: CourseStatus,
}

/// Wire size of [`GpsHead`].
pub(super) const GPS_HEAD_LEN: usize = 18;

pub(super) fn parse_gps_head(
    protocol: u8,
    content: &[u8],
    satellites_in_high_nibble: bool,
) -> Result<GpsHead, DecodeError> {
    ensure_content(protocol, content, GPS_HEAD_LEN)?;
    let datetime = field(protocol, "datetime", 0, DateTime::from_slice(content, 0))?;
    let info = content[6];
    let satellites = if satellites_in_high_nibble {
        info >> 4
    } else {
        info & 0x0F
    };
    let lat_raw = field(protocol, "latitude", 7, read_u32_be(content, 7))?;
    let lon_raw = field(protocol, "longitude", 11, read_u32_be(content, 11))?;
    let speed = content[15];
    let course = field(
        protocol,
        "course_status",
        16,
        CourseStatus::from_slice(content, 16),
    )?;
    let coordinates = field(
        protocol,
        "coordinates",
        7,
        Coordinates::from_raw(lat_raw, lon_raw, course.north, course.east),
    )?;
    Ok(GpsHead {
        datetime,
        satellites,
        coordinates,
        speed,
        course,
    })
}
