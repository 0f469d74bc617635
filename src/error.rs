//! Error taxonomy for the JM-VL03 codec and session layer.
//!
//! Field-level failures (`FieldError`) are raised by the codec primitives and
//! domain-value constructors; the decoder wraps them with protocol context
//! (`DecodeError::InvalidField`). Stream-level corruption is recoverable and
//! reported as violations by the splitter, not through these enums.

use snafu::Snafu;

/// Failures raised while extracting a single field from raw bytes.
#[derive(Debug, Clone, PartialEq, Snafu)]
pub enum FieldError {
    /// A BCD byte held a nibble greater than 9.
    #[snafu(display("byte {value:#04x} is not valid BCD"))]
    InvalidBcd { value: u8 },

    /// A date-time component was outside its inclusive range.
    #[snafu(display(
        "invalid date-time {year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"
    ))]
    InvalidDateTime {
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    },

    /// An IMEI did not decode to 15 decimal digits.
    #[snafu(display("imei {digits:?} is not 15 decimal digits"))]
    InvalidImei { digits: String },

    /// An IMEI failed its Luhn check.
    #[snafu(display("imei {imei} fails its luhn check, check digit should be {expected}"))]
    ImeiChecksum { imei: String, expected: u8 },

    /// Latitude decoded outside [-90, 90] degrees.
    #[snafu(display("latitude {value} degrees is out of range"))]
    LatitudeRange { value: f64 },

    /// Longitude decoded outside [-180, 180] degrees.
    #[snafu(display("longitude {value} degrees is out of range"))]
    LongitudeRange { value: f64 },

    /// The timezone field's minutes component was not a valid minute count.
    #[snafu(display("timezone field {raw:#06x} holds {minutes} minutes"))]
    InvalidTimezone { raw: u16, minutes: u16 },

    /// A read past the end of the available bytes.
    #[snafu(display("need {needed} bytes at offset {offset}, have {available}"))]
    OutOfBounds {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A bit-field read past the end of the bit stream.
    #[snafu(display("bit read of {wanted} bits exceeds the {remaining} remaining"))]
    BitOverrun { wanted: usize, remaining: usize },

    /// A bit-field width outside 1..=64.
    #[snafu(display("bit-field width {width} is not in 1..=64"))]
    BitWidth { width: usize },

    /// A mandatory separator was missing or misaligned.
    #[snafu(display("separator {separator:?} missing or misaligned"))]
    MissingSeparator { separator: &'static str },

    /// Text bytes were not valid for the declared encoding.
    #[snafu(display("text field is not valid {encoding}"))]
    InvalidText { encoding: &'static str },

    /// A declared inner length disagreed with the bytes present.
    #[snafu(display("declared length {declared} does not fit {available} available bytes"))]
    InvalidDeclaredLength { declared: usize, available: usize },
}

/// Failures raised while decoding one frame.
#[derive(Debug, Clone, PartialEq, Snafu)]
pub enum DecodeError {
    /// The frame is shorter than the minimum for its start marker.
    #[snafu(display("frame of {len} bytes is below the {min}-byte minimum"))]
    FrameTooSmall { len: usize, min: usize },

    /// The first two bytes are not a known start marker.
    #[snafu(display("invalid start marker {found:#06x}"))]
    InvalidStartMarker { found: u16 },

    /// The last two bytes are not `0x0D 0x0A`.
    #[snafu(display("invalid stop marker {found:#06x}"))]
    InvalidStopMarker { found: u16 },

    /// The length field disagrees with the actual frame size.
    #[snafu(display("length field implies {declared} bytes but frame holds {actual}"))]
    LengthMismatch { declared: usize, actual: usize },

    /// The frame exceeds the configured size cap.
    #[snafu(display("frame of {len} bytes exceeds the {max}-byte cap"))]
    FrameTooLarge { len: usize, max: u32 },

    /// The CRC over the framed region did not match the trailer.
    #[snafu(display("crc mismatch: computed {computed:#06x}, received {received:#06x}"))]
    CrcMismatch { computed: u16, received: u16 },

    /// No parser is registered for the protocol byte.
    #[snafu(display("no parser registered for protocol {protocol:#04x}"))]
    UnknownProtocol { protocol: u8 },

    /// Content is too short for the protocol's fixed layout.
    #[snafu(display("protocol {protocol:#04x}: content of {len} bytes, need at least {min}"))]
    ContentTooShort {
        protocol: u8,
        len: usize,
        min: usize,
    },

    /// A field inside the content failed to decode.
    #[snafu(display("protocol {protocol:#04x}, {field} at content offset {offset}: {source}"))]
    InvalidField {
        protocol: u8,
        field: &'static str,
        offset: usize,
        source: FieldError,
    },

    /// A parser was registered twice for the same protocol byte.
    #[snafu(display("parser for protocol {protocol:#04x} registered twice"))]
    DuplicateParser { protocol: u8 },
}

/// Failures raised while building an outgoing frame.
#[derive(Debug, Clone, PartialEq, Snafu)]
pub enum EncodeError {
    /// Content would push the frame past the configured size cap.
    #[snafu(display("content of {len} bytes exceeds the {max}-byte frame cap"))]
    ContentTooLarge { len: usize, max: u32 },

    /// Command and response text rides the wire as ASCII.
    #[snafu(display("{field} must be ascii"))]
    NotAscii { field: &'static str },

    /// Online-command content length must fit its one-byte length field.
    #[snafu(display("command of {len} bytes does not fit a one-byte length field"))]
    CommandTooLong { len: usize },
}

/// Connection-level failures in the session layer.
#[derive(Debug, Snafu)]
pub enum SessionError {
    /// The per-connection read buffer grew past its hard cap.
    #[snafu(display("read buffer reached {len} bytes, cap is {cap}"))]
    BufferOverflow { len: usize, cap: usize },

    /// Socket I/O failed.
    #[snafu(display("socket i/o: {source}"))]
    Io { source: std::io::Error },
}
