//! Address response packets (0x17 Chinese, 0x97 English).
//!
//! The device forwards a reverse-geocoded address for SMS delivery:
//! `ContentLength(1) | ServerFlag(4) | "ALARMSMS"(8) | "&&" | Address |
//! "&&" | PhoneNumber(21) | "##"`. All three separators are mandatory;
//! the Chinese variant carries the address as UTF-16BE, the English one
//! as ASCII.

use tracing::warn;

use super::helpers::{ascii_trimmed, ensure_content, field};
use crate::codec::read_u32_be;
use crate::decoder::DecoderConfig;
use crate::error::{DecodeError, FieldError};
use crate::frame::FrameView;
use crate::packet::{AddressResponsePacket, Packet};
use crate::protocol::{ADDRESS_RESPONSE_CHINESE, ADDRESS_RESPONSE_ENGLISH};

/// Smallest well-formed content: empty address.
const MIN_CONTENT: usize = 1 + 4 + 8 + 2 + 2 + 21 + 2;
/// Offset of the address bytes.
const ADDRESS_START: usize = 15;
/// Bytes after the second separator: phone(21) + "##".
const TAIL: usize = 25;

fn parse_address(
    protocol: u8,
    view: &FrameView<'_>,
    utf16: bool,
) -> Result<AddressResponsePacket, DecodeError> {
    let content = view.content();
    ensure_content(protocol, content, MIN_CONTENT)?;

    let content_length = content[0];
    if content_length as usize != content.len() - 1 {
        warn!(
            protocol,
            declared = content_length,
            actual = content.len() - 1,
            "address response length byte disagrees with content"
        );
    }
    let server_flag = field(protocol, "server_flag", 1, read_u32_be(content, 1))?;
    let alarm_sms = ascii_trimmed(protocol, "alarm_sms", 5, &content[5..13])?;

    if &content[13..15] != b"&&" {
        return Err(separator(protocol, "&&", 13));
    }
    // The second separator's position is fixed by the 21-byte phone field
    // and the terminator; the address is everything in between.
    let addr_end = content.len() - TAIL;
    if addr_end < ADDRESS_START || &content[addr_end..addr_end + 2] != b"&&" {
        return Err(separator(protocol, "&&", addr_end));
    }
    if &content[content.len() - 2..] != b"##" {
        return Err(separator(protocol, "##", content.len() - 2));
    }

    let address = decode_address(protocol, &content[ADDRESS_START..addr_end], utf16)?;
    let phone_number = ascii_trimmed(
        protocol,
        "phone_number",
        addr_end + 2,
        &content[addr_end + 2..addr_end + 23],
    )?;

    Ok(AddressResponsePacket {
        meta: view.meta(),
        content_length,
        server_flag,
        alarm_sms,
        address,
        phone_number,
    })
}

fn separator(protocol: u8, separator: &'static str, offset: usize) -> DecodeError {
    DecodeError::InvalidField {
        protocol,
        field: "separator",
        offset,
        source: FieldError::MissingSeparator { separator },
    }
}

fn decode_address(protocol: u8, bytes: &[u8], utf16: bool) -> Result<String, DecodeError> {
    if utf16 {
        if bytes.len() % 2 != 0 {
            return Err(DecodeError::InvalidField {
                protocol,
                field: "address",
                offset: ADDRESS_START,
                source: FieldError::InvalidText {
                    encoding: "utf-16be",
                },
            });
        }
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&units).map_err(|_| DecodeError::InvalidField {
            protocol,
            field: "address",
            offset: ADDRESS_START,
            source: FieldError::InvalidText {
                encoding: "utf-16be",
            },
        })
    } else {
        std::str::from_utf8(bytes)
            .map(|s| s.trim_matches(|c| c == ' ' || c == '\0').to_string())
            .map_err(|_| DecodeError::InvalidField {
                protocol,
                field: "address",
                offset: ADDRESS_START,
                source: FieldError::InvalidText { encoding: "utf-8" },
            })
    }
}

pub fn parse_address_response_chinese(
    view: &FrameView<'_>,
    _config: &DecoderConfig,
) -> Result<Packet, DecodeError> {
    parse_address(ADDRESS_RESPONSE_CHINESE, view, true).map(Packet::AddressResponseChinese)
}

pub fn parse_address_response_english(
    view: &FrameView<'_>,
    _config: &DecoderConfig,
) -> Result<Packet, DecodeError> {
    parse_address(ADDRESS_RESPONSE_ENGLISH, view, false).map(Packet::AddressResponseEnglish)
}
