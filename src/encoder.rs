//! Frame encoder for acknowledgements and server-initiated packets.
//!
//! Every builder returns a complete frame: start marker, length field,
//! protocol, content, echoed serial, CRC and stop marker. The short format
//! (0x7878) is chosen whenever the declared length fits one byte; long
//! frames (0x7979) carry a two-byte length field.

use crate::codec::{write_u16_be, write_u32_be};
use crate::crc::crc_itu;
use crate::error::EncodeError;
use crate::frame::MAX_FRAME;
use crate::protocol;
use crate::types::DateTime;

/// Immutable frame builder; shareable across sessions.
#[derive(Debug, Clone, Copy)]
pub struct Encoder {
    max_packet_size: u32,
}

/// Fields of an address response frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressResponseParams {
    pub serial: u16,
    pub server_flag: u32,
    /// Padded or truncated to 8 bytes on the wire.
    pub alarm_sms: String,
    pub address: String,
    /// Padded or truncated to 21 bytes on the wire.
    pub phone_number: String,
}

impl Encoder {
    pub fn new() -> Self {
        Encoder {
            max_packet_size: MAX_FRAME as u32,
        }
    }

    pub fn with_max_packet_size(max_packet_size: u32) -> Self {
        Encoder { max_packet_size }
    }

    /// Frame arbitrary content. The escape hatch for command kinds the
    /// library does not model.
    pub fn custom(&self, proto: u8, content: &[u8], serial: u16) -> Result<Vec<u8>, EncodeError> {
        let declared = 1 + content.len() + 2 + 2;
        let short = declared <= 255;
        let total = 2 + if short { 1 } else { 2 } + declared + 2;
        if declared > 65535 || total > self.max_packet_size as usize {
            return Err(EncodeError::ContentTooLarge {
                len: content.len(),
                max: self.max_packet_size,
            });
        }

        let mut body = Vec::with_capacity(total - 4);
        if short {
            body.push(declared as u8);
        } else {
            write_u16_be(&mut body, declared as u16);
        }
        body.push(proto);
        body.extend_from_slice(content);
        write_u16_be(&mut body, serial);

        let crc = crc_itu(&body);
        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(if short { &[0x78, 0x78] } else { &[0x79, 0x79] });
        out.extend_from_slice(&body);
        write_u16_be(&mut out, crc);
        out.extend_from_slice(&[0x0D, 0x0A]);
        Ok(out)
    }

    /// Empty-content acknowledgement echoing the device serial. Ten bytes,
    /// cannot exceed any sane size cap.
    fn ack(&self, proto: u8, serial: u16) -> Vec<u8> {
        let mut body = vec![0x05, proto];
        write_u16_be(&mut body, serial);
        let crc = crc_itu(&body);
        let mut out = Vec::with_capacity(10);
        out.extend_from_slice(&[0x78, 0x78]);
        out.extend_from_slice(&body);
        write_u16_be(&mut out, crc);
        out.extend_from_slice(&[0x0D, 0x0A]);
        out
    }

    pub fn login_ack(&self, serial: u16) -> Vec<u8> {
        self.ack(protocol::LOGIN, serial)
    }

    pub fn heartbeat_ack(&self, serial: u16) -> Vec<u8> {
        self.ack(protocol::HEARTBEAT, serial)
    }

    pub fn alarm_ack(&self, serial: u16) -> Vec<u8> {
        self.ack(protocol::ALARM, serial)
    }

    pub fn alarm_multi_fence_ack(&self, serial: u16) -> Vec<u8> {
        self.ack(protocol::ALARM_MULTI_FENCE, serial)
    }

    pub fn alarm_4g_ack(&self, serial: u16) -> Vec<u8> {
        self.ack(protocol::ALARM_4G, serial)
    }

    /// Six-byte UTC payload answering a time-calibration request.
    pub fn time_calibration_ack(&self, serial: u16, utc: DateTime) -> Vec<u8> {
        let content = utc.to_wire();
        let mut body = vec![(1 + content.len() + 4) as u8, protocol::TIME_CALIBRATION];
        body.extend_from_slice(&content);
        write_u16_be(&mut body, serial);
        let crc = crc_itu(&body);
        let mut out = Vec::with_capacity(content.len() + 9);
        out.extend_from_slice(&[0x78, 0x78]);
        out.extend_from_slice(&body);
        write_u16_be(&mut out, crc);
        out.extend_from_slice(&[0x0D, 0x0A]);
        out
    }

    /// Server command: `Length(1) | ServerFlag(4) | ASCII command`.
    pub fn online_command(
        &self,
        serial: u16,
        server_flag: u32,
        command: &str,
    ) -> Result<Vec<u8>, EncodeError> {
        if !command.is_ascii() {
            return Err(EncodeError::NotAscii { field: "command" });
        }
        let declared = 4 + command.len();
        if declared > 255 {
            return Err(EncodeError::CommandTooLong {
                len: command.len(),
            });
        }
        let mut content = Vec::with_capacity(1 + declared);
        content.push(declared as u8);
        write_u32_be(&mut content, server_flag);
        content.extend_from_slice(command.as_bytes());
        self.custom(protocol::ONLINE_COMMAND, &content, serial)
    }

    /// Address response with a UTF-16BE address (0x17).
    pub fn address_response_chinese(
        &self,
        params: &AddressResponseParams,
    ) -> Result<Vec<u8>, EncodeError> {
        let mut address = Vec::with_capacity(params.address.len() * 2);
        for unit in params.address.encode_utf16() {
            address.extend_from_slice(&unit.to_be_bytes());
        }
        self.address_response(protocol::ADDRESS_RESPONSE_CHINESE, params, &address)
    }

    /// Address response with an ASCII address (0x97).
    pub fn address_response_english(
        &self,
        params: &AddressResponseParams,
    ) -> Result<Vec<u8>, EncodeError> {
        if !params.address.is_ascii() {
            return Err(EncodeError::NotAscii { field: "address" });
        }
        let address = params.address.as_bytes().to_vec();
        self.address_response(protocol::ADDRESS_RESPONSE_ENGLISH, params, &address)
    }

    fn address_response(
        &self,
        proto: u8,
        params: &AddressResponseParams,
        address: &[u8],
    ) -> Result<Vec<u8>, EncodeError> {
        if !params.alarm_sms.is_ascii() {
            return Err(EncodeError::NotAscii { field: "alarm_sms" });
        }
        if !params.phone_number.is_ascii() {
            return Err(EncodeError::NotAscii {
                field: "phone_number",
            });
        }

        let mut content = vec![0u8];
        write_u32_be(&mut content, params.server_flag);
        content.extend_from_slice(&pad_ascii(&params.alarm_sms, 8));
        content.extend_from_slice(b"&&");
        content.extend_from_slice(address);
        content.extend_from_slice(b"&&");
        content.extend_from_slice(&pad_ascii(&params.phone_number, 21));
        content.extend_from_slice(b"##");

        let declared = content.len() - 1;
        if declared > 255 {
            return Err(EncodeError::ContentTooLarge {
                len: content.len(),
                max: self.max_packet_size,
            });
        }
        content[0] = declared as u8;
        self.custom(proto, &content, params.serial)
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Space-pad or truncate to an exact field width.
fn pad_ascii(text: &str, width: usize) -> Vec<u8> {
    let mut bytes = text.as_bytes()[..text.len().min(width)].to_vec();
    bytes.resize(width, b' ');
    bytes
}
