//! Information-transfer packet (0x94), multiplexed by a sub-protocol byte.

use std::collections::BTreeMap;

use super::helpers::{ensure_content, field};
use crate::codec::{decode_bcd, read_u16_be};
use crate::decoder::DecoderConfig;
use crate::error::{DecodeError, FieldError};
use crate::frame::FrameView;
use crate::packet::{
    GpsModuleStatus, InfoPayload, InfoTransferPacket, Packet, SatelliteBlock, TerminalSyncInfo,
};
use crate::protocol::INFO_TRANSFER;
use crate::types::Imei;

const SUB_EXTERNAL_VOLTAGE: u8 = 0x00;
const SUB_TERMINAL_SYNC: u8 = 0x04;
const SUB_DOOR_STATUS: u8 = 0x05;
const SUB_SELF_CHECK: u8 = 0x08;
const SUB_GPS_STATUS: u8 = 0x09;
const SUB_ICCID_BUNDLE: u8 = 0x0A;

pub fn parse_info_transfer(
    view: &FrameView<'_>,
    _config: &DecoderConfig,
) -> Result<Packet, DecodeError> {
    let content = view.content();
    ensure_content(INFO_TRANSFER, content, 1)?;
    let sub_protocol = content[0];
    let body = &content[1..];

    let payload = match sub_protocol {
        SUB_EXTERNAL_VOLTAGE => parse_external_voltage(body)?,
        SUB_TERMINAL_SYNC => parse_terminal_sync(body)?,
        SUB_DOOR_STATUS => parse_door_status(body)?,
        SUB_SELF_CHECK => InfoPayload::SelfCheck {
            data: body.to_vec(),
        },
        SUB_GPS_STATUS => parse_gps_status(body)?,
        SUB_ICCID_BUNDLE => parse_iccid_bundle(body)?,
        other => InfoPayload::Unknown {
            sub_protocol: other,
            data: body.to_vec(),
        },
    };

    Ok(Packet::InfoTransfer(InfoTransferPacket {
        meta: view.meta(),
        payload,
    }))
}

/// 0x00 — two big-endian bytes of millivolts.
fn parse_external_voltage(body: &[u8]) -> Result<InfoPayload, DecodeError> {
    let raw = field(INFO_TRANSFER, "external_voltage", 1, read_u16_be(body, 0))?;
    Ok(InfoPayload::ExternalVoltage {
        raw,
        volts: raw as f64 / 1000.0,
    })
}

/// 0x04 — ASCII `KEY=value;KEY=value;...` configuration dump.
fn parse_terminal_sync(body: &[u8]) -> Result<InfoPayload, DecodeError> {
    if !body.is_ascii() {
        return Err(DecodeError::InvalidField {
            protocol: INFO_TRANSFER,
            field: "terminal_sync",
            offset: 1,
            source: FieldError::InvalidText { encoding: "ascii" },
        });
    }
    let text = String::from_utf8_lossy(body);
    let mut entries = BTreeMap::new();
    for segment in text.split(';') {
        if let Some((key, value)) = segment.split_once('=') {
            entries.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    Ok(InfoPayload::TerminalSync(TerminalSyncInfo { entries }))
}

/// 0x05 — door sensor bits: bit 0 door open, bit 1 trigger high, bit 2 I/O
/// port high.
fn parse_door_status(body: &[u8]) -> Result<InfoPayload, DecodeError> {
    let byte = *body.first().ok_or(DecodeError::ContentTooShort {
        protocol: INFO_TRANSFER,
        len: 1,
        min: 2,
    })?;
    Ok(InfoPayload::DoorStatus {
        door_open: byte & 0x01 != 0,
        trigger_high: byte & 0x02 != 0,
        io_high: byte & 0x04 != 0,
    })
}

/// One satellite detail block: `used(1) | CN per used satellite |
/// visible(1) | id per visible satellite`. The visible list is optional.
fn parse_satellite_block(
    body: &[u8],
    offset: &mut usize,
) -> Result<SatelliteBlock, FieldError> {
    let used = *body.get(*offset).ok_or(FieldError::OutOfBounds {
        offset: *offset,
        needed: 1,
        available: body.len(),
    })? as usize;
    *offset += 1;
    if *offset + used > body.len() {
        return Err(FieldError::InvalidDeclaredLength {
            declared: used,
            available: body.len() - *offset,
        });
    }
    let fix_snr = body[*offset..*offset + used].to_vec();
    *offset += used;

    let mut visible = Vec::new();
    if *offset < body.len() {
        let count = body[*offset] as usize;
        *offset += 1;
        if *offset + count > body.len() {
            return Err(FieldError::InvalidDeclaredLength {
                declared: count,
                available: body.len() - *offset,
            });
        }
        visible = body[*offset..*offset + count].to_vec();
        *offset += count;
    }
    Ok(SatelliteBlock { fix_snr, visible })
}

/// 0x09 — module status byte, then optional GPS and BDS satellite blocks.
fn parse_gps_status(body: &[u8]) -> Result<InfoPayload, DecodeError> {
    let status = *body.first().ok_or(DecodeError::ContentTooShort {
        protocol: INFO_TRANSFER,
        len: 1,
        min: 2,
    })?;
    let mut offset = 1;
    let gps = if offset < body.len() {
        Some(field(
            INFO_TRANSFER,
            "gps_satellites",
            1 + offset,
            parse_satellite_block(body, &mut offset),
        )?)
    } else {
        None
    };
    let bds = if offset < body.len() {
        Some(field(
            INFO_TRANSFER,
            "bds_satellites",
            1 + offset,
            parse_satellite_block(body, &mut offset),
        )?)
    } else {
        None
    };
    Ok(InfoPayload::GpsModuleStatus(GpsModuleStatus {
        status,
        gps,
        bds,
    }))
}

/// 0x0A — `IMEI(8 BCD) | IMSI(8 BCD) | ICCID(10 BCD)`.
///
/// IMEI and IMSI carry a leading pad nibble; ICCID uses all 20 digits.
fn parse_iccid_bundle(body: &[u8]) -> Result<InfoPayload, DecodeError> {
    if body.len() < 26 {
        return Err(DecodeError::ContentTooShort {
            protocol: INFO_TRANSFER,
            len: body.len() + 1,
            min: 27,
        });
    }
    let imei = field(INFO_TRANSFER, "imei", 1, Imei::from_bcd(&body[..8]))?;
    let imsi_digits = field(INFO_TRANSFER, "imsi", 9, decode_bcd(&body[8..16]))?;
    let iccid = field(INFO_TRANSFER, "iccid", 17, decode_bcd(&body[16..26]))?;
    Ok(InfoPayload::IccidBundle {
        imei,
        imsi: imsi_digits[1..].to_string(),
        iccid,
    })
}
