//! Alarm packets: 0x26, 0x27 (multi-fence) and 0xA4 (4G).

use tracing::warn;

use super::helpers::{ensure_content, field, parse_gps_head, GPS_HEAD_LEN};
use crate::codec::read_u32_be;
use crate::decoder::DecoderConfig;
use crate::error::{DecodeError, FieldError};
use crate::frame::FrameView;
use crate::packet::{Alarm4GPacket, AlarmPacket, Packet};
use crate::protocol::{AlarmType, GsmSignal, Language, VoltageLevel, ALARM, ALARM_4G, ALARM_MULTI_FENCE};
use crate::types::{Lbs4G, LbsInfo, TerminalInfo};

/// 0x26/0x27 content:
/// `head(18) | LBSLen(1) | LBS(8) | TerminalInfo(1) | Voltage(1) | GSM(1) |
/// AlarmType(1) | Language(1) [| FenceID(1)] [| Mileage(4)]`.
///
/// The LBS length byte is read but the following 8 bytes are consumed
/// regardless of its value to keep the tail aligned; a declared length
/// other than 8 has not been observed and is only warned about.
fn parse_alarm_2g(
    protocol: u8,
    view: &FrameView<'_>,
    with_fence: bool,
) -> Result<Packet, DecodeError> {
    let fixed = GPS_HEAD_LEN + 1 + 8 + 5 + usize::from(with_fence);
    let content = view.content();
    ensure_content(protocol, content, fixed)?;

    let head = parse_gps_head(protocol, content, false)?;

    let lbs_declared_len = content[GPS_HEAD_LEN];
    if lbs_declared_len != 8 {
        warn!(
            protocol,
            declared = lbs_declared_len,
            "alarm LBS length byte is not 8, consuming 8 bytes anyway"
        );
    }
    let lbs = field(
        protocol,
        "lbs",
        GPS_HEAD_LEN + 1,
        LbsInfo::from_slice(content, GPS_HEAD_LEN + 1),
    )?;

    let status = GPS_HEAD_LEN + 9;
    let terminal = TerminalInfo::from_byte(content[status]);
    let voltage = VoltageLevel::from_byte(content[status + 1]);
    let gsm_signal = GsmSignal::from_byte(content[status + 2]);
    let alarm_type = AlarmType::from_byte(content[status + 3]);
    let language = Language::from_byte(content[status + 4]);
    let fence_id = with_fence.then(|| content[status + 5]);

    let mileage = if content.len() >= fixed + 4 {
        Some(field(protocol, "mileage", fixed, read_u32_be(content, fixed))?)
    } else {
        None
    };

    let packet = AlarmPacket {
        meta: view.meta(),
        datetime: head.datetime,
        satellites: head.satellites,
        coordinates: head.coordinates,
        speed: head.speed,
        course: head.course,
        lbs_declared_len,
        lbs,
        terminal,
        voltage,
        gsm_signal,
        alarm_type,
        language,
        fence_id,
        mileage,
    };
    Ok(if with_fence {
        Packet::AlarmMultiFence(packet)
    } else {
        Packet::Alarm(packet)
    })
}

pub fn parse_alarm(view: &FrameView<'_>, _config: &DecoderConfig) -> Result<Packet, DecodeError> {
    parse_alarm_2g(ALARM, view, false)
}

pub fn parse_alarm_multi_fence(
    view: &FrameView<'_>,
    _config: &DecoderConfig,
) -> Result<Packet, DecodeError> {
    parse_alarm_2g(ALARM_MULTI_FENCE, view, true)
}

/// 0xA4 content, parsed sequentially because the LBS block is variable:
/// `head(18) | LBSLen(1) | LBS(LBSLen-1) | TerminalInfo(1) | Voltage(1) |
/// GSM(1) | AlarmType(1) | Language(1) | FenceID(1) [| Mileage(4)]`.
///
/// Alert and language ride as two one-byte fields here; the protocol
/// document calls them a single two-byte field, unconfirmed by traces.
pub fn parse_alarm_4g(view: &FrameView<'_>, _config: &DecoderConfig) -> Result<Packet, DecodeError> {
    let content = view.content();
    ensure_content(ALARM_4G, content, GPS_HEAD_LEN + 1 + 15 + 6)?;

    let head = parse_gps_head(ALARM_4G, content, false)?;

    let declared = content[GPS_HEAD_LEN] as usize;
    let lbs_start = GPS_HEAD_LEN + 1;
    let tail = lbs_start + declared.saturating_sub(1);
    if declared < 1 + 15 || tail + 6 > content.len() {
        return Err(DecodeError::InvalidField {
            protocol: ALARM_4G,
            field: "lbs_length",
            offset: GPS_HEAD_LEN,
            source: FieldError::InvalidDeclaredLength {
                declared,
                available: content.len() - lbs_start,
            },
        });
    }
    let (lbs, _consumed) = field(ALARM_4G, "lbs", lbs_start, Lbs4G::from_slice(content, lbs_start))?;

    let terminal = TerminalInfo::from_byte(content[tail]);
    let voltage = VoltageLevel::from_byte(content[tail + 1]);
    let gsm_signal = GsmSignal::from_byte(content[tail + 2]);
    let alarm_type = AlarmType::from_byte(content[tail + 3]);
    let language = Language::from_byte(content[tail + 4]);
    let fence_id = content[tail + 5];

    let mileage = if content.len() >= tail + 10 {
        Some(field(
            ALARM_4G,
            "mileage",
            tail + 6,
            read_u32_be(content, tail + 6),
        )?)
    } else {
        None
    };

    Ok(Packet::Alarm4G(Alarm4GPacket {
        meta: view.meta(),
        datetime: head.datetime,
        satellites: head.satellites,
        coordinates: head.coordinates,
        speed: head.speed,
        course: head.course,
        lbs,
        terminal,
        voltage,
        gsm_signal,
        alarm_type,
        language,
        fence_id,
        mileage,
    }))
}
