//! Decoded packet variants.
//!
//! The protocol taxonomy is a closed, tagged sum: one variant per protocol
//! byte (plus `Unparsed` for lenient-mode passthrough). Every variant
//! embeds a [`FrameMeta`] with the protocol byte, device serial and the raw
//! frame bytes. Exhaustive matches over [`Packet`] drive handler and
//! acknowledgement selection; there is no runtime type discovery.

use std::collections::BTreeMap;

pub use crate::frame::FrameMeta;
use crate::protocol::{AlarmType, GsmSignal, Language, UploadMode, VoltageLevel};
use crate::types::{
    Coordinates, CourseStatus, DateTime, Imei, Lbs4G, LbsInfo, NeighborCell, TerminalInfo,
    TimezoneLanguage,
};

/// One decoded frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Login(LoginPacket),
    Heartbeat(HeartbeatPacket),
    GpsLocation(GpsLocationPacket),
    GpsLocation4G(GpsLocation4GPacket),
    Alarm(AlarmPacket),
    AlarmMultiFence(AlarmPacket),
    Alarm4G(Alarm4GPacket),
    LbsMultiBase(LbsMultiBasePacket),
    Lbs4G(Lbs4GPacket),
    TimeCalibration(TimeCalibrationPacket),
    InfoTransfer(InfoTransferPacket),
    AddressResponseChinese(AddressResponsePacket),
    AddressResponseEnglish(AddressResponsePacket),
    OnlineCommand(OnlineCommandPacket),
    CommandResponse(CommandResponsePacket),
    GpsAddressRequest(GpsAddressRequestPacket),
    /// Lenient-mode passthrough for unknown protocols or failed parses.
    Unparsed(UnparsedPacket),
}

impl Packet {
    pub fn meta(&self) -> &FrameMeta {
        match self {
            Packet::Login(p) => &p.meta,
            Packet::Heartbeat(p) => &p.meta,
            Packet::GpsLocation(p) => &p.meta,
            Packet::GpsLocation4G(p) => &p.meta,
            Packet::Alarm(p) => &p.meta,
            Packet::AlarmMultiFence(p) => &p.meta,
            Packet::Alarm4G(p) => &p.meta,
            Packet::LbsMultiBase(p) => &p.meta,
            Packet::Lbs4G(p) => &p.meta,
            Packet::TimeCalibration(p) => &p.meta,
            Packet::InfoTransfer(p) => &p.meta,
            Packet::AddressResponseChinese(p) => &p.meta,
            Packet::AddressResponseEnglish(p) => &p.meta,
            Packet::OnlineCommand(p) => &p.meta,
            Packet::CommandResponse(p) => &p.meta,
            Packet::GpsAddressRequest(p) => &p.meta,
            Packet::Unparsed(p) => &p.meta,
        }
    }

    pub fn protocol(&self) -> u8 {
        self.meta().protocol
    }

    pub fn serial(&self) -> u16 {
        self.meta().serial
    }

    /// Short name for structured logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Packet::Login(_) => "login",
            Packet::Heartbeat(_) => "heartbeat",
            Packet::GpsLocation(_) => "gps_location",
            Packet::GpsLocation4G(_) => "gps_location_4g",
            Packet::Alarm(_) => "alarm",
            Packet::AlarmMultiFence(_) => "alarm_multi_fence",
            Packet::Alarm4G(_) => "alarm_4g",
            Packet::LbsMultiBase(_) => "lbs_multi_base",
            Packet::Lbs4G(_) => "lbs_4g",
            Packet::TimeCalibration(_) => "time_calibration",
            Packet::InfoTransfer(_) => "info_transfer",
            Packet::AddressResponseChinese(_) => "address_response_chinese",
            Packet::AddressResponseEnglish(_) => "address_response_english",
            Packet::OnlineCommand(_) => "online_command",
            Packet::CommandResponse(_) => "command_response",
            Packet::GpsAddressRequest(_) => "gps_address_request",
            Packet::Unparsed(_) => "unparsed",
        }
    }
}

/// 0x01 — device login.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginPacket {
    pub meta: FrameMeta,
    pub imei: Imei,
    pub model_id: u16,
    pub timezone: TimezoneLanguage,
}

/// 0x13 — heartbeat.
#[derive(Debug, Clone, PartialEq)]
pub struct HeartbeatPacket {
    pub meta: FrameMeta,
    pub terminal: TerminalInfo,
    pub voltage: VoltageLevel,
    pub gsm_signal: GsmSignal,
    /// Present when the device appends the two extended-info bytes.
    pub extended: Option<u16>,
}

/// 0x22 — GPS location over 2G/3G radios.
///
/// ACC rides in its own byte here, not inside a terminal-info byte.
#[derive(Debug, Clone, PartialEq)]
pub struct GpsLocationPacket {
    pub meta: FrameMeta,
    pub datetime: DateTime,
    pub satellites: u8,
    pub coordinates: Coordinates,
    /// km/h.
    pub speed: u8,
    pub course: CourseStatus,
    pub lbs: LbsInfo,
    pub acc_on: bool,
    pub upload_mode: UploadMode,
    /// True when this is a stored fix re-uploaded after reconnect.
    pub reupload: bool,
    pub mileage: Option<u32>,
}

/// 0xA0 — GPS location over 4G radios.
#[derive(Debug, Clone, PartialEq)]
pub struct GpsLocation4GPacket {
    pub meta: FrameMeta,
    pub datetime: DateTime,
    pub satellites: u8,
    pub coordinates: Coordinates,
    pub speed: u8,
    pub course: CourseStatus,
    pub lbs: Lbs4G,
    /// `MCC * 1000 + MNC`.
    pub mccmnc: u32,
    pub acc_on: bool,
    pub upload_mode: UploadMode,
    pub reupload: bool,
    pub mileage: Option<u32>,
}

/// 0x26 / 0x27 — alarm with GPS fix and 2G LBS.
///
/// `fence_id` is populated for the multi-fence variant (0x27).
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmPacket {
    pub meta: FrameMeta,
    pub datetime: DateTime,
    pub satellites: u8,
    pub coordinates: Coordinates,
    pub speed: u8,
    pub course: CourseStatus,
    /// Length byte preceding the LBS block as declared by the device.
    pub lbs_declared_len: u8,
    pub lbs: LbsInfo,
    pub terminal: TerminalInfo,
    pub voltage: VoltageLevel,
    pub gsm_signal: GsmSignal,
    pub alarm_type: AlarmType,
    pub language: Language,
    pub fence_id: Option<u8>,
    pub mileage: Option<u32>,
}

/// 0xA4 — alarm with variable-width 4G LBS.
#[derive(Debug, Clone, PartialEq)]
pub struct Alarm4GPacket {
    pub meta: FrameMeta,
    pub datetime: DateTime,
    pub satellites: u8,
    pub coordinates: Coordinates,
    pub speed: u8,
    pub course: CourseStatus,
    pub lbs: Lbs4G,
    pub terminal: TerminalInfo,
    pub voltage: VoltageLevel,
    pub gsm_signal: GsmSignal,
    pub alarm_type: AlarmType,
    pub language: Language,
    pub fence_id: u8,
    pub mileage: Option<u32>,
}

/// Status trailer shared by the LBS report packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTrailer {
    pub terminal: TerminalInfo,
    pub voltage: VoltageLevel,
    pub gsm_signal: GsmSignal,
}

/// 0x28 — multi-base-station LBS report.
#[derive(Debug, Clone, PartialEq)]
pub struct LbsMultiBasePacket {
    pub meta: FrameMeta,
    pub datetime: DateTime,
    pub main: LbsInfo,
    pub main_rssi: u8,
    pub neighbors: Vec<NeighborCell>,
    pub timing_advance: Option<u8>,
    /// Raw two-byte language field; high-byte semantics are undocumented.
    pub language_raw: Option<u16>,
    pub status: Option<StatusTrailer>,
}

impl LbsMultiBasePacket {
    /// Language decoded from the low byte of the two-byte field.
    pub fn language(&self) -> Option<Language> {
        self.language_raw
            .map(|raw| Language::from_byte((raw & 0xFF) as u8))
    }
}

/// 0xA1 — 4G LBS report.
#[derive(Debug, Clone, PartialEq)]
pub struct Lbs4GPacket {
    pub meta: FrameMeta,
    pub datetime: DateTime,
    pub lbs: Lbs4G,
    /// Bytes between the main cell and the status trailer, kept raw.
    pub neighbors_raw: Vec<u8>,
    pub status: Option<Status4G>,
}

/// Four-byte status trailer of the 4G LBS report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status4G {
    pub terminal: TerminalInfo,
    pub voltage: VoltageLevel,
    pub gsm_signal: GsmSignal,
    pub upload_mode: UploadMode,
}

/// 0x8A — time calibration request; no content.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeCalibrationPacket {
    pub meta: FrameMeta,
}

/// 0x94 — information transfer, multiplexed by a sub-protocol byte.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoTransferPacket {
    pub meta: FrameMeta,
    pub payload: InfoPayload,
}

/// Sub-protocol payloads of the information-transfer packet.
#[derive(Debug, Clone, PartialEq)]
pub enum InfoPayload {
    /// 0x00 — external supply voltage.
    ExternalVoltage { raw: u16, volts: f64 },
    /// 0x04 — terminal sync: ASCII `KEY=value;` configuration dump.
    TerminalSync(TerminalSyncInfo),
    /// 0x05 — door sensor status.
    DoorStatus {
        door_open: bool,
        trigger_high: bool,
        io_high: bool,
    },
    /// 0x08 — self-check report, opaque.
    SelfCheck { data: Vec<u8> },
    /// 0x09 — GPS module status with optional satellite detail.
    GpsModuleStatus(GpsModuleStatus),
    /// 0x0A — IMEI/IMSI/ICCID bundle.
    IccidBundle {
        imei: Imei,
        imsi: String,
        iccid: String,
    },
    /// Unrecognized sub-protocol, surfaced raw.
    Unknown { sub_protocol: u8, data: Vec<u8> },
}

/// Parsed terminal-sync key/value dump.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TerminalSyncInfo {
    pub entries: BTreeMap<String, String>,
}

impl TerminalSyncInfo {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn iccid(&self) -> Option<&str> {
        self.get("ICCID")
    }

    pub fn imsi(&self) -> Option<&str> {
        self.get("IMSI")
    }

    pub fn center_number(&self) -> Option<&str> {
        self.get("CENTER")
    }

    pub fn sos_numbers(&self) -> Vec<&str> {
        self.get("SOS")
            .map(|v| v.split(',').filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }
}

/// Satellite detail block inside the GPS module status payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SatelliteBlock {
    /// Signal strength per satellite used in the fix.
    pub fix_snr: Vec<u8>,
    /// Identifiers of the visible satellites.
    pub visible: Vec<u8>,
}

/// GPS module status payload (0x94/0x09).
#[derive(Debug, Clone, PartialEq)]
pub struct GpsModuleStatus {
    pub status: u8,
    pub gps: Option<SatelliteBlock>,
    pub bds: Option<SatelliteBlock>,
}

/// 0x17 / 0x97 — address response relayed to an SMS recipient.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressResponsePacket {
    pub meta: FrameMeta,
    pub content_length: u8,
    pub server_flag: u32,
    pub alarm_sms: String,
    pub address: String,
    pub phone_number: String,
}

/// 0x80 — server-issued online command.
#[derive(Debug, Clone, PartialEq)]
pub struct OnlineCommandPacket {
    pub meta: FrameMeta,
    pub server_flag: u32,
    pub command: String,
}

/// 0x21 / 0x15 — device response to an online command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResponsePacket {
    pub meta: FrameMeta,
    pub server_flag: u32,
    pub response: String,
}

/// 0x2A — GPS-fix address request.
#[derive(Debug, Clone, PartialEq)]
pub struct GpsAddressRequestPacket {
    pub meta: FrameMeta,
    pub datetime: DateTime,
    pub satellites: u8,
    pub coordinates: Coordinates,
    pub speed: u8,
    pub course: CourseStatus,
    pub phone_number: String,
    pub alarm_type: AlarmType,
    pub language: Language,
}

/// Base packet for unknown protocols or failed parses in lenient mode.
#[derive(Debug, Clone, PartialEq)]
pub struct UnparsedPacket {
    pub meta: FrameMeta,
    /// Present when a registered parser failed; the error rendered as text.
    pub parse_error: Option<String>,
}
