//! Protocol numbers and enumerated field taxonomies for JM-VL03 v1.1.2.

/// Login with IMEI, model and timezone.
pub const LOGIN: u8 = 0x01;
/// Periodic heartbeat with status byte.
pub const HEARTBEAT: u8 = 0x13;
/// Online-command response (legacy number).
pub const COMMAND_RESPONSE_15: u8 = 0x15;
/// Address response, Chinese (UTF-16BE address text).
pub const ADDRESS_RESPONSE_CHINESE: u8 = 0x17;
/// Online-command response.
pub const COMMAND_RESPONSE_21: u8 = 0x21;
/// GPS location, 2G/3G radios.
pub const GPS_LOCATION: u8 = 0x22;
/// Alarm with GPS fix and 2G LBS.
pub const ALARM: u8 = 0x26;
/// Alarm with multi-fence id.
pub const ALARM_MULTI_FENCE: u8 = 0x27;
/// Multi-base-station LBS report.
pub const LBS_MULTI_BASE: u8 = 0x28;
/// GPS-fix address request (device asks server to reverse-geocode).
pub const GPS_ADDRESS_REQUEST: u8 = 0x2A;
/// Server-issued online command.
pub const ONLINE_COMMAND: u8 = 0x80;
/// Time calibration request.
pub const TIME_CALIBRATION: u8 = 0x8A;
/// Information transfer (sub-protocol multiplexed).
pub const INFO_TRANSFER: u8 = 0x94;
/// Address response, English (ASCII address text).
pub const ADDRESS_RESPONSE_ENGLISH: u8 = 0x97;
/// GPS location, 4G radios.
pub const GPS_LOCATION_4G: u8 = 0xA0;
/// 4G LBS report.
pub const LBS_4G: u8 = 0xA1;
/// Alarm with 4G LBS and fence id.
pub const ALARM_4G: u8 = 0xA4;

/// Battery voltage level reported in heartbeats and alarms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoltageLevel {
    NoPower,
    ExtremelyLow,
    VeryLow,
    Low,
    Medium,
    High,
    Full,
    Other(u8),
}

impl VoltageLevel {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => VoltageLevel::NoPower,
            0x01 => VoltageLevel::ExtremelyLow,
            0x02 => VoltageLevel::VeryLow,
            0x03 => VoltageLevel::Low,
            0x04 => VoltageLevel::Medium,
            0x05 => VoltageLevel::High,
            0x06 => VoltageLevel::Full,
            other => VoltageLevel::Other(other),
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            VoltageLevel::NoPower => 0x00,
            VoltageLevel::ExtremelyLow => 0x01,
            VoltageLevel::VeryLow => 0x02,
            VoltageLevel::Low => 0x03,
            VoltageLevel::Medium => 0x04,
            VoltageLevel::High => 0x05,
            VoltageLevel::Full => 0x06,
            VoltageLevel::Other(raw) => raw,
        }
    }
}

/// GSM signal strength reported in heartbeats and alarms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GsmSignal {
    None,
    ExtremelyWeak,
    Weak,
    Good,
    Strong,
    Other(u8),
}

impl GsmSignal {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => GsmSignal::None,
            0x01 => GsmSignal::ExtremelyWeak,
            0x02 => GsmSignal::Weak,
            0x03 => GsmSignal::Good,
            0x04 => GsmSignal::Strong,
            other => GsmSignal::Other(other),
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            GsmSignal::None => 0x00,
            GsmSignal::ExtremelyWeak => 0x01,
            GsmSignal::Weak => 0x02,
            GsmSignal::Good => 0x03,
            GsmSignal::Strong => 0x04,
            GsmSignal::Other(raw) => raw,
        }
    }
}

/// Device language selector carried in login and alarm packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Unspecified,
    Chinese,
    English,
    Other(u8),
}

impl Language {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => Language::Unspecified,
            0x01 => Language::Chinese,
            0x02 => Language::English,
            other => Language::Other(other),
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Language::Unspecified => 0x00,
            Language::Chinese => 0x01,
            Language::English => 0x02,
            Language::Other(raw) => raw,
        }
    }
}

/// Alarm kind carried by the alarm packet family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmType {
    Normal,
    Sos,
    PowerCut,
    Vibration,
    EnterFence,
    ExitFence,
    OverSpeed,
    Displacement,
    EnterGpsDeadZone,
    ExitGpsDeadZone,
    AccOn,
    AccOff,
    Tamper,
    InternalLowBattery,
    HighTemperature,
    Other(u8),
}

impl AlarmType {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => AlarmType::Normal,
            0x01 => AlarmType::Sos,
            0x02 => AlarmType::PowerCut,
            0x03 => AlarmType::Vibration,
            0x04 => AlarmType::EnterFence,
            0x05 => AlarmType::ExitFence,
            0x06 => AlarmType::OverSpeed,
            0x09 => AlarmType::Displacement,
            0x0A => AlarmType::EnterGpsDeadZone,
            0x0B => AlarmType::ExitGpsDeadZone,
            0x0C => AlarmType::AccOn,
            0x0D => AlarmType::AccOff,
            0x10 => AlarmType::Tamper,
            0x11 => AlarmType::InternalLowBattery,
            0x12 => AlarmType::HighTemperature,
            other => AlarmType::Other(other),
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            AlarmType::Normal => 0x00,
            AlarmType::Sos => 0x01,
            AlarmType::PowerCut => 0x02,
            AlarmType::Vibration => 0x03,
            AlarmType::EnterFence => 0x04,
            AlarmType::ExitFence => 0x05,
            AlarmType::OverSpeed => 0x06,
            AlarmType::Displacement => 0x09,
            AlarmType::EnterGpsDeadZone => 0x0A,
            AlarmType::ExitGpsDeadZone => 0x0B,
            AlarmType::AccOn => 0x0C,
            AlarmType::AccOff => 0x0D,
            AlarmType::Tamper => 0x10,
            AlarmType::InternalLowBattery => 0x11,
            AlarmType::HighTemperature => 0x12,
            AlarmType::Other(raw) => raw,
        }
    }

    /// Alarms that demand immediate operator attention.
    pub fn is_critical(self) -> bool {
        matches!(
            self,
            AlarmType::Sos | AlarmType::PowerCut | AlarmType::Tamper
        )
    }
}

/// Location upload trigger carried by 0x22/0xA0 packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadMode {
    TimedInterval,
    FixedDistance,
    InflectionPoint,
    AccStateChange,
    ReuploadAfterReconnect,
    NetworkRecovery,
    Other(u8),
}

impl UploadMode {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => UploadMode::TimedInterval,
            0x01 => UploadMode::FixedDistance,
            0x02 => UploadMode::InflectionPoint,
            0x03 => UploadMode::AccStateChange,
            0x04 => UploadMode::ReuploadAfterReconnect,
            0x05 => UploadMode::NetworkRecovery,
            other => UploadMode::Other(other),
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            UploadMode::TimedInterval => 0x00,
            UploadMode::FixedDistance => 0x01,
            UploadMode::InflectionPoint => 0x02,
            UploadMode::AccStateChange => 0x03,
            UploadMode::ReuploadAfterReconnect => 0x04,
            UploadMode::NetworkRecovery => 0x05,
            UploadMode::Other(raw) => raw,
        }
    }
}
