//! Protocol-byte dispatch and the per-protocol parser family.
//!
//! The registry maps a protocol byte to a parser with the contract
//! `parse(frame, config) -> packet | error`. It is populated once when the
//! decoder is built and read-only afterwards; duplicate registration is
//! rejected at build time, never at runtime. Lookup is a direct table
//! index.

mod address;
mod alarm;
mod command;
mod gps_address;
mod heartbeat;
mod helpers;
mod info_transfer;
mod lbs;
mod location;
mod login;
mod time_calibration;

pub use address::{parse_address_response_chinese, parse_address_response_english};
pub use alarm::{parse_alarm, parse_alarm_4g, parse_alarm_multi_fence};
pub use command::{parse_command_response, parse_online_command};
pub use gps_address::parse_gps_address_request;
pub use heartbeat::parse_heartbeat;
pub use info_transfer::parse_info_transfer;
pub use lbs::{parse_lbs_4g, parse_lbs_multi_base};
pub use location::{parse_gps_location, parse_gps_location_4g};
pub use login::parse_login;
pub use time_calibration::parse_time_calibration;

use crate::decoder::DecoderConfig;
use crate::error::DecodeError;
use crate::frame::FrameView;
use crate::packet::Packet;
use crate::protocol;

/// Parser contract: full frame view in, decoded packet out.
pub type ParserFn = fn(&FrameView<'_>, &DecoderConfig) -> Result<Packet, DecodeError>;

/// The default protocol-byte → parser wiring.
const DEFAULT_PARSERS: &[(u8, ParserFn)] = &[
    (protocol::LOGIN, parse_login),
    (protocol::HEARTBEAT, parse_heartbeat),
    (protocol::COMMAND_RESPONSE_15, parse_command_response),
    (protocol::ADDRESS_RESPONSE_CHINESE, parse_address_response_chinese),
    (protocol::COMMAND_RESPONSE_21, parse_command_response),
    (protocol::GPS_LOCATION, parse_gps_location),
    (protocol::ALARM, parse_alarm),
    (protocol::ALARM_MULTI_FENCE, parse_alarm_multi_fence),
    (protocol::LBS_MULTI_BASE, parse_lbs_multi_base),
    (protocol::GPS_ADDRESS_REQUEST, parse_gps_address_request),
    (protocol::ONLINE_COMMAND, parse_online_command),
    (protocol::TIME_CALIBRATION, parse_time_calibration),
    (protocol::INFO_TRANSFER, parse_info_transfer),
    (protocol::ADDRESS_RESPONSE_ENGLISH, parse_address_response_english),
    (protocol::GPS_LOCATION_4G, parse_gps_location_4g),
    (protocol::LBS_4G, parse_lbs_4g),
    (protocol::ALARM_4G, parse_alarm_4g),
];

/// Read-only protocol-byte dispatch table.
pub struct ParserRegistry {
    table: [Option<ParserFn>; 256],
}

impl ParserRegistry {
    /// Registry with every built-in parser wired up.
    pub fn with_defaults() -> Self {
        let mut table = [None; 256];
        for &(protocol, parser) in DEFAULT_PARSERS {
            table[protocol as usize] = Some(parser);
        }
        ParserRegistry { table }
    }

    /// Empty registry for fully custom wiring.
    pub fn empty() -> Self {
        ParserRegistry { table: [None; 256] }
    }

    /// Register a parser. Fails if the protocol byte is already taken.
    pub fn register(&mut self, protocol: u8, parser: ParserFn) -> Result<(), DecodeError> {
        if self.table[protocol as usize].is_some() {
            return Err(DecodeError::DuplicateParser { protocol });
        }
        self.table[protocol as usize] = Some(parser);
        Ok(())
    }

    pub fn get(&self, protocol: u8) -> Option<ParserFn> {
        self.table[protocol as usize]
    }

    pub fn contains(&self, protocol: u8) -> bool {
        self.table[protocol as usize].is_some()
    }

    /// Registered protocol bytes, ascending.
    pub fn protocols(&self) -> Vec<u8> {
        (0u16..256)
            .filter(|&p| self.table[p as usize].is_some())
            .map(|p| p as u8)
            .collect()
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
