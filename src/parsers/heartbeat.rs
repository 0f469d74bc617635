//! Heartbeat packet (0x13).

use super::helpers::{ensure_content, field};
use crate::codec::read_u16_be;
use crate::decoder::DecoderConfig;
use crate::error::DecodeError;
use crate::frame::FrameView;
use crate::packet::{HeartbeatPacket, Packet};
use crate::protocol::{GsmSignal, VoltageLevel, HEARTBEAT};
use crate::types::TerminalInfo;

/// Content: `TerminalInfo(1) | Voltage(1) | GSM(1) [| Extended(2)]`.
pub fn parse_heartbeat(view: &FrameView<'_>, _config: &DecoderConfig) -> Result<Packet, DecodeError> {
    let content = view.content();
    ensure_content(HEARTBEAT, content, 3)?;

    let terminal = TerminalInfo::from_byte(content[0]);
    let voltage = VoltageLevel::from_byte(content[1]);
    let gsm_signal = GsmSignal::from_byte(content[2]);
    let extended = if content.len() >= 5 {
        Some(field(HEARTBEAT, "extended_info", 3, read_u16_be(content, 3))?)
    } else {
        None
    };

    Ok(Packet::Heartbeat(HeartbeatPacket {
        meta: view.meta(),
        terminal,
        voltage,
        gsm_signal,
        extended,
    }))
}
