//! Time-calibration request (0x8A).

use crate::decoder::DecoderConfig;
use crate::error::DecodeError;
use crate::frame::FrameView;
use crate::packet::{Packet, TimeCalibrationPacket};

/// No content; the frame itself is the request. The session layer answers
/// with the encoder's UTC payload.
pub fn parse_time_calibration(
    view: &FrameView<'_>,
    _config: &DecoderConfig,
) -> Result<Packet, DecodeError> {
    Ok(Packet::TimeCalibration(TimeCalibrationPacket {
        meta: view.meta(),
    }))
}
