//! Login packet (0x01).

use tracing::warn;

use super::helpers::{ensure_content, field};
use crate::codec::read_u16_be;
use crate::decoder::DecoderConfig;
use crate::error::DecodeError;
use crate::frame::FrameView;
use crate::packet::{LoginPacket, Packet};
use crate::protocol::{Language, LOGIN};
use crate::types::{Imei, TimezoneLanguage};

/// Content: `IMEI(8 BCD) | ModelID(2) | ... | Timezone/Language(2)`.
///
/// The timezone field is read from the last two content bytes; firmware
/// revisions pad the middle differently.
pub fn parse_login(view: &FrameView<'_>, config: &DecoderConfig) -> Result<Packet, DecodeError> {
    let content = view.content();
    ensure_content(LOGIN, content, 12)?;

    let imei = field(LOGIN, "imei", 0, Imei::from_bcd(&content[..8]))?;
    if config.validate_imei_checksum {
        field(LOGIN, "imei", 0, imei.validate_luhn())?;
    }

    let model_id = field(LOGIN, "model_id", 8, read_u16_be(content, 8))?;

    let tz_offset = content.len() - 2;
    let tz_raw = field(LOGIN, "timezone", tz_offset, read_u16_be(content, tz_offset))?;
    let timezone = match TimezoneLanguage::from_u16(tz_raw) {
        Ok(tz) => tz,
        Err(source) => match config.default_timezone_offset_minutes {
            Some(offset_minutes) => {
                warn!(
                    imei = %imei,
                    raw = tz_raw,
                    fallback_minutes = offset_minutes,
                    "unusable timezone field, applying configured default"
                );
                TimezoneLanguage {
                    offset_minutes,
                    language: Language::Unspecified,
                }
            }
            None => {
                return Err(DecodeError::InvalidField {
                    protocol: LOGIN,
                    field: "timezone",
                    offset: tz_offset,
                    source,
                })
            }
        },
    };

    Ok(Packet::Login(LoginPacket {
        meta: view.meta(),
        imei,
        model_id,
        timezone,
    }))
}
