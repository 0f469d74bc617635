//! GPS-fix address request (0x2A).

use super::helpers::{ascii_trimmed, ensure_content, parse_gps_head};
use crate::decoder::DecoderConfig;
use crate::error::DecodeError;
use crate::frame::FrameView;
use crate::packet::{GpsAddressRequestPacket, Packet};
use crate::protocol::{AlarmType, Language, GPS_ADDRESS_REQUEST};

/// Strict 41-byte content:
/// `head(18) | Phone(21 ASCII) | Alarm(1) | Language(1)`.
///
/// Longer content is truncated to the first 41 bytes; shorter fails.
pub fn parse_gps_address_request(
    view: &FrameView<'_>,
    _config: &DecoderConfig,
) -> Result<Packet, DecodeError> {
    const CONTENT_LEN: usize = 41;
    let content = view.content();
    ensure_content(GPS_ADDRESS_REQUEST, content, CONTENT_LEN)?;
    let content = &content[..CONTENT_LEN];

    let head = parse_gps_head(GPS_ADDRESS_REQUEST, content, false)?;
    let phone_number = ascii_trimmed(GPS_ADDRESS_REQUEST, "phone_number", 18, &content[18..39])?;
    let alarm_type = AlarmType::from_byte(content[39]);
    let language = Language::from_byte(content[40]);

    Ok(Packet::GpsAddressRequest(GpsAddressRequestPacket {
        meta: view.meta(),
        datetime: head.datetime,
        satellites: head.satellites,
        coordinates: head.coordinates,
        speed: head.speed,
        course: head.course,
        phone_number,
        alarm_type,
        language,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::crc_itu;

    fn frame(content: &[u8]) -> Vec<u8> {
        let mut body = vec![(1 + content.len() + 4) as u8, GPS_ADDRESS_REQUEST];
        body.extend_from_slice(content);
        body.extend_from_slice(&[0x00, 0x21]);
        let crc = crc_itu(&body);
        let mut out = vec![0x78, 0x78];
        out.extend_from_slice(&body);
        out.extend_from_slice(&crc.to_be_bytes());
        out.extend_from_slice(&[0x0D, 0x0A]);
        out
    }

    fn request_content() -> Vec<u8> {
        let mut content = vec![24, 6, 15, 14, 30, 45, 0xC8];
        content.extend_from_slice(&40_582_800u32.to_be_bytes());
        content.extend_from_slice(&205_304_040u32.to_be_bytes());
        content.push(0);
        content.extend_from_slice(&[0x15, 0x4C]);
        content.extend_from_slice(b"13800138000          ");
        content.push(0x01);
        content.push(0x02);
        content
    }

    #[test]
    fn test_request_fields() {
        let bytes = frame(&request_content());
        let view = FrameView::new(&bytes).unwrap();
        let config = DecoderConfig::default();
        let Packet::GpsAddressRequest(req) = parse_gps_address_request(&view, &config).unwrap()
        else {
            panic!("wrong packet");
        };
        // Low nibble carries the satellite count here.
        assert_eq!(req.satellites, 8);
        assert_eq!(req.phone_number, "13800138000");
        assert_eq!(req.alarm_type, AlarmType::Sos);
        assert_eq!(req.language, Language::English);
        assert_eq!(req.meta.serial, 0x21);
    }

    #[test]
    fn test_oversize_content_truncates() {
        let mut content = request_content();
        content.extend_from_slice(&[0xAA, 0xBB, 0xCC]);
        let bytes = frame(&content);
        let view = FrameView::new(&bytes).unwrap();
        let config = DecoderConfig::default();
        let Packet::GpsAddressRequest(req) = parse_gps_address_request(&view, &config).unwrap()
        else {
            panic!("wrong packet");
        };
        assert_eq!(req.language, Language::English);
    }

    #[test]
    fn test_undersize_content_fails() {
        let content = request_content();
        let bytes = frame(&content[..40]);
        let view = FrameView::new(&bytes).unwrap();
        let config = DecoderConfig::default();
        assert!(matches!(
            parse_gps_address_request(&view, &config),
            Err(DecodeError::ContentTooShort { min: 41, len: 40, .. })
        ));
    }
}
