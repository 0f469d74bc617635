//! GPS location packets: 0x22 (2G/3G) and 0xA0 (4G).

use super::helpers::{ensure_content, field, parse_gps_head, GPS_HEAD_LEN};
use crate::codec::read_u32_be;
use crate::decoder::DecoderConfig;
use crate::error::DecodeError;
use crate::frame::FrameView;
use crate::packet::{GpsLocation4GPacket, GpsLocationPacket, Packet};
use crate::protocol::{UploadMode, GPS_LOCATION, GPS_LOCATION_4G};
use crate::types::{Lbs4G, LbsInfo};

/// 0x22 content:
/// `head(18) | LBS(8) | ACC(1) | UploadMode(1) | Reupload(1) [| Mileage(4)]`.
///
/// ACC occupies its own byte here; it is never packed into a terminal-info
/// byte in the location family.
pub fn parse_gps_location(
    view: &FrameView<'_>,
    _config: &DecoderConfig,
) -> Result<Packet, DecodeError> {
    const MIN: usize = GPS_HEAD_LEN + 8 + 3;
    let content = view.content();
    ensure_content(GPS_LOCATION, content, MIN)?;

    let head = parse_gps_head(GPS_LOCATION, content, true)?;
    let lbs = field(
        GPS_LOCATION,
        "lbs",
        GPS_HEAD_LEN,
        LbsInfo::from_slice(content, GPS_HEAD_LEN),
    )?;
    let acc_on = content[GPS_HEAD_LEN + 8] != 0x00;
    let upload_mode = UploadMode::from_byte(content[GPS_HEAD_LEN + 9]);
    let reupload = content[GPS_HEAD_LEN + 10] != 0x00;
    let mileage = if content.len() >= MIN + 4 {
        Some(field(
            GPS_LOCATION,
            "mileage",
            MIN,
            read_u32_be(content, MIN),
        )?)
    } else {
        None
    };

    Ok(Packet::GpsLocation(GpsLocationPacket {
        meta: view.meta(),
        datetime: head.datetime,
        satellites: head.satellites,
        coordinates: head.coordinates,
        speed: head.speed,
        course: head.course,
        lbs,
        acc_on,
        upload_mode,
        reupload,
        mileage,
    }))
}

/// 0xA0 content: as 0x22 with a variable-width 4G LBS block.
pub fn parse_gps_location_4g(
    view: &FrameView<'_>,
    _config: &DecoderConfig,
) -> Result<Packet, DecodeError> {
    let content = view.content();
    ensure_content(GPS_LOCATION_4G, content, GPS_HEAD_LEN + 15 + 3)?;

    let head = parse_gps_head(GPS_LOCATION_4G, content, true)?;
    let (lbs, lbs_len) = field(
        GPS_LOCATION_4G,
        "lbs",
        GPS_HEAD_LEN,
        Lbs4G::from_slice(content, GPS_HEAD_LEN),
    )?;
    let tail = GPS_HEAD_LEN + lbs_len;
    ensure_content(GPS_LOCATION_4G, content, tail + 3)?;

    let acc_on = content[tail] != 0x00;
    let upload_mode = UploadMode::from_byte(content[tail + 1]);
    let reupload = content[tail + 2] != 0x00;
    let mileage = if content.len() >= tail + 7 {
        Some(field(
            GPS_LOCATION_4G,
            "mileage",
            tail + 3,
            read_u32_be(content, tail + 3),
        )?)
    } else {
        None
    };

    Ok(Packet::GpsLocation4G(GpsLocation4GPacket {
        meta: view.meta(),
        datetime: head.datetime,
        satellites: head.satellites,
        coordinates: head.coordinates,
        speed: head.speed,
        course: head.course,
        lbs,
        mccmnc: lbs.mccmnc(),
        acc_on,
        upload_mode,
        reupload,
        mileage,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::crc_itu;

    fn gps_head_bytes() -> Vec<u8> {
        let mut content = vec![24, 6, 15, 14, 30, 45, 0xC8];
        content.extend_from_slice(&40_582_800u32.to_be_bytes());
        content.extend_from_slice(&205_304_040u32.to_be_bytes());
        content.push(40);
        content.extend_from_slice(&[0x15, 0x4C]);
        content
    }

    fn frame(protocol: u8, content: &[u8], serial: u16) -> Vec<u8> {
        let mut body = vec![(1 + content.len() + 4) as u8, protocol];
        body.extend_from_slice(content);
        body.extend_from_slice(&serial.to_be_bytes());
        let crc = crc_itu(&body);
        let mut out = vec![0x78, 0x78];
        out.extend_from_slice(&body);
        out.extend_from_slice(&crc.to_be_bytes());
        out.extend_from_slice(&[0x0D, 0x0A]);
        out
    }

    #[test]
    fn test_gps_location_with_mileage() {
        let mut content = gps_head_bytes();
        content.extend_from_slice(&[0x01, 0xCC, 0x00, 0x28, 0x7D, 0x00, 0x1F, 0x71]);
        content.push(0x01); // ACC on
        content.push(0x00); // timed upload
        content.push(0x00); // real-time
        content.extend_from_slice(&123_456u32.to_be_bytes());
        let bytes = frame(GPS_LOCATION, &content, 0x0042);

        let view = FrameView::new(&bytes).unwrap();
        let config = DecoderConfig::default();
        let Packet::GpsLocation(gps) = parse_gps_location(&view, &config).unwrap() else {
            panic!("not a gps location");
        };
        // 0x22 takes satellites from the high nibble.
        assert_eq!(gps.satellites, 0xC);
        assert!(gps.acc_on);
        assert_eq!(gps.upload_mode, UploadMode::TimedInterval);
        assert!(!gps.reupload);
        assert_eq!(gps.mileage, Some(123_456));
        assert_eq!(gps.lbs.mcc, 460);
        assert_eq!(gps.meta.serial, 0x0042);
        assert!((gps.coordinates.latitude - 22.546).abs() < 1e-9);
        assert!((gps.coordinates.longitude - 114.0578).abs() < 1e-9);
    }

    #[test]
    fn test_gps_location_without_mileage() {
        let mut content = gps_head_bytes();
        content.extend_from_slice(&[0x01, 0xCC, 0x00, 0x28, 0x7D, 0x00, 0x1F, 0x71]);
        content.extend_from_slice(&[0x00, 0x03, 0x01]);
        let bytes = frame(GPS_LOCATION, &content, 1);

        let view = FrameView::new(&bytes).unwrap();
        let config = DecoderConfig::default();
        let Packet::GpsLocation(gps) = parse_gps_location(&view, &config).unwrap() else {
            panic!("not a gps location");
        };
        assert!(!gps.acc_on);
        assert_eq!(gps.upload_mode, UploadMode::AccStateChange);
        assert!(gps.reupload);
        assert_eq!(gps.mileage, None);
    }

    #[test]
    fn test_gps_location_too_short() {
        let content = gps_head_bytes();
        let bytes = frame(GPS_LOCATION, &content, 1);
        let view = FrameView::new(&bytes).unwrap();
        let config = DecoderConfig::default();
        assert!(matches!(
            parse_gps_location(&view, &config),
            Err(DecodeError::ContentTooShort { min: 29, .. })
        ));
    }

    #[test]
    fn test_gps_location_4g_narrow_mnc() {
        let mut content = gps_head_bytes();
        content.extend_from_slice(&[0x01, 0xCC, 0x0B]);
        content.extend_from_slice(&0x0000287Du32.to_be_bytes());
        content.extend_from_slice(&0x1F71u64.to_be_bytes());
        content.extend_from_slice(&[0x01, 0x02, 0x00]);
        let bytes = frame(GPS_LOCATION_4G, &content, 9);

        let view = FrameView::new(&bytes).unwrap();
        let config = DecoderConfig::default();
        let Packet::GpsLocation4G(gps) = parse_gps_location_4g(&view, &config).unwrap() else {
            panic!("not a 4g location");
        };
        assert_eq!(gps.mccmnc, 460_011);
        assert!(gps.acc_on);
        assert_eq!(gps.upload_mode, UploadMode::InflectionPoint);
        assert_eq!(gps.mileage, None);
    }

    #[test]
    fn test_gps_location_4g_wide_mnc_with_mileage() {
        let mut content = gps_head_bytes();
        content.extend_from_slice(&[0x81, 0xCC, 0x00, 0x0B]);
        content.extend_from_slice(&0x0000287Du32.to_be_bytes());
        content.extend_from_slice(&0x1F71u64.to_be_bytes());
        content.extend_from_slice(&[0x00, 0x00, 0x01]);
        content.extend_from_slice(&42u32.to_be_bytes());
        let bytes = frame(GPS_LOCATION_4G, &content, 9);

        let view = FrameView::new(&bytes).unwrap();
        let config = DecoderConfig::default();
        let Packet::GpsLocation4G(gps) = parse_gps_location_4g(&view, &config).unwrap() else {
            panic!("not a 4g location");
        };
        assert!(gps.lbs.wide_mnc);
        assert_eq!(gps.mccmnc, 460_011);
        assert!(gps.reupload);
        assert_eq!(gps.mileage, Some(42));
    }

    #[test]
    fn test_gps_location_4g_truncated_tail() {
        // LBS consumes 16 bytes, leaving only two for the three fixed tail bytes.
        let mut content = gps_head_bytes();
        content.extend_from_slice(&[0x81, 0xCC, 0x00, 0x0B]);
        content.extend_from_slice(&0x0000287Du32.to_be_bytes());
        content.extend_from_slice(&0x1F71u64.to_be_bytes());
        content.extend_from_slice(&[0x00, 0x00]);
        let bytes = frame(GPS_LOCATION_4G, &content, 9);

        let view = FrameView::new(&bytes).unwrap();
        let config = DecoderConfig::default();
        assert!(matches!(
            parse_gps_location_4g(&view, &config),
            Err(DecodeError::ContentTooShort { .. })
        ));
    }
}
