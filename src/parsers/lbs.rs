//! Cell-tower report packets: 0x28 (multi-base 2G) and 0xA1 (4G).

use super::helpers::{ensure_content, field};
use crate::codec::{read_u16_be, read_u24_be};
use crate::decoder::DecoderConfig;
use crate::error::DecodeError;
use crate::frame::FrameView;
use crate::packet::{Lbs4GPacket, LbsMultiBasePacket, Packet, Status4G, StatusTrailer};
use crate::protocol::{GsmSignal, UploadMode, VoltageLevel, LBS_4G, LBS_MULTI_BASE};
use crate::types::{DateTime, Lbs4G, LbsInfo, NeighborCell, TerminalInfo};

/// Maximum neighbor cells in a 0x28 report.
const MAX_NEIGHBORS: usize = 6;

/// 0x28 content: `DateTime(6) | main cell(9) | neighbors(6 each, up to 6) |
/// [TA(1)] [| Language(2)] [| TerminalInfo(1) Voltage(1) GSM(1)]`.
pub fn parse_lbs_multi_base(
    view: &FrameView<'_>,
    _config: &DecoderConfig,
) -> Result<Packet, DecodeError> {
    let content = view.content();
    ensure_content(LBS_MULTI_BASE, content, 6 + 9)?;

    let datetime = field(
        LBS_MULTI_BASE,
        "datetime",
        0,
        DateTime::from_slice(content, 0),
    )?;
    let main = field(LBS_MULTI_BASE, "main_cell", 6, LbsInfo::from_slice(content, 6))?;
    let main_rssi = content[14];

    let mut offset = 15;
    let mut neighbors = Vec::new();
    while neighbors.len() < MAX_NEIGHBORS && offset + 6 <= content.len() {
        let lac = field(
            LBS_MULTI_BASE,
            "neighbor_lac",
            offset,
            read_u16_be(content, offset),
        )?;
        let cell_id = field(
            LBS_MULTI_BASE,
            "neighbor_cell",
            offset + 2,
            read_u24_be(content, offset + 2),
        )?;
        let rssi = content[offset + 5];
        neighbors.push(NeighborCell { lac, cell_id, rssi });
        offset += 6;
    }

    let timing_advance = if offset < content.len() {
        let ta = content[offset];
        offset += 1;
        Some(ta)
    } else {
        None
    };

    let language_raw = if offset + 2 <= content.len() {
        let raw = field(
            LBS_MULTI_BASE,
            "language",
            offset,
            read_u16_be(content, offset),
        )?;
        offset += 2;
        Some(raw)
    } else {
        None
    };

    let status = (offset + 3 <= content.len()).then(|| StatusTrailer {
        terminal: TerminalInfo::from_byte(content[offset]),
        voltage: VoltageLevel::from_byte(content[offset + 1]),
        gsm_signal: GsmSignal::from_byte(content[offset + 2]),
    });

    Ok(Packet::LbsMultiBase(LbsMultiBasePacket {
        meta: view.meta(),
        datetime,
        main,
        main_rssi,
        neighbors,
        timing_advance,
        language_raw,
        status,
    }))
}

/// 0xA1 content: `DateTime(6) | 4G LBS(15|16) | neighbors (raw) |
/// [TerminalInfo(1) Voltage(1) GSM(1) UploadMode(1)]`.
///
/// The status trailer, when present, occupies the final four bytes; bytes
/// between the main cell and the trailer are neighbor data kept raw.
pub fn parse_lbs_4g(view: &FrameView<'_>, _config: &DecoderConfig) -> Result<Packet, DecodeError> {
    let content = view.content();
    ensure_content(LBS_4G, content, 6 + 15)?;

    let datetime = field(LBS_4G, "datetime", 0, DateTime::from_slice(content, 0))?;
    let (lbs, consumed) = field(LBS_4G, "lbs", 6, Lbs4G::from_slice(content, 6))?;
    let after = 6 + consumed;

    let (neighbors_raw, status) = if content.len() - after >= 4 {
        let trailer = content.len() - 4;
        (
            content[after..trailer].to_vec(),
            Some(Status4G {
                terminal: TerminalInfo::from_byte(content[trailer]),
                voltage: VoltageLevel::from_byte(content[trailer + 1]),
                gsm_signal: GsmSignal::from_byte(content[trailer + 2]),
                upload_mode: UploadMode::from_byte(content[trailer + 3]),
            }),
        )
    } else {
        (content[after..].to_vec(), None)
    };

    Ok(Packet::Lbs4G(Lbs4GPacket {
        meta: view.meta(),
        datetime,
        lbs,
        neighbors_raw,
        status,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::crc_itu;

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

    fn multi_base_content(neighbor_count: usize) -> Vec<u8> {
        let mut content = vec![24, 6, 15, 14, 30, 45];
        content.extend_from_slice(&[0x01, 0xCC, 0x00, 0x28, 0x7D, 0x00, 0x1F, 0x71, 0x30]);
        for i in 0..neighbor_count {
            content.extend_from_slice(&(0x2800u16 + i as u16).to_be_bytes());
            content.extend_from_slice(&[0x00, 0x20, i as u8]);
            content.push(0x28 + i as u8);
        }
        content
    }

    #[test]
    fn test_main_cell_only() {
        let bytes = frame(LBS_MULTI_BASE, &multi_base_content(0), 1);
        let view = FrameView::new(&bytes).unwrap();
        let config = DecoderConfig::default();
        let Packet::LbsMultiBase(lbs) = parse_lbs_multi_base(&view, &config).unwrap() else {
            panic!("not an lbs packet");
        };
        assert_eq!(lbs.main.mcc, 460);
        assert_eq!(lbs.main_rssi, 0x30);
        assert!(lbs.neighbors.is_empty());
        assert_eq!(lbs.timing_advance, None);
        assert_eq!(lbs.language_raw, None);
        assert_eq!(lbs.status, None);
    }

    #[test]
    fn test_six_neighbors_with_trailer() {
        let mut content = multi_base_content(6);
        content.push(0x01); // timing advance
        content.extend_from_slice(&[0x00, 0x02]); // language, high byte raw
        content.extend_from_slice(&[0x04, 0x05, 0x03]); // status trailer
        let bytes = frame(LBS_MULTI_BASE, &content, 2);
        let view = FrameView::new(&bytes).unwrap();
        let config = DecoderConfig::default();
        let Packet::LbsMultiBase(lbs) = parse_lbs_multi_base(&view, &config).unwrap() else {
            panic!("not an lbs packet");
        };
        assert_eq!(lbs.neighbors.len(), 6);
        assert_eq!(lbs.neighbors[2].lac, 0x2802);
        assert_eq!(lbs.timing_advance, Some(0x01));
        assert_eq!(lbs.language_raw, Some(0x0002));
        assert_eq!(lbs.language(), Some(crate::protocol::Language::English));
        let status = lbs.status.unwrap();
        assert_eq!(status.voltage, VoltageLevel::High);
        assert_eq!(status.gsm_signal, GsmSignal::Good);
    }

    #[test]
    fn test_neighbor_cap_preserves_trailer() {
        // With six neighbors present, the six trailing bytes are not
        // mistaken for a seventh neighbor.
        let mut content = multi_base_content(6);
        content.push(0x00);
        content.extend_from_slice(&[0x00, 0x01]);
        content.extend_from_slice(&[0x00, 0x06, 0x04]);
        let bytes = frame(LBS_MULTI_BASE, &content, 3);
        let view = FrameView::new(&bytes).unwrap();
        let config = DecoderConfig::default();
        let Packet::LbsMultiBase(lbs) = parse_lbs_multi_base(&view, &config).unwrap() else {
            panic!("not an lbs packet");
        };
        assert_eq!(lbs.neighbors.len(), 6);
        assert!(lbs.status.is_some());
    }

    #[test]
    fn test_too_short() {
        let bytes = frame(LBS_MULTI_BASE, &multi_base_content(0)[..10], 4);
        let view = FrameView::new(&bytes).unwrap();
        let config = DecoderConfig::default();
        assert!(matches!(
            parse_lbs_multi_base(&view, &config),
            Err(DecodeError::ContentTooShort { min: 15, .. })
        ));
    }

    fn lbs_4g_content() -> Vec<u8> {
        let mut content = vec![24, 6, 15, 14, 30, 45];
        content.extend_from_slice(&[0x01, 0xCC, 0x0B]);
        content.extend_from_slice(&0x0000287Du32.to_be_bytes());
        content.extend_from_slice(&0x1F71u64.to_be_bytes());
        content
    }

    #[test]
    fn test_lbs_4g_bare() {
        let bytes = frame(LBS_4G, &lbs_4g_content(), 5);
        let view = FrameView::new(&bytes).unwrap();
        let config = DecoderConfig::default();
        let Packet::Lbs4G(lbs) = parse_lbs_4g(&view, &config).unwrap() else {
            panic!("not a 4g lbs packet");
        };
        assert_eq!(lbs.lbs.mccmnc(), 460_011);
        assert!(lbs.neighbors_raw.is_empty());
        assert_eq!(lbs.status, None);
    }

    #[test]
    fn test_lbs_4g_with_status_trailer() {
        let mut content = lbs_4g_content();
        content.extend_from_slice(&[0xAA, 0xBB]); // neighbor bytes, kept raw
        content.extend_from_slice(&[0x42, 0x06, 0x02, 0x00]);
        let bytes = frame(LBS_4G, &content, 6);
        let view = FrameView::new(&bytes).unwrap();
        let config = DecoderConfig::default();
        let Packet::Lbs4G(lbs) = parse_lbs_4g(&view, &config).unwrap() else {
            panic!("not a 4g lbs packet");
        };
        assert_eq!(lbs.neighbors_raw, vec![0xAA, 0xBB]);
        let status = lbs.status.unwrap();
        assert!(status.terminal.gps_positioned);
        assert_eq!(status.voltage, VoltageLevel::Full);
        assert_eq!(status.gsm_signal, GsmSignal::Weak);
        assert_eq!(status.upload_mode, UploadMode::TimedInterval);
    }
}
