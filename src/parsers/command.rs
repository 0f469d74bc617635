//! Online command (0x80) and command response (0x21 / 0x15) packets.
//!
//! All three share the layout
//! `Length(1) | ServerFlag(4) | ASCII payload(Length - 4)`.

use super::helpers::{ascii_trimmed, ensure_content, field};
use crate::codec::read_u32_be;
use crate::decoder::DecoderConfig;
use crate::error::{DecodeError, FieldError};
use crate::frame::FrameView;
use crate::packet::{CommandResponsePacket, OnlineCommandPacket, Packet};

fn parse_flagged_text(
    view: &FrameView<'_>,
    text_field: &'static str,
) -> Result<(u32, String), DecodeError> {
    let protocol = view.protocol();
    let content = view.content();
    ensure_content(protocol, content, 5)?;

    let declared = content[0] as usize;
    if declared < 4 || 1 + declared > content.len() {
        return Err(DecodeError::InvalidField {
            protocol,
            field: "command_length",
            offset: 0,
            source: FieldError::InvalidDeclaredLength {
                declared,
                available: content.len() - 1,
            },
        });
    }
    let server_flag = field(protocol, "server_flag", 1, read_u32_be(content, 1))?;
    let text = ascii_trimmed(protocol, text_field, 5, &content[5..1 + declared])?;
    Ok((server_flag, text))
}

pub fn parse_online_command(
    view: &FrameView<'_>,
    _config: &DecoderConfig,
) -> Result<Packet, DecodeError> {
    let (server_flag, command) = parse_flagged_text(view, "command")?;
    Ok(Packet::OnlineCommand(OnlineCommandPacket {
        meta: view.meta(),
        server_flag,
        command,
    }))
}

pub fn parse_command_response(
    view: &FrameView<'_>,
    _config: &DecoderConfig,
) -> Result<Packet, DecodeError> {
    let (server_flag, response) = parse_flagged_text(view, "response")?;
    Ok(Packet::CommandResponse(CommandResponsePacket {
        meta: view.meta(),
        server_flag,
        response,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::crc_itu;
    use crate::protocol::{COMMAND_RESPONSE_15, COMMAND_RESPONSE_21, ONLINE_COMMAND};

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

    fn command_content(flag: u32, text: &str) -> Vec<u8> {
        let mut content = vec![(4 + text.len()) as u8];
        content.extend_from_slice(&flag.to_be_bytes());
        content.extend_from_slice(text.as_bytes());
        content
    }

    #[test]
    fn test_online_command() {
        let bytes = frame(ONLINE_COMMAND, &command_content(0xDEADBEEF, "RESET#"), 3);
        let view = FrameView::new(&bytes).unwrap();
        let config = DecoderConfig::default();
        let Packet::OnlineCommand(cmd) = parse_online_command(&view, &config).unwrap() else {
            panic!("wrong packet");
        };
        assert_eq!(cmd.server_flag, 0xDEADBEEF);
        assert_eq!(cmd.command, "RESET#");
    }

    #[test]
    fn test_command_response_both_numbers() {
        for protocol in [COMMAND_RESPONSE_21, COMMAND_RESPONSE_15] {
            let bytes = frame(protocol, &command_content(1, "CUT OIL OK"), 4);
            let view = FrameView::new(&bytes).unwrap();
            let config = DecoderConfig::default();
            let Packet::CommandResponse(resp) = parse_command_response(&view, &config).unwrap()
            else {
                panic!("wrong packet");
            };
            assert_eq!(resp.meta.protocol, protocol);
            assert_eq!(resp.response, "CUT OIL OK");
        }
    }

    #[test]
    fn test_empty_command_text() {
        let bytes = frame(ONLINE_COMMAND, &command_content(7, ""), 5);
        let view = FrameView::new(&bytes).unwrap();
        let config = DecoderConfig::default();
        let Packet::OnlineCommand(cmd) = parse_online_command(&view, &config).unwrap() else {
            panic!("wrong packet");
        };
        assert_eq!(cmd.command, "");
    }

    #[test]
    fn test_declared_length_overrun() {
        let mut content = command_content(7, "OK");
        content[0] = 0x30;
        let bytes = frame(COMMAND_RESPONSE_21, &content, 6);
        let view = FrameView::new(&bytes).unwrap();
        let config = DecoderConfig::default();
        assert!(matches!(
            parse_command_response(&view, &config),
            Err(DecodeError::InvalidField {
                field: "command_length",
                ..
            })
        ));
    }

    #[test]
    fn test_declared_length_below_flag_size() {
        let mut content = command_content(7, "OK");
        content[0] = 0x03;
        let bytes = frame(COMMAND_RESPONSE_21, &content, 7);
        let view = FrameView::new(&bytes).unwrap();
        let config = DecoderConfig::default();
        assert!(parse_command_response(&view, &config).is_err());
    }

    #[test]
    fn test_non_ascii_payload() {
        let mut content = command_content(7, "OK");
        content[5] = 0xFF;
        let bytes = frame(ONLINE_COMMAND, &content, 8);
        let view = FrameView::new(&bytes).unwrap();
        let config = DecoderConfig::default();
        assert!(matches!(
            parse_online_command(&view, &config),
            Err(DecodeError::InvalidField { field: "command", .. })
        ));
    }
}
