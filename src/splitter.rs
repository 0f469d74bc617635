//! Streaming frame splitter.
//!
//! TCP delivers the wire protocol as an arbitrary byte stream; the splitter
//! reconstructs complete frames from an accumulated buffer and hands back
//! the residue to prepend to the next read. It never returns a partial
//! frame, and emitted frames preserve byte order.

use tracing::debug;

use crate::frame::{START_LONG, START_SHORT, STOP};

/// Result of scanning one buffer.
#[derive(Debug)]
pub struct SplitResult<'a> {
    /// Complete frames, in byte order.
    pub frames: Vec<&'a [u8]>,
    /// Trailing bytes that do not yet form a complete frame.
    pub residue: &'a [u8],
    /// Corrupt regions skipped during resynchronization.
    pub violations: Vec<StreamViolation>,
}

/// One contiguous corrupt region, reported once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamViolation {
    /// Buffer offset where the region began.
    pub offset: usize,
    /// Bytes discarded or skipped.
    pub skipped: usize,
    pub kind: ViolationKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// Bytes before the next start marker were not a frame.
    InvalidStartMarker,
    /// A delimited frame did not end in `0x0D 0x0A`.
    InvalidStopMarker,
    /// No start marker anywhere in the region; prefix unrecoverable.
    NoStartMarker,
}

fn start_width(buf: &[u8], offset: usize) -> Option<usize> {
    let pair = [buf[offset], buf[offset + 1]];
    if pair == START_SHORT {
        Some(1)
    } else if pair == START_LONG {
        Some(2)
    } else {
        None
    }
}

/// Find the next start marker at or after `from`.
fn find_marker(buf: &[u8], from: usize) -> Option<usize> {
    (from..buf.len().saturating_sub(1)).find(|&i| start_width(buf, i).is_some())
}

/// Split an accumulated buffer into complete frames plus residue.
pub fn split(buffer: &[u8]) -> SplitResult<'_> {
    let mut frames = Vec::new();
    let mut violations = Vec::new();
    let mut offset = 0;

    loop {
        let remaining = buffer.len() - offset;
        if remaining < 4 {
            return SplitResult {
                frames,
                residue: &buffer[offset..],
                violations,
            };
        }

        let width = match start_width(buffer, offset) {
            Some(width) => width,
            None => match find_marker(buffer, offset + 1) {
                Some(next) => {
                    violations.push(StreamViolation {
                        offset,
                        skipped: next - offset,
                        kind: ViolationKind::InvalidStartMarker,
                    });
                    debug!(offset, skipped = next - offset, "resynchronized stream");
                    offset = next;
                    continue;
                }
                None => {
                    // A trailing 0x78/0x79 may be a marker split across
                    // reads; keep it as residue.
                    let tail = match buffer.last() {
                        Some(0x78) | Some(0x79) => buffer.len() - 1,
                        _ => buffer.len(),
                    };
                    violations.push(StreamViolation {
                        offset,
                        skipped: tail - offset,
                        kind: ViolationKind::NoStartMarker,
                    });
                    return SplitResult {
                        frames,
                        residue: &buffer[tail..],
                        violations,
                    };
                }
            },
        };

        // Length field: 1 byte short, 2 bytes long; remaining >= 4 covers both.
        let declared = if width == 1 {
            buffer[offset + 2] as usize
        } else {
            u16::from_be_bytes([buffer[offset + 2], buffer[offset + 3]]) as usize
        };
        let total = 2 + width + declared + 2;
        if remaining < total {
            return SplitResult {
                frames,
                residue: &buffer[offset..],
                violations,
            };
        }

        let stop = [buffer[offset + total - 2], buffer[offset + total - 1]];
        if stop != STOP {
            violations.push(StreamViolation {
                offset,
                skipped: 0,
                kind: ViolationKind::InvalidStopMarker,
            });
            match find_marker(buffer, offset + 1) {
                Some(next) => {
                    debug!(offset, next, "bad stop marker, resynchronizing");
                    offset = next;
                    continue;
                }
                None => {
                    let tail = match buffer.last() {
                        Some(0x78) | Some(0x79) => buffer.len() - 1,
                        _ => buffer.len(),
                    };
                    return SplitResult {
                        frames,
                        residue: &buffer[tail..],
                        violations,
                    };
                }
            }
        }

        frames.push(&buffer[offset..offset + total]);
        offset += total;
    }
}

/// True when the buffer holds at least one complete frame.
pub fn has_complete_packet(buffer: &[u8]) -> bool {
    !split(buffer).frames.is_empty()
}

/// Number of complete frames currently in the buffer.
pub fn estimate_packet_count(buffer: &[u8]) -> usize {
    split(buffer).frames.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HB1: [u8; 13] = [
        0x78, 0x78, 0x08, 0x13, 0x04, 0x03, 0x00, 0x00, 0x01, 0x05, 0x05, 0x0D, 0x0A,
    ];
    const HB2: [u8; 13] = [
        0x78, 0x78, 0x08, 0x13, 0x24, 0x04, 0x01, 0x00, 0x02, 0x5A, 0xF2, 0x0D, 0x0A,
    ];

    #[test]
    fn test_single_frame() {
        let result = split(&HB1);
        assert_eq!(result.frames, vec![&HB1[..]]);
        assert!(result.residue.is_empty());
        assert!(result.violations.is_empty());
    }

    #[test]
    fn test_two_frames_back_to_back() {
        let mut buffer = HB1.to_vec();
        buffer.extend_from_slice(&HB2);
        let result = split(&buffer);
        assert_eq!(result.frames.len(), 2);
        assert_eq!(result.frames[0], &HB1[..]);
        assert_eq!(result.frames[1], &HB2[..]);
        assert!(result.residue.is_empty());
    }

    #[test]
    fn test_partial_frame_is_residue() {
        let result = split(&HB1[..7]);
        assert!(result.frames.is_empty());
        assert_eq!(result.residue, &HB1[..7]);
    }

    #[test]
    fn test_tiny_buffer_is_residue() {
        let result = split(&HB1[..3]);
        assert!(result.frames.is_empty());
        assert_eq!(result.residue, &HB1[..3]);
        assert!(result.violations.is_empty());
    }

    #[test]
    fn test_frame_then_partial() {
        let mut buffer = HB1.to_vec();
        buffer.extend_from_slice(&HB2[..5]);
        let result = split(&buffer);
        assert_eq!(result.frames.len(), 1);
        assert_eq!(result.residue, &HB2[..5]);
    }

    #[test]
    fn test_resync_skips_garbage_prefix() {
        let mut buffer = vec![0xDE, 0xAD, 0xBE, 0xEF];
        buffer.extend_from_slice(&HB1);
        let result = split(&buffer);
        assert_eq!(result.frames.len(), 1);
        assert_eq!(result.frames[0], &HB1[..]);
        assert_eq!(
            result.violations,
            vec![StreamViolation {
                offset: 0,
                skipped: 4,
                kind: ViolationKind::InvalidStartMarker,
            }]
        );
    }

    #[test]
    fn test_one_violation_per_garbage_region() {
        let mut buffer = vec![0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        buffer.extend_from_slice(&HB1);
        let result = split(&buffer);
        assert_eq!(result.frames.len(), 1);
        assert_eq!(result.violations.len(), 1);
    }

    #[test]
    fn test_no_marker_discards_region() {
        let result = split(&[0x01, 0x02, 0x03, 0x04, 0x05]);
        assert!(result.frames.is_empty());
        assert!(result.residue.is_empty());
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].kind, ViolationKind::NoStartMarker);
    }

    #[test]
    fn test_no_marker_keeps_trailing_marker_byte() {
        let result = split(&[0x01, 0x02, 0x03, 0x04, 0x78]);
        assert!(result.frames.is_empty());
        assert_eq!(result.residue, &[0x78]);
    }

    #[test]
    fn test_bad_stop_marker_resyncs() {
        let mut corrupt = HB1.to_vec();
        corrupt[11] = 0x00;
        corrupt.extend_from_slice(&HB2);
        let result = split(&corrupt);
        // First frame dropped, second recovered.
        assert_eq!(result.frames, vec![&HB2[..]]);
        assert_eq!(result.violations[0].kind, ViolationKind::InvalidStopMarker);
    }

    #[test]
    fn test_long_frame() {
        // Empty-content long frame: declared 5, total 11.
        let frame = [
            0x79, 0x79, 0x00, 0x05, 0x8A, 0x00, 0x01, 0xAA, 0xBB, 0x0D, 0x0A,
        ];
        let result = split(&frame);
        assert_eq!(result.frames, vec![&frame[..]]);
    }

    #[test]
    fn test_split_point_invariance() {
        // Feeding any prefix then residue + rest yields the same frames.
        let mut buffer = HB1.to_vec();
        buffer.extend_from_slice(&HB2);
        let whole: Vec<Vec<u8>> = split(&buffer)
            .frames
            .iter()
            .map(|f| f.to_vec())
            .collect();
        for k in 0..buffer.len() {
            let first = split(&buffer[..k]);
            let mut carried = first.residue.to_vec();
            let mut collected: Vec<Vec<u8>> =
                first.frames.iter().map(|f| f.to_vec()).collect();
            carried.extend_from_slice(&buffer[k..]);
            let second = split(&carried);
            collected.extend(second.frames.iter().map(|f| f.to_vec()));
            assert_eq!(collected, whole, "split point {k}");
            assert!(second.residue.is_empty());
        }
    }

    #[test]
    fn test_inspection_helpers() {
        assert!(has_complete_packet(&HB1));
        assert!(!has_complete_packet(&HB1[..6]));
        let mut buffer = HB1.to_vec();
        buffer.extend_from_slice(&HB2);
        assert_eq!(estimate_packet_count(&buffer), 2);
    }
}
