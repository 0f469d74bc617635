//! Cell-tower (LBS) identification, 2G/3G and 4G wire forms.

use crate::codec::{read_u16_be, read_u24_be, read_u32_be, read_u64_be};
use crate::codec::{write_u16_be, write_u24_be, write_u32_be, write_u64_be};
use crate::error::FieldError;

/// 2G/3G cell identification, exactly 8 wire bytes:
/// `MCC(2) | MNC(1) | LAC(2) | CellID(3)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LbsInfo {
    pub mcc: u16,
    pub mnc: u8,
    pub lac: u16,
    pub cell_id: u32,
}

impl LbsInfo {
    pub const WIRE_LEN: usize = 8;

    pub fn from_slice(buf: &[u8], offset: usize) -> Result<Self, FieldError> {
        if offset + Self::WIRE_LEN > buf.len() {
            return Err(FieldError::OutOfBounds {
                offset,
                needed: Self::WIRE_LEN,
                available: buf.len(),
            });
        }
        Ok(LbsInfo {
            mcc: read_u16_be(buf, offset)?,
            mnc: buf[offset + 2],
            lac: read_u16_be(buf, offset + 3)?,
            cell_id: read_u24_be(buf, offset + 5)?,
        })
    }

    pub fn write_wire(self, out: &mut Vec<u8>) {
        write_u16_be(out, self.mcc);
        out.push(self.mnc);
        write_u16_be(out, self.lac);
        write_u24_be(out, self.cell_id);
    }
}

/// 4G cell identification, 15 or 16 wire bytes:
/// `MCC(2) | MNC(1|2) | LAC(4) | CellID(8)`.
///
/// Bit 15 of the MCC word signals a 2-byte MNC; the semantic MCC is the
/// word with that bit cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lbs4G {
    pub mcc: u16,
    pub mnc: u16,
    /// True when the wire form carried the 2-byte MNC.
    pub wide_mnc: bool,
    pub lac: u32,
    pub cell_id: u64,
}

impl Lbs4G {
    /// Decode at `buf[offset]`, returning the value and bytes consumed
    /// (15 or 16).
    pub fn from_slice(buf: &[u8], offset: usize) -> Result<(Self, usize), FieldError> {
        let mcc_raw = read_u16_be(buf, offset)?;
        let wide_mnc = mcc_raw & 0x8000 != 0;
        let mnc_len = if wide_mnc { 2 } else { 1 };
        let total = 2 + mnc_len + 4 + 8;
        if offset + total > buf.len() {
            return Err(FieldError::OutOfBounds {
                offset,
                needed: total,
                available: buf.len(),
            });
        }
        let mnc = if wide_mnc {
            read_u16_be(buf, offset + 2)?
        } else {
            buf[offset + 2] as u16
        };
        let lac = read_u32_be(buf, offset + 2 + mnc_len)?;
        let cell_id = read_u64_be(buf, offset + 6 + mnc_len)?;
        Ok((
            Lbs4G {
                mcc: mcc_raw & 0x7FFF,
                mnc,
                wide_mnc,
                lac,
                cell_id,
            },
            total,
        ))
    }

    pub fn write_wire(self, out: &mut Vec<u8>) {
        if self.wide_mnc {
            write_u16_be(out, self.mcc | 0x8000);
            write_u16_be(out, self.mnc);
        } else {
            write_u16_be(out, self.mcc);
            out.push(self.mnc as u8);
        }
        write_u32_be(out, self.lac);
        write_u64_be(out, self.cell_id);
    }

    /// Composite country+network code: `MCC * 1000 + MNC`.
    pub fn mccmnc(self) -> u32 {
        self.mcc as u32 * 1000 + self.mnc as u32
    }
}

/// Neighbor cell entry in the multi-base LBS packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborCell {
    pub lac: u16,
    pub cell_id: u32,
    pub rssi: u8,
}
