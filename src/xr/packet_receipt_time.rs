// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    packet::Packet,
    utils::{u16_from_be_bytes, u32_from_be_bytes},
};

use super::XrBlockType;

/// The fixed fields of a Packet Receipt Times report block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrtInfo {
    /// The SSRC of the media being reported on.
    pub ssrc: u32,
    /// Every 2^thinning sequence number is reported.
    pub thinning: u8,
    /// First sequence number of the reported range, inclusive.
    pub begin_seq: u16,
    /// Last sequence number of the reported range, exclusive.
    pub end_seq: u16,
}

impl<'r, 'a> Packet<'r, 'a> {
    /// The fixed fields of the current Packet Receipt Times report block.
    ///
    /// # Panics
    ///
    /// Panics if the current block is of another type.
    pub fn xr_prt_info(&self) -> Option<PrtInfo> {
        let block = self.xr_block(&[XrBlockType::Prt])?;
        // header, ssrc and sequence range plus at least one receipt time
        if u16_from_be_bytes(&block[2..]) < 3 {
            return None;
        }

        Some(PrtInfo {
            ssrc: u32_from_be_bytes(&block[4..]),
            thinning: block[1] & 0x0f,
            begin_seq: u16_from_be_bytes(&block[8..]),
            end_seq: u16_from_be_bytes(&block[10..]),
        })
    }

    /// The receipt time of the packet with sequence number `seq`.
    ///
    /// Returns `None` if `seq` is outside of the reported range or its entry is missing.
    /// Thinning is not taken into account.
    ///
    /// # Panics
    ///
    /// Panics if the current block is of another type.
    pub fn xr_prt_by_seq(&self, seq: u16) -> Option<u32> {
        let info = self.xr_prt_info()?;
        if seq >= info.end_seq || seq < info.begin_seq {
            return None;
        }

        let block = self.xr_block(&[XrBlockType::Prt])?;
        let offset = 12 + (seq - info.begin_seq) as usize * 4;
        block.get(offset..offset + 4).map(u32_from_be_bytes)
    }
}
