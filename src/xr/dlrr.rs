// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    packet::Packet,
    utils::{u16_from_be_bytes, u32_from_be_bytes},
};

use super::XrBlockType;

/// A sub-block of a DLRR report block.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DlrrBlock {
    /// The SSRC of the receiver.
    pub ssrc: u32,
    /// Middle 32 bits of the NTP timestamp of the last Receiver Reference Time block.
    pub last_rr: u32,
    /// Delay since the last Receiver Reference Time block, in units of 1/65536 seconds.
    pub delay: u32,
}

impl DlrrBlock {
    fn parse(data: &[u8]) -> Self {
        Self {
            ssrc: u32_from_be_bytes(&data[..4]),
            last_rr: u32_from_be_bytes(&data[4..8]),
            delay: u32_from_be_bytes(&data[8..12]),
        }
    }
}

impl<'r, 'a> Packet<'r, 'a> {
    /// The `nth` sub-block of the current DLRR report block.
    ///
    /// # Panics
    ///
    /// Panics if the current block is of another type.
    pub fn xr_dlrr_block(&self, nth: usize) -> Option<DlrrBlock> {
        let block = self.xr_block(&[XrBlockType::Dlrr])?;
        let block_len = u16_from_be_bytes(&block[2..]) as usize;
        if nth.checked_mul(3)? >= block_len {
            return None;
        }
        let offset = nth.checked_mul(12)?.checked_add(4)?;
        block.get(offset..offset + 12).map(DlrrBlock::parse)
    }
}
