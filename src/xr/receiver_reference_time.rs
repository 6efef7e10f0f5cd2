// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    packet::Packet,
    utils::{u16_from_be_bytes, u64_from_be_bytes},
};

use super::XrBlockType;

impl<'r, 'a> Packet<'r, 'a> {
    /// The NTP timestamp of the current Receiver Reference Time report block.
    ///
    /// # Panics
    ///
    /// Panics if the current block is of another type.
    pub fn xr_rrt(&self) -> Option<u64> {
        let block = self.xr_block(&[XrBlockType::Rrt])?;
        if u16_from_be_bytes(&block[2..]) != 2 {
            return None;
        }
        Some(u64_from_be_bytes(&block[4..]))
    }
}
