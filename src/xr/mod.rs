// SPDX-License-Identifier: MIT OR Apache-2.0

//! Extended Report (XR) packets as specified in RFC 3611.
//!
//! An XR packet holds a sequence of report blocks.  The packet cursor walks the blocks with
//! [`Packet::xr_first_rb`] and [`Packet::xr_next_rb`], and each block type has its own
//! decoding accessors.

use crate::{
    packet::{BodyCursor, Packet, PacketType},
    utils::{u16_from_be_bytes, write_u16_be},
    RtcpWriteError,
};

mod dlrr;
mod packet_receipt_time;
mod receiver_reference_time;
mod rle;
mod summary;
mod voip_metrics;

pub use dlrr::DlrrBlock;
pub use packet_receipt_time::PrtInfo;
pub use rle::{RleChunk, RleInfo, RleSequences};
pub use summary::{SummaryInfo, SummaryJitter, SummaryPackets, SummaryTtl, TtlOrHopLimit};
pub use voip_metrics::VoipMetrics;

/// The report block types of RFC 3611.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XrBlockType {
    /// Loss RLE Report Block
    Lrle = 1,
    /// Duplicate RLE Report Block
    Drle = 2,
    /// Packet Receipt Times Report Block
    Prt = 3,
    /// Receiver Reference Time Report Block
    Rrt = 4,
    /// DLRR Report Block
    Dlrr = 5,
    /// Statistics Summary Report Block
    Ssumm = 6,
    /// VoIP Metrics Report Block
    VoipMetrics = 7,
}

impl TryFrom<u8> for XrBlockType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => Self::Lrle,
            2 => Self::Drle,
            3 => Self::Prt,
            4 => Self::Rrt,
            5 => Self::Dlrr,
            6 => Self::Ssumm,
            7 => Self::VoipMetrics,
            _ => return Err(value),
        })
    }
}

impl From<XrBlockType> for u8 {
    fn from(value: XrBlockType) -> u8 {
        value as u8
    }
}

/// Byte offset of the current report block from the start of the packet.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct XrCursor {
    block_offset: Option<usize>,
}

/// Offset of the first report block.
const FIRST_BLOCK_OFFSET: usize = 8;

/// Whether a complete block starts at `offset` in the packet `data`.
fn block_fits(data: &[u8], offset: usize) -> bool {
    if offset + 4 > data.len() {
        return false;
    }
    let block_len = u16_from_be_bytes(&data[offset + 2..]) as usize;
    offset + (block_len + 1) * 4 <= data.len()
}

impl<'r, 'a> Packet<'r, 'a> {
    #[track_caller]
    fn xr_cursor(&self) -> XrCursor {
        self.assert_type(&[PacketType::Xr]);
        match self.body {
            BodyCursor::Xr(cursor) => cursor,
            _ => unreachable!(),
        }
    }

    fn set_xr_block_offset(&mut self, block_offset: Option<usize>) {
        self.body = BodyCursor::Xr(XrCursor { block_offset });
    }

    /// The SSRC of the sender of an XR packet.
    pub fn xr_ssrc(&self) -> u32 {
        self.assert_type(&[PacketType::Xr]);
        self.read_u32(4)
    }

    /// Set the SSRC of the sender of an XR packet.
    pub fn xr_set_ssrc(&mut self, ssrc: u32) {
        self.assert_type(&[PacketType::Xr]);
        self.write_u32(4, ssrc);
    }

    /// Move to the first report block of an XR packet.  Returns `false` if there is no
    /// complete block.
    pub fn xr_first_rb(&mut self) -> bool {
        self.assert_type(&[PacketType::Xr]);
        self.set_xr_block_offset(None);

        if self.length() < 2 || !block_fits(self.data(), FIRST_BLOCK_OFFSET) {
            return false;
        }

        self.set_xr_block_offset(Some(FIRST_BLOCK_OFFSET));
        true
    }

    /// Move to the next report block of an XR packet.  Returns `false` if there is no next
    /// complete block.
    pub fn xr_next_rb(&mut self) -> bool {
        let Some(offset) = self.xr_cursor().block_offset else {
            return false;
        };

        let data = self.data();
        let block_len = u16_from_be_bytes(&data[offset + 2..]) as usize;
        let next = offset + (block_len + 1) * 4;
        if next >= self.length() as usize * 4 || !block_fits(data, next) {
            return false;
        }

        self.set_xr_block_offset(Some(next));
        true
    }

    /// The type of the current report block, or `None` if there is no current block or its
    /// type is not known.
    pub fn xr_block_type(&self) -> Option<XrBlockType> {
        let offset = self.xr_cursor().block_offset?;
        let type_ = self.data()[offset];
        match XrBlockType::try_from(type_) {
            Ok(block_type) => Some(block_type),
            Err(type_) => {
                log::debug!("unknown XR report block type {type_}");
                None
            }
        }
    }

    /// The raw type of the current report block.
    pub fn xr_block_raw_type(&self) -> Option<u8> {
        let offset = self.xr_cursor().block_offset?;
        Some(self.data()[offset])
    }

    /// The length of the current report block in 32 bit words, excluding its header.
    pub fn xr_block_length(&self) -> u16 {
        match self.xr_cursor().block_offset {
            Some(offset) => u16_from_be_bytes(&self.data()[offset + 2..]),
            None => 0,
        }
    }

    /// The complete current report block, if it is one of `types`.
    ///
    /// # Panics
    ///
    /// Panics if the current block is not of one of `types`.
    #[track_caller]
    pub(crate) fn xr_block(&self, types: &[XrBlockType]) -> Option<&[u8]> {
        let offset = self.xr_cursor().block_offset?;
        let data = self.data();
        let type_ = data[offset];
        assert!(
            types.iter().any(|t| u8::from(*t) == type_),
            "XR block type {type_} is not one of {types:?}"
        );
        let block_len = u16_from_be_bytes(&data[offset + 2..]) as usize;
        data.get(offset..offset + (block_len + 1) * 4)
    }

    /// Append a report block to an XR packet.  The length of `body` must be a multiple of 4.
    ///
    /// Returns an error if:
    ///
    /// * The body length is not a multiple of 4.
    /// * The packet is not the last packet in the buffer.
    /// * There is not enough capacity left in the buffer.
    pub fn xr_add_block(
        &mut self,
        block_type: impl Into<u8>,
        type_specific: u8,
        body: &[u8],
    ) -> Result<(), RtcpWriteError> {
        self.assert_type(&[PacketType::Xr]);
        self.assert_writable();

        if body.len() % 4 != 0 {
            return Err(RtcpWriteError::DataLen32bitMultiple(body.len()));
        }
        self.ensure_last()?;

        let offset = self.end();
        let end = offset + 4 + body.len();
        let length = self.length() as usize + 1 + body.len() / 4;
        if end > self.maxsize() || length > u16::MAX as usize {
            log::trace!("no space for XR block, {end} > {}", self.maxsize());
            return Err(RtcpWriteError::OutputTooSmall(end));
        }

        let storage = self.storage_mut();
        storage[offset] = block_type.into();
        storage[offset + 1] = type_specific;
        write_u16_be(&mut storage[offset + 2..], (body.len() / 4) as u16);
        storage[offset + 4..end].copy_from_slice(body);

        self.set_length(length as u16);
        self.set_buffer_size(end);

        Ok(())
    }
}
