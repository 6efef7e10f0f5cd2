// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    packet::Packet,
    utils::{u16_from_be_bytes, u32_from_be_bytes},
};

use super::XrBlockType;

/// The fixed fields of a Loss RLE or Duplicate RLE report block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RleInfo {
    /// The SSRC of the media being reported on.
    pub ssrc: u32,
    /// Every 2^thinning sequence number is reported.
    pub thinning: u8,
    /// First sequence number of the reported range, inclusive.
    pub begin_seq: u16,
    /// Last sequence number of the reported range, exclusive.
    pub end_seq: u16,
    /// Number of 16 bit chunks in the block, including a trailing null chunk.
    pub chunk_count: u32,
}

/// A decoded 16 bit chunk of a Loss RLE or Duplicate RLE report block.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RleChunk {
    /// A run of reported sequence numbers.  Holds the 14 bit run length.
    RunLength(u16),
    /// A run of sequence numbers that are not reported.  Holds the 14 bit run length.
    SkipLength(u16),
    /// 15 sequence numbers, the most significant of the 15 bits being the first.
    BitVector(u16),
    /// Terminates the chunk list.
    Null,
}

const BIT_VECTOR_FLAG: u16 = 0x8000;
const RUN_OF_ONES_FLAG: u16 = 0x4000;
const RUN_LENGTH_MASK: u16 = 0x3fff;
const BIT_VECTOR_LEN: u16 = 15;

impl From<u16> for RleChunk {
    fn from(value: u16) -> Self {
        match value {
            0 => Self::Null,
            v if v & BIT_VECTOR_FLAG != 0 => Self::BitVector(v & !BIT_VECTOR_FLAG),
            v if v & RUN_OF_ONES_FLAG != 0 => Self::RunLength(v & RUN_LENGTH_MASK),
            v => Self::SkipLength(v & RUN_LENGTH_MASK),
        }
    }
}

impl From<RleChunk> for u16 {
    fn from(chunk: RleChunk) -> u16 {
        match chunk {
            RleChunk::Null => 0,
            RleChunk::RunLength(len) => RUN_OF_ONES_FLAG | (len & RUN_LENGTH_MASK),
            RleChunk::SkipLength(len) => len & RUN_LENGTH_MASK,
            RleChunk::BitVector(bits) => BIT_VECTOR_FLAG | bits,
        }
    }
}

impl RleChunk {
    /// Number of sequence numbers covered by this chunk.
    pub fn length(&self) -> usize {
        match *self {
            Self::Null => 0,
            Self::BitVector(_) => BIT_VECTOR_LEN as usize,
            Self::RunLength(len) | Self::SkipLength(len) => (len & RUN_LENGTH_MASK) as usize,
        }
    }

    /// Offsets, relative to the start of the chunk, of the sequence numbers that are set.
    pub fn iter(&self) -> impl Iterator<Item = u16> {
        let chunk = *self;
        let mut from = 0;
        std::iter::from_fn(move || {
            let offset = chunk.next_set(from)?;
            from = offset + 1;
            Some(offset)
        })
    }

    /// The first offset at or after `from` whose sequence number is set.
    fn next_set(&self, from: u16) -> Option<u16> {
        match *self {
            Self::Null | Self::SkipLength(_) => None,
            Self::RunLength(len) => (from < len & RUN_LENGTH_MASK).then_some(from),
            Self::BitVector(bits) => {
                (from..BIT_VECTOR_LEN).find(|offset| bits & (0x4000 >> offset) != 0)
            }
        }
    }
}

/// The sequence numbers set in a Loss RLE or Duplicate RLE report block, in chunk order.
///
/// Thinning is applied, so with a thinning of `t` consecutive positions are `2^t` sequence
/// numbers apart.  Iteration stops at the end of the reported range or at a null chunk.
#[derive(Debug, Clone)]
pub struct RleSequences<'p> {
    chunks: &'p [u8],
    chunk: RleChunk,
    chunk_start: u32,
    from: u16,
    begin_seq: u16,
    thinning: u8,
    positions: u32,
}

impl<'p> RleSequences<'p> {
    fn new(info: &RleInfo, chunks: &'p [u8]) -> Self {
        let span = info.end_seq.wrapping_sub(info.begin_seq) as u32;
        let step = 1u32 << info.thinning;
        Self {
            chunks,
            chunk: RleChunk::Null,
            chunk_start: 0,
            from: 0,
            begin_seq: info.begin_seq,
            thinning: info.thinning,
            positions: (span + step - 1) >> info.thinning,
        }
    }

    fn stop(&mut self) -> Option<u16> {
        self.chunks = &[];
        self.chunk = RleChunk::Null;
        None
    }
}

impl Iterator for RleSequences<'_> {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        loop {
            if let Some(offset) = self.chunk.next_set(self.from) {
                self.from = offset + 1;
                let position = self.chunk_start + offset as u32;
                if position >= self.positions {
                    return self.stop();
                }
                return Some(
                    self.begin_seq
                        .wrapping_add((position << self.thinning) as u16),
                );
            }

            self.chunk_start += self.chunk.length() as u32;
            if self.chunks.len() < 2 || self.chunk_start >= self.positions {
                return self.stop();
            }
            self.chunk = RleChunk::from(u16_from_be_bytes(self.chunks));
            self.chunks = &self.chunks[2..];
            self.from = 0;
            if self.chunk == RleChunk::Null {
                return self.stop();
            }
        }
    }
}

const RLE_TYPES: [XrBlockType; 2] = [XrBlockType::Lrle, XrBlockType::Drle];

impl<'r, 'a> Packet<'r, 'a> {
    /// The fixed fields of the current Loss RLE or Duplicate RLE report block.
    ///
    /// # Panics
    ///
    /// Panics if the current block is of another type.
    pub fn xr_rle_info(&self) -> Option<RleInfo> {
        let block = self.xr_block(&RLE_TYPES)?;
        let block_len = u16_from_be_bytes(&block[2..]) as u32;
        if block_len < 3 {
            return None;
        }

        Some(RleInfo {
            ssrc: u32_from_be_bytes(&block[4..]),
            thinning: block[1] & 0x0f,
            begin_seq: u16_from_be_bytes(&block[8..]),
            end_seq: u16_from_be_bytes(&block[10..]),
            chunk_count: (block_len - 2) * 2,
        })
    }

    /// The raw `nth` chunk of the current Loss RLE or Duplicate RLE report block.  Decode it
    /// with [`RleChunk::from`].
    ///
    /// # Panics
    ///
    /// Panics if the current block is of another type.
    pub fn xr_rle_nth_chunk(&self, nth: u32) -> Option<u16> {
        let info = self.xr_rle_info()?;
        if nth >= info.chunk_count {
            return None;
        }
        let block = self.xr_block(&RLE_TYPES)?;
        let offset = 12 + nth as usize * 2;
        Some(u16_from_be_bytes(&block[offset..]))
    }

    /// The sequence numbers reported in the current Loss RLE or Duplicate RLE report block.
    ///
    /// # Panics
    ///
    /// Panics if the current block is of another type.
    pub fn xr_rle_seqnums(&self) -> Option<RleSequences<'_>> {
        let info = self.xr_rle_info()?;
        let block = self.xr_block(&RLE_TYPES)?;
        Some(RleSequences::new(&info, &block[12..]))
    }
}
