// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    packet::Packet,
    utils::{u16_from_be_bytes, u32_from_be_bytes},
};

use super::XrBlockType;

/// Length in words of a Statistics Summary report block.
const SUMMARY_BLOCK_LEN: u16 = 9;

const LOSS_REPORT_FLAG: u8 = 0x80;
const DUPLICATE_REPORT_FLAG: u8 = 0x40;
const JITTER_REPORT_FLAG: u8 = 0x20;

/// The reported sequence number range of a Statistics Summary report block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryInfo {
    /// The SSRC of the media being reported on.
    pub ssrc: u32,
    /// First sequence number of the reported range, inclusive.
    pub begin_seq: u16,
    /// Last sequence number of the reported range, exclusive.
    pub end_seq: u16,
}

/// Lost and duplicate packet counts.  Counts that are not reported are 0.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SummaryPackets {
    /// Number of packets lost in the reported range.
    pub lost_packets: u32,
    /// Number of duplicated packets in the reported range.
    pub dup_packets: u32,
}

/// Jitter statistics.  All values are 0 when jitter is not reported.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SummaryJitter {
    /// Minimum relative transit time, in timestamp units.
    pub min: u32,
    /// Maximum relative transit time, in timestamp units.
    pub max: u32,
    /// Mean relative transit time, in timestamp units.
    pub mean: u32,
    /// Standard deviation of the relative transit time, in timestamp units.
    pub dev: u32,
}

/// What the TTL statistics of a Statistics Summary report block contain.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TtlOrHopLimit {
    /// No TTL or hop limit values are reported.
    #[default]
    Missing,
    /// IPv4 TTL values.
    Ipv4,
    /// IPv6 hop limit values.
    Ipv6,
}

/// TTL or hop limit statistics.  All values are 0 when [`TtlOrHopLimit::Missing`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SummaryTtl {
    /// Whether the values are TTLs or hop limits.
    pub kind: TtlOrHopLimit,
    /// Minimum TTL or hop limit.
    pub min: u8,
    /// Maximum TTL or hop limit.
    pub max: u8,
    /// Mean TTL or hop limit.
    pub mean: u8,
    /// Standard deviation of the TTL or hop limit.
    pub dev: u8,
}

impl<'r, 'a> Packet<'r, 'a> {
    fn xr_summary_block(&self) -> Option<&[u8]> {
        let block = self.xr_block(&[XrBlockType::Ssumm])?;
        if u16_from_be_bytes(&block[2..]) != SUMMARY_BLOCK_LEN {
            return None;
        }
        Some(block)
    }

    /// The reported range of the current Statistics Summary report block.
    ///
    /// # Panics
    ///
    /// Panics if the current block is of another type.
    pub fn xr_summary_info(&self) -> Option<SummaryInfo> {
        let block = self.xr_summary_block()?;
        Some(SummaryInfo {
            ssrc: u32_from_be_bytes(&block[4..]),
            begin_seq: u16_from_be_bytes(&block[8..]),
            end_seq: u16_from_be_bytes(&block[10..]),
        })
    }

    /// The lost and duplicate packet counts of the current Statistics Summary report block.
    ///
    /// # Panics
    ///
    /// Panics if the current block is of another type.
    pub fn xr_summary_packets(&self) -> Option<SummaryPackets> {
        let block = self.xr_summary_block()?;
        let flags = block[1];

        let mut packets = SummaryPackets::default();
        if flags & LOSS_REPORT_FLAG != 0 {
            packets.lost_packets = u32_from_be_bytes(&block[12..]);
        }
        if flags & DUPLICATE_REPORT_FLAG != 0 {
            packets.dup_packets = u32_from_be_bytes(&block[16..]);
        }
        Some(packets)
    }

    /// The jitter statistics of the current Statistics Summary report block.
    ///
    /// # Panics
    ///
    /// Panics if the current block is of another type.
    pub fn xr_summary_jitter(&self) -> Option<SummaryJitter> {
        let block = self.xr_summary_block()?;
        if block[1] & JITTER_REPORT_FLAG == 0 {
            return Some(SummaryJitter::default());
        }

        Some(SummaryJitter {
            min: u32_from_be_bytes(&block[20..]),
            max: u32_from_be_bytes(&block[24..]),
            mean: u32_from_be_bytes(&block[28..]),
            dev: u32_from_be_bytes(&block[32..]),
        })
    }

    /// The TTL or hop limit statistics of the current Statistics Summary report block.
    ///
    /// Returns `None` if the block uses the reserved TTL/hop limit indicator.
    ///
    /// # Panics
    ///
    /// Panics if the current block is of another type.
    pub fn xr_summary_ttl(&self) -> Option<SummaryTtl> {
        let block = self.xr_summary_block()?;
        let kind = match (block[1] & 0x18) >> 3 {
            0 => return Some(SummaryTtl::default()),
            1 => TtlOrHopLimit::Ipv4,
            2 => TtlOrHopLimit::Ipv6,
            _ => return None,
        };

        Some(SummaryTtl {
            kind,
            min: block[36],
            max: block[37],
            mean: block[38],
            dev: block[39],
        })
    }
}
