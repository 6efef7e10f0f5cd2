// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    utils::{u32_from_be_bytes, write_u32_be},
    RtcpParseError,
};

/// A reception report block as found in SR and RR packets.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReportBlock {
    /// The SSRC of the reported source.
    pub ssrc: u32,
    /// Fraction of packets lost since the previous report, in units of 1/256.
    pub fraction_lost: u8,
    /// Cumulative number of packets lost.  24 bits, signed.
    pub packets_lost: i32,
    /// Extended highest sequence number received.
    pub exthighestseq: u32,
    /// Interarrival jitter in RTP timestamp units.
    pub jitter: u32,
    /// Middle 32 bits of the NTP timestamp of the last received SR.
    pub lsr: u32,
    /// Delay since the last SR, in units of 1/65536 seconds.
    pub dlsr: u32,
}

impl ReportBlock {
    /// Size in bytes of an encoded report block.
    pub const EXPECTED_SIZE: usize = 24;

    /// Parse a report block from exactly [`ReportBlock::EXPECTED_SIZE`] bytes.
    pub fn parse(data: &[u8]) -> Result<Self, RtcpParseError> {
        if data.len() < Self::EXPECTED_SIZE {
            return Err(RtcpParseError::Truncated {
                expected: Self::EXPECTED_SIZE,
                actual: data.len(),
            });
        }
        if data.len() > Self::EXPECTED_SIZE {
            return Err(RtcpParseError::TooLarge {
                expected: Self::EXPECTED_SIZE,
                actual: data.len(),
            });
        }

        let lost = u32_from_be_bytes(&data[4..8]);
        // sign extend the 24 bit cumulative loss
        let packets_lost = if lost & 0x0080_0000 != 0 {
            (lost | 0xff00_0000) as i32
        } else {
            (lost & 0x00ff_ffff) as i32
        };

        Ok(Self {
            ssrc: u32_from_be_bytes(&data[0..4]),
            fraction_lost: data[4],
            packets_lost,
            exthighestseq: u32_from_be_bytes(&data[8..12]),
            jitter: u32_from_be_bytes(&data[12..16]),
            lsr: u32_from_be_bytes(&data[16..20]),
            dlsr: u32_from_be_bytes(&data[20..24]),
        })
    }

    /// Write the report block into the first [`ReportBlock::EXPECTED_SIZE`] bytes of `buf`.
    /// `packets_lost` is truncated to 24 bits.
    #[track_caller]
    pub fn write_into(&self, buf: &mut [u8]) {
        let buf = &mut buf[..Self::EXPECTED_SIZE];
        write_u32_be(&mut buf[0..4], self.ssrc);
        write_u32_be(
            &mut buf[4..8],
            (self.packets_lost as u32 & 0x00ff_ffff) | (self.fraction_lost as u32) << 24,
        );
        write_u32_be(&mut buf[8..12], self.exthighestseq);
        write_u32_be(&mut buf[12..16], self.jitter);
        write_u32_be(&mut buf[16..20], self.lsr);
        write_u32_be(&mut buf[20..24], self.dlsr);
    }
}
