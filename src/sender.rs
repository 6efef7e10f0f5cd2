// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    packet::{Packet, PacketType},
    utils::{u32_from_be_bytes, u64_from_be_bytes, write_u32_be, write_u64_be},
};

/// The sender information section of a SR packet.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SenderInfo {
    /// SSRC of the sender.
    pub ssrc: u32,
    /// 64 bit NTP timestamp.
    pub ntp_timestamp: u64,
    /// RTP timestamp corresponding to the NTP timestamp.
    pub rtp_timestamp: u32,
    /// Number of RTP packets sent.
    pub packet_count: u32,
    /// Number of RTP payload octets sent.
    pub octet_count: u32,
}

impl SenderInfo {
    pub(crate) const SIZE: usize = 24;

    fn parse(data: &[u8]) -> Self {
        Self {
            ssrc: u32_from_be_bytes(&data[0..4]),
            ntp_timestamp: u64_from_be_bytes(&data[4..12]),
            rtp_timestamp: u32_from_be_bytes(&data[12..16]),
            packet_count: u32_from_be_bytes(&data[16..20]),
            octet_count: u32_from_be_bytes(&data[20..24]),
        }
    }

    fn write_into(&self, buf: &mut [u8]) {
        write_u32_be(&mut buf[0..4], self.ssrc);
        write_u64_be(&mut buf[4..12], self.ntp_timestamp);
        write_u32_be(&mut buf[12..16], self.rtp_timestamp);
        write_u32_be(&mut buf[16..20], self.packet_count);
        write_u32_be(&mut buf[20..24], self.octet_count);
    }
}

impl<'r, 'a> Packet<'r, 'a> {
    /// The sender information of a SR packet.
    pub fn sr_sender_info(&self) -> SenderInfo {
        self.assert_type(&[PacketType::Sr]);
        SenderInfo::parse(&self.data()[4..4 + SenderInfo::SIZE])
    }

    /// Overwrite the sender information of a SR packet.
    pub fn sr_set_sender_info(&mut self, info: &SenderInfo) {
        self.assert_type(&[PacketType::Sr]);
        self.assert_writable();
        let offset = self.offset() + 4;
        info.write_into(&mut self.storage_mut()[offset..offset + SenderInfo::SIZE]);
    }
}
