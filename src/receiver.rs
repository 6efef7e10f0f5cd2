// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    packet::{Packet, PacketType},
    report_block::ReportBlock,
    RtcpWriteError, MAX_RB_COUNT,
};

impl<'r, 'a> Packet<'r, 'a> {
    /// The SSRC of the sender of a RR packet.
    pub fn rr_ssrc(&self) -> u32 {
        self.assert_type(&[PacketType::Rr]);
        self.read_u32(4)
    }

    /// Set the SSRC of the sender of a RR packet.
    pub fn rr_set_ssrc(&mut self, ssrc: u32) {
        self.assert_type(&[PacketType::Rr]);
        self.write_u32(4, ssrc);
    }

    /// Word offset of the first report block.
    fn rb_base_words(&self) -> usize {
        match self.packet_type() {
            Some(PacketType::Sr) => 7,
            _ => 2,
        }
    }

    /// The number of report blocks in a SR or RR packet.
    pub fn rb_count(&self) -> u8 {
        self.assert_type(&[PacketType::Sr, PacketType::Rr]);
        self.count()
    }

    fn rb_offset(&self, nth: u8) -> Option<usize> {
        if nth >= self.count() {
            return None;
        }
        let words = self.rb_base_words() + nth as usize * 6;
        if words + 6 > self.length() as usize + 1 {
            return None;
        }
        let offset = self.offset() + words * 4;
        if offset + ReportBlock::EXPECTED_SIZE > self.buffer_size() {
            return None;
        }
        Some(offset)
    }

    /// The `nth` report block of a SR or RR packet, or `None` if it does not exist or does
    /// not fit in the packet.
    pub fn rb(&self, nth: u8) -> Option<ReportBlock> {
        self.assert_type(&[PacketType::Sr, PacketType::Rr]);
        let offset = self.rb_offset(nth)?;
        ReportBlock::parse(&self.storage()[offset..offset + ReportBlock::EXPECTED_SIZE]).ok()
    }

    /// Append a report block to a SR or RR packet.
    ///
    /// Returns an error if:
    ///
    /// * The packet already contains profile specific extension data.
    /// * The packet already contains [`MAX_RB_COUNT`] report blocks.
    /// * The packet is not the last packet in the buffer.
    /// * There is not enough capacity left in the buffer.
    pub fn add_rb(&mut self, rb: &ReportBlock) -> Result<(), RtcpWriteError> {
        self.assert_type(&[PacketType::Sr, PacketType::Rr]);
        self.assert_writable();

        if self.profile_specific_ext_length() != 0 {
            return Err(RtcpWriteError::ProfileSpecificExtensionPresent);
        }
        let count = self.count();
        if count >= MAX_RB_COUNT {
            log::trace!("report block count {count} exceeds {MAX_RB_COUNT}");
            return Err(RtcpWriteError::TooManyReportBlocks { max: MAX_RB_COUNT });
        }
        self.ensure_last()?;

        let offset = self.end();
        let end = offset + ReportBlock::EXPECTED_SIZE;
        if end > self.maxsize() {
            log::trace!("no space for report block, {end} > {}", self.maxsize());
            return Err(RtcpWriteError::OutputTooSmall(end));
        }

        let length = self.length() + 6;
        self.set_count(count + 1);
        self.set_length(length);
        self.set_buffer_size(end);
        rb.write_into(&mut self.storage_mut()[offset..end]);

        Ok(())
    }

    /// Replace the `nth` report block of a SR or RR packet.
    pub fn set_rb(&mut self, nth: u8, rb: &ReportBlock) -> Result<(), RtcpWriteError> {
        self.assert_type(&[PacketType::Sr, PacketType::Rr]);
        self.assert_writable();
        let offset = self.rb_offset(nth).ok_or(RtcpWriteError::NoSuchReportBlock {
            index: nth,
            count: self.count(),
        })?;
        rb.write_into(&mut self.storage_mut()[offset..offset + ReportBlock::EXPECTED_SIZE]);
        Ok(())
    }

    /// Length in 32 bit words of the profile specific extension data following the report
    /// blocks of a SR or RR packet.
    pub fn profile_specific_ext_length(&self) -> u16 {
        self.assert_type(&[PacketType::Sr, PacketType::Rr]);
        let used = self.rb_base_words() + self.count() as usize * 6;
        let total = self.length() as usize + 1;
        total.saturating_sub(used) as u16
    }

    /// The profile specific extension data of a SR or RR packet.
    pub fn profile_specific_ext(&self) -> Option<&[u8]> {
        let words = self.profile_specific_ext_length() as usize;
        if words == 0 {
            return None;
        }
        let data = self.data();
        Some(&data[data.len() - words * 4..])
    }

    /// A copy of the profile specific extension data of a SR or RR packet.
    pub fn copy_profile_specific_ext(&self) -> Option<Vec<u8>> {
        self.profile_specific_ext().map(<[u8]>::to_vec)
    }

    /// Append profile specific extension data to a SR or RR packet.  The length of `data`
    /// must be a multiple of 4.  No report blocks can be added afterwards.
    pub fn add_profile_specific_ext(&mut self, data: &[u8]) -> Result<(), RtcpWriteError> {
        self.assert_type(&[PacketType::Sr, PacketType::Rr]);
        self.assert_writable();

        if data.len() % 4 != 0 {
            return Err(RtcpWriteError::DataLen32bitMultiple(data.len()));
        }
        self.ensure_last()?;

        let offset = self.end();
        let end = offset + data.len();
        let length = self.length() as usize + data.len() / 4;
        if end > self.maxsize() || length > u16::MAX as usize {
            log::trace!("no space for extension data, {end} > {}", self.maxsize());
            return Err(RtcpWriteError::OutputTooSmall(end));
        }

        self.storage_mut()[offset..end].copy_from_slice(data);
        self.set_length(length as u16);
        self.set_buffer_size(end);

        Ok(())
    }
}
