// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    packet::{Packet, PacketType},
    utils::{pad_to_4bytes, write_u32_be},
    RtcpWriteError, MAX_BYE_SSRC_COUNT,
};

const MAX_REASON_LEN: u8 = 0xff;

impl<'r, 'a> Packet<'r, 'a> {
    /// The number of sources in a BYE packet.
    pub fn bye_ssrc_count(&self) -> u8 {
        self.assert_type(&[PacketType::Bye]);
        self.count()
    }

    /// The `nth` source of a BYE packet.
    pub fn bye_nth_ssrc(&self, nth: u8) -> Option<u32> {
        self.assert_type(&[PacketType::Bye]);
        if nth >= self.count() {
            return None;
        }
        let word = 1 + nth as usize;
        if word > self.length() as usize {
            return None;
        }
        Some(self.read_u32(word * 4))
    }

    /// Append a source to a BYE packet.
    ///
    /// Returns an error if:
    ///
    /// * The packet already contains [`MAX_BYE_SSRC_COUNT`] sources.
    /// * The packet already contains a reason.
    /// * The packet is not the last packet in the buffer.
    /// * There is not enough capacity left in the buffer.
    pub fn bye_add_ssrc(&mut self, ssrc: u32) -> Result<(), RtcpWriteError> {
        self.assert_type(&[PacketType::Bye]);
        self.assert_writable();

        let count = self.count();
        if count >= MAX_BYE_SSRC_COUNT {
            log::trace!("BYE source count {count} exceeds {MAX_BYE_SSRC_COUNT}");
            return Err(RtcpWriteError::TooManySources {
                max: MAX_BYE_SSRC_COUNT,
            });
        }
        if self.length() as usize != count as usize {
            return Err(RtcpWriteError::ByeReasonPresent);
        }
        self.ensure_last()?;

        let offset = self.end();
        let end = offset + 4;
        if end > self.maxsize() {
            log::trace!("no space for BYE source, {end} > {}", self.maxsize());
            return Err(RtcpWriteError::OutputTooSmall(end));
        }

        write_u32_be(&mut self.storage_mut()[offset..end], ssrc);
        let length = self.length() + 1;
        self.set_count(count + 1);
        self.set_length(length);
        self.set_buffer_size(end);

        Ok(())
    }

    /// Append several sources to a BYE packet, stopping at the first failure.
    pub fn bye_add_ssrcs(&mut self, ssrcs: &[u32]) -> Result<(), RtcpWriteError> {
        for ssrc in ssrcs {
            self.bye_add_ssrc(*ssrc)?;
        }
        Ok(())
    }

    /// Byte offset in the packet of the reason length field.
    fn bye_reason_offset(&self) -> Option<usize> {
        let word = 1 + self.count() as usize;
        if word > self.length() as usize {
            return None;
        }
        Some(word * 4)
    }

    /// The length of the reason of a BYE packet, 0 if there is none.
    pub fn bye_reason_len(&self) -> u8 {
        self.assert_type(&[PacketType::Bye]);
        self.bye_reason_offset()
            .map(|offset| self.data()[offset])
            .unwrap_or(0)
    }

    /// The raw reason of a BYE packet.
    pub fn bye_reason(&self) -> Option<&[u8]> {
        self.assert_type(&[PacketType::Bye]);
        let offset = self.bye_reason_offset()?;
        let data = self.data();
        let len = data[offset] as usize;
        if len == 0 {
            return None;
        }
        data.get(offset + 1..offset + 1 + len)
    }

    /// The reason of a BYE packet as a `String`.
    pub fn bye_reason_string(&self) -> Option<Result<String, std::string::FromUtf8Error>> {
        self.bye_reason().map(|r| String::from_utf8(r.into()))
    }

    /// Set the reason of a BYE packet.  Setting an empty reason does nothing.
    ///
    /// Returns an error if:
    ///
    /// * The reason is longer than 255 bytes.
    /// * The packet already contains a reason.
    /// * The packet is not the last packet in the buffer.
    /// * There is not enough capacity left in the buffer.
    pub fn bye_set_reason(&mut self, reason: impl AsRef<[u8]>) -> Result<(), RtcpWriteError> {
        self.assert_type(&[PacketType::Bye]);
        self.assert_writable();

        let reason = reason.as_ref();
        if reason.is_empty() {
            return Ok(());
        }
        if reason.len() > MAX_REASON_LEN as usize {
            return Err(RtcpWriteError::ReasonLenTooLarge {
                len: reason.len(),
                max: MAX_REASON_LEN,
            });
        }
        if self.length() as usize != self.count() as usize {
            return Err(RtcpWriteError::ByeReasonPresent);
        }
        self.ensure_last()?;

        // length byte and reason, 32bit packet alignment
        let padded = pad_to_4bytes(reason.len() + 1);
        let offset = self.end();
        let end = offset + padded;
        if end > self.maxsize() {
            log::trace!("no space for BYE reason, {end} > {}", self.maxsize());
            return Err(RtcpWriteError::OutputTooSmall(end));
        }

        let storage = self.storage_mut();
        storage[offset] = reason.len() as u8;
        storage[offset + 1..offset + 1 + reason.len()].copy_from_slice(reason);
        storage[offset + 1 + reason.len()..end].fill(0);

        let length = self.length() + (padded / 4) as u16;
        self.set_length(length);
        self.set_buffer_size(end);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Buffer, PacketType, RtcpBuffer, RtcpWriteError, MAX_BYE_SSRC_COUNT};

    #[test]
    fn parse_empty_bye() {
        let data = [0x80, 0xcb, 0x00, 0x00];
        let buffer = Buffer::from_slice(&data);
        let mut rtcp = RtcpBuffer::map_readable(&buffer);
        let packet = rtcp.first_packet().unwrap();
        assert_eq!(packet.bye_ssrc_count(), 0);
        assert_eq!(packet.bye_nth_ssrc(0), None);
        assert_eq!(packet.bye_reason_len(), 0);
        assert_eq!(packet.bye_reason(), None);
    }

    #[test]
    fn parse_bye_with_reason() {
        let data = [
            0x82, 0xcb, 0x00, 0x04, 0x12, 0x34, 0x56, 0x78, 0x34, 0x56, 0x78, 0x9a, 0x07, 0x62,
            0x79, 0x65, 0x20, 0x62, 0x79, 0x65, 0x00, 0x00, 0x00, 0x00,
        ];
        let buffer = Buffer::from_slice(&data[..20]);
        let mut rtcp = RtcpBuffer::map_readable(&buffer);
        let packet = rtcp.first_packet().unwrap();
        assert_eq!(packet.bye_ssrc_count(), 2);
        assert_eq!(packet.bye_nth_ssrc(0), Some(0x12345678));
        assert_eq!(packet.bye_nth_ssrc(1), Some(0x3456789a));
        assert_eq!(packet.bye_nth_ssrc(2), None);
        assert_eq!(packet.bye_reason_len(), 7);
        assert_eq!(packet.bye_reason(), Some(b"bye bye".as_ref()));
        assert_eq!(
            packet.bye_reason_string(),
            Some(Ok(String::from("bye bye")))
        );
    }

    #[test]
    fn parse_bye_truncated_reason() {
        // reason length exceeds the packet
        let data = [0x80, 0xcb, 0x00, 0x01, 0x08, 0x62, 0x79, 0x65];
        let buffer = Buffer::from_slice(&data);
        let mut rtcp = RtcpBuffer::map_readable(&buffer);
        let packet = rtcp.first_packet().unwrap();
        assert_eq!(packet.bye_reason_len(), 8);
        assert_eq!(packet.bye_reason(), None);
    }

    #[test]
    fn build_bye() {
        let mut buffer = Buffer::new(1400);
        {
            let mut rtcp = RtcpBuffer::map_writable(&mut buffer);
            let mut packet = rtcp.add_packet(PacketType::Bye).unwrap();
            packet.bye_add_ssrcs(&[0x12345678, 0x3456789a]).unwrap();
            packet.bye_set_reason("").unwrap();
            assert_eq!(packet.length(), 2);
            packet.bye_set_reason("bye bye").unwrap();
            assert_eq!(packet.length(), 4);
            assert_eq!(
                packet.bye_set_reason("again"),
                Err(RtcpWriteError::ByeReasonPresent)
            );
            assert_eq!(
                packet.bye_add_ssrc(1),
                Err(RtcpWriteError::ByeReasonPresent)
            );
        }
        assert_eq!(
            buffer.as_slice(),
            &[
                0x82, 0xcb, 0x00, 0x04, 0x12, 0x34, 0x56, 0x78, 0x34, 0x56, 0x78, 0x9a, 0x07, 0x62,
                0x79, 0x65, 0x20, 0x62, 0x79, 0x65,
            ]
        );
    }

    #[test]
    fn reason_padding() {
        let mut buffer = Buffer::new(1400);
        let mut rtcp = RtcpBuffer::map_writable(&mut buffer);
        let mut packet = rtcp.add_packet(PacketType::Bye).unwrap();
        packet.bye_set_reason([0x30; 3]).unwrap();
        assert_eq!(packet.length(), 1);
        packet.remove();

        let mut packet = rtcp.add_packet(PacketType::Bye).unwrap();
        packet.bye_set_reason([0x30; 4]).unwrap();
        assert_eq!(packet.length(), 2);
        assert_eq!(packet.bye_reason(), Some([0x30; 4].as_ref()));
        assert_eq!(&packet.data()[5..], &[0x30, 0x30, 0x30, 0x30, 0, 0, 0]);
    }

    #[test]
    fn reason_too_large() {
        let mut buffer = Buffer::new(1400);
        let mut rtcp = RtcpBuffer::map_writable(&mut buffer);
        let mut packet = rtcp.add_packet(PacketType::Bye).unwrap();
        assert_eq!(
            packet.bye_set_reason([0x30; 256]),
            Err(RtcpWriteError::ReasonLenTooLarge { len: 256, max: 255 })
        );
        packet.bye_set_reason([0x30; 255]).unwrap();
        assert_eq!(packet.length(), 64);
    }

    #[test]
    fn too_many_sources() {
        let mut buffer = Buffer::new(1400);
        let mut rtcp = RtcpBuffer::map_writable(&mut buffer);
        let mut packet = rtcp.add_packet(PacketType::Bye).unwrap();
        let ssrcs = (0..MAX_BYE_SSRC_COUNT as u32 + 1).collect::<Vec<_>>();
        assert_eq!(
            packet.bye_add_ssrcs(&ssrcs),
            Err(RtcpWriteError::TooManySources { max: 31 })
        );
        assert_eq!(packet.bye_ssrc_count(), MAX_BYE_SSRC_COUNT);
        assert_eq!(packet.bye_nth_ssrc(30), Some(30));
    }
}
