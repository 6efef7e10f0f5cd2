// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    packet::{read_header, Header, Packet, PacketType},
    utils::u16_from_be_bytes,
    RtcpParseError, RtcpWriteError, REDUCED_SIZE_VALID_MASK, VALID_MASK, VALID_VALUE, VERSION,
};

/// An owned region of bytes with a physical capacity and a logical size.
///
/// Only the first [`Buffer::size`] bytes are meaningful.  The remaining capacity up to
/// [`Buffer::maxsize`] is used when packets are appended through a writable
/// [`RtcpBuffer`] mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Buffer {
    data: Vec<u8>,
    size: usize,
}

impl Buffer {
    /// Create an empty buffer for constructing RTCP packets of at most `mtu` bytes.
    pub fn new(mtu: usize) -> Self {
        Self {
            data: vec![0; mtu],
            size: 0,
        }
    }

    /// Create a buffer that takes ownership of `data`.  The size and the capacity are both
    /// the length of `data`.
    pub fn from_vec(data: Vec<u8>) -> Self {
        let size = data.len();
        Self { data, size }
    }

    /// Create a buffer holding a copy of `data`.
    pub fn from_slice(data: &[u8]) -> Self {
        Self::from_vec(data.to_vec())
    }

    /// The number of valid bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The capacity of the buffer.
    pub fn maxsize(&self) -> usize {
        self.data.len()
    }

    /// The valid bytes of the buffer.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.size]
    }

    /// Consume the buffer, returning the valid bytes.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.data.truncate(self.size);
        self.data
    }

    /// Check that the buffer contains a valid compound (non reduced size) RTCP packet.
    pub fn validate(&self) -> Result<(), RtcpParseError> {
        validate_data(self.as_slice())
    }

    /// Check that the buffer contains a valid RTCP packet, allowing reduced size packets as
    /// specified in RFC 5506.
    pub fn validate_reduced(&self) -> Result<(), RtcpParseError> {
        validate_data_reduced(self.as_slice())
    }
}

/// Check if `data` is a valid compound, non reduced size, RTCP packet.
///
/// The first packet must be a SR or RR without padding, every packet must be version 2,
/// the packet lengths must add up to exactly the size of `data` and only the last packet
/// may carry padding.
pub fn validate_data(data: &[u8]) -> Result<(), RtcpParseError> {
    validate_data_internal(data, VALID_MASK)
}

/// Check if `data` is a valid RTCP packet.
///
/// Same as [`validate_data`] but also accepts reduced size RTCP packets (RFC 5506) where
/// the first packet can be of any type.
pub fn validate_data_reduced(data: &[u8]) -> Result<(), RtcpParseError> {
    validate_data_internal(data, REDUCED_SIZE_VALID_MASK)
}

fn validate_data_internal(data: &[u8], valid_mask: u16) -> Result<(), RtcpParseError> {
    // we need 4 bytes for the type and length
    if data.len() < 4 {
        log::debug!("len check failed, {} bytes", data.len());
        return Err(RtcpParseError::Truncated {
            expected: 4,
            actual: data.len(),
        });
    }

    let header = u16_from_be_bytes(data);
    if header & valid_mask != VALID_VALUE & valid_mask {
        log::debug!("mask check failed ({header:04x} != {valid_mask:04x})");
        return Err(RtcpParseError::InvalidFirstHeader {
            header,
            mask: valid_mask,
        });
    }

    let mut padding = data[0] & 0x20 != 0;
    let mut offset = 0;

    loop {
        let remaining = data.len() - offset;
        let header_len = (u16_from_be_bytes(&data[offset + 2..]) as usize + 1) * 4;
        if remaining < header_len {
            log::debug!("len check failed, {header_len} > {remaining}");
            return Err(RtcpParseError::Truncated {
                expected: header_len,
                actual: remaining,
            });
        }

        offset += header_len;

        if data.len() - offset < 4 {
            break;
        }

        // nothing may follow a packet with padding
        if padding {
            break;
        }

        // version of the first packet was checked by the mask
        let version = data[offset] >> 6;
        if version != VERSION {
            log::debug!("wrong version ({version} < 2)");
            return Err(RtcpParseError::UnsupportedVersion(version));
        }

        if data[offset] & 0x20 != 0 {
            padding = true;
            // the last byte contains the number of padding bytes including itself
            let pad_bytes = data[data.len() - 1];
            if pad_bytes == 0 || pad_bytes & 0x3 != 0 {
                log::debug!("padding check failed ({pad_bytes})");
                return Err(RtcpParseError::InvalidPadding);
            }
        }
    }

    if offset != data.len() {
        log::debug!("{} leftover bytes", data.len() - offset);
        return Err(RtcpParseError::TrailingData(data.len() - offset));
    }

    Ok(())
}

#[derive(Debug)]
enum Mapping<'a> {
    Readable(&'a Buffer),
    Writable(&'a mut Buffer),
}

/// A [`Buffer`] mapped for reading or writing RTCP packets.
///
/// The logical size tracked by the mapping grows as packets are appended.  When a writable
/// mapping is unmapped (or dropped) the size of the underlying [`Buffer`] is set to the
/// final size of the compound packet.
#[derive(Debug)]
pub struct RtcpBuffer<'a> {
    mapping: Mapping<'a>,
    size: usize,
}

impl<'a> RtcpBuffer<'a> {
    /// Map `buffer` for reading.
    pub fn map_readable(buffer: &'a Buffer) -> Self {
        Self {
            size: buffer.size,
            mapping: Mapping::Readable(buffer),
        }
    }

    /// Map `buffer` for reading and writing.
    pub fn map_writable(buffer: &'a mut Buffer) -> Self {
        Self {
            size: buffer.size,
            mapping: Mapping::Writable(buffer),
        }
    }

    /// Finish using this mapping.  For a writable mapping, the size of the underlying buffer
    /// is adjusted to the total length of all the packets.
    pub fn unmap(self) {}

    /// Whether the mapping allows modifying the packets.
    pub fn is_writable(&self) -> bool {
        matches!(self.mapping, Mapping::Writable(_))
    }

    /// The current logical size of the compound packet.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The capacity available for the compound packet.
    pub fn maxsize(&self) -> usize {
        self.storage().len()
    }

    /// The bytes of the compound packet.
    pub fn data(&self) -> &[u8] {
        &self.storage()[..self.size]
    }

    /// Check the mapped bytes with [`validate_data`].
    pub fn validate(&self) -> Result<(), RtcpParseError> {
        validate_data(self.data())
    }

    /// Check the mapped bytes with [`validate_data_reduced`].
    pub fn validate_reduced(&self) -> Result<(), RtcpParseError> {
        validate_data_reduced(self.data())
    }

    /// The number of packets that can be iterated over.
    pub fn packet_count(&self) -> usize {
        let data = self.data();
        let mut count = 0;
        let mut offset = 0;
        while let Some(header) = read_header(data, offset) {
            count += 1;
            if header.padding {
                break;
            }
            offset += header.byte_len();
        }
        count
    }

    /// Position a packet cursor on the first packet.
    ///
    /// Returns `None` if there is no valid packet at the start of the buffer.
    pub fn first_packet(&mut self) -> Option<Packet<'_, 'a>> {
        Packet::first(self)
    }

    /// Append a new packet of `packet_type` after the last packet of the buffer.
    ///
    /// The packet is created with the minimum length for its type, all fields zeroed.
    ///
    /// Returns an error if:
    ///
    /// * The last packet has padding, as it has to remain the last packet.
    /// * There is not enough capacity left.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is not mapped writable.
    pub fn add_packet(&mut self, packet_type: PacketType) -> Result<Packet<'_, 'a>, RtcpWriteError> {
        assert!(self.is_writable(), "RTCP buffer is not mapped writable");

        // find free space
        let mut offset = 0;
        while let Some(header) = read_header(self.data(), offset) {
            if header.padding {
                log::trace!("not appending {packet_type:?} after a padding packet");
                return Err(RtcpWriteError::PaddingPacketPresent);
            }
            offset += header.byte_len();
        }

        let len = packet_type.min_packet_len();
        if offset + len > self.maxsize() {
            log::trace!(
                "no space for {packet_type:?}, {} > {}",
                offset + len,
                self.maxsize()
            );
            return Err(RtcpWriteError::OutputTooSmall(offset + len));
        }

        let header = Header {
            padding: false,
            count: 0,
            type_: packet_type.into(),
            length: ((len - 4) / 4) as u16,
        };
        let storage = self.storage_mut();
        header.write_into(&mut storage[offset..]);
        storage[offset + 4..offset + len].fill(0);
        self.size = offset + len;

        Ok(Packet::with_header(self, offset, header))
    }

    pub(crate) fn storage(&self) -> &[u8] {
        match &self.mapping {
            Mapping::Readable(buffer) => &buffer.data,
            Mapping::Writable(buffer) => &buffer.data,
        }
    }

    pub(crate) fn storage_mut(&mut self) -> &mut [u8] {
        match &mut self.mapping {
            Mapping::Writable(buffer) => &mut buffer.data,
            Mapping::Readable(_) => panic!("RTCP buffer is not mapped writable"),
        }
    }

    pub(crate) fn set_size(&mut self, size: usize) {
        debug_assert!(size <= self.maxsize());
        self.size = size;
    }
}

impl Drop for RtcpBuffer<'_> {
    fn drop(&mut self) {
        if let Mapping::Writable(buffer) = &mut self.mapping {
            // shrink to the constructed packets
            buffer.size = self.size;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_empty_rr() {
        let data = [0x80, 0xc9, 0x00, 0x01, 0x91, 0x82, 0x73, 0x64];
        assert_eq!(validate_data(&data), Ok(()));
        assert_eq!(validate_data_reduced(&data), Ok(()));
    }

    #[test]
    fn validate_short() {
        assert_eq!(
            validate_data(&[0x80, 0xc9, 0x00]),
            Err(RtcpParseError::Truncated {
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn validate_wrong_first_packet() {
        // BYE first
        let data = [0x80, 0xcb, 0x00, 0x00];
        assert_eq!(
            validate_data(&data),
            Err(RtcpParseError::InvalidFirstHeader {
                header: 0x80cb,
                mask: VALID_MASK
            })
        );
        // accepted as a reduced size packet
        assert_eq!(validate_data_reduced(&data), Ok(()));

        // version 1
        let data = [0x40, 0xc9, 0x00, 0x00];
        assert!(validate_data(&data).is_err());
        assert!(validate_data_reduced(&data).is_err());
    }

    #[test]
    fn validate_length_too_large() {
        let data = [0x80, 0xc9, 0x00, 0x02, 0x91, 0x82, 0x73, 0x64];
        assert_eq!(
            validate_data(&data),
            Err(RtcpParseError::Truncated {
                expected: 12,
                actual: 8
            })
        );
    }

    #[test]
    fn validate_trailing_bytes() {
        let data = [0x80, 0xc9, 0x00, 0x01, 0x91, 0x82, 0x73, 0x64, 0x00, 0x00];
        assert_eq!(validate_data(&data), Err(RtcpParseError::TrailingData(2)));
    }

    #[test]
    fn validate_second_packet_wrong_version() {
        let data = [
            0x80, 0xc9, 0x00, 0x01, 0x91, 0x82, 0x73, 0x64, 0x40, 0xcb, 0x00, 0x00,
        ];
        assert_eq!(
            validate_data(&data),
            Err(RtcpParseError::UnsupportedVersion(1))
        );
    }

    #[test]
    fn validate_padding() {
        // RR followed by a BYE with 4 bytes of padding
        let data = [
            0x80, 0xc9, 0x00, 0x01, 0x91, 0x82, 0x73, 0x64, 0xa0, 0xcb, 0x00, 0x01, 0x00, 0x00,
            0x00, 0x04,
        ];
        assert_eq!(validate_data(&data), Ok(()));

        // padding count of 0
        let mut invalid = data;
        invalid[15] = 0;
        assert_eq!(validate_data(&invalid), Err(RtcpParseError::InvalidPadding));

        // padding count not a multiple of 4
        let mut invalid = data;
        invalid[15] = 3;
        assert_eq!(validate_data(&invalid), Err(RtcpParseError::InvalidPadding));
    }

    #[test]
    fn validate_packet_after_padding() {
        let data = [
            0x80, 0xc9, 0x00, 0x01, 0x91, 0x82, 0x73, 0x64, 0xa0, 0xcb, 0x00, 0x01, 0x00, 0x00,
            0x00, 0x04, 0x80, 0xcb, 0x00, 0x00,
        ];
        assert_eq!(validate_data(&data), Err(RtcpParseError::TrailingData(4)));
    }

    #[test]
    fn buffer_constructors() {
        let buffer = Buffer::new(64);
        assert_eq!(buffer.size(), 0);
        assert_eq!(buffer.maxsize(), 64);
        assert!(buffer.as_slice().is_empty());

        let data = [0x80, 0xc9, 0x00, 0x01, 0x91, 0x82, 0x73, 0x64];
        let buffer = Buffer::from_slice(&data);
        assert_eq!(buffer.size(), 8);
        assert_eq!(buffer.maxsize(), 8);
        assert_eq!(buffer.as_slice(), &data);
        assert!(buffer.validate().is_ok());
        assert_eq!(Buffer::from_vec(data.to_vec()).into_vec(), data);
    }

    #[test]
    fn map_readable_count() {
        let data = [
            0x80, 0xc9, 0x00, 0x01, 0x91, 0x82, 0x73, 0x64, 0x80, 0xcb, 0x00, 0x00,
        ];
        let buffer = Buffer::from_slice(&data);
        let rtcp = RtcpBuffer::map_readable(&buffer);
        assert!(!rtcp.is_writable());
        assert_eq!(rtcp.packet_count(), 2);
        assert_eq!(rtcp.packet_count(), 2);
    }

    #[test]
    fn unmap_trims_to_size() {
        let mut buffer = Buffer::new(1400);
        let mut rtcp = RtcpBuffer::map_writable(&mut buffer);
        assert_eq!(rtcp.size(), 0);
        assert_eq!(rtcp.maxsize(), 1400);
        rtcp.add_packet(PacketType::Rr).unwrap();
        rtcp.add_packet(PacketType::Bye).unwrap();
        assert_eq!(rtcp.size(), 12);
        assert_eq!(rtcp.packet_count(), 2);
        rtcp.unmap();

        assert_eq!(buffer.size(), 12);
        assert_eq!(
            buffer.as_slice(),
            &[0x80, 0xc9, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x80, 0xcb, 0x00, 0x00]
        );
        assert!(buffer.validate().is_ok());
    }

    #[test]
    fn add_packet_no_space() {
        let mut buffer = Buffer::new(30);
        let mut rtcp = RtcpBuffer::map_writable(&mut buffer);
        rtcp.add_packet(PacketType::Sr).unwrap();
        assert_eq!(
            rtcp.add_packet(PacketType::Rr).unwrap_err(),
            RtcpWriteError::OutputTooSmall(36)
        );
        assert_eq!(rtcp.size(), 28);
    }

    #[test]
    fn add_packet_after_padding() {
        let mut data = vec![0x80, 0xc9, 0x00, 0x01, 0x91, 0x82, 0x73, 0x64];
        data.extend_from_slice(&[0xa0, 0xcb, 0x00, 0x01, 0x00, 0x00, 0x00, 0x04]);
        data.resize(64, 0);
        let mut buffer = Buffer::from_vec(data);
        let mut rtcp = RtcpBuffer::map_writable(&mut buffer);
        rtcp.set_size(16);
        assert_eq!(
            rtcp.add_packet(PacketType::Rr).unwrap_err(),
            RtcpWriteError::PaddingPacketPresent
        );
    }

    #[test]
    #[should_panic(expected = "not mapped writable")]
    fn add_packet_read_only() {
        let buffer = Buffer::new(64);
        let mut rtcp = RtcpBuffer::map_readable(&buffer);
        let _ = rtcp.add_packet(PacketType::Rr);
    }
}
