// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    buffer::RtcpBuffer,
    sdes::SdesCursor,
    utils::{u16_from_be_bytes, u32_from_be_bytes, write_u16_be, write_u32_be},
    xr::XrCursor,
    RtcpWriteError, VERSION,
};

/// The packet types this implementation knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketType {
    /// Sender Report (RFC 3550)
    Sr = 200,
    /// Receiver Report (RFC 3550)
    Rr = 201,
    /// Source Description (RFC 3550)
    Sdes = 202,
    /// Goodbye (RFC 3550)
    Bye = 203,
    /// Application defined (RFC 3550)
    App = 204,
    /// Transport layer feedback (RFC 4585)
    Rtpfb = 205,
    /// Payload specific feedback (RFC 4585)
    Psfb = 206,
    /// Extended Report (RFC 3611)
    Xr = 207,
}

impl PacketType {
    /// The size of a packet of this type without any optional content.
    pub const fn min_packet_len(self) -> usize {
        match self {
            PacketType::Sr => 28,
            PacketType::Rr => 8,
            PacketType::Sdes => 4,
            PacketType::Bye => 4,
            PacketType::App => 12,
            PacketType::Rtpfb => 12,
            PacketType::Psfb => 12,
            PacketType::Xr => 8,
        }
    }
}

impl TryFrom<u8> for PacketType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            200 => PacketType::Sr,
            201 => PacketType::Rr,
            202 => PacketType::Sdes,
            203 => PacketType::Bye,
            204 => PacketType::App,
            205 => PacketType::Rtpfb,
            206 => PacketType::Psfb,
            207 => PacketType::Xr,
            _ => return Err(value),
        })
    }
}

impl From<PacketType> for u8 {
    fn from(value: PacketType) -> u8 {
        value as u8
    }
}

/// The common 4 byte header of every RTCP packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Header {
    pub(crate) padding: bool,
    pub(crate) count: u8,
    pub(crate) type_: u8,
    pub(crate) length: u16,
}

impl Header {
    /// Size of the packet in bytes, including the header.
    pub(crate) fn byte_len(&self) -> usize {
        (self.length as usize + 1) * 4
    }

    pub(crate) fn write_into(&self, buf: &mut [u8]) {
        let mut first = VERSION << 6 | (self.count & 0x1f);
        if self.padding {
            first |= 0x20;
        }
        buf[0] = first;
        buf[1] = self.type_;
        write_u16_be(&mut buf[2..4], self.length);
    }
}

/// Read the packet header at `offset` in `data`.
///
/// Returns `None` if there are less than 4 bytes, the version is not 2, the packet does not
/// fit into `data` or the packet is shorter than the minimum for its type.  Unknown packet
/// types have no minimum.
pub(crate) fn read_header(data: &[u8], offset: usize) -> Option<Header> {
    let bytes = data.get(offset..offset.checked_add(4)?)?;
    if bytes[0] >> 6 != VERSION {
        return None;
    }

    let header = Header {
        padding: bytes[0] & 0x20 != 0,
        count: bytes[0] & 0x1f,
        type_: bytes[1],
        length: u16_from_be_bytes(&bytes[2..4]),
    };
    if offset + header.byte_len() > data.len() {
        return None;
    }

    let min_len = PacketType::try_from(header.type_)
        .map(PacketType::min_packet_len)
        .unwrap_or(0);
    if header.byte_len() < min_len {
        return None;
    }

    Some(header)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BodyCursor {
    None,
    Sdes(SdesCursor),
    Xr(XrCursor),
}

impl BodyCursor {
    fn for_type(type_: u8) -> Self {
        match PacketType::try_from(type_) {
            Ok(PacketType::Sdes) => BodyCursor::Sdes(SdesCursor::default()),
            Ok(PacketType::Xr) => BodyCursor::Xr(XrCursor::default()),
            _ => BodyCursor::None,
        }
    }
}

/// A cursor over the packets of a mapped [`RtcpBuffer`].
///
/// The cursor either points to a valid packet or is invalid.  Once invalid, only
/// [`Packet::is_valid`] and [`Packet::move_to_next`] may be called.
///
/// Accessors are named after the packet type they apply to (`sr_`, `rr_`, `sdes_`, `bye_`,
/// `fb_`, `app_`, `xr_`).  Calling an accessor on a packet of another type, or modifying a
/// packet from a readable mapping, panics.
#[derive(Debug)]
pub struct Packet<'r, 'a> {
    rtcp: &'r mut RtcpBuffer<'a>,
    offset: usize,
    header: Option<Header>,
    pub(crate) body: BodyCursor,
}

impl<'r, 'a> Packet<'r, 'a> {
    pub(crate) fn first(rtcp: &'r mut RtcpBuffer<'a>) -> Option<Self> {
        let mut packet = Self {
            rtcp,
            offset: 0,
            header: None,
            body: BodyCursor::None,
        };
        if packet.reload() {
            Some(packet)
        } else {
            None
        }
    }

    pub(crate) fn with_header(rtcp: &'r mut RtcpBuffer<'a>, offset: usize, header: Header) -> Self {
        Self {
            rtcp,
            offset,
            header: Some(header),
            body: BodyCursor::for_type(header.type_),
        }
    }

    fn reload(&mut self) -> bool {
        self.header = read_header(self.rtcp.data(), self.offset);
        self.body = match self.header {
            Some(header) => BodyCursor::for_type(header.type_),
            None => BodyCursor::None,
        };
        self.header.is_some()
    }

    /// Whether the cursor points to a valid packet.
    pub fn is_valid(&self) -> bool {
        self.header.is_some()
    }

    /// Move to the next packet in the buffer.
    ///
    /// Returns `false` and invalidates the cursor when there is no next valid packet.  A
    /// packet with padding is always the last one.
    pub fn move_to_next(&mut self) -> bool {
        let Some(header) = self.header else {
            return false;
        };

        if header.padding {
            self.header = None;
            self.body = BodyCursor::None;
            return false;
        }

        self.offset += header.byte_len();
        self.reload()
    }

    /// Remove the current packet from the buffer.  The following packets are moved forward
    /// and the cursor points to the packet that followed the removed one.
    ///
    /// Returns `false` if there is no packet after the removed one.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is not mapped writable or the cursor is invalid.
    pub fn remove(&mut self) -> bool {
        self.assert_writable();
        let len = self.packet_len();
        let size = self.rtcp.size();

        self.rtcp
            .storage_mut()
            .copy_within(self.offset + len..size, self.offset);
        self.rtcp.set_size(size - len);

        self.reload()
    }

    /// Byte offset of the packet in the buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The raw packet type.
    pub fn type_(&self) -> u8 {
        self.header().type_
    }

    /// The packet type if it is one of the known types.
    pub fn packet_type(&self) -> Option<PacketType> {
        PacketType::try_from(self.type_()).ok()
    }

    /// Whether the padding bit is set.
    pub fn padding(&self) -> bool {
        self.header().padding
    }

    /// The 5 bit count field.  Its meaning depends on the packet type.
    pub fn count(&self) -> u8 {
        self.header().count
    }

    /// The length of the packet in 32 bit words minus one.
    pub fn length(&self) -> u16 {
        self.header().length
    }

    /// All the bytes of the packet, including the header.
    pub fn data(&self) -> &[u8] {
        &self.rtcp.data()[self.offset..self.end()]
    }

    #[track_caller]
    pub(crate) fn header(&self) -> &Header {
        self.header
            .as_ref()
            .expect("packet cursor does not point to a valid packet")
    }

    #[track_caller]
    pub(crate) fn assert_type(&self, types: &[PacketType]) {
        let type_ = self.type_();
        assert!(
            types.iter().any(|t| u8::from(*t) == type_),
            "packet type {type_} is not one of {types:?}"
        );
    }

    #[track_caller]
    pub(crate) fn assert_writable(&self) {
        assert!(self.rtcp.is_writable(), "RTCP buffer is not mapped writable");
    }

    /// Size of the packet in bytes.
    pub(crate) fn packet_len(&self) -> usize {
        self.header().byte_len()
    }

    /// Byte offset in the buffer directly after this packet.
    pub(crate) fn end(&self) -> usize {
        self.offset + self.packet_len()
    }

    pub(crate) fn buffer_size(&self) -> usize {
        self.rtcp.size()
    }

    pub(crate) fn maxsize(&self) -> usize {
        self.rtcp.maxsize()
    }

    pub(crate) fn set_buffer_size(&mut self, size: usize) {
        self.rtcp.set_size(size);
    }

    /// The whole backing storage of the buffer, up to the capacity.
    pub(crate) fn storage(&self) -> &[u8] {
        self.rtcp.storage()
    }

    pub(crate) fn storage_mut(&mut self) -> &mut [u8] {
        self.rtcp.storage_mut()
    }

    /// Only the last packet in the buffer can grow.
    pub(crate) fn ensure_last(&self) -> Result<(), RtcpWriteError> {
        if self.end() != self.rtcp.size() {
            log::trace!("packet at {} is not the last packet", self.offset);
            return Err(RtcpWriteError::NotLastPacket);
        }
        Ok(())
    }

    pub(crate) fn set_count(&mut self, count: u8) {
        debug_assert!(count <= 0x1f);
        let offset = self.offset;
        let storage = self.storage_mut();
        storage[offset] = (storage[offset] & 0xe0) | (count & 0x1f);
        if let Some(header) = self.header.as_mut() {
            header.count = count & 0x1f;
        }
    }

    pub(crate) fn set_length(&mut self, length: u16) {
        let offset = self.offset;
        write_u16_be(&mut self.storage_mut()[offset + 2..], length);
        if let Some(header) = self.header.as_mut() {
            header.length = length;
        }
    }

    /// Read a 32 bit value at `rel` bytes from the start of the packet.
    pub(crate) fn read_u32(&self, rel: usize) -> u32 {
        u32_from_be_bytes(&self.data()[rel..])
    }

    /// Write a 32 bit value at `rel` bytes from the start of the packet.
    pub(crate) fn write_u32(&mut self, rel: usize, value: u32) {
        self.assert_writable();
        let offset = self.offset + rel;
        write_u32_be(&mut self.storage_mut()[offset..], value);
    }

    /// Number of 32 bit words following the fixed part of `fixed_words` words (excluding the
    /// header word) of a packet.
    pub(crate) fn trailing_words(&self, fixed_words: u16) -> u16 {
        self.length().saturating_sub(fixed_words)
    }

    /// The bytes following the fixed part of `fixed_words` words (excluding the header word).
    pub(crate) fn trailing_data(&self, fixed_words: u16) -> Option<&[u8]> {
        if self.length() <= fixed_words {
            return None;
        }
        let start = (fixed_words as usize + 1) * 4;
        Some(&self.data()[start..])
    }

    pub(crate) fn trailing_data_mut(&mut self, fixed_words: u16) -> Option<&mut [u8]> {
        self.assert_writable();
        if self.length() <= fixed_words {
            return None;
        }
        let start = self.offset + (fixed_words as usize + 1) * 4;
        let end = self.end();
        Some(&mut self.storage_mut()[start..end])
    }

    /// Resize the data following the fixed part of the packet to `wordlen` 32 bit words.
    /// The buffer is truncated after the packet.
    pub(crate) fn set_trailing_words(
        &mut self,
        fixed_words: u16,
        wordlen: u16,
    ) -> Result<(), RtcpWriteError> {
        self.assert_writable();
        self.ensure_last()?;

        let length = wordlen
            .checked_add(fixed_words)
            .ok_or(RtcpWriteError::OutputTooSmall(usize::MAX))?;
        let end = self.offset + (length as usize + 1) * 4;
        if end > self.maxsize() {
            log::trace!("no space for {wordlen} words, {end} > {}", self.maxsize());
            return Err(RtcpWriteError::OutputTooSmall(end));
        }

        let old_end = self.end();
        if end > old_end {
            self.storage_mut()[old_end..end].fill(0);
        }
        self.set_length(length);
        self.set_buffer_size(end);

        Ok(())
    }
}
