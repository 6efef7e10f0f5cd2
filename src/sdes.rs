// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    packet::{BodyCursor, Packet, PacketType},
    utils::{pad_to_4bytes, u32_from_be_bytes, write_u32_be},
    RtcpWriteError, MAX_SDES_ITEM_COUNT,
};

/// The type of an SDES entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SdesType {
    /// Terminates the entries of an item.
    End,
    /// Canonical end-point identifier.
    Cname,
    /// User name.
    Name,
    /// Electronic mail address.
    Email,
    /// Phone number.
    Phone,
    /// Geographic user location.
    Loc,
    /// Application or tool name.
    Tool,
    /// Notice or status.
    Note,
    /// Private extension.
    Priv,
    /// H.323 callable address.
    H323Caddr,
    /// Application specific identifier.
    Apsi,
    /// Reporting group identifier.
    Rgrp,
    /// RTP stream identifier.
    RtpStreamId,
    /// Identifier of the RTP stream that is repaired.
    RepairedRtpStreamId,
    /// CLUE capture identifier.
    Ccid,
    /// Media identification.
    Mid,
    /// A type without a registered meaning.
    Unknown(u8),
}

impl From<u8> for SdesType {
    fn from(value: u8) -> Self {
        match value {
            0 => SdesType::End,
            1 => SdesType::Cname,
            2 => SdesType::Name,
            3 => SdesType::Email,
            4 => SdesType::Phone,
            5 => SdesType::Loc,
            6 => SdesType::Tool,
            7 => SdesType::Note,
            8 => SdesType::Priv,
            9 => SdesType::H323Caddr,
            10 => SdesType::Apsi,
            11 => SdesType::Rgrp,
            12 => SdesType::RtpStreamId,
            13 => SdesType::RepairedRtpStreamId,
            14 => SdesType::Ccid,
            15 => SdesType::Mid,
            v => SdesType::Unknown(v),
        }
    }
}

impl From<SdesType> for u8 {
    fn from(value: SdesType) -> u8 {
        match value {
            SdesType::End => 0,
            SdesType::Cname => 1,
            SdesType::Name => 2,
            SdesType::Email => 3,
            SdesType::Phone => 4,
            SdesType::Loc => 5,
            SdesType::Tool => 6,
            SdesType::Note => 7,
            SdesType::Priv => 8,
            SdesType::H323Caddr => 9,
            SdesType::Apsi => 10,
            SdesType::Rgrp => 11,
            SdesType::RtpStreamId => 12,
            SdesType::RepairedRtpStreamId => 13,
            SdesType::Ccid => 14,
            SdesType::Mid => 15,
            SdesType::Unknown(v) => v,
        }
    }
}

const SDES_NAMES: [(SdesType, &str); 15] = [
    (SdesType::Cname, "cname"),
    (SdesType::Name, "name"),
    (SdesType::Email, "email"),
    (SdesType::Phone, "phone"),
    (SdesType::Loc, "location"),
    (SdesType::Tool, "tool"),
    (SdesType::Note, "note"),
    (SdesType::Priv, "priv"),
    (SdesType::H323Caddr, "h323-caddr"),
    (SdesType::Apsi, "apsi"),
    (SdesType::Rgrp, "rgrp"),
    (SdesType::RtpStreamId, "rtp-stream-id"),
    (SdesType::RepairedRtpStreamId, "repaired-rtp-stream-id"),
    (SdesType::Ccid, "ccid"),
    (SdesType::Mid, "mid"),
];

/// The textual name of an SDES type.  [`SdesType::End`] and unknown types have no name.
pub fn sdes_type_to_name(type_: SdesType) -> Option<&'static str> {
    SDES_NAMES
        .iter()
        .find(|(t, _)| *t == type_)
        .map(|(_, name)| *name)
}

/// The SDES type for a textual name.
///
/// Returns `None` for an empty name.  Any other unrecognised name maps to
/// [`SdesType::Priv`] so that it can be carried as a private extension.
pub fn sdes_name_to_type(name: &str) -> Option<SdesType> {
    if name.is_empty() {
        return None;
    }
    Some(
        SDES_NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(t, _)| *t)
            .unwrap_or(SdesType::Priv),
    )
}

/// An entry of an SDES item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SdesEntry<'p> {
    /// The entry type.
    pub type_: SdesType,
    /// The entry value, at most 255 bytes.
    pub value: &'p [u8],
}

/// Position of the SDES cursor, as byte offsets from the start of the packet for the item
/// and from the start of the item for the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SdesCursor {
    item_offset: usize,
    item_index: u8,
    entry_offset: usize,
}

impl Default for SdesCursor {
    fn default() -> Self {
        Self {
            item_offset: 4,
            item_index: 0,
            entry_offset: 4,
        }
    }
}

/// Maximum length of an SDES entry value.
const MAX_SDES_VALUE_LEN: usize = 255;

/// Offset of the word following the item at `item_offset` in the packet `data`, or `None`
/// if the item has no terminator inside the packet.
fn item_end(data: &[u8], item_offset: usize) -> Option<usize> {
    item_terminator(data, item_offset).map(|offset| pad_to_4bytes(offset + 1))
}

/// Offset of the terminating null entry of the item at `item_offset`.
fn item_terminator(data: &[u8], item_offset: usize) -> Option<usize> {
    let mut offset = item_offset + 4;
    while offset < data.len() {
        if data[offset] == 0 {
            return Some(offset);
        }
        let len = *data.get(offset + 1)? as usize;
        offset += 2 + len;
    }
    None
}

impl<'r, 'a> Packet<'r, 'a> {
    #[track_caller]
    fn sdes_cursor(&self) -> SdesCursor {
        self.assert_type(&[PacketType::Sdes]);
        match self.body {
            BodyCursor::Sdes(cursor) => cursor,
            _ => unreachable!(),
        }
    }

    fn set_sdes_cursor(&mut self, cursor: SdesCursor) {
        self.body = BodyCursor::Sdes(cursor);
    }

    /// The number of items in an SDES packet.
    pub fn sdes_item_count(&self) -> u8 {
        self.assert_type(&[PacketType::Sdes]);
        self.count()
    }

    /// Move to the first item of an SDES packet.  Returns `false` if there are no items.
    pub fn sdes_first_item(&mut self) -> bool {
        self.assert_type(&[PacketType::Sdes]);
        self.set_sdes_cursor(SdesCursor::default());
        self.count() > 0 && self.packet_len() >= 8
    }

    /// Move to the next item of an SDES packet.  Returns `false` if there are no more items
    /// or the current item is malformed.
    pub fn sdes_next_item(&mut self) -> bool {
        let cursor = self.sdes_cursor();
        if cursor.item_index as usize + 1 >= self.count() as usize {
            return false;
        }

        let data = self.data();
        match item_end(data, cursor.item_offset) {
            Some(next) if next + 8 <= data.len() => {
                self.set_sdes_cursor(SdesCursor {
                    item_offset: next,
                    item_index: cursor.item_index + 1,
                    entry_offset: 4,
                });
                true
            }
            _ => false,
        }
    }

    /// The SSRC of the current SDES item.
    pub fn sdes_item_ssrc(&self) -> u32 {
        let cursor = self.sdes_cursor();
        u32_from_be_bytes(&self.data()[cursor.item_offset..])
    }

    /// Move to the first entry of the current SDES item.  Returns `false` if the item has no
    /// entries.
    pub fn sdes_first_entry(&mut self) -> bool {
        let mut cursor = self.sdes_cursor();
        cursor.entry_offset = 4;
        self.set_sdes_cursor(cursor);

        let offset = cursor.item_offset + 4;
        matches!(self.data().get(offset), Some(type_) if *type_ != 0)
    }

    /// Move to the next entry of the current SDES item.  Returns `false` at the end of the
    /// item.
    pub fn sdes_next_entry(&mut self) -> bool {
        let mut cursor = self.sdes_cursor();
        let data = self.data();

        let offset = cursor.item_offset + cursor.entry_offset;
        let len = match data.get(offset..offset + 2) {
            Some([type_, len]) if *type_ != 0 => *len as usize,
            _ => return false,
        };
        let next = offset + 2 + len;
        if next >= data.len() {
            return false;
        }
        let has_entry = data[next] != 0;

        cursor.entry_offset += 2 + len;
        self.set_sdes_cursor(cursor);
        has_entry
    }

    /// The current entry of the current SDES item.
    pub fn sdes_entry(&self) -> Option<SdesEntry<'_>> {
        let cursor = self.sdes_cursor();
        let data = self.data();
        let offset = cursor.item_offset + cursor.entry_offset;

        let type_ = *data.get(offset)?;
        if type_ == 0 {
            return None;
        }
        let len = *data.get(offset + 1)? as usize;
        let value = data.get(offset + 2..offset + 2 + len)?;

        Some(SdesEntry {
            type_: type_.into(),
            value,
        })
    }

    /// An owned copy of the current entry of the current SDES item.
    pub fn sdes_copy_entry(&self) -> Option<(SdesType, Vec<u8>)> {
        self.sdes_entry()
            .map(|entry| (entry.type_, entry.value.to_vec()))
    }

    /// Append a new item for `ssrc` to an SDES packet and move the cursor to it.
    ///
    /// Returns an error if:
    ///
    /// * The packet already contains [`MAX_SDES_ITEM_COUNT`] items.
    /// * The packet is not the last packet in the buffer.
    /// * There is not enough capacity left in the buffer.
    pub fn sdes_add_item(&mut self, ssrc: u32) -> Result<(), RtcpWriteError> {
        self.assert_type(&[PacketType::Sdes]);
        self.assert_writable();

        let count = self.count();
        if count >= MAX_SDES_ITEM_COUNT {
            log::trace!("SDES item count {count} exceeds {MAX_SDES_ITEM_COUNT}");
            return Err(RtcpWriteError::TooManySdesItems {
                max: MAX_SDES_ITEM_COUNT,
            });
        }
        self.ensure_last()?;

        // ssrc and the terminating null word
        let item_offset = self.packet_len();
        let offset = self.offset() + item_offset;
        let end = offset + 8;
        let length = self.length() as usize + 2;
        if end > self.maxsize() || length > u16::MAX as usize {
            log::trace!("no space for SDES item, {end} > {}", self.maxsize());
            return Err(RtcpWriteError::OutputTooSmall(end));
        }

        let storage = self.storage_mut();
        write_u32_be(&mut storage[offset..], ssrc);
        storage[offset + 4..end].fill(0);

        self.set_count(count + 1);
        self.set_length(length as u16);
        self.set_buffer_size(end);
        self.set_sdes_cursor(SdesCursor {
            item_offset,
            item_index: count,
            entry_offset: 4,
        });

        Ok(())
    }

    /// Append an entry to the last item of an SDES packet.  The cursor is moved to the last
    /// item and positioned on the new entry.
    ///
    /// Returns an error if:
    ///
    /// * `type_` is [`SdesType::End`].
    /// * `value` is longer than 255 bytes.
    /// * There is no item in the packet.
    /// * The packet is not the last packet in the buffer.
    /// * There is not enough capacity left in the buffer.
    pub fn sdes_add_entry(&mut self, type_: SdesType, value: &[u8]) -> Result<(), RtcpWriteError> {
        self.assert_type(&[PacketType::Sdes]);
        self.assert_writable();

        let type_ = u8::from(type_);
        if type_ == 0 {
            return Err(RtcpWriteError::InvalidSdesType(type_));
        }
        if value.len() > MAX_SDES_VALUE_LEN {
            return Err(RtcpWriteError::SdesValueTooLarge {
                len: value.len(),
                max: MAX_SDES_VALUE_LEN as u8,
            });
        }
        let count = self.count();
        if count == 0 {
            return Err(RtcpWriteError::NoSdesItem);
        }
        self.ensure_last()?;

        // locate the terminator of the last item
        let data = self.data();
        let mut item_offset = 4;
        for _ in 1..count {
            item_offset = item_end(data, item_offset).ok_or(RtcpWriteError::NoSdesItem)?;
        }
        let terminator = item_terminator(data, item_offset).ok_or(RtcpWriteError::NoSdesItem)?;

        // type, length, value and a new terminator, padded to 32 bits
        let padded = pad_to_4bytes(terminator + 2 + value.len() + 1);
        let entry_start = self.offset() + terminator;
        let end = self.offset() + padded;
        let length = (padded - 4) / 4;
        if end > self.maxsize() || length > u16::MAX as usize {
            log::trace!("no space for SDES entry, {end} > {}", self.maxsize());
            return Err(RtcpWriteError::OutputTooSmall(end));
        }

        let storage = self.storage_mut();
        storage[entry_start] = type_;
        storage[entry_start + 1] = value.len() as u8;
        storage[entry_start + 2..entry_start + 2 + value.len()].copy_from_slice(value);
        storage[entry_start + 2 + value.len()..end].fill(0);

        self.set_length(length as u16);
        self.set_buffer_size(end);
        self.set_sdes_cursor(SdesCursor {
            item_offset,
            item_index: count - 1,
            entry_offset: terminator - item_offset,
        });

        Ok(())
    }
}
