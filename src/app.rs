// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    packet::{Packet, PacketType},
    RtcpWriteError,
};

/// Length of the name of an APP packet.
pub const APP_NAME_LEN: usize = 4;

/// Words of an APP packet between the header and the application data.
const APP_FIXED_WORDS: u16 = 2;

impl<'r, 'a> Packet<'r, 'a> {
    /// The subtype of an APP packet, carried in the count field.
    pub fn app_subtype(&self) -> u8 {
        self.assert_type(&[PacketType::App]);
        self.count()
    }

    /// Set the subtype of an APP packet.
    ///
    /// # Panics
    ///
    /// Panics if `subtype` does not fit in 5 bits.
    pub fn app_set_subtype(&mut self, subtype: u8) {
        self.assert_type(&[PacketType::App]);
        self.assert_writable();
        assert!(subtype <= 0x1f, "APP subtype {subtype} out of range");
        self.set_count(subtype);
    }

    /// The SSRC of an APP packet.
    pub fn app_ssrc(&self) -> u32 {
        self.assert_type(&[PacketType::App]);
        self.read_u32(4)
    }

    /// Set the SSRC of an APP packet.
    pub fn app_set_ssrc(&mut self, ssrc: u32) {
        self.assert_type(&[PacketType::App]);
        self.write_u32(4, ssrc);
    }

    /// The 4 byte name of an APP packet.
    pub fn app_name(&self) -> [u8; APP_NAME_LEN] {
        self.assert_type(&[PacketType::App]);
        let mut name = [0; APP_NAME_LEN];
        name.copy_from_slice(&self.data()[8..8 + APP_NAME_LEN]);
        name
    }

    /// The name of an APP packet as a `String`, without trailing null bytes.
    pub fn app_name_string(&self) -> Result<String, std::string::FromUtf8Error> {
        let name = self.app_name();
        let len = name.iter().position(|&b| b == 0).unwrap_or(APP_NAME_LEN);
        String::from_utf8(name[..len].to_vec())
    }

    /// Set the name of an APP packet.  Names shorter than 4 bytes are padded with null bytes.
    pub fn app_set_name(&mut self, name: impl AsRef<[u8]>) -> Result<(), RtcpWriteError> {
        self.assert_type(&[PacketType::App]);
        self.assert_writable();

        let name = name.as_ref();
        if name.len() > APP_NAME_LEN {
            return Err(RtcpWriteError::NameLenTooLarge {
                len: name.len(),
                max: APP_NAME_LEN as u8,
            });
        }

        let offset = self.offset() + 8;
        let storage = self.storage_mut();
        storage[offset..offset + name.len()].copy_from_slice(name);
        storage[offset + name.len()..offset + APP_NAME_LEN].fill(0);

        Ok(())
    }

    /// Length of the application data in 32 bit words.
    pub fn app_data_length(&self) -> u16 {
        self.assert_type(&[PacketType::App]);
        self.trailing_words(APP_FIXED_WORDS)
    }

    /// Resize the application data to `wordlen` 32 bit words.  Newly added words are zeroed.
    ///
    /// Returns an error if:
    ///
    /// * The packet is not the last packet in the buffer.
    /// * There is not enough capacity left in the buffer.
    pub fn app_set_data_length(&mut self, wordlen: u16) -> Result<(), RtcpWriteError> {
        self.assert_type(&[PacketType::App]);
        self.set_trailing_words(APP_FIXED_WORDS, wordlen)
    }

    /// The application data.
    pub fn app_data(&self) -> Option<&[u8]> {
        self.assert_type(&[PacketType::App]);
        self.trailing_data(APP_FIXED_WORDS)
    }

    /// The application data, for modification.
    pub fn app_data_mut(&mut self) -> Option<&mut [u8]> {
        self.assert_type(&[PacketType::App]);
        self.trailing_data_mut(APP_FIXED_WORDS)
    }
}
