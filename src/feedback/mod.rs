// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    packet::{Packet, PacketType},
    RtcpWriteError,
};

/// Feedback message types of transport layer feedback packets (RTPFB).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportFeedbackType {
    /// Generic NACK (RFC 4585)
    Nack = 1,
    /// Temporary Maximum Media Stream Bit Rate Request (RFC 5104)
    Tmmbr = 3,
    /// Temporary Maximum Media Stream Bit Rate Notification (RFC 5104)
    Tmmbn = 4,
    /// Request a Sender Report (RFC 6051)
    RtcpSrReq = 5,
    /// Transport-wide congestion control
    Twcc = 15,
}

impl TryFrom<u8> for TransportFeedbackType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => Self::Nack,
            3 => Self::Tmmbr,
            4 => Self::Tmmbn,
            5 => Self::RtcpSrReq,
            15 => Self::Twcc,
            _ => return Err(value),
        })
    }
}

impl From<TransportFeedbackType> for u8 {
    fn from(value: TransportFeedbackType) -> u8 {
        value as u8
    }
}

/// Feedback message types of payload specific feedback packets (PSFB).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadFeedbackType {
    /// Picture Loss Indication (RFC 4585)
    Pli = 1,
    /// Slice Loss Indication (RFC 4585)
    Sli = 2,
    /// Reference Picture Selection Indication (RFC 4585)
    Rpsi = 3,
    /// Full Intra Request (RFC 5104)
    Fir = 4,
    /// Temporal-Spatial Trade-off Request (RFC 5104)
    Tstr = 5,
    /// Temporal-Spatial Trade-off Notification (RFC 5104)
    Tstn = 6,
    /// Video Back Channel Message (RFC 5104)
    Vbcm = 7,
    /// Application layer feedback
    Afb = 15,
}

impl TryFrom<u8> for PayloadFeedbackType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => Self::Pli,
            2 => Self::Sli,
            3 => Self::Rpsi,
            4 => Self::Fir,
            5 => Self::Tstr,
            6 => Self::Tstn,
            7 => Self::Vbcm,
            15 => Self::Afb,
            _ => return Err(value),
        })
    }
}

impl From<PayloadFeedbackType> for u8 {
    fn from(value: PayloadFeedbackType) -> u8 {
        value as u8
    }
}

const FB_TYPES: [PacketType; 2] = [PacketType::Rtpfb, PacketType::Psfb];

/// Words of a feedback packet between the header and the FCI.
const FB_FIXED_WORDS: u16 = 2;

impl<'r, 'a> Packet<'r, 'a> {
    /// The SSRC of the sender of a feedback packet.
    pub fn fb_sender_ssrc(&self) -> u32 {
        self.assert_type(&FB_TYPES);
        self.read_u32(4)
    }

    /// Set the SSRC of the sender of a feedback packet.
    pub fn fb_set_sender_ssrc(&mut self, ssrc: u32) {
        self.assert_type(&FB_TYPES);
        self.write_u32(4, ssrc);
    }

    /// The SSRC of the media source a feedback packet refers to.
    pub fn fb_media_ssrc(&self) -> u32 {
        self.assert_type(&FB_TYPES);
        self.read_u32(8)
    }

    /// Set the SSRC of the media source a feedback packet refers to.
    pub fn fb_set_media_ssrc(&mut self, ssrc: u32) {
        self.assert_type(&FB_TYPES);
        self.write_u32(8, ssrc);
    }

    /// The feedback message type, carried in the count field.
    pub fn fb_type(&self) -> u8 {
        self.assert_type(&FB_TYPES);
        self.count()
    }

    /// The feedback message type of a RTPFB packet, if known.
    pub fn fb_transport_type(&self) -> Option<TransportFeedbackType> {
        self.assert_type(&[PacketType::Rtpfb]);
        TransportFeedbackType::try_from(self.count()).ok()
    }

    /// The feedback message type of a PSFB packet, if known.
    pub fn fb_payload_type(&self) -> Option<PayloadFeedbackType> {
        self.assert_type(&[PacketType::Psfb]);
        PayloadFeedbackType::try_from(self.count()).ok()
    }

    /// Set the feedback message type.
    ///
    /// # Panics
    ///
    /// Panics if `fmt` does not fit in 5 bits.
    pub fn fb_set_type(&mut self, fmt: impl Into<u8>) {
        self.assert_type(&FB_TYPES);
        self.assert_writable();
        let fmt = fmt.into();
        assert!(fmt <= 0x1f, "feedback type {fmt} out of range");
        self.set_count(fmt);
    }

    /// Length of the Feedback Control Information in 32 bit words.
    pub fn fb_fci_length(&self) -> u16 {
        self.assert_type(&FB_TYPES);
        self.trailing_words(FB_FIXED_WORDS)
    }

    /// Resize the Feedback Control Information to `wordlen` 32 bit words.  Newly added
    /// words are zeroed.
    ///
    /// Returns an error if:
    ///
    /// * The packet is not the last packet in the buffer.
    /// * There is not enough capacity left in the buffer.
    pub fn fb_set_fci_length(&mut self, wordlen: u16) -> Result<(), RtcpWriteError> {
        self.assert_type(&FB_TYPES);
        self.set_trailing_words(FB_FIXED_WORDS, wordlen)
    }

    /// The Feedback Control Information.
    pub fn fb_fci(&self) -> Option<&[u8]> {
        self.assert_type(&FB_TYPES);
        self.trailing_data(FB_FIXED_WORDS)
    }

    /// The Feedback Control Information, for modification.
    pub fn fb_fci_mut(&mut self) -> Option<&mut [u8]> {
        self.assert_type(&FB_TYPES);
        self.trailing_data_mut(FB_FIXED_WORDS)
    }
}
