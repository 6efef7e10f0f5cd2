// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-place reading and writing of RTCP compound packets (RFC 3550, RFC 3611,
//! RFC 4585) directly over a mapped byte buffer.
//!
//! A [`Buffer`] is mapped into an [`RtcpBuffer`], which hands out [`Packet`]
//! cursors.  A cursor either walks the packets already present in the buffer
//! or is positioned on a freshly appended packet that grows as report blocks,
//! SDES entries, BYE sources and so on are added.
//!
//! ```
//! use rtcp_buffer::{Buffer, PacketType, ReportBlock, RtcpBuffer, SenderInfo};
//!
//! let mut buffer = Buffer::new(1400);
//! {
//!     let mut rtcp = RtcpBuffer::map_writable(&mut buffer);
//!     let mut packet = rtcp.add_packet(PacketType::Sr).unwrap();
//!     packet.sr_set_sender_info(&SenderInfo {
//!         ssrc: 0x1234_5678,
//!         ..Default::default()
//!     });
//!     packet.add_rb(&ReportBlock::default()).unwrap();
//! }
//! assert!(buffer.validate().is_ok());
//! assert_eq!(buffer.size(), 52);
//! ```

#![warn(missing_docs)]

/// The RTP/RTCP protocol version handled by this implementation.
pub const VERSION: u8 = 2;

/// Maximum number of report blocks in a single SR or RR packet.
pub const MAX_RB_COUNT: u8 = 31;

/// Maximum number of items in a single SDES packet.
pub const MAX_SDES_ITEM_COUNT: u8 = 31;

/// Maximum number of sources in a single BYE packet.
pub const MAX_BYE_SSRC_COUNT: u8 = 31;

/// Mask applied to the first two bytes of a compound packet: version, padding
/// bit and the packet type with its lowest bit cleared so that both SR and RR
/// compare equal to [`VALID_VALUE`].
pub const VALID_MASK: u16 = 0xc000 | 0x2000 | 0xfe;

/// Mask applied to the first two bytes of a reduced-size (RFC 5506) packet:
/// only the version and padding bit are checked, any packet type may come
/// first.
pub const REDUCED_SIZE_VALID_MASK: u16 = 0xc000 | 0x2000;

/// The expected value of the first two bytes of a compound packet after
/// applying [`VALID_MASK`].
pub const VALID_VALUE: u16 = ((VERSION as u16) << 14) | 200;

/// Errors that can be produced when parsing a RTCP packet
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RtcpParseError {
    /// Unsupported version.  This implementation only deals with version 2.
    #[error("Unsupported version: {}.  This implementation only deals with version 2.", .0)]
    UnsupportedVersion(u8),
    /// The packet was too short to parse
    #[error("The packet was too short to parse. Expected size: {expected}, actual size encountered: {actual}")]
    Truncated {
        /// The expected size
        expected: usize,
        /// The actual size encountered
        actual: usize,
    },
    /// The packet was too large to parse
    #[error("The packet was too large to parse. Expected size: {expected}, actual size encountered: {actual}")]
    TooLarge {
        /// The expected size
        expected: usize,
        /// The actual size encountered
        actual: usize,
    },
    /// The first two bytes of the compound packet do not match the expected pattern.
    #[error("Invalid first packet header {header:#06x} (mask {mask:#06x})")]
    InvalidFirstHeader {
        /// The first two bytes of the data
        header: u16,
        /// The mask that was applied
        mask: u16,
    },
    /// Invalid Padding length 0 or not a multiple of 4.
    #[error("Invalid Padding length")]
    InvalidPadding,
    /// Data remained after the last packet of the compound packet.
    #[error("{} bytes of trailing data after the last packet", .0)]
    TrailingData(usize),
}

/// Errors produced when writing a packet
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RtcpWriteError {
    /// Buffer too short to accommodate the operation.
    #[error("Buffer too short to accommodate this operation: {} bytes required", .0)]
    OutputTooSmall(usize),

    /// Too many report blocks for a SR or RR packet.
    #[error("Too many report blocks (max {max})")]
    TooManyReportBlocks {
        /// The maximum number of report blocks
        max: u8,
    },

    /// The report block to replace does not exist.
    #[error("Report block {index} does not exist, the packet has {count}")]
    NoSuchReportBlock {
        /// The requested report block
        index: u8,
        /// The number of report blocks in the packet
        count: u8,
    },

    /// Report blocks cannot be added after profile specific extension data.
    #[error("Report blocks cannot be added after profile specific extension data")]
    ProfileSpecificExtensionPresent,

    /// Too many sources for a BYE packet.
    #[error("Too many sources (max {max})")]
    TooManySources {
        /// The maximum number of sources
        max: u8,
    },

    /// Sources cannot be added after the BYE reason, and the reason can only be set once.
    #[error("The BYE packet already carries a reason")]
    ByeReasonPresent,

    /// The reason length is too large.
    #[error("Reason length {len} is too large (max {max})")]
    ReasonLenTooLarge {
        /// The reason length
        len: usize,
        /// The maximum length allowed
        max: u8,
    },

    /// Too many items for a SDES packet.
    #[error("Too many SDES items (max {max})")]
    TooManySdesItems {
        /// The maximum number of items
        max: u8,
    },

    /// An SDES entry was added before any SDES item.
    #[error("No SDES item to add the entry to")]
    NoSdesItem,

    /// The SDES value is too large.
    #[error("The SDES Value length {len} was too large (max {max})")]
    SdesValueTooLarge {
        /// The length
        len: usize,
        /// The maximum length allowed
        max: u8,
    },

    /// The SDES entry type is reserved for the end of an item.
    #[error("SDES entry type {} cannot be added", .0)]
    InvalidSdesType(u8),

    /// The APP name is too large.
    #[error("Name length {len} is too large (max {max})")]
    NameLenTooLarge {
        /// The length
        len: usize,
        /// The maximum length allowed
        max: u8,
    },

    /// The data length must be a multiple of 32bits.
    #[error("Data length must be a multiple of 32bits. Data len: {}", .0)]
    DataLen32bitMultiple(usize),

    /// The last packet in the buffer has the padding bit set and no packet may follow it.
    #[error("The last packet has padding set, no packet can be appended")]
    PaddingPacketPresent,

    /// Growing a packet is only possible for the last packet in the buffer.
    #[error("Only the last packet in the buffer can be extended")]
    NotLastPacket,
}

mod app;
mod buffer;
mod bye;
mod feedback;
mod packet;
mod receiver;
mod report_block;
mod sdes;
mod sender;
mod time;
mod utils;
pub mod xr;

pub use app::APP_NAME_LEN;
pub use buffer::{validate_data, validate_data_reduced, Buffer, RtcpBuffer};
pub use feedback::{PayloadFeedbackType, TransportFeedbackType};
pub use packet::{Packet, PacketType};
pub use report_block::ReportBlock;
pub use sdes::{sdes_name_to_type, sdes_type_to_name, SdesEntry, SdesType};
pub use sender::SenderInfo;
pub use time::{ntp_to_unix, unix_to_ntp};
pub use xr::XrBlockType;
