// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    packet::Packet,
    utils::{u16_from_be_bytes, u32_from_be_bytes},
};

use super::XrBlockType;

/// Length in words of a VoIP Metrics report block.
const VOIP_METRICS_BLOCK_LEN: u16 = 8;

/// The content of a VoIP Metrics report block (RFC 3611 section 4.7).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VoipMetrics {
    /// The SSRC of the media being reported on.
    pub ssrc: u32,
    /// Fraction of packets lost, in units of 1/256.
    pub loss_rate: u8,
    /// Fraction of packets discarded, in units of 1/256.
    pub discard_rate: u8,
    /// Fraction of packets lost or discarded within bursts, in units of 1/256.
    pub burst_density: u8,
    /// Fraction of packets lost or discarded within gaps, in units of 1/256.
    pub gap_density: u8,
    /// Mean duration of bursts, in milliseconds.
    pub burst_duration: u16,
    /// Mean duration of gaps, in milliseconds.
    pub gap_duration: u16,
    /// Most recent round trip delay, in milliseconds.
    pub round_trip_delay: u16,
    /// Most recent end system delay, in milliseconds.
    pub end_system_delay: u16,
    /// Voice signal level in dBm0, as a signed value.
    pub signal_level: u8,
    /// Noise level in dBm0, as a signed value.
    pub noise_level: u8,
    /// Residual echo return loss, in dB.
    pub rerl: u8,
    /// Gap threshold, in packets.
    pub gmin: u8,
    /// Conversational R factor.
    pub r_factor: u8,
    /// External R factor.
    pub ext_r_factor: u8,
    /// Listening quality MOS, multiplied by 10.
    pub mos_lq: u8,
    /// Conversational quality MOS, multiplied by 10.
    pub mos_cq: u8,
    /// Packet loss concealment and jitter buffer configuration.
    pub rx_config: u8,
    /// Nominal jitter buffer delay, in milliseconds.
    pub jb_nominal: u16,
    /// Current maximum jitter buffer delay, in milliseconds.
    pub jb_maximum: u16,
    /// Absolute maximum jitter buffer delay, in milliseconds.
    pub jb_abs_max: u16,
}

impl VoipMetrics {
    fn parse(block: &[u8]) -> Self {
        Self {
            ssrc: u32_from_be_bytes(&block[4..]),
            loss_rate: block[8],
            discard_rate: block[9],
            burst_density: block[10],
            gap_density: block[11],
            burst_duration: u16_from_be_bytes(&block[12..]),
            gap_duration: u16_from_be_bytes(&block[14..]),
            round_trip_delay: u16_from_be_bytes(&block[16..]),
            end_system_delay: u16_from_be_bytes(&block[18..]),
            signal_level: block[20],
            noise_level: block[21],
            rerl: block[22],
            gmin: block[23],
            r_factor: block[24],
            ext_r_factor: block[25],
            mos_lq: block[26],
            mos_cq: block[27],
            rx_config: block[28],
            // block[29] is reserved
            jb_nominal: u16_from_be_bytes(&block[30..]),
            jb_maximum: u16_from_be_bytes(&block[32..]),
            jb_abs_max: u16_from_be_bytes(&block[34..]),
        }
    }
}

impl<'r, 'a> Packet<'r, 'a> {
    /// The metrics of the current VoIP Metrics report block.
    ///
    /// # Panics
    ///
    /// Panics if the current block is of another type.
    pub fn xr_voip_metrics(&self) -> Option<VoipMetrics> {
        let block = self.xr_block(&[XrBlockType::VoipMetrics])?;
        if u16_from_be_bytes(&block[2..]) != VOIP_METRICS_BLOCK_LEN {
            return None;
        }
        Some(VoipMetrics::parse(block))
    }
}
