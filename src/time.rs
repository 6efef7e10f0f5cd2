// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion between 64 bit NTP timestamps and nanoseconds since the Unix epoch.

/// Seconds between the NTP epoch (1900) and the Unix epoch (1970).
const NTP_UNIX_OFFSET_SECS: u64 = 2_208_988_800;

const NSEC_PER_SEC: u128 = 1_000_000_000;

/// Convert a 64 bit NTP timestamp (32.32 fixed point seconds since 1900) to nanoseconds
/// since the Unix epoch.  The result is rounded up.
pub fn ntp_to_unix(ntptime: u64) -> u64 {
    let unixtime = ntptime.wrapping_sub(NTP_UNIX_OFFSET_SECS << 32);
    let nsecs = (unixtime as u128 * NSEC_PER_SEC + (1 << 32) - 1) >> 32;
    nsecs as u64
}

/// Convert nanoseconds since the Unix epoch to a 64 bit NTP timestamp (32.32 fixed point
/// seconds since 1900).  The result is rounded down.
pub fn unix_to_ntp(unixtime: u64) -> u64 {
    // NTP timestamps wrap around in 2036
    let ntptime = (((unixtime as u128) << 32) / NSEC_PER_SEC) as u64;
    ntptime.wrapping_add(NTP_UNIX_OFFSET_SECS << 32)
}
