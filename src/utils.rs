// SPDX-License-Identifier: MIT OR Apache-2.0

#[track_caller]
#[inline(always)]
pub(crate) fn u16_from_be_bytes(bytes: &[u8]) -> u16 {
    u16::from_be_bytes(bytes[..2].try_into().expect("expecting 2 bytes"))
}

#[track_caller]
#[inline(always)]
pub(crate) fn u32_from_be_bytes(bytes: &[u8]) -> u32 {
    u32::from_be_bytes(bytes[..4].try_into().expect("expecting 4 bytes"))
}

#[track_caller]
#[inline(always)]
pub(crate) fn u64_from_be_bytes(bytes: &[u8]) -> u64 {
    u64::from_be_bytes(bytes[..8].try_into().expect("expecting 8 bytes"))
}

#[track_caller]
#[inline(always)]
pub(crate) fn write_u16_be(bytes: &mut [u8], value: u16) {
    bytes[..2].copy_from_slice(&value.to_be_bytes());
}

#[track_caller]
#[inline(always)]
pub(crate) fn write_u32_be(bytes: &mut [u8], value: u32) {
    bytes[..4].copy_from_slice(&value.to_be_bytes());
}

#[track_caller]
#[inline(always)]
pub(crate) fn write_u64_be(bytes: &mut [u8], value: u64) {
    bytes[..8].copy_from_slice(&value.to_be_bytes());
}

pub(crate) const fn pad_to_4bytes(num: usize) -> usize {
    (num + 3) & !3
}
