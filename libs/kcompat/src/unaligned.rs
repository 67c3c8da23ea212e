// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Loads and stores of fixed-endian integers at arbitrary byte offsets.
//!
//! All accessors go through byte arrays, so they make no assumption about host endianness or the
//! alignment of the source.

fn head<const N: usize>(bytes: &[u8]) -> [u8; N] {
    match bytes.first_chunk::<N>() {
        Some(chunk) => *chunk,
        None => panic!(
            "unaligned access of {N} bytes out of bounds (have {})",
            bytes.len()
        ),
    }
}

/// Reads a big-endian `u16` from the first two bytes of `bytes`.
///
/// # Panics
///
/// Panics if `bytes` is shorter than 2 bytes.
#[inline]
#[must_use]
pub fn get_unaligned_be16(bytes: &[u8]) -> u16 {
    u16::from_be_bytes(head(bytes))
}

/// Reads a big-endian `u32` from the first four bytes of `bytes`.
///
/// # Panics
///
/// Panics if `bytes` is shorter than 4 bytes.
#[inline]
#[must_use]
pub fn get_unaligned_be32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes(head(bytes))
}

/// Reads a big-endian `u64` from the first eight bytes of `bytes`.
///
/// # Panics
///
/// Panics if `bytes` is shorter than 8 bytes.
#[inline]
#[must_use]
pub fn get_unaligned_be64(bytes: &[u8]) -> u64 {
    u64::from_be_bytes(head(bytes))
}

/// Reads a little-endian `u32` from the first four bytes of `bytes`.
///
/// # Panics
///
/// Panics if `bytes` is shorter than 4 bytes.
#[inline]
#[must_use]
pub fn get_unaligned_le32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes(head(bytes))
}

/// Writes `val` big-endian into the first four bytes of `bytes`.
///
/// # Panics
///
/// Panics if `bytes` is shorter than 4 bytes.
#[inline]
pub fn put_unaligned_be32(val: u32, bytes: &mut [u8]) {
    let Some(dst) = bytes.first_chunk_mut::<4>() else {
        panic!(
            "unaligned access of 4 bytes out of bounds (have {})",
            bytes.len()
        );
    };
    *dst = val.to_be_bytes();
}

/// Reads a big-endian `u32` from the four bytes starting at `ptr`.
///
/// # Safety
///
/// `ptr` must be valid for reads of 4 bytes. No alignment is required.
#[inline]
#[must_use]
pub unsafe fn get_unaligned_be32_ptr(ptr: *const u8) -> u32 {
    // Safety: ensured by caller, `[u8; 4]` has an alignment of 1
    let bytes = unsafe { ptr.cast::<[u8; 4]>().read() };
    u32::from_be_bytes(bytes)
}
