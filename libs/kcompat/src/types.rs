// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Kernel integer and sector types.
//!
//! The unsigned kernel aliases (`u8`..`u64`) are Rust's own primitives, only the signed `sN`
//! spellings and `sector_t` need an alias.

#![allow(non_camel_case_types, reason = "kernel type names")]

use crate::kconfig::SECTOR_SHIFT;

pub type s8 = i8;
pub type s16 = i16;
pub type s32 = i32;
pub type s64 = i64;

/// A 512-byte device sector index or count.
pub type sector_t = u64;

/// Converts a byte count into a count of 512-byte sectors, rounding down.
#[inline]
#[must_use]
pub const fn to_sector(bytes: u64) -> sector_t {
    bytes >> SECTOR_SHIFT
}

/// Converts a sector count into a byte count.
///
/// Returns `None` if the result would overflow `u64`.
#[inline]
#[must_use]
pub const fn to_bytes(sectors: sector_t) -> Option<u64> {
    if sectors.leading_zeros() < SECTOR_SHIFT {
        None
    } else {
        Some(sectors << SECTOR_SHIFT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kconfig::PAGE_SIZE;

    #[test]
    fn page_is_eight_sectors() {
        let page = u64::try_from(PAGE_SIZE).unwrap();
        assert_eq!(to_sector(page), 8);
        assert_eq!(to_bytes(8), Some(page));
    }

    #[test]
    fn partial_sector_rounds_down() {
        assert_eq!(to_sector(511), 0);
        assert_eq!(to_sector(513), 1);
    }

    #[test]
    fn to_bytes_overflow() {
        assert_eq!(to_bytes(u64::MAX >> SECTOR_SHIFT), Some((u64::MAX >> SECTOR_SHIFT) << SECTOR_SHIFT));
        assert_eq!(to_bytes((u64::MAX >> SECTOR_SHIFT) + 1), None);
    }
}
