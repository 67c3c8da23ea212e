// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Compile-time configuration.

use static_assertions::const_assert;

/// The default log level for [`crate::logger::init_default`]
pub const LOG_LEVEL: log::Level = log::Level::Warn;
/// log2 of the page granularity
pub const PAGE_SHIFT: u32 = 12;
/// The page granularity in bytes
pub const PAGE_SIZE: usize = 1 << PAGE_SHIFT;
/// log2 of the sector size used by device-mapper I/O
pub const SECTOR_SHIFT: u32 = 9;
/// The largest page order accepted by [`crate::alloc_pages`] (4 MiB with 4 KiB pages)
pub const MAX_ORDER: u32 = 10;
/// Minimum alignment of every slab allocation, the largest fundamental alignment on supported hosts
pub const ARCH_KMALLOC_MINALIGN: usize = 16;

const_assert!(PAGE_SIZE.is_power_of_two());
const_assert!(SECTOR_SHIFT < PAGE_SHIFT);
const_assert!(ARCH_KMALLOC_MINALIGN.is_power_of_two());
const_assert!(PAGE_SHIFT + MAX_ORDER < usize::BITS);
