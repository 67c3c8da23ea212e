// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use core::ffi::c_int;

bitflags::bitflags! {
    /// Allocation flags (`gfp_t`).
    ///
    /// In user space the distinction between `GFP_KERNEL` and `GFP_NOIO` has no meaning, both are
    /// accepted and treated the same. [`Gfp::ZERO`] is honored.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Gfp: u32 {
        /// The caller asserts that the allocation must not recurse into the I/O path.
        const NOIO = 1 << 0;
        /// Zero-fill the allocation (`__GFP_ZERO`).
        const ZERO = 1 << 8;
    }
}

impl Gfp {
    /// A regular allocation that may block (`GFP_KERNEL`).
    pub const KERNEL: Self = Self::empty();

    /// Converts the raw flag word passed by C callers, keeping unknown bits.
    #[must_use]
    pub const fn from_raw(raw: c_int) -> Self {
        Self::from_bits_retain(u32::from_ne_bytes(raw.to_ne_bytes()))
    }

    /// Whether the memory should be handed out zero-filled.
    #[inline]
    #[must_use]
    pub const fn zeroed(self) -> bool {
        self.contains(Self::ZERO)
    }
}

impl Default for Gfp {
    fn default() -> Self {
        Self::KERNEL
    }
}
