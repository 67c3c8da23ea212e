// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Shape of the MD5 transform state (`crypto/md5.h`).
//!
//! Nothing here computes MD5. The constants and [`Md5State`] only need to exist with the exact
//! kernel layout so the hashing glue built on them compiles and sizes its descriptors correctly.

use static_assertions::{const_assert_eq, const_assert};

use super::shash::HASH_MAX_DIGESTSIZE;

pub const MD5_DIGEST_SIZE: usize = 16;
pub const MD5_HMAC_BLOCK_SIZE: usize = 64;
pub const MD5_BLOCK_WORDS: usize = 16;
pub const MD5_HASH_WORDS: usize = 4;

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Md5State {
    pub hash: [u32; MD5_HASH_WORDS],
    pub block: [u32; MD5_BLOCK_WORDS],
    pub byte_count: u64,
}

const_assert_eq!(size_of::<Md5State>(), 88);
const_assert_eq!(MD5_HASH_WORDS * 4, MD5_DIGEST_SIZE);
const_assert_eq!(MD5_BLOCK_WORDS * 4, MD5_HMAC_BLOCK_SIZE);
const_assert!(MD5_DIGEST_SIZE <= HASH_MAX_DIGESTSIZE);

#[cfg(test)]
mod tests {
    use core::mem::offset_of;

    use super::*;

    #[test]
    fn layout() {
        assert_eq!(offset_of!(Md5State, hash), 0);
        assert_eq!(offset_of!(Md5State, block), 16);
        assert_eq!(offset_of!(Md5State, byte_count), 80);
        assert_eq!(Md5State::default().byte_count, 0);
    }
}
