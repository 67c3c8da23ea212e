// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The slice of the kernel crypto API the block hash tree depends on.

pub mod md5;
pub mod shash;

pub use shash::{
    HASH_MAX_DIGESTSIZE, ShashAlg, ShashDesc, find_shash, register_shash, unregister_shash,
};
