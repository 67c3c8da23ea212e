// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! User-space substitutes for the kernel primitives used by the dm-verity block hash tree.
//!
//! Kernel-derived code (`dm-bht` and the hashing glue around it) expects a small set of kernel
//! facilities: `atomic_t`, `alloc_page`, mempools, `kzalloc`, unaligned big-endian loads,
//! per-CPU variables, `IS_ERR`, `module_init` and a `shash` algorithm table. This crate provides
//! each of them on top of the hosted standard runtime so that code can be built and tested in a
//! regular process.
//!
//! The crate is deliberately a *collapse* of the kernel model, not an emulation of it: there is
//! one CPU, no preemption, no interrupts and no reserve memory behind mempools. The one exception
//! are the atomic primitives in [`atomic`], which are correct under real multi-threaded use.
//!
//! # C callers
//!
//! With the `ffi` feature enabled, the [`ffi`] module exports the same functionality under the
//! kernel symbol names (`atomic_cmpxchg`, `alloc_page`, `mempool_alloc`, ...).

mod loom;

pub mod atomic;
pub mod crypto;
pub mod dm;
pub mod error;
#[cfg(all(feature = "ffi", not(loom)))]
pub mod ffi;
pub mod gfp;
pub mod kconfig;
pub mod logger;
pub mod mempool;
pub mod module;
pub mod page;
pub mod percpu;
pub mod slab;
pub mod types;
pub mod unaligned;

pub use atomic::Atomic;
pub use error::{Errno, is_err};
pub use gfp::Gfp;
pub use kconfig::{PAGE_SHIFT, PAGE_SIZE};
pub use mempool::MemPool;
pub use page::{Page, alloc_page, alloc_pages, free_page, free_pages, page_address, virt_to_page};
pub use percpu::PerCpu;
pub use slab::{kcalloc, kfree, kmalloc, ksize, kzalloc};
pub use types::{sector_t, to_bytes, to_sector};
pub use unaligned::get_unaligned_be32;

#[doc(hidden)]
pub mod __private {
    pub use {linkme, log};
}
