// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Page mempools.
//!
//! A kernel mempool keeps `min_nr` elements in reserve so allocations on the I/O path can always
//! make progress. In user space the global allocator is the only source of memory, so a
//! [`MemPool`] physically reserves nothing. It does remember the requested reserve and keeps an
//! exact count of the elements that are currently handed out, which catches elements that are
//! never given back.

use core::cell::Cell;
use core::fmt;

use crate::gfp::Gfp;
use crate::page::{self, Page};

/// Bookkeeping record for a pool of page blocks.
///
/// The outstanding count is updated non-atomically, a pool has a single owner (`MemPool` is
/// `Send` but not `Sync`).
#[repr(C)]
pub struct MemPool {
    min_nr: usize,
    order: u32,
    out: Cell<usize>,
}

impl MemPool {
    /// Creates a pool of blocks of `2^order` pages (`mempool_create_page_pool`).
    ///
    /// `min_nr` is the reserve the caller asked for. It is recorded but not pre-allocated.
    #[must_use]
    pub fn create_page_pool(min_nr: usize, order: u32) -> Self {
        log::trace!("mempool_create_page_pool(min_nr={min_nr}, order={order})");

        Self {
            min_nr,
            order,
            out: Cell::new(0),
        }
    }

    /// The reserve requested at creation.
    #[inline]
    #[must_use]
    pub fn min_nr(&self) -> usize {
        self.min_nr
    }

    /// The page order of every element.
    #[inline]
    #[must_use]
    pub fn order(&self) -> u32 {
        self.order
    }

    /// The number of elements handed out and not yet returned.
    #[inline]
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.out.get()
    }

    /// Takes a zero-filled element from the pool (`mempool_alloc`).
    ///
    /// Returns `None` if the page allocator fails, in which case the outstanding count is left
    /// untouched.
    pub fn alloc(&self, gfp: Gfp) -> Option<Page> {
        let element = page::alloc_pages(gfp | Gfp::ZERO, self.order)?;
        self.out.set(self.out.get() + 1);
        Some(element)
    }

    /// Returns an element to the pool (`mempool_free`).
    ///
    /// Returning an element to a pool it wasn't taken from corrupts the bookkeeping of both
    /// pools, this is not detected.
    ///
    /// # Panics
    ///
    /// Panics if the pool has no outstanding elements.
    pub fn free(&self, element: Page) {
        let out = self.out.get();
        assert!(out > 0, "mempool element returned to a pool with nothing outstanding");
        debug_assert_eq!(element.order(), self.order, "element returned to the wrong pool");

        self.out.set(out - 1);
        page::free_pages(element);
    }

    /// Destroys the pool (`mempool_destroy`).
    ///
    /// If elements are still outstanding a diagnostic is logged. The outstanding elements are not
    /// reclaimed. Dropping the pool has the same effect.
    pub fn destroy(self) {
        drop(self);
    }
}

impl Drop for MemPool {
    fn drop(&mut self) {
        let out = self.out.get();
        if out > 0 {
            log::error!(target: "mempool", "ALL ELEMENTS NOT RETURNED TO MEMPOOL");
            log::debug!(target: "mempool", "{out} element(s) of order {} leaked", self.order);
        }
    }
}

impl fmt::Debug for MemPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemPool")
            .field("min_nr", &self.min_nr)
            .field("order", &self.order)
            .field("out", &self.out.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::kconfig::{MAX_ORDER, PAGE_SIZE};

    #[test_log::test]
    fn balanced_pool() {
        let pool = MemPool::create_page_pool(4, 0);
        assert_eq!(pool.min_nr(), 4);

        let element = pool.alloc(Gfp::KERNEL).unwrap();
        assert_eq!(element.size(), PAGE_SIZE);
        assert!(element.as_slice().iter().all(|b| *b == 0));
        assert_eq!(pool.outstanding(), 1);

        pool.free(element);
        assert_eq!(pool.outstanding(), 0);
        pool.destroy();
    }

    #[test_log::test]
    fn order_is_honored() {
        let pool = MemPool::create_page_pool(1, 1);
        let element = pool.alloc(Gfp::NOIO).unwrap();
        assert_eq!(element.size(), 2 * PAGE_SIZE);
        pool.free(element);
    }

    #[test_log::test]
    fn failed_alloc_leaves_count() {
        let pool = MemPool::create_page_pool(2, MAX_ORDER + 1);
        assert!(pool.alloc(Gfp::KERNEL).is_none());
        assert_eq!(pool.outstanding(), 0);
    }

    #[test_log::test]
    #[should_panic(expected = "nothing outstanding")]
    fn free_without_alloc() {
        let pool = MemPool::create_page_pool(1, 0);
        let stray = page::alloc_page(Gfp::KERNEL).unwrap();
        pool.free(stray);
    }

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Alloc,
        Free(usize),
    }

    fn ops() -> impl Strategy<Value = Vec<Op>> {
        proptest::collection::vec(
            prop_oneof![Just(Op::Alloc), any::<usize>().prop_map(Op::Free)],
            0..64,
        )
    }

    proptest! {
        #[test]
        fn outstanding_tracks_interleaving(ops in ops()) {
            let pool = MemPool::create_page_pool(4, 0);
            let mut held = Vec::new();

            for op in ops {
                match op {
                    Op::Alloc => held.push(pool.alloc(Gfp::KERNEL).unwrap()),
                    Op::Free(idx) if !held.is_empty() => {
                        let element = held.swap_remove(idx % held.len());
                        pool.free(element);
                    }
                    Op::Free(_) => {}
                }
                prop_assert_eq!(pool.outstanding(), held.len());
            }

            for element in held.drain(..) {
                pool.free(element);
            }
            prop_assert_eq!(pool.outstanding(), 0);
        }
    }
}
