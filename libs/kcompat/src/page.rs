// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Page allocation on top of the global allocator.
//!
//! A block of `2^order` pages is a single allocation of `PAGE_SIZE << order` bytes aligned to its
//! own size, the same shape the buddy allocator hands out. There is no `struct page` metadata:
//! `page_address` and `virt_to_page` are identity mappings between a [`Page`] handle and the
//! address of its first byte.

use core::alloc::Layout;
use core::ptr::NonNull;
use core::slice;
use std::alloc::{alloc_zeroed, dealloc};

use crate::gfp::Gfp;
use crate::kconfig::{MAX_ORDER, PAGE_SIZE};

/// An owned block of `2^order` contiguous, page-aligned pages.
///
/// Pages have no destructor, every page must be given back through [`free_pages`] (or
/// [`free_page`]). Dropping a `Page` leaks it.
#[derive(Debug)]
#[must_use = "pages must be released with `free_pages`"]
pub struct Page {
    ptr: NonNull<u8>,
    order: u32,
}

// Safety: a `Page` is the unique owner of its memory
unsafe impl Send for Page {}
// Safety: shared access only hands out `&[u8]`
unsafe impl Sync for Page {}

impl Page {
    /// The page order of this block.
    #[inline]
    #[must_use]
    pub fn order(&self) -> u32 {
        self.order
    }

    /// The size of this block in bytes, `PAGE_SIZE << order`.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        PAGE_SIZE << self.order
    }

    #[inline]
    #[must_use]
    pub fn as_ptr(&self) -> NonNull<u8> {
        self.ptr
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        // Safety: the block is `size()` bytes, initialized at allocation and owned by us
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.size()) }
    }

    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // Safety: the block is `size()` bytes, initialized at allocation and owned by us
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.size()) }
    }

    /// Gives up ownership, returning the address of the first byte.
    #[must_use]
    pub fn into_raw(self) -> NonNull<u8> {
        self.ptr
    }
}

pub(crate) fn page_layout(order: u32) -> Option<Layout> {
    if order > MAX_ORDER {
        return None;
    }

    let size = PAGE_SIZE << order;
    Layout::from_size_align(size, size).ok()
}

/// Allocates a block of `2^order` pages.
///
/// The memory is always handed out zero-filled, so [`Gfp::ZERO`] is implied. Other flags are
/// accepted and ignored.
///
/// Returns `None` if `order` exceeds [`MAX_ORDER`] or the global allocator is out of memory.
pub fn alloc_pages(gfp: Gfp, order: u32) -> Option<Page> {
    let Some(layout) = page_layout(order) else {
        log::warn!("alloc_pages: order {order} exceeds MAX_ORDER ({MAX_ORDER})");
        return None;
    };

    // Safety: `layout` has a non-zero size
    let ptr = NonNull::new(unsafe { alloc_zeroed(layout) });
    log::trace!("alloc_pages(gfp={gfp:?}, order={order}) = {ptr:?}");

    Some(Page { ptr: ptr?, order })
}

/// Allocates a single page.
///
/// Returns `None` if the global allocator is out of memory.
#[inline]
pub fn alloc_page(gfp: Gfp) -> Option<Page> {
    alloc_pages(gfp, 0)
}

/// Releases a block of pages obtained from [`alloc_pages`].
///
/// # Panics
///
/// Panics if `page` was forged through [`virt_to_page`] with an order above [`MAX_ORDER`].
pub fn free_pages(page: Page) {
    let Some(layout) = page_layout(page.order) else {
        unreachable!("page of order {} was never allocatable", page.order);
    };
    log::trace!("free_pages({:?}, order={})", page.ptr, page.order);

    // Safety: `Page`s are only constructed from allocations with exactly this layout
    unsafe { dealloc(page.ptr.as_ptr(), layout) }
}

/// Releases a page obtained from [`alloc_page`].
#[inline]
pub fn free_page(page: Page) {
    debug_assert_eq!(page.order, 0, "free_page called on a higher-order block");
    free_pages(page);
}

/// Returns the address of the first byte of `page`.
#[inline]
#[must_use]
pub fn page_address(page: &Page) -> NonNull<u8> {
    page.ptr
}

/// Reconstructs the [`Page`] handle for an address previously obtained through
/// [`page_address`] or [`Page::into_raw`].
///
/// # Safety
///
/// `addr` must be the first byte of a live block allocated by [`alloc_pages`] with the same
/// `order`, and the caller must not use any other handle to that block afterwards.
#[inline]
pub unsafe fn virt_to_page(addr: NonNull<u8>, order: u32) -> Page {
    Page { ptr: addr, order }
}
