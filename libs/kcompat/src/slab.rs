// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! `kmalloc` family on top of the global allocator.
//!
//! Rust's allocator wants the layout back on deallocation, `kfree` only gets a pointer. Every
//! block therefore carries a small header right in front of the returned pointer that records the
//! layout of the underlying allocation and the size the caller asked for.

use core::alloc::Layout;
use core::mem;
use core::ptr::NonNull;
use std::alloc::{alloc, alloc_zeroed, dealloc};

use crate::gfp::Gfp;
use crate::kconfig::ARCH_KMALLOC_MINALIGN;

#[derive(Copy, Clone)]
struct SlabHeader {
    /// Layout of the whole allocation, header included.
    layout: Layout,
    /// Start of the whole allocation.
    base: *mut u8,
    /// The size requested by the caller.
    size: usize,
}

/// Allocates `size` bytes of uninitialized memory, aligned to [`ARCH_KMALLOC_MINALIGN`].
///
/// With [`Gfp::ZERO`] the memory is zero-filled. Returns `None` if the allocator is out of
/// memory or `size` is too large to be described by a [`Layout`].
pub fn kmalloc(size: usize, gfp: Gfp) -> Option<NonNull<u8>> {
    let layout = Layout::from_size_align(size, ARCH_KMALLOC_MINALIGN).ok()?;
    let (to_request, offset) = Layout::new::<SlabHeader>().extend(layout).ok()?;
    let to_request = to_request.pad_to_align();

    // Safety: `to_request` is never zero-sized, it always contains the header
    let base = unsafe {
        if gfp.zeroed() {
            alloc_zeroed(to_request)
        } else {
            alloc(to_request)
        }
    };
    if base.is_null() {
        log::trace!("kmalloc({size}, {gfp:?}) failed");
        return None;
    }

    // Safety: `offset` is within the allocation and `offset >= size_of::<SlabHeader>()`
    unsafe {
        let obj = base.add(offset);
        obj.sub(mem::size_of::<SlabHeader>())
            .cast::<SlabHeader>()
            .write_unaligned(SlabHeader {
                layout: to_request,
                base,
                size,
            });

        Some(NonNull::new_unchecked(obj))
    }
}

/// Allocates `size` bytes of zeroed memory.
///
/// Returns `None` if the allocator is out of memory.
#[inline]
pub fn kzalloc(size: usize, gfp: Gfp) -> Option<NonNull<u8>> {
    kmalloc(size, gfp | Gfp::ZERO)
}

/// Allocates zeroed memory for an array of `n` elements of `size` bytes each.
///
/// Returns `None` without allocating if `n * size` overflows, or if the allocator is out of
/// memory.
pub fn kcalloc(n: usize, size: usize, gfp: Gfp) -> Option<NonNull<u8>> {
    let Some(bytes) = n.checked_mul(size) else {
        log::debug!("kcalloc({n}, {size}): size overflows");
        return None;
    };

    kzalloc(bytes, gfp)
}

/// # Safety
///
/// `obj` must be a live block handed out by [`kmalloc`].
unsafe fn header(obj: NonNull<u8>) -> SlabHeader {
    // Safety: every object handed out by `kmalloc` is preceded by a `SlabHeader`,
    // `read_unaligned` has no alignment requirement
    unsafe {
        obj.as_ptr()
            .sub(mem::size_of::<SlabHeader>())
            .cast::<SlabHeader>()
            .read_unaligned()
    }
}

/// Returns the number of usable bytes in a block, the size originally requested.
///
/// # Safety
///
/// `obj` must have been returned by a `kmalloc`-family function and not been freed.
#[must_use]
pub unsafe fn ksize(obj: NonNull<u8>) -> usize {
    // Safety: ensured by caller
    unsafe { header(obj) }.size
}

/// Releases a block returned by a `kmalloc`-family function. `kfree(null)` does nothing.
///
/// # Safety
///
/// `obj` must be null or a live block returned by [`kmalloc`], [`kzalloc`] or [`kcalloc`].
pub unsafe fn kfree(obj: *mut u8) {
    let Some(obj) = NonNull::new(obj) else {
        return;
    };

    // Safety: ensured by caller
    let SlabHeader { layout, base, size } = unsafe { header(obj) };
    debug_assert!(size <= layout.size(), "corrupted slab header for {obj:?}");

    // Safety: `base` and `layout` describe exactly the allocation made in `kmalloc`
    unsafe { dealloc(base, layout) }
}
