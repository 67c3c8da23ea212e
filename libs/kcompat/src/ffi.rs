// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! C ABI exports under the kernel's symbol names.
//!
//! Pages cross this boundary as the address of their first byte (what `page_address` would
//! return), not as a `struct page *`. Every function that hands out memory returns null on
//! failure, and every function that takes memory back treats null as a no-op.

use core::alloc::Layout;
use core::ffi::{c_int, c_uint, c_void};
use core::ptr::{self, NonNull};

use crate::atomic::Atomic;
use crate::gfp::Gfp;
use crate::mempool::MemPool;
use crate::{page, slab, unaligned};

/// # Safety
///
/// `v` must point to a live `atomic_t`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn atomic_cmpxchg(v: *const Atomic, old: c_int, new: c_int) -> c_int {
    // Safety: ensured by caller
    unsafe { &*v }.cmpxchg(old, new)
}

/// # Safety
///
/// `v` must point to a live `atomic_t`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn atomic_set(v: *const Atomic, i: c_int) {
    // Safety: ensured by caller
    unsafe { &*v }.set(i);
}

/// # Safety
///
/// `v` must point to a live `atomic_t`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn atomic_read(v: *const Atomic) -> c_int {
    // Safety: ensured by caller
    unsafe { &*v }.read()
}

/// # Safety
///
/// `p` must be valid for reading 4 bytes. It need not be aligned.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn get_unaligned_be32(p: *const c_void) -> u32 {
    // Safety: ensured by caller
    unsafe { unaligned::get_unaligned_be32_ptr(p.cast()) }
}

#[unsafe(no_mangle)]
pub extern "C" fn alloc_pages(gfp: c_int, order: c_uint) -> *mut c_void {
    page::alloc_pages(Gfp::from_raw(gfp), order)
        .map_or(ptr::null_mut(), |page| page.into_raw().as_ptr().cast())
}

#[unsafe(no_mangle)]
pub extern "C" fn alloc_page(gfp: c_int) -> *mut c_void {
    alloc_pages(gfp, 0)
}

/// # Safety
///
/// `addr` must be null or the address of a live block returned by [`alloc_pages`] with the same
/// `order`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn free_pages(addr: *mut c_void, order: c_uint) {
    let Some(addr) = NonNull::new(addr.cast::<u8>()) else {
        return;
    };

    // Safety: ensured by caller
    page::free_pages(unsafe { page::virt_to_page(addr, order) });
}

/// # Safety
///
/// `addr` must be null or the address of a live page returned by [`alloc_page`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn free_page(addr: *mut c_void) {
    // Safety: ensured by caller
    unsafe { free_pages(addr, 0) }
}

#[unsafe(no_mangle)]
pub extern "C" fn kzalloc(size: usize, gfp: c_int) -> *mut c_void {
    slab::kzalloc(size, Gfp::from_raw(gfp)).map_or(ptr::null_mut(), |obj| obj.as_ptr().cast())
}

#[unsafe(no_mangle)]
pub extern "C" fn kcalloc(n: usize, size: usize, gfp: c_int) -> *mut c_void {
    slab::kcalloc(n, size, Gfp::from_raw(gfp)).map_or(ptr::null_mut(), |obj| obj.as_ptr().cast())
}

/// # Safety
///
/// `obj` must be null or a live block returned by [`kzalloc`] or [`kcalloc`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn kfree(obj: *const c_void) {
    // Safety: ensured by caller
    unsafe { slab::kfree(obj.cast_mut().cast()) }
}

/// Returns null if either argument is negative or the pool record can't be allocated.
#[unsafe(no_mangle)]
pub extern "C" fn mempool_create_page_pool(min_nr: c_int, order: c_int) -> *mut MemPool {
    let (Ok(min_nr), Ok(order)) = (usize::try_from(min_nr), u32::try_from(order)) else {
        log::warn!("mempool_create_page_pool: invalid arguments ({min_nr}, {order})");
        return ptr::null_mut();
    };

    // Safety: `MemPool` is not zero-sized
    let Some(pool) = NonNull::new(unsafe { std::alloc::alloc(Layout::new::<MemPool>()) }) else {
        return ptr::null_mut();
    };
    let pool = pool.cast::<MemPool>();

    // Safety: freshly allocated with the layout of a `MemPool`
    unsafe { pool.write(MemPool::create_page_pool(min_nr, order)) };

    pool.as_ptr()
}

/// # Safety
///
/// `pool` must be null or a live pool returned by [`mempool_create_page_pool`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mempool_destroy(pool: *mut MemPool) {
    if pool.is_null() {
        return;
    }

    // Safety: ensured by caller. Dropping the pool runs the leak check.
    unsafe {
        ptr::drop_in_place(pool);
        std::alloc::dealloc(pool.cast(), Layout::new::<MemPool>());
    }
}

/// # Safety
///
/// `pool` must be a live pool returned by [`mempool_create_page_pool`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mempool_alloc(pool: *mut MemPool, gfp: c_int) -> *mut c_void {
    // Safety: ensured by caller
    let Some(pool) = (unsafe { pool.as_ref() }) else {
        return ptr::null_mut();
    };

    pool.alloc(Gfp::from_raw(gfp))
        .map_or(ptr::null_mut(), |element| element.into_raw().as_ptr().cast())
}

/// # Safety
///
/// `pool` must be a live pool and `element` null or an element obtained from that pool through
/// [`mempool_alloc`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mempool_free(element: *mut c_void, pool: *mut MemPool) {
    let Some(element) = NonNull::new(element.cast::<u8>()) else {
        return;
    };
    // Safety: ensured by caller
    let Some(pool) = (unsafe { pool.as_ref() }) else {
        return;
    };

    // Safety: ensured by caller, elements of this pool all have the pool's order
    pool.free(unsafe { page::virt_to_page(element, pool.order()) });
}

#[unsafe(no_mangle)]
#[allow(non_snake_case, reason = "kernel symbol name")]
pub extern "C" fn IS_ERR(ptr: *const c_void) -> bool {
    crate::error::is_err(ptr)
}
