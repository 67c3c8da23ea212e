// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Per-CPU variables, collapsed onto a single CPU.
//!
//! User space has no notion of "the current CPU", so every [`define_per_cpu!`] declaration owns
//! exactly one slot for the whole process. On a real kernel `get_cpu_var` disables preemption
//! until the matching `put_cpu_var`, here the same window is modeled by the guard returned from
//! [`PerCpu::get`]: nobody else can touch the slot while it is alive.
//!
//! ```
//! use kcompat::{define_per_cpu, get_cpu_var, put_cpu_var};
//!
//! define_per_cpu! {
//!     static VERIFIED_BLOCKS: u64 = 0;
//! }
//!
//! {
//!     let mut count = get_cpu_var!(VERIFIED_BLOCKS);
//!     *count += 1;
//! }
//! put_cpu_var!(VERIFIED_BLOCKS);
//!
//! assert_eq!(*get_cpu_var!(VERIFIED_BLOCKS), 1);
//! ```

use core::fmt;

use parking_lot::{Mutex, MutexGuard};

/// Declare one or more per-CPU variables (`DEFINE_PER_CPU`).
#[macro_export]
macro_rules! define_per_cpu {
    () => {};
    ($(#[$attr:meta])* $vis:vis static $name:ident: $t:ty = $init:expr; $($rest:tt)*) => {
        $(#[$attr])* $vis static $name: $crate::percpu::PerCpu<$t> = $crate::percpu::PerCpu::new($init);
        $crate::define_per_cpu!($($rest)*);
    };
    ($(#[$attr:meta])* $vis:vis static $name:ident: $t:ty = $init:expr) => {
        $(#[$attr])* $vis static $name: $crate::percpu::PerCpu<$t> = $crate::percpu::PerCpu::new($init);
    };
}

/// Access the current CPU's instance of a per-CPU variable (`get_cpu_var`).
#[macro_export]
macro_rules! get_cpu_var {
    ($name:expr) => {
        $name.get()
    };
}

/// Access the current CPU's instance of a per-CPU variable without the preemption bracket
/// (`__get_cpu_var`). With a single slot this is the same as [`get_cpu_var!`].
#[macro_export]
macro_rules! __get_cpu_var {
    ($name:expr) => {
        $name.get()
    };
}

/// End a [`get_cpu_var!`] section (`put_cpu_var`). Does nothing.
#[macro_export]
macro_rules! put_cpu_var {
    ($name:expr) => {
        $name.put()
    };
}

/// Storage behind a [`define_per_cpu!`] declaration.
pub struct PerCpu<T> {
    slot: Mutex<T>,
}

impl<T> PerCpu<T> {
    #[must_use]
    pub const fn new(init: T) -> Self {
        Self {
            slot: Mutex::new(init),
        }
    }

    /// Returns exclusive access to the slot.
    ///
    /// Calling this again while a previous guard is still alive on the same thread deadlocks,
    /// just like taking a non-recursive lock twice.
    #[inline]
    pub fn get(&self) -> MutexGuard<'_, T> {
        self.slot.lock()
    }

    /// Counterpart to [`PerCpu::get`]. Preemption does not exist in user space, so there is
    /// nothing to re-enable; the guard itself releases the slot.
    #[inline]
    pub fn put(&self) {}
}

impl<T: fmt::Debug> fmt::Debug for PerCpu<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerCpu").field("slot", &self.slot).finish()
    }
}
