// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The kernel's `atomic_t`.
//!
//! All three operations are sequentially consistent. That is stronger than the release store
//! `atomic_set` is required to be, but it keeps the cell trivially correct for the handful of
//! state machines (`dm_bht_entry::state`) that are built on it.

use core::fmt;

use crate::loom::sync::atomic::{AtomicI32, Ordering};

/// A signed 32-bit integer that is only ever accessed atomically.
///
/// The counter itself is private, there is no way to read or write it non-atomically.
#[repr(transparent)]
pub struct Atomic {
    counter: AtomicI32,
}

impl Atomic {
    /// Creates a new cell holding `val` (`ATOMIC_INIT`).
    #[cfg(not(loom))]
    #[must_use]
    pub const fn new(val: i32) -> Self {
        Self {
            counter: AtomicI32::new(val),
        }
    }

    #[cfg(loom)]
    #[must_use]
    pub fn new(val: i32) -> Self {
        Self {
            counter: AtomicI32::new(val),
        }
    }

    /// Returns the current value (`atomic_read`).
    #[inline]
    pub fn read(&self) -> i32 {
        self.counter.load(Ordering::SeqCst)
    }

    /// Stores `val` (`atomic_set`).
    ///
    /// Any write made by this thread before the `set` is visible to a thread that observes `val`
    /// through [`Atomic::read`] or [`Atomic::cmpxchg`].
    #[inline]
    pub fn set(&self, val: i32) {
        self.counter.store(val, Ordering::SeqCst);
    }

    /// Replaces the value with `new` if it currently equals `old` (`atomic_cmpxchg`).
    ///
    /// Returns the value observed before the operation, whether or not the exchange happened.
    /// The exchange took place exactly when the returned value equals `old`.
    #[inline]
    pub fn cmpxchg(&self, old: i32, new: i32) -> i32 {
        match self
            .counter
            .compare_exchange(old, new, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(prev) | Err(prev) => prev,
        }
    }
}

impl Default for Atomic {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Debug for Atomic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Atomic").field(&self.read()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loom;
    use crate::loom::cell::UnsafeCell;
    use crate::loom::sync::Arc;
    use crate::loom::thread;

    #[test]
    #[cfg_attr(loom, ignore = "not concurrency-relevant")]
    fn cmpxchg_sequence() {
        let a = Atomic::new(0);

        assert_eq!(a.cmpxchg(0, 7), 0);
        assert_eq!(a.read(), 7);
        assert_eq!(a.cmpxchg(0, 9), 7);
        assert_eq!(a.read(), 7);
    }

    #[test]
    #[cfg_attr(loom, ignore = "not concurrency-relevant")]
    fn set_then_read() {
        let a = Atomic::default();
        a.set(-3);
        assert_eq!(a.read(), -3);
        assert_eq!(format!("{a:?}"), "Atomic(-3)");
    }

    #[cfg(not(loom))]
    proptest::proptest! {
        #[test]
        fn cmpxchg_law(old: i32, new: i32, v: i32) {
            let a = Atomic::new(0);
            a.set(v);

            proptest::prop_assert_eq!(a.cmpxchg(old, new), v);
            if v == old {
                proptest::prop_assert_eq!(a.read(), new);
            } else {
                proptest::prop_assert_eq!(a.read(), v);
            }
        }
    }

    struct Published {
        payload: UnsafeCell<u64>,
        ready: Atomic,
    }

    // Safety: `payload` is only written before `ready` is set and only read after it was observed
    unsafe impl Sync for Published {}

    #[test]
    fn set_publishes_prior_writes() {
        loom::model(|| {
            let shared = Arc::new(Published {
                payload: UnsafeCell::new(0),
                ready: Atomic::new(0),
            });

            let producer = {
                let shared = shared.clone();
                thread::spawn(move || {
                    // Safety: the consumer doesn't read `payload` before `ready == 1`
                    shared.payload.with_mut(|p| unsafe { *p = 0xdead_beef });
                    shared.ready.set(1);
                })
            };

            if shared.ready.read() == 1 {
                // Safety: observing `ready == 1` orders us after the producer's write
                let payload = shared.payload.with(|p| unsafe { *p });
                assert_eq!(payload, 0xdead_beef);
            }

            producer.join().unwrap();
            assert_eq!(shared.ready.read(), 1);
        });
    }

    #[test]
    fn cmpxchg_is_exclusive() {
        loom::model(|| {
            let a = Arc::new(Atomic::new(0));

            let handles: Vec<_> = (1..=2)
                .map(|id| {
                    let a = a.clone();
                    thread::spawn(move || a.cmpxchg(0, id) == 0)
                })
                .collect();

            let winners = handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|won| *won)
                .count();

            assert_eq!(winners, 1);
            assert_ne!(a.read(), 0);
        });
    }
}
