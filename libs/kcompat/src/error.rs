// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use core::ffi::c_int;
use core::fmt::{Display, Formatter};
use core::ptr::NonNull;

/// Status codes returned next to (instead of encoded in) pointers.
///
/// The kernel folds `-errno` values into the top page of the address space (`ERR_PTR`). User-space
/// pointers can't be trusted to stay out of that range, so the error pointer here is just null
/// and the reason travels separately as an `Errno`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Errno {
    /// The system was not able to allocate memory needed for the operation.
    NoMemory,
    /// An argument is invalid.
    InvalidArgument,
    /// An object with the same identifier already exists.
    AlreadyExists,
    /// No object with the specified identifier exists.
    NotFound,
}

impl Errno {
    /// The positive errno value (`ENOMEM`, `EINVAL`, ...).
    #[must_use]
    pub const fn errno(self) -> c_int {
        match self {
            Errno::NoMemory => 12,
            Errno::InvalidArgument => 22,
            Errno::AlreadyExists => 17,
            Errno::NotFound => 2,
        }
    }

    /// The negative value kernel functions return on failure.
    #[must_use]
    pub const fn to_errno(self) -> c_int {
        -self.errno()
    }
}

impl Display for Errno {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Errno::NoMemory => write!(f, "Out of memory"),
            Errno::InvalidArgument => write!(f, "Invalid argument"),
            Errno::AlreadyExists => write!(f, "An object with the same identifier already exists"),
            Errno::NotFound => write!(f, "No such object"),
        }
    }
}

impl core::error::Error for Errno {}

/// Converts a `Result` into the `0`/`-errno` convention of kernel return codes.
#[must_use]
pub fn errno_of(res: Result<(), Errno>) -> c_int {
    match res {
        Ok(()) => 0,
        Err(err) => err.to_errno(),
    }
}

/// Pointers that can be checked against the error sentinel (`IS_ERR`).
pub trait ErrPtr {
    /// Returns `true` iff this is the error sentinel, the null pointer.
    fn is_err(&self) -> bool;
}

impl<T: ?Sized> ErrPtr for *const T {
    fn is_err(&self) -> bool {
        self.is_null()
    }
}

impl<T: ?Sized> ErrPtr for *mut T {
    fn is_err(&self) -> bool {
        self.is_null()
    }
}

impl<T: ?Sized> ErrPtr for Option<NonNull<T>> {
    fn is_err(&self) -> bool {
        self.is_none()
    }
}

/// Returns `true` iff `ptr` is the error sentinel (`IS_ERR`).
#[inline]
#[must_use]
pub fn is_err<P: ErrPtr>(ptr: P) -> bool {
    ptr.is_err()
}

#[cfg(test)]
mod tests {
    use core::ptr;

    use super::*;

    #[test]
    fn null_is_err() {
        assert!(is_err(ptr::null::<u8>()));
        assert!(is_err(ptr::null_mut::<u32>()));
        assert!(is_err(None::<NonNull<u8>>));
    }

    #[test]
    fn valid_is_not_err() {
        let value = 5_u32;
        assert!(!is_err(&raw const value));
        assert!(!is_err(Some(NonNull::from(&value))));
    }

    #[test]
    fn kernel_values() {
        assert_eq!(Errno::NoMemory.to_errno(), -12);
        assert_eq!(Errno::InvalidArgument.to_errno(), -22);
        assert_eq!(Errno::AlreadyExists.to_errno(), -17);
        assert_eq!(errno_of(Ok(())), 0);
        assert_eq!(errno_of(Err(Errno::NotFound)), -2);
    }
}
