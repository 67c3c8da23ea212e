// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Device-mapper message macros (`DMERR`, `DMCRIT`, ...).
//!
//! Every message goes to the `log` facade under the [`TARGET`] target and is prefixed with the
//! `DM_MSG_PREFIX` constant *in scope at the call site*, just like the C macros pick up the
//! `#define` of the including file.
//!
//! ```
//! use kcompat::{dmdebug, dmerr};
//!
//! const DM_MSG_PREFIX: &str = "dm bht";
//!
//! let depth = 3;
//! dmerr!("invalid depth {}", depth);
//! dmdebug!("tree built");
//! ```
//!
//! The kernel has no separate critical level in `log`, so [`dmcrit!`] logs at error level.

/// Log target of all device-mapper messages.
pub const TARGET: &str = "device-mapper";

#[doc(hidden)]
#[macro_export]
macro_rules! __dm_log {
    ($lvl:expr, $($arg:tt)+) => {
        $crate::__private::log::log!(
            target: $crate::dm::TARGET,
            $lvl,
            "{}: {}",
            DM_MSG_PREFIX,
            ::core::format_args!($($arg)+)
        )
    };
}

/// `DMCRIT`
#[macro_export]
macro_rules! dmcrit {
    ($($arg:tt)+) => {
        $crate::__dm_log!($crate::__private::log::Level::Error, $($arg)+)
    };
}

/// `DMERR`
#[macro_export]
macro_rules! dmerr {
    ($($arg:tt)+) => {
        $crate::__dm_log!($crate::__private::log::Level::Error, $($arg)+)
    };
}

/// `DMWARN`
#[macro_export]
macro_rules! dmwarn {
    ($($arg:tt)+) => {
        $crate::__dm_log!($crate::__private::log::Level::Warn, $($arg)+)
    };
}

/// `DMINFO`
#[macro_export]
macro_rules! dminfo {
    ($($arg:tt)+) => {
        $crate::__dm_log!($crate::__private::log::Level::Info, $($arg)+)
    };
}

/// `DMDEBUG`
#[macro_export]
macro_rules! dmdebug {
    ($($arg:tt)+) => {
        $crate::__dm_log!($crate::__private::log::Level::Debug, $($arg)+)
    };
}
