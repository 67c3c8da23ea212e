// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! `module_init` / `module_exit` for code that is linked into a regular process.
//!
//! Every [`module_init!`] registration is collected at link time into the [`INITCALLS`]
//! distributed slice. A single call to [`do_initcalls`] early in `main` (or in a test fixture)
//! then runs each of them exactly once. Their relative order is whatever the linker produced: not
//! specified, but stable for a given build.
//!
//! There is no module unloading in user space, the end of the process is the end of every module,
//! so [`module_exit!`] only type-checks its argument.
//!
//! ```
//! use kcompat::{Errno, module_exit, module_init};
//!
//! fn sha256_mod_init() -> Result<(), Errno> {
//!     Ok(())
//! }
//!
//! fn sha256_mod_fini() {}
//!
//! module_init!(sha256_mod_init);
//! module_exit!(sha256_mod_fini);
//!
//! kcompat::module::do_initcalls().unwrap();
//! ```

use std::sync::Once;

use linkme::distributed_slice;

use crate::error::Errno;

/// Signature of a module init function.
pub type InitFn = fn() -> Result<(), Errno>;

/// A registered module init function.
#[derive(Debug)]
pub struct InitCall {
    module: &'static str,
    name: &'static str,
    init: InitFn,
}

impl InitCall {
    #[doc(hidden)]
    #[must_use]
    pub const fn new(module: &'static str, name: &'static str, init: InitFn) -> Self {
        Self { module, name, init }
    }

    /// The module path the registration was made from.
    #[must_use]
    pub fn module(&self) -> &'static str {
        self.module
    }

    /// The name of the init function.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    fn call(&self) -> Result<(), Errno> {
        log::debug!("calling {}::{}", self.module, self.name);
        let res = (self.init)();
        if let Err(err) = res {
            log::error!("initcall {}::{} failed: {err}", self.module, self.name);
        }
        res
    }
}

/// All `module_init!` registrations linked into this binary.
#[distributed_slice]
pub static INITCALLS: [InitCall];

/// Register a function to run once at startup (`module_init`).
///
/// The function must have the signature `fn() -> Result<(), Errno>`.
#[macro_export]
macro_rules! module_init {
    ($init:path) => {
        const _: () = {
            #[$crate::__private::linkme::distributed_slice($crate::module::INITCALLS)]
            #[linkme(crate = $crate::__private::linkme)]
            static INITCALL: $crate::module::InitCall = $crate::module::InitCall::new(
                ::core::module_path!(),
                ::core::stringify!($init),
                $init,
            );
        };
    };
}

/// Accept a module exit function (`module_exit`). It is never called.
#[macro_export]
macro_rules! module_exit {
    ($exit:path) => {
        const _: fn() = $exit;
    };
}

/// Run a module init function directly (`CALL_MODULE_INIT`).
///
/// This works whether or not [`do_initcalls`] has already run it, in which case the function runs
/// a second time. Making repeated initialization harmless is up to the function.
#[macro_export]
macro_rules! call_module_init {
    ($init:path) => {
        $crate::module::call_init(::core::module_path!(), ::core::stringify!($init), $init)
    };
}

#[doc(hidden)]
pub fn call_init(module: &'static str, name: &'static str, init: InitFn) -> Result<(), Errno> {
    InitCall::new(module, name, init).call()
}

/// Runs every registered initcall, once per process.
///
/// A failing initcall is logged and does not prevent the remaining ones from running. The first
/// failure is returned to the caller that actually ran the initcalls; later calls return `Ok(())`
/// without doing anything.
///
/// # Errors
///
/// Returns the error of the first initcall that failed.
pub fn do_initcalls() -> Result<(), Errno> {
    static ONCE: Once = Once::new();

    let mut res = Ok(());
    ONCE.call_once(|| {
        log::debug!("running {} initcall(s)", INITCALLS.len());
        for initcall in INITCALLS.iter() {
            let r = initcall.call();
            if res.is_ok() {
                res = r;
            }
        }
    });
    res
}
