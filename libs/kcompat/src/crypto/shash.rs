// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Synchronous hash ("shash") algorithm registry.
//!
//! Algorithms register a `'static` [`ShashAlg`] descriptor, usually from a [`module_init!`]
//! function. The registry keeps a reference to the descriptor (not a copy) keyed by name, so a
//! lookup through [`find_shash`] yields the very same descriptor until the process exits.
//!
//! Registering a second, *different* descriptor under a name that is already taken fails with
//! [`Errno::AlreadyExists`] and leaves the first registration in place. Registering the *same*
//! descriptor again is a no-op. There is no module unload in user space, so
//! [`unregister_shash`] doesn't remove anything.
//!
//! [`module_init!`]: crate::module_init

use core::{fmt, ptr};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use parking_lot::Mutex;

use crate::error::Errno;

/// The largest digest any registered algorithm may produce.
pub const HASH_MAX_DIGESTSIZE: usize = 64;

pub type ShashInitFn = fn(&mut ShashDesc) -> Result<(), Errno>;
pub type ShashUpdateFn = fn(&mut ShashDesc, &[u8]) -> Result<(), Errno>;
pub type ShashFinalFn = fn(&mut ShashDesc, &mut [u8]) -> Result<(), Errno>;

/// Descriptor of a synchronous hash algorithm (`struct shash_alg`).
#[derive(Debug)]
pub struct ShashAlg {
    /// The name the algorithm is looked up by, e.g. `"sha256"`.
    pub name: &'static str,
    /// Size of the produced digest in bytes.
    pub digest_size: usize,
    /// Size of the input block in bytes.
    pub block_size: usize,
    /// Size of the per-descriptor hash state in bytes.
    pub desc_size: usize,
    pub init: Option<ShashInitFn>,
    pub update: Option<ShashUpdateFn>,
    pub finalize: Option<ShashFinalFn>,
}

#[derive(Clone, Copy)]
struct ShashOps {
    init: ShashInitFn,
    update: ShashUpdateFn,
    finalize: ShashFinalFn,
}

impl ShashAlg {
    fn ops(&self) -> Result<ShashOps, Errno> {
        match (self.init, self.update, self.finalize) {
            (Some(init), Some(update), Some(finalize)) => Ok(ShashOps {
                init,
                update,
                finalize,
            }),
            _ => Err(Errno::InvalidArgument),
        }
    }

    fn validate(&self) -> Result<ShashOps, Errno> {
        if self.name.is_empty()
            || self.digest_size == 0
            || self.digest_size > HASH_MAX_DIGESTSIZE
            || self.block_size == 0
        {
            return Err(Errno::InvalidArgument);
        }

        self.ops()
    }
}

static SHASH_ALGS: Mutex<BTreeMap<&'static str, &'static ShashAlg>> = Mutex::new(BTreeMap::new());

/// Adds `alg` to the registry (`crypto_register_shash`).
///
/// # Errors
///
/// - [`Errno::InvalidArgument`] if `alg` has an empty name, a digest size of zero or above
///   [`HASH_MAX_DIGESTSIZE`], a block size of zero, or lacks one of its functions.
/// - [`Errno::AlreadyExists`] if a different descriptor is already registered under the same name.
pub fn register_shash(alg: &'static ShashAlg) -> Result<(), Errno> {
    if let Err(err) = alg.validate() {
        log::warn!("rejecting malformed shash algorithm {:?}", alg.name);
        return Err(err);
    }

    match SHASH_ALGS.lock().entry(alg.name) {
        Entry::Occupied(entry) if ptr::eq(*entry.get(), alg) => {
            log::debug!("shash algorithm {:?} is already registered", alg.name);
            Ok(())
        }
        Entry::Occupied(_) => {
            log::warn!(
                "shash algorithm {:?} is already registered by a different descriptor",
                alg.name
            );
            Err(Errno::AlreadyExists)
        }
        Entry::Vacant(entry) => {
            log::debug!(
                "registered shash algorithm {:?} (digest {} bytes, block {} bytes)",
                alg.name,
                alg.digest_size,
                alg.block_size
            );
            entry.insert(alg);
            Ok(())
        }
    }
}

/// Counterpart to [`register_shash`] (`crypto_unregister_shash`).
///
/// Modules are never unloaded in user space, the registration stays in place and this always
/// succeeds.
///
/// # Errors
///
/// Never returns an error.
pub fn unregister_shash(alg: &'static ShashAlg) -> Result<(), Errno> {
    log::trace!("unregister_shash({:?}) ignored", alg.name);
    Ok(())
}

/// Looks up a registered algorithm by name.
///
/// # Errors
///
/// Returns [`Errno::NotFound`] if no algorithm with that name was registered.
pub fn find_shash(name: &str) -> Result<&'static ShashAlg, Errno> {
    SHASH_ALGS.lock().get(name).copied().ok_or(Errno::NotFound)
}

/// A hashing operation in progress (`struct shash_desc`).
///
/// The descriptor owns `desc_size` bytes of zero-initialized state that the algorithm's functions
/// reach through [`ShashDesc::ctx_mut`].
pub struct ShashDesc {
    tfm: &'static ShashAlg,
    ops: ShashOps,
    ctx: Box<[u8]>,
}

impl ShashDesc {
    /// Creates a descriptor for `alg`.
    ///
    /// # Errors
    ///
    /// Returns [`Errno::InvalidArgument`] if `alg` is malformed (see [`register_shash`]) and
    /// [`Errno::NoMemory`] if the hash state can't be allocated.
    pub fn new(alg: &'static ShashAlg) -> Result<Self, Errno> {
        let ops = alg.validate()?;

        let mut ctx = Vec::new();
        ctx.try_reserve_exact(alg.desc_size)
            .map_err(|_| Errno::NoMemory)?;
        ctx.resize(alg.desc_size, 0);

        Ok(Self {
            tfm: alg,
            ops,
            ctx: ctx.into_boxed_slice(),
        })
    }

    /// The algorithm this descriptor runs.
    #[must_use]
    pub fn alg(&self) -> &'static ShashAlg {
        self.tfm
    }

    /// The algorithm's private state.
    #[must_use]
    pub fn ctx(&self) -> &[u8] {
        &self.ctx
    }

    /// The algorithm's private state.
    #[must_use]
    pub fn ctx_mut(&mut self) -> &mut [u8] {
        &mut self.ctx
    }

    /// Resets the hash state (`crypto_shash_init`).
    ///
    /// # Errors
    ///
    /// Returns whatever the algorithm's init function reports.
    pub fn init(&mut self) -> Result<(), Errno> {
        let init = self.ops.init;
        init(self)
    }

    /// Feeds `data` into the hash (`crypto_shash_update`).
    ///
    /// # Errors
    ///
    /// Returns whatever the algorithm's update function reports.
    pub fn update(&mut self, data: &[u8]) -> Result<(), Errno> {
        let update = self.ops.update;
        update(self, data)
    }

    /// Writes the digest into the first `digest_size` bytes of `out` (`crypto_shash_final`).
    ///
    /// # Errors
    ///
    /// Returns [`Errno::InvalidArgument`] if `out` is shorter than the digest, otherwise whatever
    /// the algorithm's final function reports.
    pub fn finalize(&mut self, out: &mut [u8]) -> Result<(), Errno> {
        let Some(out) = out.get_mut(..self.tfm.digest_size) else {
            return Err(Errno::InvalidArgument);
        };

        let finalize = self.ops.finalize;
        finalize(self, out)
    }

    /// Hashes `data` in one go (`crypto_shash_digest`).
    ///
    /// # Errors
    ///
    /// See [`ShashDesc::init`], [`ShashDesc::update`] and [`ShashDesc::finalize`].
    pub fn digest(&mut self, data: &[u8], out: &mut [u8]) -> Result<(), Errno> {
        self.init()?;
        self.update(data)?;
        self.finalize(out)
    }
}

impl fmt::Debug for ShashDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShashDesc")
            .field("tfm", &self.tfm.name)
            .field("ctx", &self.ctx.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum_init(desc: &mut ShashDesc) -> Result<(), Errno> {
        desc.ctx_mut().fill(0);
        Ok(())
    }

    fn sum_update(desc: &mut ShashDesc, data: &[u8]) -> Result<(), Errno> {
        let ctx: &mut [u8; 4] = desc
            .ctx_mut()
            .first_chunk_mut()
            .ok_or(Errno::InvalidArgument)?;
        let sum = data
            .iter()
            .fold(u32::from_le_bytes(*ctx), |acc, b| acc.wrapping_add(u32::from(*b)));
        *ctx = sum.to_le_bytes();
        Ok(())
    }

    fn sum_final(desc: &mut ShashDesc, out: &mut [u8]) -> Result<(), Errno> {
        let ctx: [u8; 4] = *desc.ctx().first_chunk().ok_or(Errno::InvalidArgument)?;
        out.copy_from_slice(&u32::from_le_bytes(ctx).to_be_bytes());
        Ok(())
    }

    const fn sum32(name: &'static str) -> ShashAlg {
        ShashAlg {
            name,
            digest_size: 4,
            block_size: 1,
            desc_size: 4,
            init: Some(sum_init),
            update: Some(sum_update),
            finalize: Some(sum_final),
        }
    }

    #[test_log::test]
    fn first_registration_wins() {
        static FIRST: ShashAlg = sum32("sum32-first-wins");
        static SECOND: ShashAlg = sum32("sum32-first-wins");

        assert_eq!(register_shash(&FIRST), Ok(()));
        assert_eq!(register_shash(&SECOND), Err(Errno::AlreadyExists));
        assert!(ptr::eq(find_shash("sum32-first-wins").unwrap(), &FIRST));
    }

    #[test_log::test]
    fn same_descriptor_is_idempotent() {
        static ALG: ShashAlg = sum32("sum32-idempotent");

        assert_eq!(register_shash(&ALG), Ok(()));
        assert_eq!(register_shash(&ALG), Ok(()));
        assert!(ptr::eq(find_shash("sum32-idempotent").unwrap(), &ALG));
    }

    #[test_log::test]
    fn unregister_keeps_entry() {
        static ALG: ShashAlg = sum32("sum32-unregister");

        register_shash(&ALG).unwrap();
        assert_eq!(unregister_shash(&ALG), Ok(()));
        assert!(ptr::eq(find_shash("sum32-unregister").unwrap(), &ALG));
    }

    #[test_log::test]
    fn malformed_descriptors() {
        static NO_NAME: ShashAlg = sum32("");
        static NO_DIGEST: ShashAlg = ShashAlg {
            digest_size: 0,
            ..sum32("sum32-no-digest")
        };
        static HUGE_DIGEST: ShashAlg = ShashAlg {
            digest_size: HASH_MAX_DIGESTSIZE + 1,
            ..sum32("sum32-huge-digest")
        };
        static NO_BLOCK: ShashAlg = ShashAlg {
            block_size: 0,
            ..sum32("sum32-no-block")
        };
        static NO_FINAL: ShashAlg = ShashAlg {
            finalize: None,
            ..sum32("sum32-no-final")
        };

        for alg in [&NO_NAME, &NO_DIGEST, &HUGE_DIGEST, &NO_BLOCK, &NO_FINAL] {
            assert_eq!(register_shash(alg), Err(Errno::InvalidArgument), "{}", alg.name);
            assert_eq!(find_shash(alg.name).unwrap_err(), Errno::NotFound);
        }
    }

    #[test_log::test]
    fn unknown_name() {
        assert_eq!(find_shash("sum32-never-registered").unwrap_err(), Errno::NotFound);
    }

    #[test_log::test]
    fn desc_runs_algorithm() {
        static ALG: ShashAlg = sum32("sum32-desc");
        register_shash(&ALG).unwrap();

        let mut desc = ShashDesc::new(find_shash("sum32-desc").unwrap()).unwrap();
        assert_eq!(desc.ctx().len(), 4);

        let mut digest = [0_u8; 8];
        desc.digest(b"abc", &mut digest).unwrap();
        assert_eq!(digest, [0, 0, 0x01, 0x26, 0, 0, 0, 0]);

        desc.init().unwrap();
        desc.update(b"ab").unwrap();
        desc.update(b"c").unwrap();
        let mut again = [0_u8; 4];
        desc.finalize(&mut again).unwrap();
        assert_eq!(again, digest[..4]);
    }

    #[test_log::test]
    fn desc_short_output() {
        static ALG: ShashAlg = sum32("sum32-short-out");

        let mut desc = ShashDesc::new(&ALG).unwrap();
        desc.init().unwrap();
        assert_eq!(desc.finalize(&mut [0; 3]), Err(Errno::InvalidArgument));
    }
}
