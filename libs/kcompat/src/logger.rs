// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! A minimal `log` backend writing to standard error.
//!
//! Messages are printed as `[LEVEL target] message`, one per line. Binaries embedding the shim
//! should call [`init`] (or [`init_default`]) once at startup; the mempool leak diagnostic and the
//! `dm*!` messages are invisible otherwise.

use std::io::Write;

use log::{LevelFilter, Metadata, Record, SetLoggerError};

use crate::kconfig;

static LOGGER: Logger = Logger;

struct Logger;

/// Installs the stderr logger with the given maximum level.
///
/// # Errors
///
/// Returns an error if a logger has already been installed. The maximum level is left untouched
/// in that case.
pub fn init(filter: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(filter);
    Ok(())
}

/// Installs the stderr logger at [`kconfig::LOG_LEVEL`].
///
/// # Errors
///
/// Returns an error if a logger has already been installed.
pub fn init_default() -> Result<(), SetLoggerError> {
    init(kconfig::LOG_LEVEL.to_level_filter())
}

fn write_record(w: &mut impl Write, record: &Record) -> std::io::Result<()> {
    writeln!(
        w,
        "[{:<5} {}] {}",
        record.level(),
        record.target(),
        record.args()
    )
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            // nowhere left to report a failing stderr
            let _ = write_record(&mut std::io::stderr().lock(), record);
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[cfg(test)]
mod tests {
    use log::Level;

    use super::*;

    fn line(level: Level, target: &str, args: core::fmt::Arguments<'_>) -> String {
        let mut out = Vec::new();
        write_record(
            &mut out,
            &Record::builder()
                .level(level)
                .target(target)
                .args(args)
                .build(),
        )
        .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn line_format() {
        assert_eq!(
            line(Level::Error, "mempool", format_args!("ALL ELEMENTS NOT RETURNED TO MEMPOOL")),
            "[ERROR mempool] ALL ELEMENTS NOT RETURNED TO MEMPOOL\n"
        );
        assert_eq!(
            line(Level::Warn, "device-mapper", format_args!("dm bht: {}", 3)),
            "[WARN  device-mapper] dm bht: 3\n"
        );
        assert_eq!(
            line(Level::Info, "kcompat::page", format_args!("hi")),
            "[INFO  kcompat::page] hi\n"
        );
    }
}
