// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

#![allow(unused, reason = "not used by all tests")]

use std::sync::Once;
use std::thread::{self, ThreadId};

use log::{Level, LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub level: Level,
    pub target: String,
    pub message: String,
}

/// Records every log message together with the thread that emitted it.
///
/// The test harness runs every test on its own thread, so filtering by thread keeps the tests of
/// one binary from seeing each other's records.
struct CaptureLogger {
    records: Mutex<Vec<(ThreadId, Captured)>>,
}

static LOGGER: CaptureLogger = CaptureLogger {
    records: Mutex::new(Vec::new()),
};

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.records.lock().push((
            thread::current().id(),
            Captured {
                level: record.level(),
                target: record.target().to_owned(),
                message: record.args().to_string(),
            },
        ));
    }

    fn flush(&self) {}
}

/// Installs the capturing logger, once per test binary.
pub fn capture_logs() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(LevelFilter::Trace);
    });
}

/// All records logged by the current thread so far at `level` or above.
pub fn captured(level: Level) -> Vec<Captured> {
    let me = thread::current().id();
    LOGGER
        .records
        .lock()
        .iter()
        .filter(|(id, rec)| *id == me && rec.level <= level)
        .map(|(_, rec)| rec.clone())
        .collect()
}

/// How often the current thread logged the mempool leak diagnostic.
pub fn leak_diagnostics() -> usize {
    captured(Level::Error)
        .iter()
        .filter(|rec| rec.message == "ALL ELEMENTS NOT RETURNED TO MEMPOOL")
        .count()
}
