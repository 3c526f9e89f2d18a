// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Debug output for the register layer.
//!
//! A board installs a writer once with [`set_debug_writer`]. Until then
//! every `debug!` message is dropped.
//!
//! ```rust
//! # fn main() {}
//! use bitreg::debug;
//!
//! fn report(latency: u32) {
//!     debug!("flash latency set to {} wait states", latency);
//! }
//! ```

use core::cell::Cell;
use core::fmt::{self, Arguments, Write};

use critical_section::Mutex;

/// Sink for debug output, usually a UART or a semihosting channel.
pub trait IoWrite: Sync {
    fn write(&self, buf: &[u8]);
}

static DEBUG_WRITER: Mutex<Cell<Option<&'static dyn IoWrite>>> = Mutex::new(Cell::new(None));

pub fn set_debug_writer(writer: &'static dyn IoWrite) {
    critical_section::with(|cs| DEBUG_WRITER.borrow(cs).set(Some(writer)));
}

struct DebugWriter {
    writer: &'static dyn IoWrite,
}

impl Write for DebugWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.writer.write(s.as_bytes());
        Ok(())
    }
}

fn debug_writer() -> Option<DebugWriter> {
    critical_section::with(|cs| DEBUG_WRITER.borrow(cs).get()).map(|writer| DebugWriter { writer })
}

pub fn begin_debug_fmt(args: Arguments, file_line: &(&'static str, u32)) {
    if let Some(mut writer) = debug_writer() {
        let (file, line) = *file_line;
        let _ = writer.write_fmt(format_args!("BITREG_DEBUG: {}:{}: ", file, line));
        let _ = writer.write_fmt(args);
        let _ = writer.write_str("\r\n");
    }
}

pub fn begin_debug(msg: &str, file_line: &(&'static str, u32)) {
    begin_debug_fmt(format_args!("{}", msg), file_line)
}

/// Print a line on the debug output, prefixed with the file and line.
#[macro_export]
macro_rules! debug {
    () => ({
        // Allow an empty debug!() to print the location when hit
        $crate::debug!("")
    });
    ($msg:expr) => ({
        $crate::debug::begin_debug($msg, {
            static _FILE_LINE: (&'static str, u32) = (file!(), line!());
            &_FILE_LINE
        })
    });
    ($fmt:expr, $($arg:tt)+) => ({
        $crate::debug::begin_debug_fmt(format_args!($fmt, $($arg)+), {
            static _FILE_LINE: (&'static str, u32) = (file!(), line!());
            &_FILE_LINE
        })
    });
}

#[cfg(test)]
mod tests {
    use std::string::String;
    use std::sync::Mutex;
    use std::vec::Vec;

    struct Capture(Mutex<Vec<u8>>);

    impl super::IoWrite for Capture {
        fn write(&self, buf: &[u8]) {
            self.0.lock().unwrap().extend_from_slice(buf);
        }
    }

    static CAPTURE: Capture = Capture(Mutex::new(Vec::new()));

    #[test]
    fn messages_reach_the_installed_writer() {
        super::set_debug_writer(&CAPTURE);
        debug!("latency {}", 5);

        let out = String::from_utf8(CAPTURE.0.lock().unwrap().clone()).unwrap();
        assert!(out.starts_with("BITREG_DEBUG: "));
        assert!(out.contains("debug.rs"));
        assert!(out.contains("latency 5\r\n"));
    }
}
