// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Standard error enum for peripheral operations.

use core::fmt;

/// Errors returned by the peripheral drivers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum ErrorCode {
    /// Generic failure condition
    FAIL = 0,
    /// Underlying system is busy; retry
    BUSY = 1,
    /// The state requested is already set
    ALREADY = 2,
    /// An invalid parameter was passed
    INVAL = 5,
    /// Parameter passed was too large
    SIZE = 6,
    /// Operation or command is unsupported
    NOSUPPORT = 9,
}

impl From<ErrorCode> for usize {
    fn from(err: ErrorCode) -> usize {
        err as usize
    }
}

impl From<bitreg::Error> for ErrorCode {
    fn from(err: bitreg::Error) -> ErrorCode {
        match err {
            bitreg::Error::ReadOnly { .. }
            | bitreg::Error::WriteOnly { .. }
            | bitreg::Error::NotABit { .. }
            | bitreg::Error::NotClearable { .. }
            | bitreg::Error::NotSeparable => ErrorCode::NOSUPPORT,
            bitreg::Error::ValueTooWide { .. } => ErrorCode::SIZE,
            bitreg::Error::DuplicateField { .. } => ErrorCode::INVAL,
            bitreg::Error::UnknownValue { .. } => ErrorCode::FAIL,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ErrorCode::FAIL => "FAIL",
            ErrorCode::BUSY => "BUSY",
            ErrorCode::ALREADY => "ALREADY",
            ErrorCode::INVAL => "INVAL",
            ErrorCode::SIZE => "SIZE",
            ErrorCode::NOSUPPORT => "NOSUPPORT",
        };
        f.write_str(name)
    }
}

/// Polls `done` up to `attempts` times, giving up with `BUSY`.
pub fn poll(attempts: usize, mut done: impl FnMut() -> Result<bool, ErrorCode>) -> Result<(), ErrorCode> {
    for _ in 0..attempts {
        if done()? {
            return Ok(());
        }
    }
    Err(ErrorCode::BUSY)
}
