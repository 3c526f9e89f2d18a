// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

use core::fmt;

/// Requests rejected by the register layer.
///
/// Every error is raised before the bus is touched.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Attempt to write a read-only field.
    ReadOnly { field: &'static str },
    /// Attempt to read a write-only field.
    WriteOnly { field: &'static str },
    /// Value does not fit in the field.
    ValueTooWide {
        field: &'static str,
        value: u32,
        max: u32,
    },
    /// Raw field bits have no symbolic value.
    UnknownValue { field: &'static str, raw: u32 },
    /// Single-bit operation on a wider field.
    NotABit { field: &'static str },
    /// Storing 0 into this field has no effect on the hardware.
    NotClearable { field: &'static str },
    /// The same field appears twice in one request.
    DuplicateField { field: &'static str },
    /// The fields cannot be written through one byte or halfword lane
    /// without touching an isolated field.
    NotSeparable,
}

pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Error::*;

        match self {
            ReadOnly { field } => write!(f, "field {} is read-only", field),
            WriteOnly { field } => write!(f, "field {} is write-only", field),
            ValueTooWide { field, value, max } => write!(
                f,
                "value {:#x} does not fit field {} (max {:#x})",
                value, field, max
            ),
            UnknownValue { field, raw } => {
                write!(f, "field {} holds unknown value {:#x}", field, raw)
            }
            NotABit { field } => write!(f, "field {} is wider than one bit", field),
            NotClearable { field } => write!(f, "field {} cannot be cleared by writing 0", field),
            DuplicateField { field } => write!(f, "field {} named more than once", field),
            NotSeparable => write!(f, "fields do not share an isolated access lane"),
        }
    }
}
