// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Typed bit-field register interface.
//!
//! Registers are declared as `static` descriptors: an address, a table of
//! bit-fields and an enumeration naming each field. All layout checks run
//! during constant evaluation, so a register with overlapping fields or a
//! mismatched name enumeration does not build. Accesses are addressed by
//! field name and go through a [`Bus`], which is volatile MMIO on hardware
//! and an emulated register file in tests.
//!
//! ```rust
//! # fn main() {}
//! use bitreg::{register_fields, BaseAddress, Offset, Register};
//!
//! register_fields! {
//!     /// Flash access control register.
//!     pub Acr [
//!         Latency OFFSET(0) NUMBITS(4) ReadWrite,
//!         PrftEn OFFSET(8) NUMBITS(1) ReadWrite,
//!         ICEn OFFSET(9) NUMBITS(1) ReadWrite,
//!         DCEn OFFSET(10) NUMBITS(1) ReadWrite,
//!         ICRst OFFSET(11) NUMBITS(1) ReadWrite,
//!         DCRst OFFSET(12) NUMBITS(1) ReadWrite
//!     ]
//! }
//!
//! pub static FLASH_ACR: Register<Acr> = Register::new(
//!     "FLASH_ACR",
//!     BaseAddress::new(0x4002_3C00),
//!     Offset::new(0x00),
//!     &Acr::FIELDS,
//! );
//! ```

#![no_std]

#[cfg(any(test, feature = "emulation"))]
extern crate std;

mod access;
mod bus;
mod config;
pub mod debug;
mod error;
mod field;
pub mod macros;
mod register;
pub mod strong;
mod value;

#[cfg(any(test, feature = "emulation"))]
pub mod emu;

pub use access::Access;
pub use bus::{Bus, Mmio, Width, Widths};
pub use error::{Error, Result};
pub use field::BitField;
pub use register::{Register, Snapshot};
pub use strong::{BaseAddress, Hertz, Millivolts, Offset, ResetValue};
pub use value::{Bounded, FieldValue};

/// Names the fields of one register.
///
/// Implemented by the enumerations generated with [`register_fields!`] and
/// [`field_names!`]. Ordinal `i` of the enumeration addresses descriptor `i`
/// of the register's field table.
pub trait FieldName: Copy + Eq + 'static {
    /// Number of fields, which must match the length of the field table.
    const COUNT: usize;

    /// Field names, indexed by ordinal. Used in errors and debug output.
    const NAMES: &'static [&'static str];

    fn index(self) -> usize;

    fn name(self) -> &'static str {
        Self::NAMES[self.index()]
    }
}
