// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Bit-field descriptors.

use crate::{Access, Error, Result};

/// Label used when a descriptor is used on its own, outside a register.
const UNNAMED: &str = "<unnamed>";

/// Position, width and access policy of one field in a 32-bit register.
///
/// Descriptors are built in constant context. The constructors panic during
/// constant evaluation when the field does not fit the register, so an
/// invalid `static` table is a build error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BitField {
    shift: u8,
    width: u8,
    access: Access,
}

impl BitField {
    pub const fn new(shift: u32, width: u32, access: Access) -> BitField {
        assert!(width >= 1 && width <= 32, "bit-field width must be 1..=32");
        assert!(shift < 32, "bit-field start must be 0..=31");
        assert!(shift + width <= 32, "bit-field exceeds the register width");
        BitField {
            shift: shift as u8,
            width: width as u8,
            access,
        }
    }

    pub const fn rw(shift: u32, width: u32) -> BitField {
        BitField::new(shift, width, Access::ReadWrite)
    }

    /// Single bit field.
    pub const fn bit(position: u32, access: Access) -> BitField {
        BitField::new(position, 1, access)
    }

    /// Read-only single bit field set and cleared by hardware.
    pub const fn status(position: u32) -> BitField {
        BitField::bit(position, Access::ReadOnly)
    }

    /// `K` equally shaped fields, `stride` bits apart, the first one
    /// starting at bit `first`.
    pub const fn array<const K: usize>(
        first: u32,
        width: u32,
        stride: u32,
        access: Access,
    ) -> [BitField; K] {
        assert!(stride >= width, "bit-field array stride overlaps its fields");
        let mut fields = [BitField::new(first, width, access); K];
        let mut i = 0;
        while i < K {
            fields[i] = BitField::new(first + i as u32 * stride, width, access);
            i += 1;
        }
        fields
    }

    pub const fn shift(&self) -> u32 {
        self.shift as u32
    }

    pub const fn width(&self) -> u32 {
        self.width as u32
    }

    pub const fn access(&self) -> Access {
        self.access
    }

    pub const fn is_bit(&self) -> bool {
        self.width == 1
    }

    /// Largest value the field can hold.
    pub const fn max_value(&self) -> u32 {
        if self.width == 32 {
            u32::MAX
        } else {
            (1 << self.width) - 1
        }
    }

    /// The field's bits in register position.
    pub const fn mask(&self) -> u32 {
        self.max_value() << self.shift
    }

    pub const fn overlaps(&self, other: &BitField) -> bool {
        self.mask() & other.mask() != 0
    }

    /// Field bits of `raw`, right aligned. Does not look at the access
    /// policy.
    pub const fn get(&self, raw: u32) -> u32 {
        (raw & self.mask()) >> self.shift
    }

    /// `raw` with the field replaced by `value`. Bits of `value` above the
    /// field width are dropped. Does not look at the access policy.
    pub const fn set(&self, raw: u32, value: u32) -> u32 {
        (raw & !self.mask()) | ((value << self.shift) & self.mask())
    }

    /// Field value of `raw`. Fails for write-only fields.
    pub fn extract(&self, raw: u32) -> Result<u32> {
        self.check_readable(UNNAMED)?;
        Ok(self.get(raw))
    }

    /// `raw` with the field replaced by `value`. Fails for read-only fields
    /// and for values wider than the field.
    pub fn insert(&self, raw: u32, value: u32) -> Result<u32> {
        self.check_write(UNNAMED, value)?;
        Ok(self.set(raw, value))
    }

    pub(crate) fn check_readable(&self, name: &'static str) -> Result<()> {
        if self.access.is_readable() {
            Ok(())
        } else {
            Err(Error::WriteOnly { field: name })
        }
    }

    pub(crate) fn check_write(&self, name: &'static str, value: u32) -> Result<()> {
        if !self.access.is_writable() {
            return Err(Error::ReadOnly { field: name });
        }
        if value > self.max_value() {
            return Err(Error::ValueTooWide {
                field: name,
                value,
                max: self.max_value(),
            });
        }
        Ok(())
    }

    pub(crate) fn check_bit(&self, name: &'static str) -> Result<()> {
        if self.is_bit() {
            Ok(())
        } else {
            Err(Error::NotABit { field: name })
        }
    }
}
