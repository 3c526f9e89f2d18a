// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

use core::fmt;

/// Typed view of a field's raw bits.
///
/// Implemented for the unsigned integers and `bool`, for [`Bounded`], and
/// for enumerations declared with [`field_values!`](crate::field_values).
pub trait FieldValue: Copy {
    fn into_bits(self) -> u32;

    /// `None` when `bits` has no corresponding value.
    fn from_bits(bits: u32) -> Option<Self>;
}

impl FieldValue for u32 {
    fn into_bits(self) -> u32 {
        self
    }

    fn from_bits(bits: u32) -> Option<Self> {
        Some(bits)
    }
}

impl FieldValue for u16 {
    fn into_bits(self) -> u32 {
        self as u32
    }

    fn from_bits(bits: u32) -> Option<Self> {
        u16::try_from(bits).ok()
    }
}

impl FieldValue for u8 {
    fn into_bits(self) -> u32 {
        self as u32
    }

    fn from_bits(bits: u32) -> Option<Self> {
        u8::try_from(bits).ok()
    }
}

impl FieldValue for bool {
    fn into_bits(self) -> u32 {
        self as u32
    }

    fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }
    }
}

/// Integer restricted to `MIN..=MAX`.
///
/// Used for fields whose legal encodings are a contiguous subrange of what
/// the bits can hold, such as flash wait states.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Bounded<const MIN: u32, const MAX: u32>(u32);

impl<const MIN: u32, const MAX: u32> Bounded<MIN, MAX> {
    pub const LOWEST: Self = Bounded(MIN);
    pub const HIGHEST: Self = Bounded(MAX);

    pub const fn new(value: u32) -> Option<Self> {
        if value >= MIN && value <= MAX {
            Some(Bounded(value))
        } else {
            None
        }
    }

    /// Constant constructor. Out of range values fail constant evaluation.
    pub const fn new_const(value: u32) -> Self {
        assert!(value >= MIN && value <= MAX, "value outside of lookup range");
        Bounded(value)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl<const MIN: u32, const MAX: u32> FieldValue for Bounded<MIN, MAX> {
    fn into_bits(self) -> u32 {
        self.0
    }

    fn from_bits(bits: u32) -> Option<Self> {
        Self::new(bits)
    }
}

impl<const MIN: u32, const MAX: u32> fmt::Display for Bounded<MIN, MAX> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
