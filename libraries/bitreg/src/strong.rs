// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Single-field wrappers that keep addresses, offsets and physical units
//! apart. None of them convert implicitly to or from their representation.

use core::fmt;

macro_rules! strong_type {
    ($(#[$attr:meta])* $name:ident($repr:ty), $fmt:literal) => {
        $(#[$attr])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name($repr);

        impl $name {
            pub const fn new(value: $repr) -> Self {
                $name(value)
            }

            pub const fn get(self) -> $repr {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, $fmt, self.0)
            }
        }
    };
}

strong_type!(
    /// Start of a peripheral's register block.
    BaseAddress(u32),
    "{:#010x}"
);

strong_type!(
    /// Register offset from a peripheral base.
    Offset(u32),
    "+{:#x}"
);

strong_type!(
    /// Value a register holds after reset.
    ResetValue(u32),
    "{:#010x}"
);

strong_type!(Hertz(u32), "{} Hz");

strong_type!(
    /// Supply voltage.
    Millivolts(u32),
    "{} mV"
);

impl BaseAddress {
    /// Base of the `index`th block in an array of equally spaced blocks,
    /// such as GPIO ports.
    pub const fn nth(self, index: u32, stride: u32) -> BaseAddress {
        BaseAddress(self.0 + index * stride)
    }
}

impl Hertz {
    pub const fn mhz(mhz: u32) -> Hertz {
        Hertz(mhz * 1_000_000)
    }
}
