// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Load/store primitives underneath every register access.

use core::ptr;

/// Size of a single bus transaction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Width {
    Byte,
    HalfWord,
    Word,
}

impl Width {
    pub const fn bytes(self) -> u32 {
        match self {
            Width::Byte => 1,
            Width::HalfWord => 2,
            Width::Word => 4,
        }
    }

    pub const fn bits(self) -> u32 {
        self.bytes() * 8
    }

    /// Mask covering the low `bits()` of a word.
    pub const fn mask(self) -> u32 {
        match self {
            Width::Byte => 0xFF,
            Width::HalfWord => 0xFFFF,
            Width::Word => u32::MAX,
        }
    }
}

/// Transaction widths a register accepts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Widths(u8);

impl Widths {
    pub const BYTE: Widths = Widths(0b001);
    pub const HALF_WORD: Widths = Widths(0b010);
    pub const WORD: Widths = Widths(0b100);
    pub const ALL: Widths = Widths(0b111);

    pub const fn with(self, other: Widths) -> Widths {
        Widths(self.0 | other.0)
    }

    pub const fn contains(self, width: Width) -> bool {
        let bit = match width {
            Width::Byte => Widths::BYTE,
            Width::HalfWord => Widths::HALF_WORD,
            Width::Word => Widths::WORD,
        };
        self.0 & bit.0 != 0
    }
}

/// Something that can perform loads and stores at absolute addresses.
///
/// Loads and stores of `Byte` and `HalfWord` width carry their value in the
/// low bits of the `u32`.
pub trait Bus {
    fn load(&self, address: u32, width: Width) -> u32;
    fn store(&self, address: u32, width: Width, value: u32);
}

impl<B: Bus + ?Sized> Bus for &B {
    fn load(&self, address: u32, width: Width) -> u32 {
        (**self).load(address, width)
    }

    fn store(&self, address: u32, width: Width, value: u32) {
        (**self).store(address, width, value)
    }
}

/// Volatile memory mapped I/O.
#[derive(Copy, Clone, Debug)]
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// # Safety
    ///
    /// Every register accessed through this bus must describe a real,
    /// correctly aligned peripheral register of the running device. Accesses
    /// go straight to the addresses the registers name.
    pub const unsafe fn new() -> Mmio {
        Mmio { _private: () }
    }
}

impl Bus for Mmio {
    fn load(&self, address: u32, width: Width) -> u32 {
        let addr = address as usize;
        // Safety: `Mmio::new` requires every address to be a valid register.
        unsafe {
            match width {
                Width::Byte => ptr::read_volatile(addr as *const u8) as u32,
                Width::HalfWord => ptr::read_volatile(addr as *const u16) as u32,
                Width::Word => ptr::read_volatile(addr as *const u32),
            }
        }
    }

    fn store(&self, address: u32, width: Width, value: u32) {
        let addr = address as usize;
        // Safety: `Mmio::new` requires every address to be a valid register.
        unsafe {
            match width {
                Width::Byte => ptr::write_volatile(addr as *mut u8, value as u8),
                Width::HalfWord => ptr::write_volatile(addr as *mut u16, value as u16),
                Width::Word => ptr::write_volatile(addr as *mut u32, value),
            }
        }
    }
}
