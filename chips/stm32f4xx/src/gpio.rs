// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! GPIO ports A to H.

use bitreg::BaseAddress;
use stm32::gpio::{GpioRegisters, GpioResets};

use crate::rcc::{Ahb1enr, PeripheralClock};

pub const GPIO_BASE: BaseAddress = BaseAddress::new(0x4002_0000);
const PORT_STRIDE: u32 = 0x400;

/// Port A comes out of reset with the debug pins in alternate function
/// mode.
const PORT_A_RESETS: GpioResets = GpioResets {
    moder: 0xA800_0000,
    ospeedr: 0x0C00_0000,
    pupdr: 0x6400_0000,
};

const PORT_B_RESETS: GpioResets = GpioResets {
    moder: 0x0000_0280,
    ospeedr: 0x0000_00C0,
    pupdr: 0x0000_0100,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PortId {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
}

impl PortId {
    pub const fn base(self) -> BaseAddress {
        GPIO_BASE.nth(self as u32, PORT_STRIDE)
    }

    /// Clock gate of the port.
    pub const fn clock(self) -> PeripheralClock {
        PeripheralClock::Ahb1(match self {
            PortId::A => Ahb1enr::GpioAEn,
            PortId::B => Ahb1enr::GpioBEn,
            PortId::C => Ahb1enr::GpioCEn,
            PortId::D => Ahb1enr::GpioDEn,
            PortId::E => Ahb1enr::GpioEEn,
            PortId::F => Ahb1enr::GpioFEn,
            PortId::G => Ahb1enr::GpioGEn,
            PortId::H => Ahb1enr::GpioHEn,
        })
    }
}

pub static GPIOA: GpioRegisters = GpioRegisters::new(PortId::A.base(), PORT_A_RESETS);
pub static GPIOB: GpioRegisters = GpioRegisters::new(PortId::B.base(), PORT_B_RESETS);
pub static GPIOC: GpioRegisters = GpioRegisters::new(PortId::C.base(), GpioResets::ZERO);
pub static GPIOD: GpioRegisters = GpioRegisters::new(PortId::D.base(), GpioResets::ZERO);
pub static GPIOE: GpioRegisters = GpioRegisters::new(PortId::E.base(), GpioResets::ZERO);
pub static GPIOF: GpioRegisters = GpioRegisters::new(PortId::F.base(), GpioResets::ZERO);
pub static GPIOG: GpioRegisters = GpioRegisters::new(PortId::G.base(), GpioResets::ZERO);
pub static GPIOH: GpioRegisters = GpioRegisters::new(PortId::H.base(), GpioResets::ZERO);

pub fn port(id: PortId) -> &'static GpioRegisters {
    match id {
        PortId::A => &GPIOA,
        PortId::B => &GPIOB,
        PortId::C => &GPIOC,
        PortId::D => &GPIOD,
        PortId::E => &GPIOE,
        PortId::F => &GPIOF,
        PortId::G => &GPIOG,
        PortId::H => &GPIOH,
    }
}
