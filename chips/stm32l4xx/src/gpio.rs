// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! GPIO ports A to E and H. Unused pins reset to analog mode.

use bitreg::BaseAddress;
use stm32::gpio::{GpioRegisters, GpioResets};

pub const GPIO_BASE: BaseAddress = BaseAddress::new(0x4800_0000);
const PORT_STRIDE: u32 = 0x400;

const ANALOG: GpioResets = GpioResets {
    moder: 0xFFFF_FFFF,
    ospeedr: 0,
    pupdr: 0,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PortId {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    H = 7,
}

impl PortId {
    pub const fn base(self) -> BaseAddress {
        GPIO_BASE.nth(self as u32, PORT_STRIDE)
    }
}

pub static GPIOA: GpioRegisters = GpioRegisters::new(
    PortId::A.base(),
    GpioResets {
        moder: 0xABFF_FFFF,
        ospeedr: 0x0C00_0000,
        pupdr: 0x6400_0000,
    },
)
.with_brr();
pub static GPIOB: GpioRegisters = GpioRegisters::new(
    PortId::B.base(),
    GpioResets {
        moder: 0xFFFF_FEBF,
        ospeedr: 0,
        pupdr: 0x0000_0100,
    },
)
.with_brr();
pub static GPIOC: GpioRegisters = GpioRegisters::new(PortId::C.base(), ANALOG).with_brr();
pub static GPIOD: GpioRegisters = GpioRegisters::new(PortId::D.base(), ANALOG).with_brr();
pub static GPIOE: GpioRegisters = GpioRegisters::new(PortId::E.base(), ANALOG).with_brr();
pub static GPIOH: GpioRegisters = GpioRegisters::new(PortId::H.base(), ANALOG).with_brr();

pub fn port(id: PortId) -> &'static GpioRegisters {
    match id {
        PortId::A => &GPIOA,
        PortId::B => &GPIOB,
        PortId::C => &GPIOC,
        PortId::D => &GPIOD,
        PortId::E => &GPIOE,
        PortId::H => &GPIOH,
    }
}

#[cfg(test)]
mod tests {
    use bitreg::emu::{MmioEmu, Transaction};
    use bitreg::Width;
    use stm32::gpio::{Mode, Pin, Port};

    use super::*;

    #[test]
    fn port_h_skips_the_gap() {
        assert_eq!(port(PortId::H).moder.address(), 0x4800_1C00);
        assert_eq!(GPIOE.brr.map(|brr| brr.address()), Some(0x4800_1028));
    }

    #[test]
    fn reset_modes() {
        let mut emu = MmioEmu::new();
        let file = emu.register_file(PortId::B.base(), 0x400).unwrap();
        file.lock().unwrap().model(&GPIOB.moder);
        let gpio = Port::new(&GPIOB, &emu);

        assert_eq!(gpio.mode(Pin::Pin3), Ok(Mode::AltFunc));
        assert_eq!(gpio.mode(Pin::Pin4), Ok(Mode::AltFunc));
        assert_eq!(gpio.mode(Pin::Pin0), Ok(Mode::Analog));
        assert_eq!(GPIOC.moder.reset_value_of(Pin::Pin15), Mode::Analog as u32);
    }

    #[test]
    fn clear_goes_through_brr() {
        let mut emu = MmioEmu::new();
        let file = emu.register_file(PortId::C.base(), 0x400).unwrap();
        if let Some(brr) = &GPIOC.brr {
            file.lock().unwrap().model(brr);
        }
        let gpio = Port::new(&GPIOC, &emu);

        gpio.clear(Pin::Pin13).unwrap();
        assert_eq!(
            emu.transactions(),
            [Transaction::Store {
                address: 0x4800_0828,
                width: Width::Word,
                value: 1 << 13
            }]
        );
    }
}
