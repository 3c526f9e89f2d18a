// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

use bitreg::BaseAddress;
use stm32::gpio::{GpioRegisters, GpioResets};

pub const GPIO_BASE: BaseAddress = BaseAddress::new(0x4800_0000);
const PORT_STRIDE: u32 = 0x400;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PortId {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    F = 5,
}

impl PortId {
    pub const fn base(self) -> BaseAddress {
        GPIO_BASE.nth(self as u32, PORT_STRIDE)
    }
}

pub static GPIOA: GpioRegisters = GpioRegisters::new(
    PortId::A.base(),
    GpioResets {
        moder: 0xA800_0000,
        ospeedr: 0x0C00_0000,
        pupdr: 0x6400_0000,
    },
)
.with_brr();
/// PB3 (JTDO) and PB4 (NJTRST) belong to the debug port after reset.
pub static GPIOB: GpioRegisters = GpioRegisters::new(
    PortId::B.base(),
    GpioResets {
        moder: 0x0000_0280,
        ospeedr: 0x0000_00C0,
        pupdr: 0x0000_0100,
    },
)
.with_brr();
pub static GPIOC: GpioRegisters =
    GpioRegisters::new(PortId::C.base(), GpioResets::ZERO).with_brr();
pub static GPIOD: GpioRegisters =
    GpioRegisters::new(PortId::D.base(), GpioResets::ZERO).with_brr();
pub static GPIOF: GpioRegisters =
    GpioRegisters::new(PortId::F.base(), GpioResets::ZERO).with_brr();

pub fn port(id: PortId) -> &'static GpioRegisters {
    match id {
        PortId::A => &GPIOA,
        PortId::B => &GPIOB,
        PortId::C => &GPIOC,
        PortId::D => &GPIOD,
        PortId::F => &GPIOF,
    }
}

#[cfg(test)]
mod tests {
    use bitreg::emu::MmioEmu;
    use stm32::gpio::{AltFunc, Mode, Pin, Port, Pupd};

    use super::*;

    #[test]
    fn port_f_address() {
        assert_eq!(port(PortId::F).idr.address(), 0x4800_1410);
    }

    #[test]
    fn usart_pins() {
        let mut emu = MmioEmu::new();
        let file = emu.register_file(PortId::C.base(), 0x400).unwrap();
        let gpio = Port::new(&GPIOC, &emu);

        gpio.make_alt_function(Pin::Pin4, AltFunc::AF7).unwrap();
        gpio.make_alt_function(Pin::Pin5, AltFunc::AF7).unwrap();
        let f = file.lock().unwrap();
        assert_eq!(f.peek(0x00), 0x0000_0A00);
        assert_eq!(f.peek(0x20), 0x0077_0000);
    }

    #[test]
    fn port_b_debug_pin_resets() {
        assert_eq!(GPIOB.pupdr.reset_value().get(), 0x0000_0100);
        assert_eq!(GPIOB.pupdr.reset_value_of(Pin::Pin4), 0b01);

        let mut emu = MmioEmu::new();
        let file = emu.register_file(PortId::B.base(), 0x400).unwrap();
        {
            let mut f = file.lock().unwrap();
            f.model(&GPIOB.moder);
            f.model(&GPIOB.pupdr);
        }
        let gpio = Port::new(&GPIOB, &emu);
        gpio.set_pull(Pin::Pin4, Pupd::None).unwrap();
        GPIOB.pupdr.reset(&emu);
        assert_eq!(gpio.pull(Pin::Pin4), Ok(Pupd::PullUp));
        assert_eq!(gpio.mode(Pin::Pin3), Ok(Mode::AltFunc));
    }
}
