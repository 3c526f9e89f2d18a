// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! General purpose I/O port registers and driver.

use bitreg::{
    field_names, field_values, Access, BaseAddress, BitField, Bus, FieldName, Offset, Register,
    ResetValue, Widths,
};

use crate::ErrorCode;

field_names! {
    /// Pins of a port, naming the fields of every per-pin register.
    pub Pin [
        Pin0, Pin1, Pin2, Pin3, Pin4, Pin5, Pin6, Pin7,
        Pin8, Pin9, Pin10, Pin11, Pin12, Pin13, Pin14, Pin15
    ],
    /// Bit set/reset register: 16 set strobes, then 16 reset strobes.
    pub Bsrr [
        Bs0, Bs1, Bs2, Bs3, Bs4, Bs5, Bs6, Bs7,
        Bs8, Bs9, Bs10, Bs11, Bs12, Bs13, Bs14, Bs15,
        Br0, Br1, Br2, Br3, Br4, Br5, Br6, Br7,
        Br8, Br9, Br10, Br11, Br12, Br13, Br14, Br15
    ],
    /// Alternate function low register, pins 0 to 7.
    pub Afrl [Afrl0, Afrl1, Afrl2, Afrl3, Afrl4, Afrl5, Afrl6, Afrl7],
    /// Alternate function high register, pins 8 to 15.
    pub Afrh [Afrh8, Afrh9, Afrh10, Afrh11, Afrh12, Afrh13, Afrh14, Afrh15]
}

field_values! {
    pub Mode NUMBITS(2) [
        Input = 0b00,
        Output = 0b01,
        AltFunc = 0b10,
        Analog = 0b11
    ],
    pub OutputType NUMBITS(1) [
        PushPull = 0,
        OpenDrain = 1
    ],
    pub OutputSpeed NUMBITS(2) [
        Low = 0b00,
        Medium = 0b01,
        Fast = 0b10,
        High = 0b11
    ],
    pub Pupd NUMBITS(2) [
        None = 0b00,
        PullUp = 0b01,
        PullDown = 0b10
    ],
    pub AltFunc NUMBITS(4) [
        AF0 = 0,
        AF1 = 1,
        AF2 = 2,
        AF3 = 3,
        AF4 = 4,
        AF5 = 5,
        AF6 = 6,
        AF7 = 7,
        AF8 = 8,
        AF9 = 9,
        AF10 = 10,
        AF11 = 11,
        AF12 = 12,
        AF13 = 13,
        AF14 = 14,
        AF15 = 15
    ]
}

const PAIRS: [BitField; 16] = BitField::array(0, 2, 2, Access::ReadWrite);
const BITS: [BitField; 16] = BitField::array(0, 1, 1, Access::ReadWrite);
const INPUTS: [BitField; 16] = BitField::array(0, 1, 1, Access::ReadOnly);
const STROBES: [BitField; 16] = BitField::array(0, 1, 1, Access::WriteOnly);
const SET_RESET: [BitField; 32] = BitField::array(0, 1, 1, Access::WriteOnly);
const NIBBLES: [BitField; 8] = BitField::array(0, 4, 4, Access::ReadWrite);

/// Reset values that differ between ports and families.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GpioResets {
    pub moder: u32,
    pub ospeedr: u32,
    pub pupdr: u32,
}

impl GpioResets {
    pub const ZERO: GpioResets = GpioResets {
        moder: 0,
        ospeedr: 0,
        pupdr: 0,
    };
}

/// Register block of one GPIO port.
pub struct GpioRegisters {
    pub moder: Register<Pin>,
    pub otyper: Register<Pin>,
    pub ospeedr: Register<Pin>,
    pub pupdr: Register<Pin>,
    pub idr: Register<Pin>,
    pub odr: Register<Pin>,
    pub bsrr: Register<Bsrr>,
    pub afrl: Register<Afrl>,
    pub afrh: Register<Afrh>,
    /// Bit reset register, absent on F4 parts.
    pub brr: Option<Register<Pin>>,
}

impl GpioRegisters {
    /// Every register of the port is word access only.
    pub const fn new(base: BaseAddress, resets: GpioResets) -> GpioRegisters {
        GpioRegisters {
            moder: Register::new("GPIO_MODER", base, Offset::new(0x00), &PAIRS)
                .with_reset(ResetValue::new(resets.moder))
                .with_widths(Widths::WORD),
            otyper: Register::new("GPIO_OTYPER", base, Offset::new(0x04), &BITS)
                .with_widths(Widths::WORD),
            ospeedr: Register::new("GPIO_OSPEEDR", base, Offset::new(0x08), &PAIRS)
                .with_reset(ResetValue::new(resets.ospeedr))
                .with_widths(Widths::WORD),
            pupdr: Register::new("GPIO_PUPDR", base, Offset::new(0x0C), &PAIRS)
                .with_reset(ResetValue::new(resets.pupdr))
                .with_widths(Widths::WORD),
            idr: Register::new("GPIO_IDR", base, Offset::new(0x10), &INPUTS)
                .with_widths(Widths::WORD),
            odr: Register::new("GPIO_ODR", base, Offset::new(0x14), &BITS)
                .with_widths(Widths::WORD),
            bsrr: Register::new("GPIO_BSRR", base, Offset::new(0x18), &SET_RESET)
                .with_widths(Widths::WORD),
            afrl: Register::new("GPIO_AFRL", base, Offset::new(0x20), &NIBBLES)
                .with_widths(Widths::WORD),
            afrh: Register::new("GPIO_AFRH", base, Offset::new(0x24), &NIBBLES)
                .with_widths(Widths::WORD),
            brr: None,
        }
    }

    /// Adds the bit reset register found on F3 and L4 parts.
    pub const fn with_brr(mut self) -> GpioRegisters {
        self.brr = Some(
            Register::new("GPIO_BRR", self.moder.base(), Offset::new(0x28), &STROBES)
                .with_widths(Widths::WORD),
        );
        self
    }
}

fn set_strobe(pin: Pin) -> Bsrr {
    Bsrr::ALL[pin.index()]
}

fn reset_strobe(pin: Pin) -> Bsrr {
    Bsrr::ALL[16 + pin.index()]
}

/// Driver for one GPIO port.
pub struct Port<'a, B: Bus> {
    registers: &'a GpioRegisters,
    bus: B,
}

impl<'a, B: Bus> Port<'a, B> {
    pub const fn new(registers: &'a GpioRegisters, bus: B) -> Port<'a, B> {
        Port { registers, bus }
    }

    pub fn registers(&self) -> &'a GpioRegisters {
        self.registers
    }

    pub fn mode(&self, pin: Pin) -> Result<Mode, ErrorCode> {
        Ok(self.registers.moder.read_as(&self.bus, pin)?)
    }

    pub fn set_mode(&self, pin: Pin, mode: Mode) -> Result<(), ErrorCode> {
        Ok(self.registers.moder.write_as(&self.bus, pin, mode)?)
    }

    /// Same mode for several pins, with one store.
    pub fn set_mode_many<const K: usize>(&self, pins: [Pin; K], mode: Mode) -> Result<(), ErrorCode> {
        Ok(self
            .registers
            .moder
            .write_all(&self.bus, pins, mode as u32)?)
    }

    pub fn set_output_options(
        &self,
        pin: Pin,
        output_type: OutputType,
        speed: OutputSpeed,
    ) -> Result<(), ErrorCode> {
        self.registers.otyper.write_as(&self.bus, pin, output_type)?;
        self.registers.ospeedr.write_as(&self.bus, pin, speed)?;
        Ok(())
    }

    pub fn pull(&self, pin: Pin) -> Result<Pupd, ErrorCode> {
        Ok(self.registers.pupdr.read_as(&self.bus, pin)?)
    }

    pub fn set_pull(&self, pin: Pin, pull: Pupd) -> Result<(), ErrorCode> {
        Ok(self.registers.pupdr.write_as(&self.bus, pin, pull)?)
    }

    pub fn set_alt_function(&self, pin: Pin, function: AltFunc) -> Result<(), ErrorCode> {
        let index = pin.index();
        if index < 8 {
            self.registers
                .afrl
                .write_as(&self.bus, Afrl::ALL[index], function)?;
        } else {
            self.registers
                .afrh
                .write_as(&self.bus, Afrh::ALL[index - 8], function)?;
        }
        Ok(())
    }

    /// Configures `pin` for `function` with one call per register.
    pub fn make_alt_function(&self, pin: Pin, function: AltFunc) -> Result<(), ErrorCode> {
        self.set_alt_function(pin, function)?;
        self.set_mode(pin, Mode::AltFunc)
    }

    pub fn read_input(&self, pin: Pin) -> Result<bool, ErrorCode> {
        Ok(self.registers.idr.read_bit(&self.bus, pin)?)
    }

    pub fn read_output(&self, pin: Pin) -> Result<bool, ErrorCode> {
        Ok(self.registers.odr.read_bit(&self.bus, pin)?)
    }

    /// Drives `pin` high with a single BSRR store.
    pub fn set(&self, pin: Pin) -> Result<(), ErrorCode> {
        self.set_many([pin])
    }

    /// Drives `pin` low with a single BSRR store.
    pub fn clear(&self, pin: Pin) -> Result<(), ErrorCode> {
        self.clear_many([pin])
    }

    pub fn set_many<const K: usize>(&self, pins: [Pin; K]) -> Result<(), ErrorCode> {
        Ok(self.registers.bsrr.set_bits(&self.bus, pins.map(set_strobe))?)
    }

    pub fn clear_many<const K: usize>(&self, pins: [Pin; K]) -> Result<(), ErrorCode> {
        match self.registers.brr {
            Some(brr) => Ok(brr.set_bits(&self.bus, pins)?),
            None => Ok(self
                .registers
                .bsrr
                .set_bits(&self.bus, pins.map(reset_strobe))?),
        }
    }

    /// Drives `high` pins high and `low` pins low with one BSRR store.
    pub fn write_many<const H: usize, const L: usize>(
        &self,
        high: [Pin; H],
        low: [Pin; L],
    ) -> Result<(), ErrorCode> {
        let strobes = high
            .iter()
            .map(|&pin| set_strobe(pin))
            .chain(low.iter().map(|&pin| reset_strobe(pin)));
        let mut raw = 0;
        for strobe in strobes {
            let mask = self.registers.bsrr.field(strobe).mask();
            if raw & mask != 0 {
                return Err(ErrorCode::INVAL);
            }
            raw |= mask;
        }
        // Strobes left out are stored as 0, which does nothing.
        let updates: [(Bsrr, u32); 32] = core::array::from_fn(|i| (Bsrr::ALL[i], (raw >> i) & 1));
        Ok(self.registers.bsrr.write(&self.bus, updates)?)
    }

    /// Inverts the output level of `pin` through ODR and returns the new
    /// level.
    pub fn toggle(&self, pin: Pin) -> Result<bool, ErrorCode> {
        let high = !self.read_output(pin)?;
        self.registers.odr.write_field(&self.bus, pin, high as u32)?;
        Ok(high)
    }
}
