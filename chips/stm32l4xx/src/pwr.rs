// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

use bitreg::{field_values, register_fields, BaseAddress, Bus, Offset, Register, ResetValue};
use stm32::errorcode::poll;
use stm32::ErrorCode;

register_fields! {
    /// Power control register 1
    pub Cr1 [
        /// Low-power mode selection
        Lpms OFFSET(0) NUMBITS(3) ReadWrite,
        /// Backup domain write protection disable
        Dbp OFFSET(8) NUMBITS(1) ReadWrite,
        /// Voltage scaling range selection
        Vos OFFSET(9) NUMBITS(2) ReadWrite,
        /// Low-power run
        Lpr OFFSET(14) NUMBITS(1) ReadWrite
    ],
    /// Power status register 2
    pub Sr2 [
        /// Voltage scaling flag, set while the regulator changes range
        Vosf OFFSET(10) NUMBITS(1) ReadOnly
    ]
}

field_values! {
    /// Core regulator range. Range 1 allows up to 80 MHz, range 2 up to
    /// 26 MHz.
    pub VoltageRange NUMBITS(2) [
        Range1 = 0b01,
        Range2 = 0b10
    ]
}

pub const PWR_BASE: BaseAddress = BaseAddress::new(0x4000_7000);

pub static CR1: Register<Cr1> =
    Register::new("PWR_CR1", PWR_BASE, Offset::new(0x00), &Cr1::FIELDS)
        .with_reset(ResetValue::new(0x0000_0200));
pub static SR2: Register<Sr2> =
    Register::new("PWR_SR2", PWR_BASE, Offset::new(0x14), &Sr2::FIELDS);

const VOSF_ATTEMPTS: usize = 1000;

pub struct Pwr<B: Bus> {
    bus: B,
}

impl<B: Bus> Pwr<B> {
    pub const fn new(bus: B) -> Pwr<B> {
        Pwr { bus }
    }

    pub fn voltage_range(&self) -> Result<VoltageRange, ErrorCode> {
        Ok(CR1.read_as(&self.bus, Cr1::Vos)?)
    }

    /// Selects `range` and waits until the regulator has settled.
    ///
    /// Returns:
    ///
    /// + Ok(()) once the regulator runs in `range`
    /// + Err(ErrorCode::BUSY) if the voltage scaling flag did not clear in
    ///   time
    pub fn set_voltage_range(&self, range: VoltageRange) -> Result<(), ErrorCode> {
        CR1.write_as(&self.bus, Cr1::Vos, range)?;
        poll(VOSF_ATTEMPTS, || Ok(!SR2.read_bit(&self.bus, Sr2::Vosf)?))
    }

    pub fn unlock_backup_domain(&self) -> Result<(), ErrorCode> {
        Ok(CR1.set_bits(&self.bus, [Cr1::Dbp])?)
    }

    pub fn lock_backup_domain(&self) -> Result<(), ErrorCode> {
        Ok(CR1.clear_bits(&self.bus, [Cr1::Dbp])?)
    }
}
