// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Power controller: regulator voltage scaling, overdrive and backup domain
//! write protection.

use bitreg::{field_values, register_fields, BaseAddress, Bus, Offset, Register, ResetValue};
use stm32::errorcode::poll;
use stm32::ErrorCode;

register_fields! {
    /// Power control register
    pub Cr [
        /// Low-power deepsleep
        Lpds OFFSET(0) NUMBITS(1) ReadWrite,
        /// Power-down deepsleep
        Pdds OFFSET(1) NUMBITS(1) ReadWrite,
        /// Clear wakeup flag
        Cwuf OFFSET(2) NUMBITS(1) WriteOnly,
        /// Clear standby flag
        Csbf OFFSET(3) NUMBITS(1) WriteOnly,
        /// Power voltage detector enable
        Pvde OFFSET(4) NUMBITS(1) ReadWrite,
        /// PVD level selection
        Pls OFFSET(5) NUMBITS(3) ReadWrite,
        /// Disable backup domain write protection
        Dbp OFFSET(8) NUMBITS(1) ReadWrite,
        /// Flash power-down in stop mode
        Fpds OFFSET(9) NUMBITS(1) ReadWrite,
        /// Low-power regulator in deepsleep under-drive mode
        Lpuds OFFSET(10) NUMBITS(1) ReadWrite,
        /// Main regulator in deepsleep under-drive mode
        Mruds OFFSET(11) NUMBITS(1) ReadWrite,
        /// ADCDC1
        AdcDc1 OFFSET(13) NUMBITS(1) ReadWrite,
        /// Regulator voltage scaling output selection
        Vos OFFSET(14) NUMBITS(2) ReadWrite,
        /// Overdrive enable
        OdEn OFFSET(16) NUMBITS(1) ReadWrite,
        /// Overdrive switching enabled
        OdSwEn OFFSET(17) NUMBITS(1) ReadWrite,
        /// Under-drive enable in stop mode
        UdEn OFFSET(18) NUMBITS(2) ReadWrite
    ],
    /// Power control/status register
    pub Csr [
        /// Wakeup flag
        Wuf OFFSET(0) NUMBITS(1) ReadOnly,
        /// Standby flag
        Sbf OFFSET(1) NUMBITS(1) ReadOnly,
        /// PVD output
        Pvdo OFFSET(2) NUMBITS(1) ReadOnly,
        /// Backup regulator ready
        Brr OFFSET(3) NUMBITS(1) ReadOnly,
        /// Enable WKUP pin
        Ewup OFFSET(8) NUMBITS(1) ReadWrite,
        /// Backup regulator enable
        Bre OFFSET(9) NUMBITS(1) ReadWrite,
        /// Regulator voltage scaling output selection ready bit
        VosRdy OFFSET(14) NUMBITS(1) ReadOnly,
        /// Overdrive mode ready
        OdRdy OFFSET(16) NUMBITS(1) ReadOnly,
        /// Overdrive mode switching ready
        OdSwRdy OFFSET(17) NUMBITS(1) ReadOnly,
        /// Under-drive ready flag
        UdRdy OFFSET(18) NUMBITS(2) ReadClearOnWrite1
    ]
}

field_values! {
    /// Main regulator output voltage. Scale 1 allows the highest HCLK.
    pub VoltageScale NUMBITS(2) [
        Scale3 = 0b01,
        Scale2 = 0b10,
        Scale1 = 0b11
    ]
}

pub const PWR_BASE: BaseAddress = BaseAddress::new(0x4000_7000);

pub static CR: Register<Cr> = Register::new("PWR_CR", PWR_BASE, Offset::new(0x00), &Cr::FIELDS)
    .with_reset(ResetValue::new(0x0000_C000));
pub static CSR: Register<Csr> =
    Register::new("PWR_CSR", PWR_BASE, Offset::new(0x04), &Csr::FIELDS);

const READY_ATTEMPTS: usize = 1000;

pub struct Pwr<B: Bus> {
    bus: B,
}

impl<B: Bus> Pwr<B> {
    pub const fn new(bus: B) -> Pwr<B> {
        Pwr { bus }
    }

    pub fn voltage_scale(&self) -> Result<VoltageScale, ErrorCode> {
        Ok(CR.read_as(&self.bus, Cr::Vos)?)
    }

    /// Selects the regulator output and waits for it to settle.
    ///
    /// The new scale only takes effect once the PLL runs, so callers switch
    /// it on before waiting here.
    pub fn set_voltage_scale(&self, scale: VoltageScale) -> Result<(), ErrorCode> {
        CR.write_as(&self.bus, Cr::Vos, scale)?;
        self.wait_voltage_scaling_ready()
    }

    pub fn wait_voltage_scaling_ready(&self) -> Result<(), ErrorCode> {
        poll(READY_ATTEMPTS, || Ok(CSR.read_bit(&self.bus, Csr::VosRdy)?))
    }

    /// Starts the overdrive regulator and waits for it to be ready.
    pub fn enable_overdrive(&self) -> Result<(), ErrorCode> {
        CR.set_bits(&self.bus, [Cr::OdEn])?;
        self.wait_overdrive_ready()
    }

    pub fn wait_overdrive_ready(&self) -> Result<(), ErrorCode> {
        poll(READY_ATTEMPTS, || Ok(CSR.read_bit(&self.bus, Csr::OdRdy)?))
    }

    /// Switches the core domain to the overdrive regulator. Overdrive must
    /// be ready.
    ///
    /// Returns:
    ///
    /// + Ok(()) once the switch is complete
    /// + Err(ErrorCode::FAIL) if overdrive is not ready
    /// + Err(ErrorCode::BUSY) if the switch did not complete in time
    pub fn enable_overdrive_switch(&self) -> Result<(), ErrorCode> {
        if !CSR.read_bit(&self.bus, Csr::OdRdy)? {
            return Err(ErrorCode::FAIL);
        }
        CR.set_bits(&self.bus, [Cr::OdSwEn])?;
        self.wait_overdrive_switch_ready()
    }

    pub fn wait_overdrive_switch_ready(&self) -> Result<(), ErrorCode> {
        poll(READY_ATTEMPTS, || Ok(CSR.read_bit(&self.bus, Csr::OdSwRdy)?))
    }

    /// Leaves overdrive, dropping the switch and the regulator with one
    /// store.
    pub fn disable_overdrive(&self) -> Result<(), ErrorCode> {
        Ok(CR.write(&self.bus, [(Cr::OdEn, 0), (Cr::OdSwEn, 0)])?)
    }

    /// Allows writes to the RTC and backup registers.
    pub fn unlock_backup_domain(&self) -> Result<(), ErrorCode> {
        Ok(CR.set_bits(&self.bus, [Cr::Dbp])?)
    }

    pub fn lock_backup_domain(&self) -> Result<(), ErrorCode> {
        Ok(CR.clear_bits(&self.bus, [Cr::Dbp])?)
    }
}
