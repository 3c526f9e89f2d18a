// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! STM32L4xx flash access control.
//!
//! The number of wait states depends on HCLK and on the voltage range of
//! the core regulator, see [`crate::pwr::VoltageRange`].

use bitreg::{register_fields, BaseAddress, Bounded, Bus, Hertz, Offset, Register};
use stm32::errorcode::poll;
use stm32::ErrorCode;

use crate::pwr::VoltageRange;

register_fields! {
    /// Flash access control register
    pub Acr [
        /// Latency (number of wait states)
        Latency OFFSET(0) NUMBITS(3) ReadWrite,
        /// Prefetch enable
        PrftEn OFFSET(8) NUMBITS(1) ReadWrite,
        /// Instruction cache enable
        ICEn OFFSET(9) NUMBITS(1) ReadWrite,
        /// Data cache enable
        DCEn OFFSET(10) NUMBITS(1) ReadWrite,
        /// Instruction cache reset
        ICRst OFFSET(11) NUMBITS(1) ReadWrite,
        /// Data cache reset
        DCRst OFFSET(12) NUMBITS(1) ReadWrite,
        /// Flash power-down in run mode, writable once unlocked through
        /// FLASH_PDKEYR
        RunPd OFFSET(13) NUMBITS(1) ReadWrite,
        /// Flash power-down in sleep mode
        SleepPd OFFSET(14) NUMBITS(1) ReadWrite
    ]
}

pub const FLASH_BASE: BaseAddress = BaseAddress::new(0x4002_2000);

pub static ACR: Register<Acr> =
    Register::new("FLASH_ACR", FLASH_BASE, Offset::new(0x00), &Acr::FIELDS)
        .with_reset(bitreg::ResetValue::new(0x0000_0600));

pub type FlashLatency = Bounded<0, 4>;

const RANGE1_MHZ_PER_WAIT_STATE: u32 = 16;
const RANGE2_LIMITS_MHZ: [u32; 4] = [6, 12, 18, 26];
const LATENCY_CONFIRM_ATTEMPTS: usize = 16;

/// Wait states needed to read flash at `hclk` in `range`.
///
/// Returns:
///
/// + Ok(latency) with the smallest latency that supports `hclk`
/// + Err(ErrorCode::INVAL) if `hclk` is above the range limit, 80 MHz for
///   range 1 and 26 MHz for range 2
pub fn latency_for(hclk: Hertz, range: VoltageRange) -> Result<FlashLatency, ErrorCode> {
    let wait_states = match range {
        VoltageRange::Range1 => {
            if hclk > Hertz::mhz(80) {
                return Err(ErrorCode::INVAL);
            }
            hclk.get().saturating_sub(1) / Hertz::mhz(RANGE1_MHZ_PER_WAIT_STATE).get()
        }
        VoltageRange::Range2 => RANGE2_LIMITS_MHZ
            .iter()
            .position(|&limit| hclk <= Hertz::mhz(limit))
            .ok_or(ErrorCode::INVAL)? as u32,
    };
    FlashLatency::new(wait_states).ok_or(ErrorCode::INVAL)
}

pub struct Flash<B: Bus> {
    bus: B,
}

impl<B: Bus> Flash<B> {
    pub const fn new(bus: B) -> Flash<B> {
        Flash { bus }
    }

    pub fn latency(&self) -> Result<FlashLatency, ErrorCode> {
        Ok(ACR.read_as(&self.bus, Acr::Latency)?)
    }

    /// Returns:
    ///
    /// + Ok(()) if the new latency is in effect
    /// + Err(ErrorCode::BUSY) if the new latency was not confirmed in time
    pub fn set_latency(&self, latency: FlashLatency) -> Result<(), ErrorCode> {
        ACR.write_isolated(
            &self.bus,
            [(Acr::Latency, latency.get())],
            [Acr::PrftEn, Acr::ICEn, Acr::DCEn],
        )?;
        poll(LATENCY_CONFIRM_ATTEMPTS, || Ok(self.latency()? == latency))
    }

    pub fn set_latency_for(
        &self,
        hclk: Hertz,
        range: VoltageRange,
    ) -> Result<FlashLatency, ErrorCode> {
        let latency = latency_for(hclk, range)?;
        self.set_latency(latency)?;
        Ok(latency)
    }

    pub fn enable_prefetch(&self) -> Result<(), ErrorCode> {
        Ok(ACR.set_bits(&self.bus, [Acr::PrftEn])?)
    }

    pub fn disable_prefetch(&self) -> Result<(), ErrorCode> {
        Ok(ACR.clear_bits(&self.bus, [Acr::PrftEn])?)
    }
}
