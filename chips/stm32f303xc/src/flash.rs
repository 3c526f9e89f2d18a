// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Flash access control: wait states, half cycle access and the prefetch
//! buffer.

use bitreg::{register_fields, BaseAddress, Bounded, Bus, Hertz, Offset, Register, ResetValue};
use stm32::errorcode::poll;
use stm32::ErrorCode;

register_fields! {
    /// Flash access control register
    pub Acr [
        /// Latency
        Latency OFFSET(0) NUMBITS(3) ReadWrite,
        /// Flash half cycle access enable
        HlfCyA OFFSET(3) NUMBITS(1) ReadWrite,
        /// Prefetch buffer enable
        PrftBE OFFSET(4) NUMBITS(1) ReadWrite,
        /// Prefetch buffer status
        PrftBS OFFSET(5) NUMBITS(1) ReadOnly
    ]
}

pub const FLASH_BASE: BaseAddress = BaseAddress::new(0x4002_2000);

pub static ACR: Register<Acr> =
    Register::new("FLASH_ACR", FLASH_BASE, Offset::new(0x00), &Acr::FIELDS)
        .with_reset(ResetValue::new(0x0000_0030));

pub type FlashLatency = Bounded<0, 2>;

const MHZ_PER_WAIT_STATE: u32 = 24;
const PREFETCH_ATTEMPTS: usize = 16;

/// Returns:
///
/// + Ok(latency) with the smallest latency that supports `hclk`
/// + Err(ErrorCode::INVAL) if `hclk` is above 72 MHz
pub fn latency_for(hclk: Hertz) -> Result<FlashLatency, ErrorCode> {
    let wait_states = hclk.get().saturating_sub(1) / Hertz::mhz(MHZ_PER_WAIT_STATE).get();
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
        ACR.write_field(&self.bus, Acr::Latency, latency.get())?;
        poll(PREFETCH_ATTEMPTS, || Ok(self.latency()? == latency))
    }

    /// Turns the prefetch buffer on and waits until it reports being
    /// enabled.
    ///
    /// Returns:
    ///
    /// + Ok(()) once the prefetch buffer is enabled
    /// + Err(ErrorCode::BUSY) if the status bit did not follow in time
    pub fn enable_prefetch(&self) -> Result<(), ErrorCode> {
        ACR.set_bits(&self.bus, [Acr::PrftBE])?;
        poll(PREFETCH_ATTEMPTS, || Ok(ACR.read_bit(&self.bus, Acr::PrftBS)?))
    }

    /// Half cycle access is only allowed below 8 MHz with no wait state.
    pub fn set_half_cycle_access(&self, enabled: bool) -> Result<(), ErrorCode> {
        Ok(ACR.write_as(&self.bus, Acr::HlfCyA, enabled)?)
    }
}

#[cfg(test)]
mod tests {
    use bitreg::emu::MmioEmu;

    use super::*;

    fn ws(n: u32) -> FlashLatency {
        FlashLatency::new(n).unwrap()
    }

    #[test]
    fn wait_states() {
        assert_eq!(latency_for(Hertz::mhz(8)), Ok(ws(0)));
        assert_eq!(latency_for(Hertz::mhz(24)), Ok(ws(0)));
        assert_eq!(latency_for(Hertz::mhz(36)), Ok(ws(1)));
        assert_eq!(latency_for(Hertz::mhz(72)), Ok(ws(2)));
        assert_eq!(latency_for(Hertz::mhz(73)), Err(ErrorCode::INVAL));
    }

    #[test]
    fn prefetch_waits_for_status() {
        let mut emu = MmioEmu::new();
        let file = emu.register_file(FLASH_BASE, 0x04).unwrap();
        file.lock().unwrap().model(&ACR);
        let flash = Flash::new(&emu);

        // Reset state: prefetch enabled and reported.
        assert_eq!(flash.enable_prefetch(), Ok(()));

        file.lock().unwrap().lower(0x00, 0x30);
        assert_eq!(flash.enable_prefetch(), Err(ErrorCode::BUSY));
        assert_eq!(file.lock().unwrap().peek(0x00), 0x10);
    }

    #[test]
    fn latency_keeps_prefetch() {
        let mut emu = MmioEmu::new();
        let file = emu.register_file(FLASH_BASE, 0x04).unwrap();
        file.lock().unwrap().model(&ACR);
        let flash = Flash::new(&emu);

        flash.set_latency(ws(2)).unwrap();
        assert_eq!(file.lock().unwrap().peek(0x00), 0x32);
        assert_eq!(flash.latency(), Ok(ws(2)));

        // Encoding 3 exists in the field but is not a legal latency.
        ACR.write_field(&emu, Acr::Latency, 3).unwrap();
        assert_eq!(flash.latency(), Err(ErrorCode::FAIL));
    }
}
