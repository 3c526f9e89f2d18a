// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Flash interface: wait states, prefetch and the ART accelerator caches.

use bitreg::{register_fields, BaseAddress, Bounded, Bus, Hertz, Millivolts, Offset, Register};
use stm32::errorcode::poll;
use stm32::ErrorCode;

register_fields! {
    /// Flash access control register
    pub Acr [
        /// Latency
        Latency OFFSET(0) NUMBITS(4) ReadWrite,
        /// Prefetch enable
        PrftEn OFFSET(8) NUMBITS(1) ReadWrite,
        /// Instruction cache enable
        ICEn OFFSET(9) NUMBITS(1) ReadWrite,
        /// Data cache enable
        DCEn OFFSET(10) NUMBITS(1) ReadWrite,
        /// Instruction cache reset
        ICRst OFFSET(11) NUMBITS(1) ReadWrite,
        /// Data cache reset
        DCRst OFFSET(12) NUMBITS(1) ReadWrite
    ]
}

pub const FLASH_BASE: BaseAddress = BaseAddress::new(0x4002_3C00);

pub static ACR: Register<Acr> =
    Register::new("FLASH_ACR", FLASH_BASE, Offset::new(0x00), &Acr::FIELDS);

/// Number of wait states.
pub type FlashLatency = Bounded<0, 15>;

/// Highest HCLK supported by the family, with overdrive.
pub const MAX_HCLK: Hertz = Hertz::mhz(180);

const LATENCY_CONFIRM_ATTEMPTS: usize = 16;

/// Wait states needed to read flash at `hclk` with the device supplied at
/// `vdd`.
///
/// Returns:
///
/// + Ok(latency) with the smallest latency that supports `hclk`
/// + Err(ErrorCode::INVAL) if `hclk` is above 180 MHz or `vdd` is outside
///   1.8 V to 3.6 V
pub fn latency_for(hclk: Hertz, vdd: Millivolts) -> Result<FlashLatency, ErrorCode> {
    let mhz_per_wait_state = match vdd.get() {
        2700..=3600 => 30,
        2400..=2699 => 24,
        2100..=2399 => 22,
        1800..=2099 => 20,
        _ => return Err(ErrorCode::INVAL),
    };
    if hclk > MAX_HCLK {
        return Err(ErrorCode::INVAL);
    }
    let step = Hertz::mhz(mhz_per_wait_state).get();
    FlashLatency::new(hclk.get().saturating_sub(1) / step).ok_or(ErrorCode::INVAL)
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

    /// Changes the number of wait states and waits until the flash
    /// interface reports the new value.
    ///
    /// The store is narrowed to the byte holding the latency, so the cache
    /// and prefetch bits are not written.
    ///
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

    /// Sets the latency needed at `hclk` and returns it.
    pub fn set_latency_for(
        &self,
        hclk: Hertz,
        vdd: Millivolts,
    ) -> Result<FlashLatency, ErrorCode> {
        let latency = latency_for(hclk, vdd)?;
        self.set_latency(latency)?;
        Ok(latency)
    }

    /// Enables prefetch and both ART caches together with `latency`, in one
    /// store.
    pub fn enable_art(&self, latency: FlashLatency) -> Result<(), ErrorCode> {
        ACR.write(
            &self.bus,
            [
                (Acr::Latency, latency.get()),
                (Acr::PrftEn, 1),
                (Acr::ICEn, 1),
                (Acr::DCEn, 1),
            ],
        )?;
        poll(LATENCY_CONFIRM_ATTEMPTS, || Ok(self.latency()? == latency))
    }

    /// Flushes both caches. They are disabled for the duration of the
    /// reset and enabled again afterwards.
    pub fn reset_caches(&self) -> Result<(), ErrorCode> {
        let [icache, dcache] = ACR.read(&self.bus, [Acr::ICEn, Acr::DCEn])?;
        ACR.clear_bits(&self.bus, [Acr::ICEn, Acr::DCEn])?;
        ACR.set_bits(&self.bus, [Acr::ICRst, Acr::DCRst])?;
        ACR.write(
            &self.bus,
            [
                (Acr::ICRst, 0),
                (Acr::DCRst, 0),
                (Acr::ICEn, icache),
                (Acr::DCEn, dcache),
            ],
        )?;
        Ok(())
    }

    pub fn is_prefetch_enabled(&self) -> Result<bool, ErrorCode> {
        Ok(ACR.read_bit(&self.bus, Acr::PrftEn)?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::vec::Vec;

    use bitreg::emu::{MmioEmu, RegisterFile, Transaction};
    use bitreg::Width;

    use super::*;

    const VDD: Millivolts = Millivolts::new(3300);

    fn setup() -> (MmioEmu, Arc<Mutex<RegisterFile>>) {
        let mut emu = MmioEmu::new();
        let file = emu.register_file(FLASH_BASE, 0x04).unwrap();
        file.lock().unwrap().model(&ACR);
        (emu, file)
    }

    fn ws(n: u32) -> FlashLatency {
        FlashLatency::new(n).unwrap()
    }

    #[test]
    fn wait_states_at_full_voltage() {
        assert_eq!(latency_for(Hertz::mhz(16), VDD), Ok(ws(0)));
        assert_eq!(latency_for(Hertz::mhz(25), VDD), Ok(ws(0)));
        assert_eq!(latency_for(Hertz::mhz(30), VDD), Ok(ws(0)));
        assert_eq!(latency_for(Hertz::mhz(42), VDD), Ok(ws(1)));
        assert_eq!(latency_for(Hertz::mhz(84), VDD), Ok(ws(2)));
        assert_eq!(latency_for(Hertz::mhz(90), VDD), Ok(ws(2)));
        assert_eq!(latency_for(Hertz::mhz(96), VDD), Ok(ws(3)));
        assert_eq!(latency_for(Hertz::mhz(168), VDD), Ok(ws(5)));
        assert_eq!(latency_for(Hertz::mhz(180), VDD), Ok(ws(5)));
    }

    #[test]
    fn wait_states_follow_supply_voltage() {
        let hclk = Hertz::mhz(168);
        assert_eq!(latency_for(hclk, Millivolts::new(2500)), Ok(ws(6)));
        assert_eq!(latency_for(hclk, Millivolts::new(2200)), Ok(ws(7)));
        assert_eq!(latency_for(hclk, Millivolts::new(1800)), Ok(ws(8)));
        assert_eq!(latency_for(Hertz::mhz(20), Millivolts::new(1900)), Ok(ws(0)));
        assert_eq!(latency_for(Hertz::mhz(21), Millivolts::new(1900)), Ok(ws(1)));
    }

    #[test]
    fn out_of_range_operating_points() {
        assert_eq!(latency_for(Hertz::mhz(181), VDD), Err(ErrorCode::INVAL));
        assert_eq!(latency_for(Hertz::mhz(16), Millivolts::new(1700)), Err(ErrorCode::INVAL));
        assert_eq!(latency_for(Hertz::mhz(16), Millivolts::new(3700)), Err(ErrorCode::INVAL));
    }

    #[test]
    fn set_latency_is_a_byte_store() {
        let (emu, file) = setup();
        file.lock().unwrap().raise(0x00, 0x0700);
        let flash = Flash::new(&emu);

        flash.set_latency(ws(5)).unwrap();
        assert_eq!(
            emu.transactions()[0],
            Transaction::Store {
                address: 0x4002_3C00,
                width: Width::Byte,
                value: 5
            }
        );
        assert_eq!(file.lock().unwrap().peek(0x00), 0x0705);
        assert_eq!(flash.latency(), Ok(ws(5)));
    }

    #[test]
    fn too_wide_latency_never_reaches_the_bus() {
        let (emu, _file) = setup();
        assert_eq!(
            ACR.write_field(&emu, Acr::Latency, 16),
            Err(bitreg::Error::ValueTooWide {
                field: "Latency",
                value: 16,
                max: 15
            })
        );
        assert_eq!(emu.loads(), 0);
        assert_eq!(emu.stores(), 0);
    }

    #[test]
    fn art_is_enabled_in_one_store() {
        let (emu, file) = setup();
        let flash = Flash::new(&emu);

        flash.enable_art(ws(5)).unwrap();
        let stores: Vec<Transaction> = emu
            .transactions()
            .into_iter()
            .filter(|t| matches!(t, Transaction::Store { .. }))
            .collect();
        assert_eq!(
            stores,
            [Transaction::Store {
                address: 0x4002_3C00,
                width: Width::Word,
                value: 0x0705
            }]
        );
        assert_eq!(file.lock().unwrap().peek(0x00), 0x0705);
        assert_eq!(flash.is_prefetch_enabled(), Ok(true));
    }

    #[test]
    fn cache_reset_restores_enables() {
        let (emu, file) = setup();
        let flash = Flash::new(&emu);

        flash.enable_art(ws(3)).unwrap();
        emu.clear_log();
        flash.reset_caches().unwrap();

        let stored: Vec<u32> = emu
            .transactions()
            .into_iter()
            .filter_map(|t| match t {
                Transaction::Store { value, .. } => Some(value),
                Transaction::Load { .. } => None,
            })
            .collect();
        assert_eq!(stored, [0x0103, 0x1903, 0x0703]);
        assert_eq!(file.lock().unwrap().peek(0x00), 0x0703);
    }
}
