// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Reset and clock control: oscillators, the main PLL, the system clock
//! switch, bus prescalers and peripheral clock gates.

use bitreg::{
    field_values, register_fields, BaseAddress, Bounded, Bus, FieldValue, Offset, Register,
    ResetValue,
};
use stm32::errorcode::poll;
use stm32::ErrorCode;

register_fields! {
    /// Clock control register
    pub Cr [
        /// Internal high-speed clock enable
        HsiOn OFFSET(0) NUMBITS(1) ReadWrite,
        /// Internal high-speed clock ready flag
        HsiRdy OFFSET(1) NUMBITS(1) ReadOnly,
        /// Internal high-speed clock trimming
        HsiTrim OFFSET(3) NUMBITS(5) ReadWrite,
        /// Internal high-speed clock calibration
        HsiCal OFFSET(8) NUMBITS(8) ReadOnly,
        /// HSE clock enable
        HseOn OFFSET(16) NUMBITS(1) ReadWrite,
        /// HSE clock ready flag
        HseRdy OFFSET(17) NUMBITS(1) ReadOnly,
        /// HSE clock bypass
        HseByp OFFSET(18) NUMBITS(1) ReadWrite,
        /// Clock security system enable
        CssOn OFFSET(19) NUMBITS(1) ReadWrite,
        /// Main PLL enable
        PllOn OFFSET(24) NUMBITS(1) ReadWrite,
        /// Main PLL clock ready flag
        PllRdy OFFSET(25) NUMBITS(1) ReadOnly,
        /// PLLI2S enable
        PllI2sOn OFFSET(26) NUMBITS(1) ReadWrite,
        /// PLLI2S clock ready flag
        PllI2sRdy OFFSET(27) NUMBITS(1) ReadOnly,
        /// PLLSAI enable
        PllSaiOn OFFSET(28) NUMBITS(1) ReadWrite,
        /// PLLSAI clock ready flag
        PllSaiRdy OFFSET(29) NUMBITS(1) ReadOnly
    ],
    /// PLL configuration register
    pub Pllcfgr [
        /// Division factor for the main PLL input clock
        M OFFSET(0) NUMBITS(6) ReadWrite,
        /// Main PLL multiplication factor for VCO
        N OFFSET(6) NUMBITS(9) ReadWrite,
        /// Main PLL division factor for main system clock
        P OFFSET(16) NUMBITS(2) ReadWrite,
        /// Main PLL entry clock source
        Src OFFSET(22) NUMBITS(1) ReadWrite,
        /// Main PLL division factor for USB OTG FS, SDIO and RNG clocks
        Q OFFSET(24) NUMBITS(4) ReadWrite,
        /// Main PLL division factor for I2S, DFSDM clocks
        R OFFSET(28) NUMBITS(3) ReadWrite
    ],
    /// Clock configuration register
    pub Cfgr [
        /// System clock switch
        Sw OFFSET(0) NUMBITS(2) ReadWrite,
        /// System clock switch status
        Sws OFFSET(2) NUMBITS(2) ReadOnly,
        /// AHB prescaler
        Hpre OFFSET(4) NUMBITS(4) ReadWrite,
        /// APB low-speed prescaler (APB1)
        Ppre1 OFFSET(10) NUMBITS(3) ReadWrite,
        /// APB high-speed prescaler (APB2)
        Ppre2 OFFSET(13) NUMBITS(3) ReadWrite,
        /// HSE division factor for RTC clock
        RtcPre OFFSET(16) NUMBITS(5) ReadWrite,
        /// Microcontroller clock output 1
        Mco1 OFFSET(21) NUMBITS(2) ReadWrite,
        /// I2S clock selection
        I2sSrc OFFSET(23) NUMBITS(1) ReadWrite,
        /// MCO1 prescaler
        Mco1Pre OFFSET(24) NUMBITS(3) ReadWrite,
        /// MCO2 prescaler
        Mco2Pre OFFSET(27) NUMBITS(3) ReadWrite,
        /// Microcontroller clock output 2
        Mco2 OFFSET(30) NUMBITS(2) ReadWrite
    ],
    /// AHB1 peripheral clock enable register
    pub Ahb1enr [
        GpioAEn OFFSET(0) NUMBITS(1) ReadWrite,
        GpioBEn OFFSET(1) NUMBITS(1) ReadWrite,
        GpioCEn OFFSET(2) NUMBITS(1) ReadWrite,
        GpioDEn OFFSET(3) NUMBITS(1) ReadWrite,
        GpioEEn OFFSET(4) NUMBITS(1) ReadWrite,
        GpioFEn OFFSET(5) NUMBITS(1) ReadWrite,
        GpioGEn OFFSET(6) NUMBITS(1) ReadWrite,
        GpioHEn OFFSET(7) NUMBITS(1) ReadWrite,
        CrcEn OFFSET(12) NUMBITS(1) ReadWrite,
        BkpSramEn OFFSET(18) NUMBITS(1) ReadWrite,
        CcmDataRamEn OFFSET(20) NUMBITS(1) ReadWrite,
        Dma1En OFFSET(21) NUMBITS(1) ReadWrite,
        Dma2En OFFSET(22) NUMBITS(1) ReadWrite,
        OtgHsEn OFFSET(29) NUMBITS(1) ReadWrite,
        OtgHsUlpiEn OFFSET(30) NUMBITS(1) ReadWrite
    ],
    /// APB1 peripheral clock enable register
    pub Apb1enr [
        Usart2En OFFSET(17) NUMBITS(1) ReadWrite,
        Usart3En OFFSET(18) NUMBITS(1) ReadWrite,
        Uart4En OFFSET(19) NUMBITS(1) ReadWrite,
        Uart5En OFFSET(20) NUMBITS(1) ReadWrite,
        I2c1En OFFSET(21) NUMBITS(1) ReadWrite,
        I2c2En OFFSET(22) NUMBITS(1) ReadWrite,
        I2c3En OFFSET(23) NUMBITS(1) ReadWrite,
        PwrEn OFFSET(28) NUMBITS(1) ReadWrite
    ],
    /// APB2 peripheral clock enable register
    pub Apb2enr [
        Usart1En OFFSET(4) NUMBITS(1) ReadWrite,
        Usart6En OFFSET(5) NUMBITS(1) ReadWrite,
        SyscfgEn OFFSET(14) NUMBITS(1) ReadWrite
    ]
}

field_values! {
    pub SysClockSource NUMBITS(2) [
        Hsi = 0b00,
        Hse = 0b01,
        Pll = 0b10
    ],
    pub PllSource NUMBITS(1) [
        Hsi = 0,
        Hse = 1
    ],
    /// Main PLL output division. Only even factors exist.
    pub PllP NUMBITS(2) [
        Div2 = 0b00,
        Div4 = 0b01,
        Div6 = 0b10,
        Div8 = 0b11
    ],
    pub AhbPrescaler NUMBITS(4) [
        Div1 = 0b0000,
        Div2 = 0b1000,
        Div4 = 0b1001,
        Div8 = 0b1010,
        Div16 = 0b1011,
        Div64 = 0b1100,
        Div128 = 0b1101,
        Div256 = 0b1110,
        Div512 = 0b1111
    ],
    pub ApbPrescaler NUMBITS(3) [
        Div1 = 0b000,
        Div2 = 0b100,
        Div4 = 0b101,
        Div8 = 0b110,
        Div16 = 0b111
    ]
}

pub const RCC_BASE: BaseAddress = BaseAddress::new(0x4002_3800);

pub static CR: Register<Cr> = Register::new("RCC_CR", RCC_BASE, Offset::new(0x00), &Cr::FIELDS)
    .with_reset(ResetValue::new(0x0000_0083));
pub static PLLCFGR: Register<Pllcfgr> =
    Register::new("RCC_PLLCFGR", RCC_BASE, Offset::new(0x04), &Pllcfgr::FIELDS)
        .with_reset(ResetValue::new(0x2400_3010));
pub static CFGR: Register<Cfgr> =
    Register::new("RCC_CFGR", RCC_BASE, Offset::new(0x08), &Cfgr::FIELDS);
pub static AHB1ENR: Register<Ahb1enr> =
    Register::new("RCC_AHB1ENR", RCC_BASE, Offset::new(0x30), &Ahb1enr::FIELDS)
        .with_reset(ResetValue::new(0x0010_0000));
pub static APB1ENR: Register<Apb1enr> =
    Register::new("RCC_APB1ENR", RCC_BASE, Offset::new(0x40), &Apb1enr::FIELDS);
pub static APB2ENR: Register<Apb2enr> =
    Register::new("RCC_APB2ENR", RCC_BASE, Offset::new(0x44), &Apb2enr::FIELDS);

const READY_ATTEMPTS: usize = 1000;

/// Clock sources with an enable bit and a ready flag in `RCC_CR`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Oscillator {
    Hsi,
    Hse,
    /// External clock fed directly into OSC_IN.
    HseBypass,
    Pll,
    PllI2s,
    PllSai,
}

impl Oscillator {
    fn bits(self) -> (Cr, Cr) {
        match self {
            Oscillator::Hsi => (Cr::HsiOn, Cr::HsiRdy),
            Oscillator::Hse | Oscillator::HseBypass => (Cr::HseOn, Cr::HseRdy),
            Oscillator::Pll => (Cr::PllOn, Cr::PllRdy),
            Oscillator::PllI2s => (Cr::PllI2sOn, Cr::PllI2sRdy),
            Oscillator::PllSai => (Cr::PllSaiOn, Cr::PllSaiRdy),
        }
    }
}

/// A gated peripheral clock.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PeripheralClock {
    Ahb1(Ahb1enr),
    Apb1(Apb1enr),
    Apb2(Apb2enr),
}

pub type PllM = Bounded<2, 63>;
pub type PllN = Bounded<50, 432>;
pub type PllQ = Bounded<2, 15>;

/// Main PLL settings.
///
/// The VCO runs at `source / m * n`, and the system clock output is the VCO
/// divided by `p`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PllConfig {
    pub source: PllSource,
    pub m: PllM,
    pub n: PllN,
    pub p: PllP,
    pub q: PllQ,
}

impl PllConfig {
    /// Validates raw factors.
    ///
    /// Returns:
    ///
    /// + Ok(config) if every factor is in range
    /// + Err(ErrorCode::INVAL) if M is outside 2..=63, N outside 50..=432,
    ///   Q outside 2..=15, or P is not one of 2, 4, 6 and 8
    pub fn new(source: PllSource, m: u32, n: u32, p: u32, q: u32) -> Result<PllConfig, ErrorCode> {
        let p = match p {
            2 => PllP::Div2,
            4 => PllP::Div4,
            6 => PllP::Div6,
            8 => PllP::Div8,
            _ => return Err(ErrorCode::INVAL),
        };
        Ok(PllConfig {
            source,
            m: PllM::new(m).ok_or(ErrorCode::INVAL)?,
            n: PllN::new(n).ok_or(ErrorCode::INVAL)?,
            p,
            q: PllQ::new(q).ok_or(ErrorCode::INVAL)?,
        })
    }
}

pub struct Rcc<B: Bus> {
    bus: B,
}

impl<B: Bus> Rcc<B> {
    pub const fn new(bus: B) -> Rcc<B> {
        Rcc { bus }
    }

    pub fn enable_clock(&self, clock: PeripheralClock) -> Result<(), ErrorCode> {
        match clock {
            PeripheralClock::Ahb1(bit) => AHB1ENR.set_bits(&self.bus, [bit])?,
            PeripheralClock::Apb1(bit) => APB1ENR.set_bits(&self.bus, [bit])?,
            PeripheralClock::Apb2(bit) => APB2ENR.set_bits(&self.bus, [bit])?,
        }
        Ok(())
    }

    pub fn disable_clock(&self, clock: PeripheralClock) -> Result<(), ErrorCode> {
        match clock {
            PeripheralClock::Ahb1(bit) => AHB1ENR.clear_bits(&self.bus, [bit])?,
            PeripheralClock::Apb1(bit) => APB1ENR.clear_bits(&self.bus, [bit])?,
            PeripheralClock::Apb2(bit) => APB2ENR.clear_bits(&self.bus, [bit])?,
        }
        Ok(())
    }

    pub fn is_enabled_clock(&self, clock: PeripheralClock) -> Result<bool, ErrorCode> {
        let enabled = match clock {
            PeripheralClock::Ahb1(bit) => AHB1ENR.read_bit(&self.bus, bit)?,
            PeripheralClock::Apb1(bit) => APB1ENR.read_bit(&self.bus, bit)?,
            PeripheralClock::Apb2(bit) => APB2ENR.read_bit(&self.bus, bit)?,
        };
        Ok(enabled)
    }

    /// Starts `oscillator` and waits for its ready flag.
    ///
    /// Returns:
    ///
    /// + Ok(()) once the oscillator is stable
    /// + Err(ErrorCode::BUSY) if it did not become ready in time. It is left
    ///   enabled.
    pub fn enable_oscillator(&self, oscillator: Oscillator) -> Result<(), ErrorCode> {
        let (on, _) = oscillator.bits();
        if oscillator == Oscillator::HseBypass {
            // The bypass has to be selected while HSE is still off.
            CR.set_bits(&self.bus, [Cr::HseByp])?;
        }
        CR.set_bits(&self.bus, [on])?;
        self.wait_oscillator_ready(oscillator)
    }

    pub fn wait_oscillator_ready(&self, oscillator: Oscillator) -> Result<(), ErrorCode> {
        let (_, ready) = oscillator.bits();
        poll(READY_ATTEMPTS, || Ok(CR.read_bit(&self.bus, ready)?))
    }

    pub fn is_ready_oscillator(&self, oscillator: Oscillator) -> Result<bool, ErrorCode> {
        Ok(CR.read_bit(&self.bus, oscillator.bits().1)?)
    }

    /// Stops `oscillator`.
    ///
    /// Returns:
    ///
    /// + Ok(()) if the oscillator was stopped
    /// + Err(ErrorCode::FAIL) if it drives the system clock
    pub fn disable_oscillator(&self, oscillator: Oscillator) -> Result<(), ErrorCode> {
        let current = self.system_clock()?;
        let in_use = match oscillator {
            Oscillator::Hsi => current == SysClockSource::Hsi,
            Oscillator::Hse | Oscillator::HseBypass => current == SysClockSource::Hse,
            Oscillator::Pll => current == SysClockSource::Pll,
            Oscillator::PllI2s | Oscillator::PllSai => false,
        };
        if in_use {
            return Err(ErrorCode::FAIL);
        }
        let (on, _) = oscillator.bits();
        if oscillator == Oscillator::HseBypass {
            CR.write(&self.bus, [(Cr::HseOn, 0), (Cr::HseByp, 0)])?;
        } else {
            CR.clear_bits(&self.bus, [on])?;
        }
        Ok(())
    }

    /// Programs the main PLL with one store.
    ///
    /// Returns:
    ///
    /// + Ok(()) if the PLL was configured
    /// + Err(ErrorCode::FAIL) if the PLL is running. It must be disabled
    ///   before it can be configured.
    pub fn configure_pll(&self, config: PllConfig) -> Result<(), ErrorCode> {
        if CR.read_bit(&self.bus, Cr::PllOn)? {
            return Err(ErrorCode::FAIL);
        }
        PLLCFGR.write(
            &self.bus,
            [
                (Pllcfgr::Src, config.source.into_bits()),
                (Pllcfgr::M, config.m.get()),
                (Pllcfgr::N, config.n.get()),
                (Pllcfgr::P, config.p.into_bits()),
                (Pllcfgr::Q, config.q.get()),
            ],
        )?;
        Ok(())
    }

    pub fn pll_config(&self) -> Result<PllConfig, ErrorCode> {
        let [src, m, n, p, q] = PLLCFGR.read(
            &self.bus,
            [Pllcfgr::Src, Pllcfgr::M, Pllcfgr::N, Pllcfgr::P, Pllcfgr::Q],
        )?;
        Ok(PllConfig {
            source: PllSource::from_bits(src).ok_or(ErrorCode::FAIL)?,
            m: PllM::new(m).ok_or(ErrorCode::FAIL)?,
            n: PllN::new(n).ok_or(ErrorCode::FAIL)?,
            p: PllP::from_bits(p).ok_or(ErrorCode::FAIL)?,
            q: PllQ::new(q).ok_or(ErrorCode::FAIL)?,
        })
    }

    pub fn system_clock(&self) -> Result<SysClockSource, ErrorCode> {
        Ok(CFGR.read_as(&self.bus, Cfgr::Sws)?)
    }

    /// Switches the system clock to `source` and waits for the switch to be
    /// reported.
    ///
    /// Returns:
    ///
    /// + Ok(()) once `source` drives the system clock
    /// + Err(ErrorCode::FAIL) if `source` is not ready
    /// + Err(ErrorCode::BUSY) if the switch was not reported in time
    pub fn set_system_clock(&self, source: SysClockSource) -> Result<(), ErrorCode> {
        let ready = match source {
            SysClockSource::Hsi => Cr::HsiRdy,
            SysClockSource::Hse => Cr::HseRdy,
            SysClockSource::Pll => Cr::PllRdy,
        };
        if !CR.read_bit(&self.bus, ready)? {
            return Err(ErrorCode::FAIL);
        }
        CFGR.write_as(&self.bus, Cfgr::Sw, source)?;
        poll(READY_ATTEMPTS, || Ok(self.system_clock()? == source))
    }

    /// Sets the AHB, APB1 and APB2 prescalers with one store.
    pub fn set_bus_prescalers(
        &self,
        ahb: AhbPrescaler,
        apb1: ApbPrescaler,
        apb2: ApbPrescaler,
    ) -> Result<(), ErrorCode> {
        Ok(CFGR.write(
            &self.bus,
            [
                (Cfgr::Hpre, ahb.into_bits()),
                (Cfgr::Ppre1, apb1.into_bits()),
                (Cfgr::Ppre2, apb2.into_bits()),
            ],
        )?)
    }

    pub fn ahb_prescaler(&self) -> Result<AhbPrescaler, ErrorCode> {
        Ok(CFGR.read_as(&self.bus, Cfgr::Hpre)?)
    }
}
