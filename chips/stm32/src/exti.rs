// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! External interrupt/event controller.

use bitreg::{
    field_names, Access, BaseAddress, BitField, Bus, FieldName, Offset, Register, ResetValue,
};

use crate::ErrorCode;

field_names! {
    /// EXTI lines. 0 to 15 follow the GPIO pin numbers, the others are
    /// wired to internal peripherals.
    pub Line [
        Line0, Line1, Line2, Line3, Line4, Line5, Line6, Line7,
        Line8, Line9, Line10, Line11, Line12, Line13, Line14, Line15,
        Line16, Line17, Line18, Line19, Line20, Line21, Line22
    ]
}

const LINES: [BitField; 23] = BitField::array(0, 1, 1, Access::ReadWrite);
const PENDING: [BitField; 23] = BitField::array(0, 1, 1, Access::ReadClearOnWrite1);

/// Edge that raises a line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TriggerType {
    Rise,
    Fall,
    Both,
}

pub struct ExtiRegisters {
    /// Interrupt mask register (EXTI_IMR)
    pub imr: Register<Line>,
    /// Event mask register (EXTI_EMR)
    pub emr: Register<Line>,
    /// Rising trigger selection register (EXTI_RTSR)
    pub rtsr: Register<Line>,
    /// Falling trigger selection register (EXTI_FTSR)
    pub ftsr: Register<Line>,
    /// Software interrupt event register (EXTI_SWIER)
    pub swier: Register<Line>,
    /// Pending register (EXTI_PR)
    pub pr: Register<Line>,
    /// Lines whose edge selection bits are reserved.
    no_trigger: u32,
}

impl ExtiRegisters {
    pub const fn new(base: BaseAddress) -> ExtiRegisters {
        ExtiRegisters {
            imr: Register::new("EXTI_IMR", base, Offset::new(0x00), &LINES),
            emr: Register::new("EXTI_EMR", base, Offset::new(0x04), &LINES),
            rtsr: Register::new("EXTI_RTSR", base, Offset::new(0x08), &LINES),
            ftsr: Register::new("EXTI_FTSR", base, Offset::new(0x0C), &LINES),
            swier: Register::new("EXTI_SWIER", base, Offset::new(0x10), &LINES),
            pr: Register::new("EXTI_PR", base, Offset::new(0x14), &PENDING),
            no_trigger: 0,
        }
    }

    /// Parts where some internal lines come out of reset unmasked.
    pub const fn with_imr_reset(mut self, reset: ResetValue) -> ExtiRegisters {
        self.imr = self.imr.with_reset(reset);
        self
    }

    /// Marks `line` as having no configurable edge.
    pub const fn without_trigger(mut self, line: Line) -> ExtiRegisters {
        self.no_trigger |= 1 << line as u32;
        self
    }
}

pub struct Exti<'a, B: Bus> {
    registers: &'a ExtiRegisters,
    bus: B,
}

impl<'a, B: Bus> Exti<'a, B> {
    pub const fn new(registers: &'a ExtiRegisters, bus: B) -> Exti<'a, B> {
        Exti { registers, bus }
    }

    /// Unmasks both the interrupt and the event of `line`.
    pub fn enable(&self, line: Line) -> Result<(), ErrorCode> {
        self.registers.imr.set_bits(&self.bus, [line])?;
        self.registers.emr.set_bits(&self.bus, [line])?;
        Ok(())
    }

    pub fn disable(&self, line: Line) -> Result<(), ErrorCode> {
        self.registers.imr.clear_bits(&self.bus, [line])?;
        self.registers.emr.clear_bits(&self.bus, [line])?;
        Ok(())
    }

    pub fn is_enabled(&self, line: Line) -> Result<bool, ErrorCode> {
        Ok(self.registers.imr.read_bit(&self.bus, line)?)
    }

    pub fn set_trigger_type(&self, line: Line, trigger: TriggerType) -> Result<(), ErrorCode> {
        if self.registers.no_trigger & (1 << line.index()) != 0 {
            return Err(ErrorCode::NOSUPPORT);
        }
        let (rise, fall) = match trigger {
            TriggerType::Rise => (1, 0),
            TriggerType::Fall => (0, 1),
            TriggerType::Both => (1, 1),
        };
        self.registers.rtsr.write_field(&self.bus, line, rise)?;
        self.registers.ftsr.write_field(&self.bus, line, fall)?;
        Ok(())
    }

    /// Raises `line` from software. Hardware clears the request together
    /// with the pending bit.
    pub fn generate_software_irq(&self, line: Line) -> Result<(), ErrorCode> {
        Ok(self.registers.swier.set_bits(&self.bus, [line])?)
    }

    pub fn is_pending(&self, line: Line) -> Result<bool, ErrorCode> {
        Ok(self.registers.pr.read_bit(&self.bus, line)?)
    }

    pub fn clear_pending(&self, line: Line) -> Result<(), ErrorCode> {
        Ok(self.registers.pr.acknowledge(&self.bus, [line])?)
    }

    /// Acknowledges every pending line with one load and one store and
    /// returns the acknowledged lines as a bit mask.
    ///
    /// Lines raised between the load and the store stay pending, since only
    /// the observed bits are written back as 1.
    pub fn clear_all_pending(&self) -> Result<u32, ErrorCode> {
        let pr = &self.registers.pr;
        let pending = pr.snapshot(&self.bus).raw() & !pr.reserved_mask();
        let updates: [(Line, u32); 23] =
            core::array::from_fn(|i| (Line::ALL[i], (pending >> i) & 1));
        pr.write(&self.bus, updates)?;
        Ok(pending)
    }
}
