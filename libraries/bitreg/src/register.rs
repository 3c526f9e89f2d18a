// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Register accessors.
//!
//! A [`Register`] binds an address to a table of [`BitField`]s and to the
//! enumeration that names them. It holds no state of its own: every read
//! goes to the bus, and every write is exactly one store, preceded by at
//! most one load.
//!
//! # Interrupts
//!
//! A write that has to preserve sibling fields is a load followed by a
//! store, and it can be torn by an interrupt handler that writes the same
//! register in between. Call sites sharing a register with a handler use
//! one of:
//!
//! - [`Register::modify_guarded`], which runs the update in a critical
//!   section;
//! - [`Register::write_isolated`], which narrows the update to a byte or
//!   halfword lane holding none of the handler's fields;
//! - writes that need no load at all. Strobe, set-only and rc_w1 fields
//!   never force a load, so a write naming only such fields is a single
//!   store.

use core::fmt;
use core::marker::PhantomData;

use crate::bus::{Bus, Width, Widths};
use crate::config;
use crate::{Access, BaseAddress, BitField, Error, FieldName, FieldValue, Offset, ResetValue, Result};

/// One memory mapped 32-bit register with named fields.
pub struct Register<N: FieldName> {
    name: &'static str,
    base: BaseAddress,
    offset: Offset,
    reset: ResetValue,
    widths: Widths,
    fields: &'static [BitField],
    _names: PhantomData<N>,
}

impl<N: FieldName> Clone for Register<N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N: FieldName> Copy for Register<N> {}

/// Byte lane an access is restricted to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Lane {
    width: Width,
    shift: u32,
}

impl Lane {
    const WORD: Lane = Lane {
        width: Width::Word,
        shift: 0,
    };

    fn mask(self) -> u32 {
        self.width.mask() << self.shift
    }
}

impl<N: FieldName> Register<N> {
    /// Declares a register. Panics during constant evaluation when the
    /// table does not have one descriptor per name of `N`, or when two
    /// descriptors share a bit.
    pub const fn new(
        name: &'static str,
        base: BaseAddress,
        offset: Offset,
        fields: &'static [BitField],
    ) -> Register<N> {
        assert!(
            fields.len() == N::COUNT,
            "field name count does not match the field table"
        );
        let mut i = 0;
        while i < fields.len() {
            let mut j = i + 1;
            while j < fields.len() {
                assert!(!fields[i].overlaps(&fields[j]), "overlapping bit-fields");
                j += 1;
            }
            i += 1;
        }
        Register {
            name,
            base,
            offset,
            reset: ResetValue::new(0),
            widths: Widths::ALL,
            fields,
            _names: PhantomData,
        }
    }

    pub const fn with_reset(self, reset: ResetValue) -> Register<N> {
        Register {
            name: self.name,
            base: self.base,
            offset: self.offset,
            reset,
            widths: self.widths,
            fields: self.fields,
            _names: PhantomData,
        }
    }

    /// Restricts the widths [`Register::write_isolated`] may narrow a store
    /// to. Registers accept byte, halfword and word stores by default.
    pub const fn with_widths(self, widths: Widths) -> Register<N> {
        Register {
            name: self.name,
            base: self.base,
            offset: self.offset,
            reset: self.reset,
            widths,
            fields: self.fields,
            _names: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn base(&self) -> BaseAddress {
        self.base
    }

    pub const fn offset(&self) -> Offset {
        self.offset
    }

    pub const fn reset_value(&self) -> ResetValue {
        self.reset
    }

    pub const fn widths(&self) -> Widths {
        self.widths
    }

    pub const fn address(&self) -> u32 {
        self.base.get() + self.offset.get()
    }

    pub const fn fields(&self) -> &'static [BitField] {
        self.fields
    }

    pub fn field(&self, name: N) -> &'static BitField {
        &self.fields[name.index()]
    }

    /// Default value of a field, taken from the register's reset value.
    pub fn reset_value_of(&self, name: N) -> u32 {
        self.field(name).get(self.reset.get())
    }

    /// Bits not covered by any field.
    pub fn reserved_mask(&self) -> u32 {
        !self.fields.iter().fold(0, |mask, f| mask | f.mask())
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    /// Values of the named fields, from a single load.
    pub fn read<B: Bus, const K: usize>(&self, bus: &B, names: [N; K]) -> Result<[u32; K]> {
        self.check_readable(&names)?;
        let raw = self.load(bus, Lane::WORD);
        Ok(names.map(|name| self.field(name).get(raw)))
    }

    pub fn read_field<B: Bus>(&self, bus: &B, name: N) -> Result<u32> {
        let [value] = self.read(bus, [name])?;
        Ok(value)
    }

    pub fn read_as<T: FieldValue, B: Bus>(&self, bus: &B, name: N) -> Result<T> {
        let raw = self.read_field(bus, name)?;
        T::from_bits(raw).ok_or(Error::UnknownValue {
            field: name.name(),
            raw,
        })
    }

    pub fn read_bit<B: Bus>(&self, bus: &B, name: N) -> Result<bool> {
        let [bit] = self.read_bits(bus, [name])?;
        Ok(bit)
    }

    /// Single-bit fields as booleans, from a single load.
    pub fn read_bits<B: Bus, const K: usize>(&self, bus: &B, names: [N; K]) -> Result<[bool; K]> {
        self.check_bits(&names)?;
        let values = self.read(bus, names)?;
        Ok(values.map(|v| v != 0))
    }

    /// Register value masked to the named fields, bits left in place.
    pub fn read_masked<B: Bus, const K: usize>(&self, bus: &B, names: [N; K]) -> Result<u32> {
        self.check_readable(&names)?;
        let mask = self.mask_of(names.iter().copied());
        Ok(self.load(bus, Lane::WORD) & mask)
    }

    /// Every readable field, from a single load.
    pub fn snapshot<B: Bus>(&self, bus: &B) -> Snapshot<N> {
        Snapshot {
            register: *self,
            raw: self.load(bus, Lane::WORD),
        }
    }

    // ---------------------------------------------------------------------
    // Writes
    // ---------------------------------------------------------------------

    /// Writes the named fields with one store.
    ///
    /// Retained sibling fields and reserved bits are preserved by a load
    /// beforehand. The load is skipped when every read/write field of the
    /// register is named. Strobe, set-only, read-only and rc_w1 fields that
    /// are not named are stored as 0, which has no effect on them. An empty
    /// `updates` touches nothing.
    pub fn write<B: Bus, const K: usize>(&self, bus: &B, updates: [(N, u32); K]) -> Result<()> {
        self.check_updates(&updates)?;
        if K == 0 {
            return Ok(());
        }
        self.update(bus, &updates, Lane::WORD);
        Ok(())
    }

    pub fn write_field<B: Bus>(&self, bus: &B, name: N, value: u32) -> Result<()> {
        self.write(bus, [(name, value)])
    }

    pub fn write_as<T: FieldValue, B: Bus>(&self, bus: &B, name: N, value: T) -> Result<()> {
        self.write(bus, [(name, value.into_bits())])
    }

    /// Writes the same value into every named field with one store.
    pub fn write_all<B: Bus, const K: usize>(&self, bus: &B, names: [N; K], value: u32) -> Result<()> {
        self.write(bus, names.map(|name| (name, value)))
    }

    /// Stores 1 into each named single-bit field.
    ///
    /// For rc_w1 fields this acknowledges the pending condition, and the
    /// bit reads back as 0 afterwards.
    pub fn set_bits<B: Bus, const K: usize>(&self, bus: &B, names: [N; K]) -> Result<()> {
        self.check_bits(&names)?;
        self.write(bus, names.map(|name| (name, 1)))
    }

    /// Stores 0 into each named single-bit field.
    ///
    /// Rejected for set-only and rc_w1 fields, where storing 0 does
    /// nothing.
    pub fn clear_bits<B: Bus, const K: usize>(&self, bus: &B, names: [N; K]) -> Result<()> {
        self.check_bits(&names)?;
        for name in names {
            let access = self.field(name).access();
            if access.is_writable() && !access.is_clearable() {
                return Err(Error::NotClearable { field: name.name() });
            }
        }
        self.write(bus, names.map(|name| (name, 0)))
    }

    /// Clears pending rc_w1 flags by storing 1 into them.
    pub fn acknowledge<B: Bus, const K: usize>(&self, bus: &B, names: [N; K]) -> Result<()> {
        for name in names {
            if self.field(name).access() != Access::ReadClearOnWrite1 {
                return Err(Error::NotClearable { field: name.name() });
            }
        }
        self.set_bits(bus, names)
    }

    /// [`Register::write`] inside a critical section.
    pub fn modify_guarded<B: Bus, const K: usize>(
        &self,
        bus: &B,
        updates: [(N, u32); K],
    ) -> Result<()> {
        self.check_updates(&updates)?;
        if K == 0 {
            return Ok(());
        }
        critical_section::with(|_| self.update(bus, &updates, Lane::WORD));
        Ok(())
    }

    /// Writes the named fields through the narrowest byte or halfword lane
    /// holding all of them, leaving the rest of the register untouched.
    ///
    /// Fails with [`Error::NotSeparable`] when the fields do not fit one
    /// lane the register accepts, or when the lane also holds one of the
    /// `avoid` fields.
    pub fn write_isolated<B: Bus, const K: usize, const A: usize>(
        &self,
        bus: &B,
        updates: [(N, u32); K],
        avoid: [N; A],
    ) -> Result<()> {
        self.check_updates(&updates)?;
        if K == 0 {
            return Ok(());
        }
        let target = self.mask_of(updates.iter().map(|&(name, _)| name));
        let avoided = self.mask_of(avoid.iter().copied());
        let lane = Self::isolating_lane(target, avoided, self.widths).ok_or(Error::NotSeparable)?;
        self.update(bus, &updates, lane);
        Ok(())
    }

    /// Stores the reset value.
    pub fn reset<B: Bus>(&self, bus: &B) {
        self.store(bus, Lane::WORD, self.reset.get());
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn mask_of(&self, names: impl Iterator<Item = N>) -> u32 {
        names.fold(0, |mask, name| mask | self.field(name).mask())
    }

    fn check_distinct(names: impl Iterator<Item = N> + Clone) -> Result<()> {
        for (i, name) in names.clone().enumerate() {
            if names.clone().take(i).any(|other| other == name) {
                return Err(Error::DuplicateField { field: name.name() });
            }
        }
        Ok(())
    }

    fn check_readable(&self, names: &[N]) -> Result<()> {
        Self::check_distinct(names.iter().copied())?;
        for &name in names {
            self.field(name).check_readable(name.name())?;
        }
        Ok(())
    }

    fn check_bits(&self, names: &[N]) -> Result<()> {
        for &name in names {
            self.field(name).check_bit(name.name())?;
        }
        Ok(())
    }

    fn check_updates(&self, updates: &[(N, u32)]) -> Result<()> {
        Self::check_distinct(updates.iter().map(|&(name, _)| name))?;
        for &(name, value) in updates {
            self.field(name).check_write(name.name(), value)?;
        }
        Ok(())
    }

    /// First lane of an accepted width, byte before halfword, that holds all
    /// of `target` and none of `avoided`.
    fn isolating_lane(target: u32, avoided: u32, widths: Widths) -> Option<Lane> {
        for width in [Width::Byte, Width::HalfWord] {
            if !widths.contains(width) {
                continue;
            }
            let mut shift = 0;
            while shift < 32 {
                let lane = Lane { width, shift };
                if target & !lane.mask() == 0 && avoided & lane.mask() == 0 {
                    return Some(lane);
                }
                shift += width.bits();
            }
        }
        None
    }

    /// Composes and stores the new value of `lane`. Callers validate
    /// `updates` first.
    fn update<B: Bus>(&self, bus: &B, updates: &[(N, u32)], lane: Lane) {
        let target = self.mask_of(updates.iter().map(|&(name, _)| name));
        let needs_load = self
            .fields
            .iter()
            .any(|f| f.access().is_retained() && f.mask() & target == 0 && f.mask() & lane.mask() != 0);

        let current = if needs_load {
            self.load(bus, lane)
        } else {
            self.reset.get() & self.reserved_mask()
        };
        let transient = self
            .fields
            .iter()
            .filter(|f| !f.access().is_retained())
            .fold(0, |mask, f| mask | f.mask());

        let value = updates
            .iter()
            .fold(current & !(target | transient), |raw, &(name, value)| {
                self.field(name).set(raw, value)
            });
        self.store(bus, lane, value);
    }

    /// Loads `lane`, returned in register position.
    fn load<B: Bus>(&self, bus: &B, lane: Lane) -> u32 {
        let address = self.address() + lane.shift / 8;
        let value = (bus.load(address, lane.width) & lane.width.mask()) << lane.shift;
        if config::CONFIG.trace_register_access {
            crate::debug!("{} load  {:#010x} -> {:#010x}", self.name, address, value);
        }
        value
    }

    /// Stores the `lane` bits of `value`, given in register position.
    fn store<B: Bus>(&self, bus: &B, lane: Lane, value: u32) {
        let address = self.address() + lane.shift / 8;
        if config::CONFIG.trace_register_access {
            crate::debug!("{} store {:#010x} <- {:#010x}", self.name, address, value);
        }
        bus.store(address, lane.width, (value >> lane.shift) & lane.width.mask());
    }
}

impl<N: FieldName> fmt::Debug for Register<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Register")
            .field("name", &self.name)
            .field("address", &format_args!("{:#010x}", self.address()))
            .field("reset", &format_args!("{:#010x}", self.reset.get()))
            .field("fields", &N::NAMES)
            .finish()
    }
}

/// A register value captured by one load, printable field by field.
pub struct Snapshot<N: FieldName> {
    register: Register<N>,
    raw: u32,
}

impl<N: FieldName> Snapshot<N> {
    pub fn raw(&self) -> u32 {
        self.raw
    }

    pub fn get(&self, name: N) -> Result<u32> {
        let field = self.register.field(name);
        field.check_readable(name.name())?;
        Ok(field.get(self.raw))
    }
}

impl<N: FieldName> fmt::Debug for Snapshot<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug_struct = f.debug_struct(self.register.name);
        for (name, field) in N::NAMES.iter().zip(self.register.fields) {
            if field.access().is_readable() {
                debug_struct.field(name, &field.get(self.raw));
            }
        }
        debug_struct.finish()
    }
}

#[cfg(test)]
mod tests {
    use std::format;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::emu::{MmioEmu, RegisterFile, Transaction};
    use crate::field_names;

    field_names! {
        Line [
            Line0, Line1, Line2, Line3, Line4, Line5, Line6, Line7, Line8, Line9, Line10, Line11,
            Line12, Line13, Line14, Line15, Line16, Line17, Line18, Line19, Line20, Line21, Line22
        ]
    }

    const EXTI: BaseAddress = BaseAddress::new(0x4001_3C00);

    static LINES: [BitField; 23] = BitField::array(0, 1, 1, Access::ReadWrite);
    static PENDING: [BitField; 23] = BitField::array(0, 1, 1, Access::ReadClearOnWrite1);

    static IMR: Register<Line> = Register::new("EXTI_IMR", EXTI, Offset::new(0x00), &LINES);
    static PR: Register<Line> = Register::new("EXTI_PR", EXTI, Offset::new(0x14), &PENDING);

    field_names! {
        Mixed [Mode, Enable, Strobe, Flag, Ready]
    }

    static MIXED_FIELDS: [BitField; 5] = [
        BitField::rw(0, 4),
        BitField::bit(8, Access::ReadWrite),
        BitField::bit(9, Access::WriteOnly),
        BitField::bit(10, Access::ReadClearOnWrite1),
        BitField::status(16),
    ];
    static MIXED: Register<Mixed> =
        Register::new("MIXED", BaseAddress::new(0x4000_0000), Offset::new(0x04), &MIXED_FIELDS)
            .with_reset(ResetValue::new(0x0000_0003));

    fn exti() -> (MmioEmu, Arc<Mutex<RegisterFile>>) {
        let mut emu = MmioEmu::new();
        let file = emu.register_file(EXTI, 0x18).unwrap();
        file.lock().unwrap().model(&IMR);
        file.lock().unwrap().model(&PR);
        (emu, file)
    }

    fn mixed() -> (MmioEmu, Arc<Mutex<RegisterFile>>) {
        let mut emu = MmioEmu::new();
        let file = emu.register_file(BaseAddress::new(0x4000_0000), 0x8).unwrap();
        file.lock().unwrap().model(&MIXED);
        (emu, file)
    }

    fn all_lines() -> [Line; 23] {
        core::array::from_fn(|i| Line::ALL[i])
    }

    #[test]
    fn set_one_line_and_read_it_back() {
        let (emu, _) = exti();
        IMR.set_bits(&emu, [Line::Line13]).unwrap();
        assert_eq!(IMR.read_bit(&emu, Line::Line13), Ok(true));

        let bits = IMR.read_bits(&emu, all_lines()).unwrap();
        for (i, bit) in bits.iter().enumerate() {
            assert_eq!(*bit, i == 13, "line {}", i);
        }
    }

    #[test]
    fn grouped_set_is_one_store_and_reads_back_two_lines() {
        let (emu, _) = exti();
        IMR.set_bits(&emu, [Line::Line13]).unwrap();
        emu.clear_log();

        IMR.set_bits(&emu, [Line::Line13, Line::Line5]).unwrap();
        assert_eq!(emu.stores(), 1);

        let bits = IMR.read_bits(&emu, all_lines()).unwrap();
        let set: std::vec::Vec<usize> = (0..23).filter(|&i| bits[i]).collect();
        assert_eq!(set, [5, 13]);
    }

    #[test]
    fn read_of_many_fields_is_one_load() {
        let (emu, _) = exti();
        emu.clear_log();
        let _ = IMR.read(&emu, all_lines()).unwrap();
        assert_eq!(emu.loads(), 1);
        assert_eq!(emu.stores(), 0);
    }

    #[test]
    fn pending_flag_clears_when_set() {
        let (emu, file) = exti();
        file.lock().unwrap().raise(0x14, 1 << 13);
        assert_eq!(PR.read_bit(&emu, Line::Line13), Ok(true));

        PR.set_bits(&emu, [Line::Line13]).unwrap();
        assert_eq!(PR.read_bit(&emu, Line::Line13), Ok(false));
    }

    #[test]
    fn acknowledging_one_flag_keeps_the_others_pending() {
        let (emu, file) = exti();
        file.lock().unwrap().raise(0x14, (1 << 13) | (1 << 2));
        emu.clear_log();

        PR.acknowledge(&emu, [Line::Line13]).unwrap();
        assert_eq!(emu.loads(), 0);
        assert_eq!(
            emu.transactions(),
            [Transaction::Store {
                address: 0x4001_3C14,
                width: Width::Word,
                value: 1 << 13
            }]
        );
        assert_eq!(PR.read_bits(&emu, [Line::Line2, Line::Line13]), Ok([true, false]));
    }

    #[test]
    fn pending_flags_cannot_be_cleared_with_zero() {
        let (emu, _) = exti();
        emu.clear_log();
        assert_eq!(
            PR.clear_bits(&emu, [Line::Line3]),
            Err(Error::NotClearable { field: "Line3" })
        );
        assert!(emu.transactions().is_empty());
        assert_eq!(
            IMR.acknowledge(&emu, [Line::Line3]),
            Err(Error::NotClearable { field: "Line3" })
        );
    }

    #[test]
    fn too_wide_value_touches_nothing() {
        let (emu, file) = mixed();
        emu.clear_log();
        assert_eq!(
            MIXED.write_field(&emu, Mixed::Mode, 16),
            Err(Error::ValueTooWide {
                field: "Mode",
                value: 16,
                max: 15
            })
        );
        assert!(emu.transactions().is_empty());
        assert_eq!(file.lock().unwrap().peek(0x04), 0x3);
    }

    #[test]
    fn policy_violations_touch_nothing() {
        let (emu, _) = mixed();
        emu.clear_log();
        assert_eq!(
            MIXED.read_field(&emu, Mixed::Strobe),
            Err(Error::WriteOnly { field: "Strobe" })
        );
        assert_eq!(
            MIXED.write_field(&emu, Mixed::Ready, 1),
            Err(Error::ReadOnly { field: "Ready" })
        );
        assert_eq!(
            MIXED.set_bits(&emu, [Mixed::Enable, Mixed::Ready]),
            Err(Error::ReadOnly { field: "Ready" })
        );
        assert_eq!(
            MIXED.set_bits(&emu, [Mixed::Mode]),
            Err(Error::NotABit { field: "Mode" })
        );
        assert_eq!(
            MIXED.write(&emu, [(Mixed::Mode, 1), (Mixed::Mode, 2)]),
            Err(Error::DuplicateField { field: "Mode" })
        );
        assert!(emu.transactions().is_empty());
    }

    #[test]
    fn writes_preserve_siblings_and_leave_flags_alone() {
        let (emu, file) = mixed();
        file.lock().unwrap().raise(0x04, (1 << 10) | (1 << 16));

        MIXED.set_bits(&emu, [Mixed::Enable]).unwrap();
        assert_eq!(MIXED.read(&emu, [Mixed::Mode, Mixed::Enable]), Ok([3, 1]));
        // The pending flag was not acknowledged by the write.
        assert_eq!(MIXED.read_bit(&emu, Mixed::Flag), Ok(true));

        let stored = emu.transactions().into_iter().rev().find_map(|t| match t {
            Transaction::Store { value, .. } => Some(value),
            _ => None,
        });
        assert_eq!(stored, Some(0x0000_0103));
    }

    #[test]
    fn non_interference() {
        let (emu, _) = mixed();
        let mut enable = 0;
        for mode in 0..16 {
            MIXED.write_field(&emu, Mixed::Mode, mode).unwrap();
            assert_eq!(MIXED.read_field(&emu, Mixed::Enable), Ok(enable));
            enable = mode & 1;
            MIXED.write_field(&emu, Mixed::Enable, enable).unwrap();
            assert_eq!(MIXED.read_field(&emu, Mixed::Mode), Ok(mode));
        }
    }

    #[test]
    fn write_of_every_retained_field_skips_the_load() {
        let (emu, _) = mixed();
        emu.clear_log();
        MIXED
            .write(&emu, [(Mixed::Mode, 5), (Mixed::Enable, 1), (Mixed::Strobe, 1)])
            .unwrap();
        assert_eq!(emu.loads(), 0);
        assert_eq!(emu.stores(), 1);
        assert_eq!(MIXED.read(&emu, [Mixed::Mode, Mixed::Enable]), Ok([5, 1]));
    }

    #[test]
    fn masked_read_keeps_positions() {
        let (emu, file) = mixed();
        file.lock().unwrap().raise(0x04, 1 << 16);
        assert_eq!(
            MIXED.read_masked(&emu, [Mixed::Mode, Mixed::Ready]),
            Ok(0x0001_0003)
        );
    }

    #[test]
    fn typed_reads() {
        let (emu, _) = mixed();
        assert_eq!(MIXED.read_as::<u8, _>(&emu, Mixed::Mode), Ok(3));
        assert_eq!(
            MIXED.read_as::<bool, _>(&emu, Mixed::Mode),
            Err(Error::UnknownValue {
                field: "Mode",
                raw: 3
            })
        );
        MIXED.write_as(&emu, Mixed::Enable, true).unwrap();
        assert_eq!(MIXED.read_as::<bool, _>(&emu, Mixed::Enable), Ok(true));
    }

    #[test]
    fn write_all_uses_one_value() {
        let (emu, _) = exti();
        IMR.write_all(&emu, [Line::Line0, Line::Line1, Line::Line22], 1)
            .unwrap();
        assert_eq!(emu.transactions().len(), 2);
        assert_eq!(IMR.read_masked(&emu, all_lines()), Ok(0x0040_0003));
    }

    #[test]
    fn reset_and_defaults() {
        let (emu, _) = mixed();
        MIXED.write_field(&emu, Mixed::Mode, 9).unwrap();
        MIXED.reset(&emu);
        assert_eq!(MIXED.read_field(&emu, Mixed::Mode), Ok(3));
        assert_eq!(MIXED.reset_value_of(Mixed::Mode), 3);
        assert_eq!(MIXED.reset_value_of(Mixed::Enable), 0);
        assert_eq!(MIXED.address(), 0x4000_0004);
    }

    #[test]
    fn guarded_write() {
        let (emu, _) = mixed();
        MIXED
            .modify_guarded(&emu, [(Mixed::Mode, 7), (Mixed::Enable, 1)])
            .unwrap();
        assert_eq!(MIXED.read(&emu, [Mixed::Mode, Mixed::Enable]), Ok([7, 1]));
    }

    #[test]
    fn isolated_write_uses_a_byte_lane() {
        let (emu, _) = mixed();
        MIXED.set_bits(&emu, [Mixed::Enable]).unwrap();
        emu.clear_log();

        MIXED
            .write_isolated(&emu, [(Mixed::Mode, 0xA)], [Mixed::Enable])
            .unwrap();
        assert_eq!(
            emu.transactions(),
            [Transaction::Store {
                address: 0x4000_0004,
                width: Width::Byte,
                value: 0x0A
            }]
        );
        assert_eq!(MIXED.read(&emu, [Mixed::Mode, Mixed::Enable]), Ok([0xA, 1]));
    }

    #[test]
    fn isolated_write_rejects_a_shared_lane() {
        let (emu, _) = mixed();
        emu.clear_log();
        assert_eq!(
            MIXED.write_isolated(&emu, [(Mixed::Enable, 1)], [Mixed::Strobe]),
            Err(Error::NotSeparable)
        );
        assert_eq!(
            MIXED.write_isolated(&emu, [(Mixed::Mode, 1), (Mixed::Enable, 1)], [Mixed::Ready]),
            Ok(())
        );
        assert_eq!(
            emu.transactions().last(),
            Some(&Transaction::Store {
                address: 0x4000_0004,
                width: Width::HalfWord,
                value: 0x0101
            })
        );
    }

    #[test]
    fn snapshot_lists_readable_fields() {
        let (emu, _) = mixed();
        let snapshot = MIXED.snapshot(&emu);
        assert_eq!(snapshot.raw(), 3);
        assert_eq!(snapshot.get(Mixed::Strobe), Err(Error::WriteOnly { field: "Strobe" }));
        assert_eq!(
            format!("{:?}", snapshot),
            "MIXED { Mode: 3, Enable: 0, Flag: 0, Ready: 0 }"
        );
    }

    #[test]
    #[should_panic]
    fn overlapping_fields_are_rejected() {
        static OVERLAP: [BitField; 5] = [
            BitField::rw(0, 4),
            BitField::bit(3, Access::ReadWrite),
            BitField::bit(9, Access::WriteOnly),
            BitField::bit(10, Access::ReadWrite),
            BitField::status(16),
        ];
        let _ = Register::<Mixed>::new("BAD", BaseAddress::new(0), Offset::new(0), &OVERLAP);
    }

    #[test]
    #[should_panic]
    fn name_count_must_match_table() {
        let _ = Register::<Mixed>::new("BAD", BaseAddress::new(0), Offset::new(0), &LINES);
    }

    field_names! {
        Gate [Lock, Start, Busy]
    }

    static GATE_FIELDS: [BitField; 3] = [
        BitField::bit(0, Access::ReadSet),
        BitField::bit(1, Access::ReadSet),
        BitField::status(16),
    ];
    static GATE: Register<Gate> =
        Register::new("GATE", BaseAddress::new(0x4000_0000), Offset::new(0x00), &GATE_FIELDS);

    #[test]
    fn set_only_bits_need_no_load() {
        let (emu, file) = {
            let mut emu = MmioEmu::new();
            let file = emu.register_file(BaseAddress::new(0x4000_0000), 0x4).unwrap();
            file.lock().unwrap().model(&GATE);
            (emu, file)
        };
        file.lock().unwrap().raise(0x00, 1 << 1);

        GATE.set_bits(&emu, [Gate::Lock]).unwrap();
        // Start is stored as 0 and stays set.
        assert_eq!(
            emu.transactions(),
            [Transaction::Store {
                address: 0x4000_0000,
                width: Width::Word,
                value: 1
            }]
        );
        assert_eq!(GATE.read_bits(&emu, [Gate::Lock, Gate::Start]), Ok([true, true]));

        emu.clear_log();
        assert_eq!(
            GATE.clear_bits(&emu, [Gate::Lock]),
            Err(Error::NotClearable { field: "Lock" })
        );
        assert!(emu.transactions().is_empty());

        // Only hardware releases the lock.
        file.lock().unwrap().lower(0x00, 1);
        assert_eq!(GATE.read_bit(&emu, Gate::Lock), Ok(false));
        assert_eq!(GATE.read_bit(&emu, Gate::Start), Ok(true));
    }

    #[test]
    fn empty_writes_touch_nothing() {
        let (emu, _) = mixed();
        emu.clear_log();
        assert_eq!(MIXED.write(&emu, []), Ok(()));
        assert_eq!(MIXED.set_bits(&emu, []), Ok(()));
        assert_eq!(MIXED.modify_guarded(&emu, []), Ok(()));
        assert_eq!(MIXED.write_isolated(&emu, [], [Mixed::Enable]), Ok(()));
        assert!(emu.transactions().is_empty());
    }

    static MIXED_HALF: Register<Mixed> =
        Register::new("MIXED", BaseAddress::new(0x4000_0000), Offset::new(0x04), &MIXED_FIELDS)
            .with_widths(Widths::HALF_WORD.with(Widths::WORD));
    static MIXED_WORD: Register<Mixed> =
        Register::new("MIXED", BaseAddress::new(0x4000_0000), Offset::new(0x04), &MIXED_FIELDS)
            .with_widths(Widths::WORD);

    #[test]
    fn isolated_write_uses_only_accepted_widths() {
        let (emu, _) = mixed();
        assert_eq!(MIXED.widths(), Widths::ALL);
        emu.clear_log();

        MIXED_HALF
            .write_isolated(&emu, [(Mixed::Mode, 0x6)], [Mixed::Ready])
            .unwrap();
        assert_eq!(
            emu.transactions().last(),
            Some(&Transaction::Store {
                address: 0x4000_0004,
                width: Width::HalfWord,
                value: 0x06
            })
        );

        emu.clear_log();
        assert_eq!(
            MIXED_HALF.write_isolated(&emu, [(Mixed::Mode, 0x6)], [Mixed::Enable]),
            Err(Error::NotSeparable)
        );
        assert_eq!(
            MIXED_WORD.write_isolated(&emu, [(Mixed::Mode, 0x6)], [Mixed::Ready]),
            Err(Error::NotSeparable)
        );
        assert!(emu.transactions().is_empty());
        assert_eq!(MIXED_WORD.read_field(&emu, Mixed::Mode), Ok(6));
    }
}
