// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Emulated bus for host-side testing of register code.
//!
//! [`MmioEmu`] routes each access to the device owning the address and
//! records every transaction, so tests can check how many loads and stores
//! an operation issued and with which values. [`RegisterFile`] is a device
//! made of 32-bit words whose bits follow the access policies declared on
//! the registers mapped onto it.

// This module requires libstd.
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::vec::Vec;

use crate::{Access, BaseAddress, Bus, FieldName, Register, Width};

/// Errors that can be encountered while mapping emulated devices.
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    RegionOverlaps(u32, u32),
    ZeroSizedRegion(u32),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Error::*;

        match self {
            RegionOverlaps(base, size) => write!(
                f,
                "region overlaps with existing region of base {:#x} size {:#x}",
                base, size
            ),
            ZeroSizedRegion(base) => {
                write!(f, "region at base address {:#x} cannot be zero-sized", base)
            }
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
struct MmioRegion {
    base: u32,
    size: u32,
}

impl MmioRegion {
    /// Returns true if there is overlap with the given range.
    fn overlaps(&self, base: u32, size: u32) -> bool {
        self.base < (base + size) && base < self.base + self.size
    }
}

/// A device controlled by reading or writing its registers.
pub trait MmioDevice: Send {
    /// Reads `width` bytes at `offset` from the start of the device.
    fn mmio_read(&mut self, offset: u32, width: Width) -> u32;
    /// Writes the low `width` bytes of `value` at `offset`.
    fn mmio_write(&mut self, offset: u32, width: Width, value: u32);
}

/// One recorded bus access.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transaction {
    Load { address: u32, width: Width, value: u32 },
    Store { address: u32, width: Width, value: u32 },
}

/// Emulated address space.
pub struct MmioEmu {
    devices: BTreeMap<MmioRegion, Arc<Mutex<dyn MmioDevice>>>,
    log: Mutex<Vec<Transaction>>,
}

impl MmioEmu {
    pub fn new() -> MmioEmu {
        MmioEmu {
            devices: BTreeMap::new(),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Maps `device` at `base` for `size` bytes.
    ///
    /// This may fail if the region is zero-sized, or if it overlaps the
    /// region of another device.
    pub fn add_device(
        &mut self,
        base: BaseAddress,
        size: u32,
        device: Arc<Mutex<dyn MmioDevice>>,
    ) -> Result<()> {
        let region = MmioRegion {
            base: base.get(),
            size,
        };
        if region.size == 0 {
            return Err(Error::ZeroSizedRegion(region.base));
        }
        if self
            .devices
            .keys()
            .any(|range| range.overlaps(region.base, region.size))
        {
            return Err(Error::RegionOverlaps(region.base, region.size));
        }
        self.devices.insert(region, device);
        Ok(())
    }

    /// Maps a fresh [`RegisterFile`] and returns a handle to it.
    pub fn register_file(&mut self, base: BaseAddress, size: u32) -> Result<Arc<Mutex<RegisterFile>>> {
        let file = Arc::new(Mutex::new(RegisterFile::new(size)));
        self.add_device(base, size, file.clone())?;
        Ok(file)
    }

    /// Device owning `addr` and the offset of `addr` inside it.
    ///
    /// # Panics
    ///
    /// Panics if no device is mapped at `addr`.
    fn device(&self, addr: u32) -> (u32, &Mutex<dyn MmioDevice>) {
        let found = self
            .devices
            .range(
                ..=MmioRegion {
                    base: addr,
                    size: u32::MAX,
                },
            )
            .next_back()
            .filter(|(range, _)| addr - range.base < range.size);
        match found {
            Some((range, dev)) => (addr - range.base, &**dev),
            None => panic!("mmio_emu: no device for address {:#010x}", addr),
        }
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.log.lock().unwrap().clone()
    }

    pub fn loads(&self) -> usize {
        self.count(|t| matches!(t, Transaction::Load { .. }))
    }

    pub fn stores(&self) -> usize {
        self.count(|t| matches!(t, Transaction::Store { .. }))
    }

    pub fn clear_log(&self) {
        self.log.lock().unwrap().clear();
    }

    fn count(&self, pred: impl Fn(&Transaction) -> bool) -> usize {
        self.log.lock().unwrap().iter().filter(|t| pred(t)).count()
    }
}

impl Default for MmioEmu {
    fn default() -> Self {
        MmioEmu::new()
    }
}

impl Bus for MmioEmu {
    fn load(&self, address: u32, width: Width) -> u32 {
        let (offset, dev) = self.device(address);
        let value = dev.lock().unwrap().mmio_read(offset, width);
        self.log.lock().unwrap().push(Transaction::Load {
            address,
            width,
            value,
        });
        value
    }

    fn store(&self, address: u32, width: Width, value: u32) {
        let (offset, dev) = self.device(address);
        self.log.lock().unwrap().push(Transaction::Store {
            address,
            width,
            value,
        });
        dev.lock().unwrap().mmio_write(offset, width, value);
    }
}

#[derive(Copy, Clone, Debug, Default)]
struct Word {
    value: u32,
    write_only: u32,
    read_only: u32,
    read_set: u32,
    clear_on_one: u32,
}

/// Little-endian block of 32-bit registers.
///
/// Every bit behaves as plain storage until a [`Register`] is modelled on
/// it with [`RegisterFile::model`].
pub struct RegisterFile {
    words: Vec<Word>,
}

impl RegisterFile {
    /// A zeroed file of `size` bytes, rounded up to whole words.
    pub fn new(size: u32) -> RegisterFile {
        RegisterFile {
            words: std::vec![Word::default(); size.div_ceil(4) as usize],
        }
    }

    /// Applies the access policies of `register` to its word and loads the
    /// reset value. The register offset is taken relative to the start of
    /// this file.
    pub fn model<N: FieldName>(&mut self, register: &Register<N>) {
        let word = &mut self.words[(register.offset().get() / 4) as usize];
        *word = Word {
            value: register.reset_value().get(),
            ..Word::default()
        };
        for field in register.fields() {
            let mask = field.mask();
            match field.access() {
                Access::ReadWrite => {}
                Access::WriteOnly => word.write_only |= mask,
                Access::ReadOnly => word.read_only |= mask,
                Access::ReadSet => word.read_set |= mask,
                Access::ReadClearOnWrite1 => word.clear_on_one |= mask,
            }
        }
    }

    /// Sets `bits` the way hardware would, regardless of their policy.
    pub fn raise(&mut self, offset: u32, bits: u32) {
        self.words[(offset / 4) as usize].value |= bits;
    }

    /// Clears `bits` the way hardware would, regardless of their policy.
    pub fn lower(&mut self, offset: u32, bits: u32) {
        self.words[(offset / 4) as usize].value &= !bits;
    }

    /// Stored word at `offset`, write-only bits included, without any bus
    /// side effect.
    pub fn peek(&self, offset: u32) -> u32 {
        self.words[(offset / 4) as usize].value
    }
}

impl MmioDevice for RegisterFile {
    fn mmio_read(&mut self, offset: u32, width: Width) -> u32 {
        let word = self.words[(offset / 4) as usize];
        let shift = (offset % 4) * 8;
        ((word.value & !word.write_only) >> shift) & width.mask()
    }

    fn mmio_write(&mut self, offset: u32, width: Width, value: u32) {
        let word = &mut self.words[(offset / 4) as usize];
        let shift = (offset % 4) * 8;
        let lane = width.mask() << shift;
        let data = (value << shift) & lane;

        let plain = lane & !(word.read_only | word.read_set | word.clear_on_one);
        word.value = (word.value & !plain) | (data & plain);
        word.value |= data & word.read_set;
        word.value &= !(data & word.clear_on_one);
    }
}
