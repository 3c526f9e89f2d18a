// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

use bitreg::BaseAddress;
use stm32::exti::{ExtiRegisters, Line};

pub const EXTI_BASE: BaseAddress = BaseAddress::new(0x4001_3C00);

/// Line 19 has no edge selection on this family.
pub static EXTI: ExtiRegisters = ExtiRegisters::new(EXTI_BASE).without_trigger(Line::Line19);
