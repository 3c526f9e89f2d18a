// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

use bitreg::{BaseAddress, ResetValue};
use stm32::exti::ExtiRegisters;

pub const EXTI_BASE: BaseAddress = BaseAddress::new(0x4001_0400);

/// Internal lines 23 to 28 are unmasked at reset.
pub static EXTI: ExtiRegisters =
    ExtiRegisters::new(EXTI_BASE).with_imr_reset(ResetValue::new(0x1F80_0000));

#[cfg(test)]
mod tests {
    use bitreg::emu::MmioEmu;
    use stm32::exti::{Exti, Line, TriggerType};

    use super::*;

    #[test]
    fn enable_keeps_internal_lines_unmasked() {
        let mut emu = MmioEmu::new();
        let file = emu.register_file(EXTI_BASE, 0x18).unwrap();
        {
            let mut f = file.lock().unwrap();
            f.model(&EXTI.imr);
            f.model(&EXTI.pr);
        }
        let exti = Exti::new(&EXTI, &emu);

        exti.enable(Line::Line0).unwrap();
        assert_eq!(file.lock().unwrap().peek(0x00), 0x1F80_0001);
        exti.disable(Line::Line0).unwrap();
        assert_eq!(file.lock().unwrap().peek(0x00), 0x1F80_0000);

        // Every line has an edge selection on this part.
        assert_eq!(exti.set_trigger_type(Line::Line19, TriggerType::Rise), Ok(()));
    }
}
