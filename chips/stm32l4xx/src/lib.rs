// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Peripheral register maps and drivers for the STM32L4 family.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod flash;
pub mod gpio;
pub mod pwr;

pub use stm32::ErrorCode;
