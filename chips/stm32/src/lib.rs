// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Register layouts and drivers shared by the STM32 F3, F4 and L4 families.
//!
//! The GPIO port and EXTI register blocks are identical across these
//! families apart from their base addresses and reset values, which the
//! family crates supply.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod errorcode;
pub mod exti;
pub mod gpio;

pub use errorcode::ErrorCode;
