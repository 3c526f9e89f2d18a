// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Compile-time configuration of the register layer.
//!
//! Options are plain constants so that disabled code paths are still
//! type-checked and then folded away by the compiler.

pub(crate) struct Config {
    /// Whether every register load and store is printed on the debug output,
    /// with the register name, address and value.
    pub(crate) trace_register_access: bool,
}

pub(crate) const CONFIG: Config = Config {
    trace_register_access: cfg!(feature = "trace_register_access"),
};
