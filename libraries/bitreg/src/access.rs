// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

/// How software may access a bit-field.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Access {
    /// Plain read/write storage.
    ReadWrite,
    /// Strobe bits. Writes trigger an action, reads are meaningless.
    WriteOnly,
    /// Status set by hardware. Writes are ignored by the silicon.
    ReadOnly,
    /// Writing 1 sets the bit, writing 0 has no effect.
    ReadSet,
    /// Hardware sets the bit, writing 1 clears it, writing 0 has no effect.
    ReadClearOnWrite1,
}

impl Access {
    pub const fn is_readable(self) -> bool {
        !matches!(self, Access::WriteOnly)
    }

    pub const fn is_writable(self) -> bool {
        !matches!(self, Access::ReadOnly)
    }

    /// Whether storing 0 into the field changes it.
    pub const fn is_clearable(self) -> bool {
        matches!(self, Access::ReadWrite | Access::WriteOnly)
    }

    /// Whether the stored value survives in the register and must be
    /// preserved by read-modify-write of sibling fields.
    pub const fn is_retained(self) -> bool {
        matches!(self, Access::ReadWrite)
    }
}

#[cfg(test)]
mod tests {
    use super::Access;

    #[test]
    fn policies() {
        assert!(Access::ReadWrite.is_readable() && Access::ReadWrite.is_writable());
        assert!(!Access::WriteOnly.is_readable());
        assert!(!Access::ReadOnly.is_writable());
        assert!(Access::ReadClearOnWrite1.is_readable());
        assert!(Access::ReadClearOnWrite1.is_writable());
        assert!(!Access::ReadClearOnWrite1.is_clearable());
        assert!(!Access::ReadSet.is_clearable());
        assert!(Access::WriteOnly.is_clearable());
        assert!(!Access::WriteOnly.is_retained());
    }
}
