// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Macros for cleanly defining register fields and their values.

/// Declares field name enumerations and their descriptor tables.
///
/// Each block expands to an enumeration implementing
/// [`FieldName`](crate::FieldName) and an associated `FIELDS` table with one
/// [`BitField`](crate::BitField) per name, in declaration order.
///
/// ```rust
/// # fn main() {}
/// use bitreg::register_fields;
///
/// register_fields! {
///     pub Cr [
///         /// Voltage scaling output selection
///         Vos OFFSET(14) NUMBITS(2) ReadWrite,
///         OdEn OFFSET(16) NUMBITS(1) ReadWrite
///     ],
///     pub Csr [
///         VosRdy OFFSET(14) NUMBITS(1) ReadOnly
///     ]
/// }
/// ```
#[macro_export]
macro_rules! register_fields {
    {
        $(
            $(#[$attr:meta])*
            $vis:vis $name:ident [
                $(
                    $(#[$field_attr:meta])*
                    $field:ident OFFSET($offset:expr) NUMBITS($numbits:expr) $access:ident
                ),+ $(,)?
            ]
        ),* $(,)?
    } => {
        $(
            $crate::field_names! {
                $(#[$attr])*
                $vis $name [
                    $( $(#[$field_attr])* $field ),+
                ]
            }

            impl $name {
                pub const FIELDS: [$crate::BitField; <$name as $crate::FieldName>::COUNT] = [
                    $( $crate::BitField::new($offset, $numbits, $crate::Access::$access) ),+
                ];
            }
        )*
    };
}

/// Declares field name enumerations only.
///
/// Used with field tables that are built some other way, usually
/// [`BitField::array`](crate::BitField::array) for registers made of many
/// equally shaped fields.
#[macro_export]
macro_rules! field_names {
    {
        $(
            $(#[$attr:meta])*
            $vis:vis $name:ident [
                $( $(#[$field_attr:meta])* $field:ident ),+ $(,)?
            ]
        ),* $(,)?
    } => {
        $(
            $(#[$attr])*
            #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
            #[repr(usize)]
            $vis enum $name {
                $( $(#[$field_attr])* $field ),+
            }

            impl $name {
                /// Every name, in field table order.
                pub const ALL: &'static [$name] = &[ $( $name::$field ),+ ];
            }

            impl $crate::FieldName for $name {
                const COUNT: usize = <$name as $crate::FieldName>::NAMES.len();
                const NAMES: &'static [&'static str] = &[ $( stringify!($field) ),+ ];

                fn index(self) -> usize {
                    self as usize
                }
            }
        )*
    };
}

/// Declares symbolic field values.
///
/// Every value is checked against `NUMBITS` during constant evaluation, so a
/// constant that does not fit its field is a build error.
///
/// ```rust
/// # fn main() {}
/// use bitreg::field_values;
///
/// field_values! {
///     pub Pupd NUMBITS(2) [
///         None = 0b00,
///         PullUp = 0b01,
///         PullDown = 0b10
///     ]
/// }
/// ```
#[macro_export]
macro_rules! field_values {
    {
        $(
            $(#[$attr:meta])*
            $vis:vis $name:ident NUMBITS($numbits:expr) [
                $( $(#[$variant_attr:meta])* $variant:ident = $value:expr ),+ $(,)?
            ]
        ),* $(,)?
    } => {
        $(
            $(#[$attr])*
            #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
            #[repr(u32)]
            $vis enum $name {
                $( $(#[$variant_attr])* $variant = $value ),+
            }

            impl $name {
                pub const NUMBITS: u32 = $numbits;
            }

            const _: () = {
                $(
                    assert!(
                        ($value as u64) < (1u64 << $numbits),
                        concat!(stringify!($name), "::", stringify!($variant), " does not fit its field")
                    );
                )+
            };

            impl $crate::FieldValue for $name {
                fn into_bits(self) -> u32 {
                    self as u32
                }

                #[allow(non_upper_case_globals, unused)]
                fn from_bits(bits: u32) -> Option<Self> {
                    $(
                        if bits == $name::$variant as u32 {
                            return Some($name::$variant);
                        }
                    )+
                    None
                }
            }
        )*
    };
}
