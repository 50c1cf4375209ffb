// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Integer-backed enumerations.
//!
//! Enumeration values travel on the wire as `Int32` codes. Codes are stable
//! and unique within an enumeration; decoding an undeclared code fails with
//! [`EnumerationError::InvalidValue`] instead of falling back to a default.
//!
//! Enumerations are declared with [`ua_enumeration!`](crate::ua_enumeration):
//!
//! ```
//! use uanode_core::ua_enumeration;
//! use uanode_core::enumeration::EnumerationCode;
//!
//! ua_enumeration! {
//!     /// Direction of travel.
//!     pub enum DirectionEnumeration {
//!         /// Forward.
//!         Forward = 0 as "FORWARD",
//!         /// Backward.
//!         Backward = 1 as "BACKWARD",
//!     }
//! }
//!
//! assert_eq!(DirectionEnumeration::from_code(1).unwrap(), DirectionEnumeration::Backward);
//! assert_eq!(DirectionEnumeration::Forward.name(), "FORWARD");
//! assert!(DirectionEnumeration::from_code(7).is_err());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EnumerationError, ModelResult};
use crate::types::Variant;

// =============================================================================
// EnumerationCode
// =============================================================================

/// A closed set of named `Int32` codes.
pub trait EnumerationCode: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Name of the enumeration data type.
    const NAME: &'static str;

    /// Declared `(symbol, code)` pairs in declaration order.
    const VALUES: &'static [(&'static str, i32)];

    /// Returns the wire code.
    fn code(self) -> i32;

    /// Decodes a wire code.
    fn from_code(code: i32) -> ModelResult<Self>;

    /// Returns the symbol of this value.
    fn name(self) -> &'static str;

    /// Decodes a symbol. Matching ignores ASCII case.
    fn from_name(name: &str) -> ModelResult<Self> {
        let found = Self::VALUES
            .iter()
            .find(|(symbol, _)| symbol.eq_ignore_ascii_case(name.trim()));
        match found {
            Some(&(_, code)) => Self::from_code(code),
            None => Err(EnumerationError::UnknownName {
                enumeration: Self::NAME,
                name: name.to_string(),
            }
            .into()),
        }
    }

    /// Decodes an `Int32` variant.
    fn from_variant(value: &Variant) -> ModelResult<Self> {
        match value {
            Variant::Int32(code) => Self::from_code(*code),
            other => Err(EnumerationError::WrongValueType {
                enumeration: Self::NAME,
                actual: other.type_name(),
            }
            .into()),
        }
    }

    /// Encodes as an `Int32` variant.
    fn to_variant(self) -> Variant {
        Variant::Int32(self.code())
    }
}

// =============================================================================
// ua_enumeration!
// =============================================================================

/// Declares an enumeration implementing [`EnumerationCode`].
///
/// Each variant is written `Variant = code as "SYMBOL"`. The macro derives the
/// usual value traits and adds `Display` (the symbol), `TryFrom<i32>`,
/// `From<Self> for i32` and serde support as the integer code.
///
/// [`EnumerationCode`]: crate::enumeration::EnumerationCode
#[macro_export]
macro_rules! ua_enumeration {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $code:literal as $symbol:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $crate::enumeration::EnumerationCode for $name {
            const NAME: &'static str = stringify!($name);
            const VALUES: &'static [(&'static str, i32)] = &[$(($symbol, $code)),+];

            fn code(self) -> i32 {
                match self {
                    $(Self::$variant => $code,)+
                }
            }

            fn from_code(code: i32) -> $crate::error::ModelResult<Self> {
                match code {
                    $($code => Ok(Self::$variant),)+
                    _ => Err($crate::error::ModelError::invalid_enum_value(
                        <Self as $crate::enumeration::EnumerationCode>::NAME,
                        code,
                    )),
                }
            }

            fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $symbol,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::enumeration::EnumerationCode::name(*self))
            }
        }

        impl ::std::convert::TryFrom<i32> for $name {
            type Error = $crate::error::ModelError;

            fn try_from(code: i32) -> ::std::result::Result<Self, Self::Error> {
                <Self as $crate::enumeration::EnumerationCode>::from_code(code)
            }
        }

        impl ::std::convert::From<$name> for i32 {
            fn from(value: $name) -> i32 {
                $crate::enumeration::EnumerationCode::code(value)
            }
        }

        impl $crate::__private::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: $crate::__private::serde::Serializer,
            {
                serializer.serialize_i32($crate::enumeration::EnumerationCode::code(*self))
            }
        }

        impl<'de> $crate::__private::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: $crate::__private::serde::Deserializer<'de>,
            {
                let code = <i32 as $crate::__private::serde::Deserialize>::deserialize(deserializer)?;
                <Self as $crate::enumeration::EnumerationCode>::from_code(code)
                    .map_err($crate::__private::serde::de::Error::custom)
            }
        }
    };
}

// =============================================================================
// EnumerationCollection
// =============================================================================

/// An ordered collection of enumeration values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnumerationCollection<E>(Vec<E>);

impl<E> Default for EnumerationCollection<E> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<E: EnumerationCode> EnumerationCollection<E> {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty collection with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Decodes wire codes. Fails on the first undeclared code.
    pub fn from_codes(codes: &[i32]) -> ModelResult<Self> {
        codes
            .iter()
            .map(|&code| E::from_code(code))
            .collect::<ModelResult<Vec<_>>>()
            .map(Self)
    }

    /// Decodes an array variant of `Int32` codes.
    pub fn from_variant(value: &Variant) -> ModelResult<Self> {
        match value {
            Variant::Array(items) => items
                .iter()
                .map(E::from_variant)
                .collect::<ModelResult<Vec<_>>>()
                .map(Self),
            other => Err(EnumerationError::WrongValueType {
                enumeration: E::NAME,
                actual: other.type_name(),
            }
            .into()),
        }
    }

    /// Returns the wire codes.
    pub fn to_codes(&self) -> Vec<i32> {
        self.0.iter().map(|value| value.code()).collect()
    }

    /// Encodes as an array variant of `Int32` codes.
    pub fn to_variant(&self) -> Variant {
        Variant::Array(self.0.iter().map(|value| value.to_variant()).collect())
    }

    /// Copies the values into a vector.
    pub fn to_vec(&self) -> Vec<E> {
        self.0.clone()
    }

    /// Returns the values as a slice.
    pub fn as_slice(&self) -> &[E] {
        &self.0
    }

    /// Appends a value.
    pub fn push(&mut self, value: E) {
        self.0.push(value);
    }

    /// Returns the number of values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the values.
    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.0.iter()
    }
}

impl<E> From<Vec<E>> for EnumerationCollection<E> {
    fn from(values: Vec<E>) -> Self {
        Self(values)
    }
}

impl<E> From<EnumerationCollection<E>> for Vec<E> {
    fn from(collection: EnumerationCollection<E>) -> Self {
        collection.0
    }
}

impl<E> FromIterator<E> for EnumerationCollection<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<E> IntoIterator for EnumerationCollection<E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a EnumerationCollection<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// =============================================================================
// Tests
// =============================================================================
