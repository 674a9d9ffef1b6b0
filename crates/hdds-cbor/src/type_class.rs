// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-tag classification.
//!
//! Declared type tags are sorted into a closed set of classes. Lookup order
//! is fixed, so a tag listed in two tables (`sequence<uint8>` is both a
//! byte stream and a typed array) resolves to the earlier class.

use crate::typed_array::TypedArrayFormat;

pub const STRING_TYPES: &[&str] = &["string"];
pub const BOOL_TYPES: &[&str] = &["bool", "boolean"];
pub const INT_TYPES: &[&str] = &[
    "byte", "char", "int8", "uint8", "int16", "uint16", "int32", "uint32", "int64", "uint64",
    "octet",
];
pub const FLOAT_TYPES: &[&str] = &["float32", "float64", "float", "double"];
pub const TIME_TYPES: &[&str] = &["time", "duration"];
pub const BYTESTREAM_TYPES: &[&str] = &["sequence<uint8>", "sequence<char>"];
pub const BOOL_ARRAY_TYPES: &[&str] = &["sequence<boolean>"];
pub const STRING_ARRAY_TYPES: &[&str] = &["sequence<string>"];

/// Conversion class of a declared type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeClass {
    String,
    Bool,
    Int,
    Float,
    /// `time` / `duration`: `{sec, nanosec}`.
    Time,
    /// Raw CBOR byte string.
    ByteStream,
    BoolArray,
    StringArray,
    /// Homogeneous numeric array packed under an RFC 8746 tag.
    TaggedArray(TypedArrayFormat),
    /// Not in the vocabulary: nested record or array of records, decided by
    /// the value's shape.
    Structural,
}

impl TypeClass {
    /// Classify a declared type tag.
    pub fn classify(type_tag: &str) -> Self {
        let tables: [(&[&str], Self); 8] = [
            (STRING_TYPES, Self::String),
            (BOOL_TYPES, Self::Bool),
            (INT_TYPES, Self::Int),
            (FLOAT_TYPES, Self::Float),
            (TIME_TYPES, Self::Time),
            (BYTESTREAM_TYPES, Self::ByteStream),
            (BOOL_ARRAY_TYPES, Self::BoolArray),
            (STRING_ARRAY_TYPES, Self::StringArray),
        ];

        for (names, class) in tables {
            if names.contains(&type_tag) {
                return class;
            }
        }

        TypedArrayFormat::lookup(type_tag).map_or(Self::Structural, Self::TaggedArray)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Time => "time",
            Self::ByteStream => "bytestream",
            Self::BoolArray => "bool-array",
            Self::StringArray => "string-array",
            Self::TaggedArray(_) => "tagged-array",
            Self::Structural => "structural",
        }
    }
}
