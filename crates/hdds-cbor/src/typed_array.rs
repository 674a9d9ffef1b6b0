// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed-array tags (RFC 8746, draft-ietf-cbor-array-tags).
//!
//! Homogeneous numeric arrays are packed into a byte string and wrapped in
//! the CBOR tag that names their element type. Only the little-endian tag
//! variants are produced.
//!
//! | Tag | Element |   | Tag | Element |
//! |-----|---------|---|-----|---------|
//! | 64  | uint8   |   | 72  | sint8   |
//! | 69  | uint16  |   | 77  | sint16  |
//! | 70  | uint32  |   | 78  | sint32  |
//! | 71  | uint64  |   | 79  | sint64  |
//! | 85  | float32 |   | 86  | float64 |

use crate::record::Value;
use byteorder::{ByteOrder, LittleEndian};
use std::fmt;
use thiserror::Error;

pub const TAG_UINT8: u64 = 64;
pub const TAG_UINT16_LE: u64 = 69;
pub const TAG_UINT32_LE: u64 = 70;
pub const TAG_UINT64_LE: u64 = 71;
pub const TAG_SINT8: u64 = 72;
pub const TAG_SINT16_LE: u64 = 77;
pub const TAG_SINT32_LE: u64 = 78;
pub const TAG_SINT64_LE: u64 = 79;
pub const TAG_FLOAT32_LE: u64 = 85;
pub const TAG_FLOAT64_LE: u64 = 86;

/// Element pack code: width and signedness of one array element.
///
/// Byte order is not part of the code; every multi-byte element is written
/// little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl ElementKind {
    /// Size of one packed element in bytes.
    pub fn width(&self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }

    fn put_integer(self, slot: &mut [u8], v: i128) -> Result<(), PackFault> {
        match self {
            Self::U8 => slot[0] = u8::try_from(v).map_err(|_| PackFault::Range)?,
            Self::I8 => slot[0] = i8::try_from(v).map_err(|_| PackFault::Range)? as u8,
            Self::U16 => {
                LittleEndian::write_u16(slot, u16::try_from(v).map_err(|_| PackFault::Range)?)
            }
            Self::I16 => {
                LittleEndian::write_i16(slot, i16::try_from(v).map_err(|_| PackFault::Range)?)
            }
            Self::U32 => {
                LittleEndian::write_u32(slot, u32::try_from(v).map_err(|_| PackFault::Range)?)
            }
            Self::I32 => {
                LittleEndian::write_i32(slot, i32::try_from(v).map_err(|_| PackFault::Range)?)
            }
            Self::U64 => {
                LittleEndian::write_u64(slot, u64::try_from(v).map_err(|_| PackFault::Range)?)
            }
            Self::I64 => {
                LittleEndian::write_i64(slot, i64::try_from(v).map_err(|_| PackFault::Range)?)
            }
            Self::F32 | Self::F64 => self.put_float(slot, v as f64)?,
        }
        Ok(())
    }

    fn put_float(self, slot: &mut [u8], v: f64) -> Result<(), PackFault> {
        match self {
            Self::F32 => {
                // Finite input must stay finite after rounding to binary32.
                let narrowed = v as f32;
                if v.is_finite() && narrowed.is_infinite() {
                    return Err(PackFault::Range);
                }
                LittleEndian::write_f32(slot, narrowed);
            }
            Self::F64 => LittleEndian::write_f64(slot, v),
            _ => return Err(PackFault::Kind),
        }
        Ok(())
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::U8 => "uint8",
            Self::U16 => "uint16",
            Self::U32 => "uint32",
            Self::U64 => "uint64",
            Self::I8 => "int8",
            Self::I16 => "int16",
            Self::I32 => "int32",
            Self::I64 => "int64",
            Self::F32 => "float32",
            Self::F64 => "float64",
        };
        f.write_str(name)
    }
}

/// Packing errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PackError {
    #[error("expected a sequence of {element} elements, found {found}")]
    NotASequence {
        element: ElementKind,
        found: &'static str,
    },

    #[error("element {index}: cannot pack {found} as {element}")]
    WrongKind {
        index: usize,
        element: ElementKind,
        found: &'static str,
    },

    #[error("element {index}: {value} out of range for {element}")]
    OutOfRange {
        index: usize,
        element: ElementKind,
        value: String,
    },
}

impl PackError {
    /// Index of the offending element, if the failure is element-specific.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::NotASequence { .. } => None,
            Self::WrongKind { index, .. } | Self::OutOfRange { index, .. } => Some(*index),
        }
    }
}

enum PackFault {
    Kind,
    Range,
}

#[derive(Debug, Clone, Copy)]
enum Numeric {
    Int(i128),
    Float(f64),
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
        }
    }
}

fn numeric(value: &Value) -> Result<Numeric, &'static str> {
    match value {
        Value::Int(v) => Ok(Numeric::Int(i128::from(*v))),
        Value::UInt(v) => Ok(Numeric::Int(i128::from(*v))),
        Value::Bool(v) => Ok(Numeric::Int(i128::from(*v))),
        Value::Char(c) => Ok(Numeric::Int(i128::from(u32::from(*c)))),
        Value::Float(v) => Ok(Numeric::Float(*v)),
        other => Err(other.kind_name()),
    }
}

/// A Tagged Array Format entry: CBOR tag number plus element pack code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypedArrayFormat {
    pub tag: u64,
    pub element: ElementKind,
}

impl TypedArrayFormat {
    pub const fn new(tag: u64, element: ElementKind) -> Self {
        Self { tag, element }
    }

    /// Look up the format for a declared type tag.
    pub fn lookup(type_tag: &str) -> Option<Self> {
        TYPED_ARRAY_FORMATS
            .iter()
            .find(|(name, _)| *name == type_tag)
            .map(|(_, format)| *format)
    }

    /// Pack a sequence (or byte string) value into a little-endian payload.
    ///
    /// The payload is exactly `len * element.width()` bytes; an empty input
    /// yields an empty payload.
    pub fn pack(&self, value: &Value) -> Result<Vec<u8>, PackError> {
        match value {
            Value::Bytes(bytes) => self.pack_numbers(
                bytes.len(),
                bytes.iter().map(|b| Ok(Numeric::Int(i128::from(*b)))),
            ),
            Value::Sequence(items) => self.pack_numbers(items.len(), items.iter().map(numeric)),
            other => Err(PackError::NotASequence {
                element: self.element,
                found: other.kind_name(),
            }),
        }
    }

    fn pack_numbers<I>(&self, count: usize, numbers: I) -> Result<Vec<u8>, PackError>
    where
        I: Iterator<Item = Result<Numeric, &'static str>>,
    {
        let element = self.element;
        let width = element.width();
        let mut payload = vec![0u8; count * width];

        for ((index, number), slot) in numbers.enumerate().zip(payload.chunks_exact_mut(width)) {
            let number = number.map_err(|found| PackError::WrongKind {
                index,
                element,
                found,
            })?;
            let result = match number {
                Numeric::Int(v) => element.put_integer(slot, v),
                Numeric::Float(v) => element.put_float(slot, v),
            };
            result.map_err(|fault| match fault {
                PackFault::Kind => PackError::WrongKind {
                    index,
                    element,
                    found: "float",
                },
                PackFault::Range => PackError::OutOfRange {
                    index,
                    element,
                    value: number.to_string(),
                },
            })?;
        }

        Ok(payload)
    }
}

/// Type tag → typed-array format. Aliases share one entry value.
pub static TYPED_ARRAY_FORMATS: &[(&str, TypedArrayFormat)] = &[
    ("uint16[]", TypedArrayFormat::new(TAG_UINT16_LE, ElementKind::U16)),
    ("uint32[]", TypedArrayFormat::new(TAG_UINT32_LE, ElementKind::U32)),
    ("uint64[]", TypedArrayFormat::new(TAG_UINT64_LE, ElementKind::U64)),
    ("byte[]", TypedArrayFormat::new(TAG_SINT8, ElementKind::I8)),
    ("int8[]", TypedArrayFormat::new(TAG_SINT8, ElementKind::I8)),
    ("uint8[]", TypedArrayFormat::new(TAG_UINT8, ElementKind::U8)),
    ("sequence<byte>", TypedArrayFormat::new(TAG_SINT8, ElementKind::I8)),
    ("sequence<int8>", TypedArrayFormat::new(TAG_SINT8, ElementKind::I8)),
    ("sequence<uint8>", TypedArrayFormat::new(TAG_UINT8, ElementKind::U8)),
    ("sequence<int16>", TypedArrayFormat::new(TAG_SINT16_LE, ElementKind::I16)),
    ("sequence<uint16>", TypedArrayFormat::new(TAG_UINT16_LE, ElementKind::U16)),
    ("sequence<int32>", TypedArrayFormat::new(TAG_SINT32_LE, ElementKind::I32)),
    ("sequence<uint32>", TypedArrayFormat::new(TAG_UINT32_LE, ElementKind::U32)),
    ("sequence<int64>", TypedArrayFormat::new(TAG_SINT64_LE, ElementKind::I64)),
    ("sequence<uint64>", TypedArrayFormat::new(TAG_UINT64_LE, ElementKind::U64)),
    ("sequence<float32>", TypedArrayFormat::new(TAG_FLOAT32_LE, ElementKind::F32)),
    ("sequence<float64>", TypedArrayFormat::new(TAG_FLOAT64_LE, ElementKind::F64)),
    ("sequence<float>", TypedArrayFormat::new(TAG_FLOAT32_LE, ElementKind::F32)),
    ("sequence<double>", TypedArrayFormat::new(TAG_FLOAT64_LE, ElementKind::F64)),
    ("int16[]", TypedArrayFormat::new(TAG_SINT16_LE, ElementKind::I16)),
    ("int32[]", TypedArrayFormat::new(TAG_SINT32_LE, ElementKind::I32)),
    ("int64[]", TypedArrayFormat::new(TAG_SINT64_LE, ElementKind::I64)),
    ("float32[]", TypedArrayFormat::new(TAG_FLOAT32_LE, ElementKind::F32)),
    ("float64[]", TypedArrayFormat::new(TAG_FLOAT64_LE, ElementKind::F64)),
];
