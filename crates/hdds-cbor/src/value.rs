// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Converted value tree.
//!
//! The tree is what the converter hands to a CBOR serializer. It maps onto
//! `ciborium::value::Value` one-to-one, with typed arrays carried as
//! `Tag(tag, Bytes(payload))`.

use crate::error::ConvertError;
use ciborium::value::Value as Cbor;

/// A typed-array blob: CBOR tag number plus packed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedBinary {
    pub tag: u64,
    pub payload: Vec<u8>,
}

impl TaggedBinary {
    pub fn new(tag: u64, payload: Vec<u8>) -> Self {
        Self { tag, payload }
    }
}

/// A node of the converted value tree.
#[derive(Debug, Clone, PartialEq)]
pub enum CborValue {
    Bool(bool),
    /// Integer that fits in i64.
    Integer(i64),
    /// Unsigned integer > i64::MAX.
    UInteger(u64),
    Float(f64),
    Text(String),
    /// Untagged byte string.
    Bytes(Vec<u8>),
    Array(Vec<CborValue>),
    /// Map with field-declaration key order.
    Map(Vec<(String, CborValue)>),
    Tagged(TaggedBinary),
}

impl CborValue {
    /// Build an integer node, picking the unsigned variant only when needed.
    pub fn integer(v: i128) -> Option<Self> {
        if let Ok(i) = i64::try_from(v) {
            Some(Self::Integer(i))
        } else {
            u64::try_from(v).ok().map(Self::UInteger)
        }
    }

    /// Look up a map entry by key.
    pub fn get(&self, key: &str) -> Option<&CborValue> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn as_map(&self) -> Option<&[(String, CborValue)]> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[CborValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_tagged(&self) -> Option<&TaggedBinary> {
        match self {
            Self::Tagged(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            Self::UInteger(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Map keys in order.
    pub fn keys(&self) -> Vec<&str> {
        self.as_map()
            .map(|entries| entries.iter().map(|(k, _)| k.as_str()).collect())
            .unwrap_or_default()
    }
}

impl From<CborValue> for Cbor {
    fn from(v: CborValue) -> Self {
        match v {
            CborValue::Bool(b) => Cbor::Bool(b),
            CborValue::Integer(i) => Cbor::Integer(i.into()),
            CborValue::UInteger(u) => Cbor::Integer(u.into()),
            CborValue::Float(f) => Cbor::Float(f),
            CborValue::Text(s) => Cbor::Text(s),
            CborValue::Bytes(b) => Cbor::Bytes(b),
            CborValue::Array(items) => Cbor::Array(items.into_iter().map(Cbor::from).collect()),
            CborValue::Map(entries) => Cbor::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (Cbor::Text(k), Cbor::from(v)))
                    .collect(),
            ),
            CborValue::Tagged(t) => Cbor::Tag(t.tag, Box::new(Cbor::Bytes(t.payload))),
        }
    }
}

/// Serialize a converted tree to CBOR bytes with ciborium.
pub fn to_cbor_vec(value: &CborValue) -> Result<Vec<u8>, ConvertError> {
    let cbor = Cbor::from(value.clone());
    let mut out = Vec::new();
    ciborium::ser::into_writer(&cbor, &mut out)
        .map_err(|e| ConvertError::Serialize(e.to_string()))?;
    Ok(out)
}
