// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Record → CBOR value tree conversion.
//!
//! Each declared field is dispatched on its [`TypeClass`]. Tags from the
//! vocabulary always win; only unrecognized tags fall back to the value's
//! shape (sequence → array of records, record → nested map).

use crate::config::{ConverterConfig, DEFAULT_MAX_DEPTH, MAX_DEPTH_LIMIT};
use crate::error::ConvertError;
use crate::record::{Record, Value};
use crate::type_class::TypeClass;
use crate::typed_array::PackError;
use crate::value::{CborValue, TaggedBinary};
use std::fmt::Write;
use tracing::{debug, trace, warn};

/// Converts records into [`CborValue`] trees.
///
/// Holds no state besides its depth bound, so one converter can be shared
/// freely across threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CborConverter {
    max_depth: usize,
}

impl Default for CborConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl CborConverter {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Converter with a custom depth bound, clamped to [`MAX_DEPTH_LIMIT`].
    pub fn with_max_depth(max_depth: usize) -> Self {
        if max_depth > MAX_DEPTH_LIMIT {
            warn!(
                "max_depth {} exceeds limit {}, clamping",
                max_depth, MAX_DEPTH_LIMIT
            );
        }
        Self {
            max_depth: max_depth.min(MAX_DEPTH_LIMIT),
        }
    }

    pub fn with_config(config: &ConverterConfig) -> Self {
        Self::with_max_depth(config.max_depth)
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Convert a record into a map keyed by its field names, in declaration
    /// order.
    pub fn convert(&self, record: &dyn Record) -> Result<CborValue, ConvertError> {
        debug!("Converting '{}' to CBOR", record.type_name());
        let tree = self.convert_record(record, None, 0)?;
        debug!(
            "Converted '{}' ({} fields)",
            record.type_name(),
            tree.as_map().map_or(0, <[_]>::len)
        );
        Ok(tree)
    }

    fn convert_record(
        &self,
        record: &dyn Record,
        path: Option<&FieldPath<'_>>,
        depth: usize,
    ) -> Result<CborValue, ConvertError> {
        if depth > self.max_depth {
            return Err(ConvertError::DepthExceeded {
                path: render(path),
                max_depth: self.max_depth,
            });
        }

        let fields = record.fields_and_types();
        let mut out = Vec::with_capacity(fields.len());
        for (name, type_tag) in fields {
            let field_path = FieldPath::field(path, name);
            let value = record
                .field(name)
                .ok_or_else(|| ConvertError::MissingField {
                    path: field_path.render(),
                })?;
            let converted = self.convert_field(value, type_tag, &field_path, depth)?;
            out.push((name.to_string(), converted));
        }
        Ok(CborValue::Map(out))
    }

    fn convert_field(
        &self,
        value: &Value,
        type_tag: &str,
        path: &FieldPath<'_>,
        depth: usize,
    ) -> Result<CborValue, ConvertError> {
        let class = TypeClass::classify(type_tag);
        trace!("Field '{}' ({}) -> {}", path.render(), type_tag, class.name());

        let encoding = |reason: String| ConvertError::Encoding {
            path: path.render(),
            reason,
        };

        match class {
            TypeClass::String => coerce_string(value).map(CborValue::Text).map_err(encoding),
            TypeClass::Bool => Ok(CborValue::Bool(value.is_truthy())),
            TypeClass::Int => coerce_integer(value).map_err(encoding),
            TypeClass::Float => coerce_float(value).map(CborValue::Float).map_err(encoding),
            TypeClass::Time => convert_time(value, path),
            TypeClass::ByteStream => coerce_bytes(value).map(CborValue::Bytes).map_err(encoding),
            TypeClass::BoolArray => match value {
                Value::Sequence(items) => Ok(CborValue::Array(
                    items.iter().map(|v| CborValue::Bool(v.is_truthy())).collect(),
                )),
                Value::Bytes(bytes) => Ok(CborValue::Array(
                    bytes.iter().map(|b| CborValue::Bool(*b != 0)).collect(),
                )),
                other => Err(encoding(not_a_sequence(other))),
            },
            TypeClass::StringArray => {
                let items = value
                    .as_sequence()
                    .ok_or_else(|| encoding(not_a_sequence(value)))?;
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let text = coerce_string(item).map_err(|reason| ConvertError::Encoding {
                        path: FieldPath::index(path, index).render(),
                        reason,
                    })?;
                    out.push(CborValue::Text(text));
                }
                Ok(CborValue::Array(out))
            }
            TypeClass::TaggedArray(format) => format
                .pack(value)
                .map(|payload| CborValue::Tagged(TaggedBinary::new(format.tag, payload)))
                .map_err(|e| pack_error(path, e)),
            TypeClass::Structural => self.convert_structural(value, path, depth),
        }
    }

    fn convert_structural(
        &self,
        value: &Value,
        path: &FieldPath<'_>,
        depth: usize,
    ) -> Result<CborValue, ConvertError> {
        if !value.is_container() {
            let record = value
                .as_record()
                .ok_or_else(|| ConvertError::StructuralMismatch {
                    path: path.render(),
                    found: value.kind_name(),
                })?;
            return self.convert_record(record, Some(path), depth + 1);
        }

        let items = value.as_sequence().unwrap_or_default();
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let item_path = FieldPath::index(path, index);
            let record = item
                .as_record()
                .ok_or_else(|| ConvertError::StructuralMismatch {
                    path: item_path.render(),
                    found: item.kind_name(),
                })?;
            out.push(self.convert_record(record, Some(&item_path), depth + 1)?);
        }
        Ok(CborValue::Array(out))
    }
}

/// Convert a record with the default configuration.
pub fn convert(record: &dyn Record) -> Result<CborValue, ConvertError> {
    CborConverter::default().convert(record)
}

fn convert_time(value: &Value, path: &FieldPath<'_>) -> Result<CborValue, ConvertError> {
    let record = value.as_record().ok_or_else(|| ConvertError::Encoding {
        path: path.render(),
        reason: format!("time value must be a record with sec/nanosec, found {}", value.kind_name()),
    })?;

    let mut out = Vec::with_capacity(2);
    for name in ["sec", "nanosec"] {
        let sub_path = FieldPath::field(Some(path), name);
        let sub = record.field(name).ok_or_else(|| ConvertError::MissingField {
            path: sub_path.render(),
        })?;
        let converted = coerce_integer(sub).map_err(|reason| ConvertError::Encoding {
            path: sub_path.render(),
            reason,
        })?;
        out.push((name.to_string(), converted));
    }
    Ok(CborValue::Map(out))
}

fn not_a_sequence(value: &Value) -> String {
    format!("expected a sequence, found {}", value.kind_name())
}

fn cannot_coerce(value: &Value, target: &str) -> String {
    format!("cannot coerce {} to {}", value.kind_name(), target)
}

fn pack_error(path: &FieldPath<'_>, e: PackError) -> ConvertError {
    let path = match e.index() {
        Some(index) => FieldPath::index(path, index).render(),
        None => path.render(),
    };
    ConvertError::Encoding {
        path,
        reason: e.to_string(),
    }
}

fn coerce_string(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Char(c) => Ok(c.to_string()),
        Value::Bool(v) => Ok(v.to_string()),
        Value::Int(v) => Ok(v.to_string()),
        Value::UInt(v) => Ok(v.to_string()),
        // Debug keeps the decimal point on whole floats ("1.0").
        Value::Float(v) => Ok(format!("{:?}", v)),
        other => Err(cannot_coerce(other, "string")),
    }
}

fn coerce_integer(value: &Value) -> Result<CborValue, String> {
    let wide: i128 = match value {
        Value::Int(v) => i128::from(*v),
        Value::UInt(v) => i128::from(*v),
        Value::Bool(v) => i128::from(*v),
        Value::Char(c) => i128::from(u32::from(*c)),
        Value::Float(v) => {
            if !v.is_finite() {
                return Err(format!("cannot convert {} to integer", v));
            }
            let t = v.trunc();
            if t < i64::MIN as f64 || t >= 18_446_744_073_709_551_616.0 {
                return Err(format!("{} out of integer range", v));
            }
            t as i128
        }
        Value::String(s) => s
            .trim()
            .parse::<i128>()
            .map_err(|_| format!("invalid integer literal '{}'", s))?,
        other => return Err(cannot_coerce(other, "integer")),
    };
    CborValue::integer(wide).ok_or_else(|| format!("{} out of integer range", wide))
}

fn coerce_float(value: &Value) -> Result<f64, String> {
    match value {
        Value::Float(v) => Ok(*v),
        Value::Int(v) => Ok(*v as f64),
        Value::UInt(v) => Ok(*v as f64),
        Value::Bool(v) => Ok(if *v { 1.0 } else { 0.0 }),
        Value::Char(c) => Ok(f64::from(u32::from(*c))),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("invalid float literal '{}'", s)),
        other => Err(cannot_coerce(other, "float")),
    }
}

fn coerce_bytes(value: &Value) -> Result<Vec<u8>, String> {
    match value {
        Value::Bytes(b) => Ok(b.clone()),
        Value::Sequence(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let byte = match item {
                    Value::Int(v) => u8::try_from(*v).ok(),
                    Value::UInt(v) => u8::try_from(*v).ok(),
                    Value::Bool(v) => Some(u8::from(*v)),
                    Value::Char(c) => u8::try_from(u32::from(*c)).ok(),
                    _ => None,
                };
                byte.ok_or_else(|| format!("element {}: {} is not a byte", index, item.kind_name()))
            })
            .collect(),
        other => Err(cannot_coerce(other, "bytes")),
    }
}

#[derive(Debug, Clone, Copy)]
enum Segment<'a> {
    Field(&'a str),
    Index(usize),
}

/// Borrowed parent-linked path, rendered only when an error or trace needs it.
#[derive(Debug, Clone, Copy)]
struct FieldPath<'a> {
    parent: Option<&'a FieldPath<'a>>,
    segment: Segment<'a>,
}

impl<'a> FieldPath<'a> {
    fn field(parent: Option<&'a FieldPath<'a>>, name: &'a str) -> Self {
        Self {
            parent,
            segment: Segment::Field(name),
        }
    }

    fn index(parent: &'a FieldPath<'a>, index: usize) -> Self {
        Self {
            parent: Some(parent),
            segment: Segment::Index(index),
        }
    }

    fn render(&self) -> String {
        let mut segments = Vec::new();
        let mut cur = Some(self);
        while let Some(p) = cur {
            segments.push(p.segment);
            cur = p.parent;
        }

        let mut out = String::new();
        for segment in segments.into_iter().rev() {
            match segment {
                Segment::Field(name) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(name);
                }
                Segment::Index(i) => {
                    let _ = write!(out, "[{}]", i);
                }
            }
        }
        out
    }
}

fn render(path: Option<&FieldPath<'_>>) -> String {
    path.map_or_else(|| "<root>".to_string(), FieldPath::render)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Message;

    fn single(type_tag: &str, value: impl Into<Value>) -> Result<CborValue, ConvertError> {
        let msg = Message::builder("test_msgs/Single")
            .field("v", type_tag, value)
            .build();
        convert(&msg).map(|tree| tree.get("v").cloned().expect("field v"))
    }

    #[test]
    fn test_field_path_render() {
        let root = FieldPath::field(None, "points");
        let idx = FieldPath::index(&root, 2);
        let leaf = FieldPath::field(Some(&idx), "x");
        assert_eq!(leaf.render(), "points[2].x");
        assert_eq!(render(None), "<root>");
        assert_eq!(render(Some(&root)), "points");
    }

    #[test]
    fn test_string_coercion() {
        assert_eq!(single("string", "abc").unwrap(), CborValue::Text("abc".into()));
        assert_eq!(single("string", 42i32).unwrap(), CborValue::Text("42".into()));
        assert_eq!(single("string", 'q').unwrap(), CborValue::Text("q".into()));
        assert_eq!(single("string", 1.0).unwrap(), CborValue::Text("1.0".into()));
        assert_eq!(single("string", -2.5).unwrap(), CborValue::Text("-2.5".into()));
        assert!(matches!(
            single("string", Value::Bytes(vec![1])),
            Err(ConvertError::Encoding { .. })
        ));
    }

    #[test]
    fn test_bool_coercion() {
        assert_eq!(single("bool", 1i32).unwrap(), CborValue::Bool(true));
        assert_eq!(single("boolean", 0u8).unwrap(), CborValue::Bool(false));
        assert_eq!(single("bool", "").unwrap(), CborValue::Bool(false));
    }

    #[test]
    fn test_integer_coercion() {
        assert_eq!(single("int32", 42i32).unwrap(), CborValue::Integer(42));
        assert_eq!(single("uint64", u64::MAX).unwrap(), CborValue::UInteger(u64::MAX));
        assert_eq!(single("int8", true).unwrap(), CborValue::Integer(1));
        assert_eq!(single("int64", -2.9).unwrap(), CborValue::Integer(-2));
        assert_eq!(single("char", 'A').unwrap(), CborValue::Integer(65));
        assert_eq!(single("octet", " 7 ").unwrap(), CborValue::Integer(7));
        assert!(single("int32", f64::NAN).is_err());
        assert!(single("int32", 1.0e30).is_err());
        assert!(single("int32", "seven").is_err());
    }

    #[test]
    fn test_float_coercion() {
        assert_eq!(single("float64", 1.5).unwrap(), CborValue::Float(1.5));
        assert_eq!(single("float32", 3i32).unwrap(), CborValue::Float(3.0));
        assert_eq!(single("double", "2.5").unwrap(), CborValue::Float(2.5));
        assert!(single("float", Value::Null).is_err());
    }

    #[test]
    fn test_bytes_coercion() {
        assert_eq!(
            single("sequence<uint8>", Value::Bytes(vec![1, 2, 3])).unwrap(),
            CborValue::Bytes(vec![1, 2, 3])
        );
        assert_eq!(
            single("sequence<char>", vec![104u8, 105]).unwrap(),
            CborValue::Bytes(vec![104, 105])
        );
        let err = single("sequence<uint8>", vec![1i32, 300]).unwrap_err();
        assert_eq!(err.path(), Some("v"));
    }

    #[test]
    fn test_bool_and_string_arrays() {
        assert_eq!(
            single("sequence<boolean>", vec![1i32, 0, 2]).unwrap(),
            CborValue::Array(vec![
                CborValue::Bool(true),
                CborValue::Bool(false),
                CborValue::Bool(true)
            ])
        );
        assert_eq!(
            single("sequence<string>", vec!["a", "b"]).unwrap(),
            CborValue::Array(vec![CborValue::Text("a".into()), CborValue::Text("b".into())])
        );
        let err = single(
            "sequence<string>",
            Value::Sequence(vec!["ok".into(), Value::Null]),
        )
        .unwrap_err();
        assert_eq!(err.path(), Some("v[1]"));
    }

    #[test]
    fn test_pack_error_path_has_index() {
        let err = single("int8[]", vec![0i32, 1, 500]).unwrap_err();
        assert_eq!(err.path(), Some("v[2]"));
        assert!(matches!(err, ConvertError::Encoding { .. }));
    }

    #[test]
    fn test_time_requires_record() {
        let err = single("time", 5i32).unwrap_err();
        assert!(matches!(err, ConvertError::Encoding { .. }));

        let partial = Message::builder("builtin_interfaces/Time")
            .field("sec", "int32", 1i32)
            .build();
        let err = single("time", partial).unwrap_err();
        assert_eq!(
            err,
            ConvertError::MissingField {
                path: "v.nanosec".into()
            }
        );
    }

    #[test]
    fn test_structural_mismatch() {
        let err = single("custom_msgs/Thing", 3i32).unwrap_err();
        assert_eq!(
            err,
            ConvertError::StructuralMismatch {
                path: "v".into(),
                found: "integer"
            }
        );

        let err = single(
            "sequence<custom_msgs/Thing>",
            Value::Sequence(vec![Message::time(0, 0).into(), 1i32.into()]),
        )
        .unwrap_err();
        assert_eq!(err.path(), Some("v[1]"));
    }

    #[test]
    fn test_with_max_depth_clamps() {
        assert_eq!(CborConverter::with_max_depth(8).max_depth(), 8);
        assert_eq!(
            CborConverter::with_max_depth(MAX_DEPTH_LIMIT + 1).max_depth(),
            MAX_DEPTH_LIMIT
        );
        assert_eq!(
            CborConverter::with_max_depth(usize::MAX).max_depth(),
            MAX_DEPTH_LIMIT
        );
    }

    #[test]
    fn test_converter_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CborConverter>();
        assert_send_sync::<Value>();
    }
}
