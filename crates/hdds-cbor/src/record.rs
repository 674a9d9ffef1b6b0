// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Record model consumed by the converter.
//!
//! A [`Record`] exposes its declared fields as `(name, type_tag)` pairs in
//! declaration order and gives access to each field's current [`Value`].
//! Reflection layers (ROS 2 type support, XTypes dynamic data) implement the
//! trait; [`Message`] is the built-in implementation.

use std::fmt;
use std::sync::Arc;

/// Field access for a typed record.
pub trait Record: fmt::Debug + Send + Sync {
    /// Fully qualified type name (e.g. `geometry_msgs/Point`).
    fn type_name(&self) -> &str;

    /// Declared fields as `(name, type_tag)`, in declaration order.
    fn fields_and_types(&self) -> Vec<(&str, &str)>;

    /// Current value of a field.
    fn field(&self, name: &str) -> Option<&Value>;
}

/// A field value as supplied by the reflection layer.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Char(char),
    String(String),
    Bytes(Vec<u8>),
    Sequence(Vec<Value>),
    Record(Arc<dyn Record>),
}

impl Value {
    /// Wrap any record implementation.
    pub fn record<R: Record + 'static>(record: R) -> Self {
        Self::Record(Arc::new(record))
    }

    /// Short kind name used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) | Self::UInt(_) => "integer",
            Self::Float(_) => "float",
            Self::Char(_) => "char",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Sequence(_) => "sequence",
            Self::Record(_) => "record",
        }
    }

    /// List-like container (the array-of-records fallback applies).
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Sequence(_))
    }

    pub fn as_record(&self) -> Option<&dyn Record> {
        match self {
            Self::Record(r) => Some(r.as_ref()),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Truthiness: zero, empty and null are false; records are always true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(v) => *v,
            Self::Int(v) => *v != 0,
            Self::UInt(v) => *v != 0,
            Self::Float(v) => *v != 0.0,
            Self::Char(c) => *c != '\0',
            Self::String(s) => !s.is_empty(),
            Self::Bytes(b) => !b.is_empty(),
            Self::Sequence(items) => !items.is_empty(),
            Self::Record(_) => true,
        }
    }
}

macro_rules! value_from {
    ($variant:ident, $conv:ty; $($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Self::$variant(<$conv>::from(v))
                }
            }
        )*
    };
}

value_from!(Int, i64; i8, i16, i32, i64);
value_from!(UInt, u64; u8, u16, u32, u64);
value_from!(Float, f64; f32, f64);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Self::Char(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<Message> for Value {
    fn from(v: Message) -> Self {
        Self::record(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::Sequence(v.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone)]
struct MessageField {
    name: String,
    type_tag: String,
    value: Value,
}

/// An ordered, self-describing record.
#[derive(Debug, Clone)]
pub struct Message {
    type_name: String,
    fields: Vec<MessageField>,
}

impl Message {
    /// Start building a message of the given type.
    pub fn builder(type_name: impl Into<String>) -> MessageBuilder {
        MessageBuilder::new(type_name)
    }

    /// `builtin_interfaces/Time`.
    pub fn time(sec: i32, nanosec: u32) -> Self {
        Self::builder("builtin_interfaces/Time")
            .field("sec", "int32", sec)
            .field("nanosec", "uint32", nanosec)
            .build()
    }

    /// `builtin_interfaces/Duration`.
    pub fn duration(sec: i32, nanosec: u32) -> Self {
        Self::builder("builtin_interfaces/Duration")
            .field("sec", "int32", sec)
            .field("nanosec", "uint32", nanosec)
            .build()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Declared type tag of a field.
    pub fn type_tag(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.type_tag.as_str())
    }

    /// Replace the value of a declared field. Returns false if undeclared.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> bool {
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => {
                field.value = value.into();
                true
            }
            None => false,
        }
    }
}

impl Record for Message {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn fields_and_types(&self) -> Vec<(&str, &str)> {
        self.fields
            .iter()
            .map(|f| (f.name.as_str(), f.type_tag.as_str()))
            .collect()
    }

    fn field(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }
}

/// Fluent builder for [`Message`].
#[derive(Debug)]
pub struct MessageBuilder {
    type_name: String,
    fields: Vec<MessageField>,
}

impl MessageBuilder {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Declare a field. Redeclaring a name keeps its position and replaces
    /// the type tag and value.
    pub fn field(
        mut self,
        name: impl Into<String>,
        type_tag: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        let field = MessageField {
            name: name.into(),
            type_tag: type_tag.into(),
            value: value.into(),
        };
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
        self
    }

    /// Declare a nested message field typed by the nested message's own name.
    pub fn nested(self, name: impl Into<String>, message: Message) -> Self {
        let type_tag = message.type_name.clone();
        self.field(name, type_tag, message)
    }

    /// Declare a raw byte field (`sequence<uint8>`).
    pub fn bytes(self, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.field(name, "sequence<uint8>", Value::Bytes(bytes))
    }

    pub fn build(self) -> Message {
        Message {
            type_name: self.type_name,
            fields: self.fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_preserves_declaration_order() {
        let msg = Message::builder("geometry_msgs/Point")
            .field("x", "float64", 1.0)
            .field("y", "float64", 2.0)
            .field("z", "float64", 3.0)
            .build();

        let names: Vec<&str> = msg.fields_and_types().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["x", "y", "z"]);
        assert_eq!(msg.type_name(), "geometry_msgs/Point");
        assert_eq!(msg.len(), 3);
    }

    #[test]
    fn test_redeclared_field_replaced_in_place() {
        let msg = Message::builder("T")
            .field("a", "int32", 1)
            .field("b", "int32", 2)
            .field("a", "string", "x")
            .build();

        assert_eq!(msg.fields_and_types(), vec![("a", "string"), ("b", "int32")]);
        assert_eq!(msg.field("a").and_then(Value::as_str), Some("x"));
    }

    #[test]
    fn test_set_declared_field() {
        let mut msg = Message::time(1, 2);
        assert!(msg.set("sec", 10i32));
        assert!(!msg.set("missing", 0i32));
        assert!(matches!(msg.field("sec"), Some(Value::Int(10))));
        assert_eq!(msg.type_tag("nanosec"), Some("uint32"));
    }

    #[test]
    fn test_nested_uses_type_name_as_tag() {
        let header = Message::builder("std_msgs/Header")
            .nested("stamp", Message::time(0, 0))
            .field("frame_id", "string", "map")
            .build();
        assert_eq!(header.type_tag("stamp"), Some("builtin_interfaces/Time"));
        assert!(header.field("stamp").and_then(Value::as_record).is_some());
    }

    #[test]
    fn test_value_capabilities() {
        assert!(Value::from(vec![1u8, 2]).is_container());
        assert!(!Value::Bytes(vec![1, 2]).is_container());
        assert!(!Value::from(Message::time(0, 0)).is_container());
        assert!(Value::from(Message::time(0, 0)).as_record().is_some());
        assert!(Value::from(3i32).as_record().is_none());
        assert_eq!(Value::from(3u16).kind_name(), "integer");
        assert_eq!(Value::Null.kind_name(), "null");
    }

    #[test]
    fn test_truthiness() {
        assert!(Value::from(1i32).is_truthy());
        assert!(!Value::from(0u8).is_truthy());
        assert!(!Value::from(0.0).is_truthy());
        assert!(Value::from(f64::NAN).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("no").is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Sequence(Vec::new()).is_truthy());
        assert!(Value::from(Message::time(0, 0)).is_truthy());
    }
}
