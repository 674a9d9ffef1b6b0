// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! HDDS CBOR Conversion
//!
//! Turns typed records (ROS 2 / DDS messages) into CBOR-encodable value
//! trees for bridges that ship samples to browsers and other non-DDS peers.
//!
//! # Features
//!
//! - **Type-tag dispatch**: each field is converted according to its
//!   declared type tag (`int32`, `string`, `time`, `float64[]`, ...)
//! - **Typed arrays**: numeric arrays are packed little-endian under the
//!   RFC 8746 typed-array tags (64-86)
//! - **Raw bytes**: `sequence<uint8>` / `sequence<char>` become plain CBOR
//!   byte strings
//! - **Nesting**: nested records and arrays of records are converted
//!   recursively, bounded by a configurable maximum depth
//! - **ciborium output**: trees convert into `ciborium::value::Value`
//!
//! # Example
//!
//! ```rust
//! use hdds_cbor::{convert, to_cbor_vec, CborValue, Message};
//!
//! let msg = Message::builder("sensor_msgs/Range")
//!     .field("stamp", "time", Message::time(5, 250))
//!     .field("range", "float32", 1.25f32)
//!     .field("samples", "uint32[]", vec![1u32, 2])
//!     .build();
//!
//! let tree = convert(&msg).unwrap();
//! assert_eq!(tree.get("range"), Some(&CborValue::Float(1.25)));
//!
//! let samples = tree.get("samples").and_then(CborValue::as_tagged).unwrap();
//! assert_eq!(samples.tag, 70);
//! assert_eq!(samples.payload, vec![1, 0, 0, 0, 2, 0, 0, 0]);
//!
//! let bytes = to_cbor_vec(&tree).unwrap();
//! assert_eq!(bytes[0], 0xA3); // map(3)
//! ```
//!
//! # Configuration File
//!
//! ```toml
//! max_depth = 32
//! ```

pub mod config;
pub mod convert;
pub mod error;
pub mod record;
pub mod type_class;
pub mod typed_array;
pub mod value;

pub use config::{ConfigError, ConverterConfig, DEFAULT_MAX_DEPTH, MAX_DEPTH_LIMIT};
pub use convert::{convert, CborConverter};
pub use error::ConvertError;
pub use record::{Message, MessageBuilder, Record, Value};
pub use type_class::TypeClass;
pub use typed_array::{ElementKind, PackError, TypedArrayFormat};
pub use value::{to_cbor_vec, CborValue, TaggedBinary};
