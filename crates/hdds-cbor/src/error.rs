// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Conversion errors.

use thiserror::Error;

/// Errors returned by [`crate::CborConverter::convert`].
///
/// `path` is the dotted field path of the failing value, e.g.
/// `header.stamp.sec` or `points[2].x`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConvertError {
    #[error("Structural mismatch at '{path}': {found} value is not a record")]
    StructuralMismatch { path: String, found: &'static str },

    #[error("Missing field '{path}'")]
    MissingField { path: String },

    #[error("Encoding error at '{path}': {reason}")]
    Encoding { path: String, reason: String },

    #[error("Record nesting at '{path}' exceeds maximum depth {max_depth}")]
    DepthExceeded { path: String, max_depth: usize },

    #[error("CBOR serialization error: {0}")]
    Serialize(String),
}

impl ConvertError {
    /// Field path of the failure (None for serializer errors).
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::StructuralMismatch { path, .. }
            | Self::MissingField { path }
            | Self::Encoding { path, .. }
            | Self::DepthExceeded { path, .. } => Some(path),
            Self::Serialize(_) => None,
        }
    }
}
