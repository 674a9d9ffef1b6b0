// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Converter configuration.
//!
//! Supports both programmatic and file-based configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default bound on record nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Hard ceiling on record nesting.
///
/// Every nested record costs a few stack frames, so the bound must stay well
/// below what a default 2 MiB thread stack can hold in an unoptimized build.
/// Configs above it are rejected and [`crate::CborConverter::with_max_depth`]
/// clamps to it.
pub const MAX_DEPTH_LIMIT: usize = 256;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Converter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Maximum record nesting depth (top-level record is depth 0).
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ConverterConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the maximum nesting depth.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be at least 1".into()));
        }
        if self.max_depth > MAX_DEPTH_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max_depth {} exceeds limit {}",
                self.max_depth, MAX_DEPTH_LIMIT
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ConverterConfig::default();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_str() {
        let config = ConverterConfig::from_toml_str("max_depth = 8").expect("parse");
        assert_eq!(config.max_depth, 8);

        let config = ConverterConfig::from_toml_str("").expect("empty uses defaults");
        assert_eq!(config, ConverterConfig::default());
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            ConverterConfig::from_toml_str("max_depth = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(ConverterConfig::default()
            .max_depth(MAX_DEPTH_LIMIT + 1)
            .validate()
            .is_err());
        assert!(matches!(
            ConverterConfig::from_toml_str("max_depth = 4096"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(ConverterConfig::default()
            .max_depth(MAX_DEPTH_LIMIT)
            .validate()
            .is_ok());
        assert!(matches!(
            ConverterConfig::from_toml_str("max_depth = \"deep\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "max_depth = 16").expect("write");
        let config = ConverterConfig::from_file(file.path()).expect("load");
        assert_eq!(config.max_depth, 16);

        assert!(matches!(
            ConverterConfig::from_file("/nonexistent/hdds-cbor.toml"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_config_serialization() {
        let toml_str = toml::to_string_pretty(&ConverterConfig::default()).expect("serialize");
        assert!(toml_str.contains("max_depth = 64"));
    }
}
