// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Extraction configuration.
//!
//! Supports both programmatic and file-based configuration.
//!
//! ```toml
//! max_elements = 1000000
//! complex_decode = "auto"
//! squeeze = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

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

/// How complex scalars are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexDecode {
    /// Read the memory layout, fall back to the host's text rendering.
    #[default]
    Auto,
    /// Only read real/imaginary parts from memory.
    Layout,
    /// Only parse the host's text rendering.
    Text,
}

/// Extraction settings shared by every call made with one resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Upper bound on decoded leaves per extraction (None = unlimited).
    #[serde(default)]
    pub max_elements: Option<usize>,

    /// Complex decoding strategy.
    #[serde(default)]
    pub complex_decode: ComplexDecode,

    /// Drop size-1 dimensions when densifying.
    #[serde(default = "default_true")]
    pub squeeze: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_elements: None,
            complex_decode: ComplexDecode::Auto,
            squeeze: true,
        }
    }
}

impl ExtractConfig {
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

    /// Set the element budget.
    pub fn with_max_elements(mut self, max: usize) -> Self {
        self.max_elements = Some(max);
        self
    }

    /// Set the complex decoding strategy.
    pub fn with_complex_decode(mut self, mode: ComplexDecode) -> Self {
        self.complex_decode = mode;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_elements == Some(0) {
            return Err(ConfigError::Invalid(
                "max_elements must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
