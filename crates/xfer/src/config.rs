// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transfer configuration.
//!
//! Supports both programmatic and file-based configuration:
//!
//! ```toml
//! kind = "buffered"
//! write_capacity = 4096
//! read_capacity = 4096
//! scratch_capacity = 8192
//! refill_policy = "demand"
//!
//! [compression]
//! algo = "deflate"
//! level = 6
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::transfer::{
    CompressionConfig, RefillPolicy, TransferKind, DEFAULT_MAX_FRAME_SIZE,
};
use crate::{DEFAULT_READ_CAPACITY, DEFAULT_SCRATCH_CAPACITY, DEFAULT_WRITE_CAPACITY};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for this schema.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Values parsed but do not make sense together.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Transfer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransferConfig {
    /// Which transfer to build.
    #[serde(default)]
    pub kind: TransferKind,

    /// Write-buffer capacity (`W`).
    #[serde(default = "default_write_capacity")]
    pub write_capacity: usize,

    /// Read-buffer capacity (`R`).
    #[serde(default = "default_read_capacity")]
    pub read_capacity: usize,

    /// Size of the scratch region allocated when the caller supplies none.
    #[serde(default = "default_scratch_capacity")]
    pub scratch_capacity: usize,

    /// Refills above this size use `read_exact`. Defaults to the scratch
    /// length; larger values are clamped to it.
    #[serde(default)]
    pub direct_read_threshold: Option<usize>,

    /// How much a buffered refill asks for.
    #[serde(default)]
    pub refill_policy: RefillPolicy,

    /// Largest frame or envelope accepted in either direction.
    #[serde(default = "default_max_frame_size")]
    pub max_frame_size: usize,

    /// Codec settings for the compressed transfer.
    #[serde(default)]
    pub compression: CompressionConfig,
}

fn default_write_capacity() -> usize {
    DEFAULT_WRITE_CAPACITY
}

fn default_read_capacity() -> usize {
    DEFAULT_READ_CAPACITY
}

fn default_scratch_capacity() -> usize {
    DEFAULT_SCRATCH_CAPACITY
}

fn default_max_frame_size() -> usize {
    DEFAULT_MAX_FRAME_SIZE
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            kind: TransferKind::default(),
            write_capacity: DEFAULT_WRITE_CAPACITY,
            read_capacity: DEFAULT_READ_CAPACITY,
            scratch_capacity: DEFAULT_SCRATCH_CAPACITY,
            direct_read_threshold: None,
            refill_policy: RefillPolicy::default(),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            compression: CompressionConfig::default(),
        }
    }
}

impl TransferConfig {
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

    /// Default configuration for `kind`.
    pub fn for_kind(kind: TransferKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// Set buffer capacities.
    pub fn with_capacities(mut self, write_capacity: usize, read_capacity: usize) -> Self {
        self.write_capacity = write_capacity;
        self.read_capacity = read_capacity;
        self.scratch_capacity = self.scratch_capacity.max(read_capacity);
        self
    }

    /// Set the refill policy.
    pub fn with_refill_policy(mut self, policy: RefillPolicy) -> Self {
        self.refill_policy = policy;
        self
    }

    /// Set the maximum frame size.
    pub fn with_max_frame_size(mut self, max: usize) -> Self {
        self.max_frame_size = max;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.write_capacity == 0 {
            return Err(ConfigError::Invalid("write_capacity must be non-zero".into()));
        }
        if self.read_capacity == 0 {
            return Err(ConfigError::Invalid("read_capacity must be non-zero".into()));
        }
        if self.scratch_capacity < self.read_capacity {
            return Err(ConfigError::Invalid(format!(
                "scratch_capacity ({}) is smaller than read_capacity ({})",
                self.scratch_capacity, self.read_capacity
            )));
        }
        if self.max_frame_size == 0 {
            return Err(ConfigError::Invalid("max_frame_size must be non-zero".into()));
        }
        if self.kind == TransferKind::Compressed {
            self.compression.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::CompressionAlgo;

    #[test]
    fn test_default_config() {
        let config = TransferConfig::default();
        assert_eq!(config.kind, TransferKind::Buffered);
        assert_eq!(config.write_capacity, 4096);
        assert_eq!(config.read_capacity, 4096);
        assert_eq!(config.scratch_capacity, 8192);
        assert_eq!(config.direct_read_threshold, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
kind = "compressed"
write_capacity = 1024
read_capacity = 2048
scratch_capacity = 2048
direct_read_threshold = 512
refill_policy = "demand"

[compression]
algo = "deflate"
level = 9
"#;

        let config = TransferConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.kind, TransferKind::Compressed);
        assert_eq!(config.write_capacity, 1024);
        assert_eq!(config.read_capacity, 2048);
        assert_eq!(config.direct_read_threshold, Some(512));
        assert_eq!(config.refill_policy, RefillPolicy::Demand);
        assert_eq!(config.compression.algo, CompressionAlgo::Deflate);
        assert_eq!(config.compression.level, 9);
        assert_eq!(config.max_frame_size, DEFAULT_MAX_FRAME_SIZE);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = TransferConfig::from_toml_str("").unwrap();
        assert_eq!(config, TransferConfig::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = TransferConfig::from_toml_str("buffer_size = 10");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_validation() {
        let config = TransferConfig {
            write_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = TransferConfig {
            read_capacity: 16384,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        // Compression settings only matter for the compressed kind.
        let mut config = TransferConfig::default();
        config.compression.level = 42;
        assert!(config.validate().is_ok());
        config.kind = TransferKind::Compressed;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builder_keeps_scratch_large_enough() {
        let config = TransferConfig::for_kind(TransferKind::Framed)
            .with_capacities(64, 16384)
            .with_max_frame_size(1024);
        assert_eq!(config.scratch_capacity, 16384);
        assert_eq!(config.kind, TransferKind::Framed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xfer.toml");
        std::fs::write(&path, "kind = \"framed\"\nmax_frame_size = 65536\n").unwrap();

        let config = TransferConfig::from_file(&path).unwrap();
        assert_eq!(config.kind, TransferKind::Framed);
        assert_eq!(config.max_frame_size, 65536);

        let missing = TransferConfig::from_file(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
