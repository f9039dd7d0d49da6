//! Configuration system for typeflow.
//!
//! Load pipeline configuration from TOML or YAML to control how collected
//! containers are allocated, how repeated terminal calls behave, and how much
//! per-element tracing is emitted.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use typeflow_config::{ReusePolicy, StreamConfig};
//!
//! let config = StreamConfig::from_toml_str(r#"
//!     reuse = "reject"
//!     initial_capacity = 64
//! "#).unwrap();
//!
//! assert_eq!(config.reuse, ReusePolicy::Reject);
//! assert_eq!(config.initial_capacity, Some(64));
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use typeflow_config::StreamConfig;
//!
//! let config = StreamConfig::load("typeflow.toml").unwrap_or_default();
//! // Proceeds with defaults if file doesn't exist
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Upper bound on the up-front reservation taken from `initial_capacity`.
pub const MAX_PREALLOC: usize = 1 << 16;

/// Pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct StreamConfig {
    /// Behavior of a terminal call on an already consumed pipeline.
    #[serde(default)]
    pub reuse: ReusePolicy,

    /// Pre-allocation hint for collected containers.
    #[serde(default)]
    pub initial_capacity: Option<usize>,

    /// Emit a trace event for every element dropped by a stage.
    #[serde(default)]
    pub trace_elements: bool,
}

impl StreamConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist, contains invalid TOML, or fails
    /// [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values serde cannot reject on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_capacity == Some(0) {
            return Err(ConfigError::Invalid(
                "initial_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Sets the reuse policy.
    pub fn with_reuse(mut self, reuse: ReusePolicy) -> Self {
        self.reuse = reuse;
        self
    }

    /// Sets the pre-allocation hint.
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = Some(capacity);
        self
    }

    /// Enables or disables per-element trace events.
    pub fn with_trace_elements(mut self, enabled: bool) -> Self {
        self.trace_elements = enabled;
        self
    }

    /// Returns the capacity to reserve for a collected container.
    ///
    /// Falls back to the source's lower size bound when no hint is configured.
    /// Either way the reservation is clamped to [`MAX_PREALLOC`]; containers
    /// still grow past it while collecting.
    pub fn capacity_for(&self, lower_bound: usize) -> usize {
        self.initial_capacity
            .unwrap_or(lower_bound)
            .min(MAX_PREALLOC)
    }
}

/// What a terminal call does on a pipeline whose source is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReusePolicy {
    /// Evaluate again; the exhausted source yields an empty container.
    #[default]
    Drain,

    /// Fail with a "consumed" error and leave destinations untouched.
    Reject,
}
