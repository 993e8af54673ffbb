//! Configuration types for linearization and dispatch sessions

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{MroError, Result};

/// Main configuration for a resolution session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MroConfig {
    /// Linearization cache configuration
    pub cache: CacheConfig,

    /// Linearization configuration
    pub linearization: LinearizationConfig,
}

/// Linearization cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Memoize linearizations per class
    pub enabled: bool,

    /// Capacity reserved up front
    pub initial_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_capacity: 64,
        }
    }
}

/// Linearization configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearizationConfig {
    /// Longest recursion path followed before giving up
    pub max_depth: usize,
}

impl Default for LinearizationConfig {
    fn default() -> Self {
        Self { max_depth: 512 }
    }
}

impl MroConfig {
    /// Parse a configuration from `YAML`
    ///
    /// # Errors
    ///
    /// Returns [`MroError::Config`] if the text is not valid `YAML` for this
    /// structure or the values fail validation.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| MroError::config(format!("invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read, otherwise the errors
    /// of [`MroConfig::from_yaml_str`].
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns [`MroError::Config`] when `linearization.max_depth` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.linearization.max_depth == 0 {
            return Err(MroError::config(
                "linearization.max_depth must be greater than 0",
            ));
        }
        Ok(())
    }
}
