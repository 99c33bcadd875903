//! Configuration management for Strata
//!
//! This module handles loading, parsing, and validating configuration
//! from TOML files. It combines settings for stack behavior, transition
//! animation hints, and general options.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main configuration struct containing all Strata settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StrataConfig {
    /// Stack behavior settings
    #[serde(default)]
    pub stack: StackConfig,

    /// Transition animation settings
    #[serde(default)]
    pub animation: AnimationConfig,

    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,
}

/// Window stack behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StackConfig {
    /// When false, externally registered windows the stack does not
    /// manage are still included in transition logic (the underlying
    /// window lists). When true, only managed windows are considered.
    pub ignore_unmanaged: bool,
}

/// Transition animation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimationConfig {
    /// Enable animated transitions. When false the stack never
    /// delegates to an animator and every transition completes
    /// synchronously.
    pub enabled: bool,

    /// Suggested transition duration (milliseconds) for animators
    #[serde(default = "AnimationConfig::default_duration_ms")]
    pub duration_ms: u32,

    /// Suggested curve ("linear", "ease", "ease-in", "ease-out", "ease-in-out")
    pub curve: String,
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable debug logging
    pub debug: bool,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            ignore_unmanaged: false,
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_ms: Self::default_duration_ms(),
            curve: "ease-out".to_string(),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { debug: false }
    }
}

impl AnimationConfig {
    fn default_duration_ms() -> u32 {
        250
    }
}

impl StrataConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Expand ~ to home directory
        let expanded_path = if path.to_string_lossy().starts_with('~') {
            let home = std::env::var("HOME").context("Failed to get HOME environment variable")?;
            Path::new(&home).join(path.strip_prefix("~").unwrap_or(path))
        } else {
            path.to_path_buf()
        };

        let contents = fs::read_to_string(&expanded_path)
            .with_context(|| format!("Failed to read config file: {}", expanded_path.display()))?;

        let config: StrataConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", expanded_path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let valid_curves = ["linear", "ease", "ease-in", "ease-out", "ease-in-out"];
        if !valid_curves.contains(&self.animation.curve.as_str()) {
            anyhow::bail!("Invalid animation curve: {}", self.animation.curve);
        }

        if self.animation.duration_ms == 0 || self.animation.duration_ms > 10_000 {
            anyhow::bail!(
                "Invalid animation duration_ms: {} (must be between 1 and 10000)",
                self.animation.duration_ms
            );
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, contents).context("Failed to write configuration file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests;

#[cfg(test)]
mod property_tests;
