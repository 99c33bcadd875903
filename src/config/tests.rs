//! Unit tests for configuration module
//!
//! Tests configuration parsing, validation, serialization/deserialization,
//! and edge cases in configuration handling.

use super::*;
use anyhow::Result;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_default_configuration_is_valid() {
    let config = StrataConfig::default();

    assert!(config.animation.enabled);
    assert!(config.animation.duration_ms > 0);
    assert!(!config.stack.ignore_unmanaged);
    assert!(!config.general.debug);

    config.validate().expect("defaults must validate");
}

#[test]
fn test_configuration_serialization_roundtrip() -> Result<()> {
    let original_config = StrataConfig::default();

    // Serialize to TOML
    let toml_string = toml::to_string(&original_config)?;

    // Deserialize back
    let deserialized_config: StrataConfig = toml::from_str(&toml_string)?;

    assert_eq!(original_config, deserialized_config);

    Ok(())
}

#[test]
fn test_configuration_from_file() -> Result<()> {
    let dir = tempdir()?;
    let file_path = dir.path().join("test_config.toml");

    // Write test configuration
    let test_config = r#"
[stack]
ignore_unmanaged = true

[animation]
enabled = true
duration_ms = 400
curve = "ease-in-out"

[general]
debug = true
"#;

    fs::write(&file_path, test_config)?;

    let config = StrataConfig::load(&file_path)?;

    assert!(config.stack.ignore_unmanaged);
    assert_eq!(config.animation.duration_ms, 400);
    assert_eq!(config.animation.curve, "ease-in-out");
    assert!(config.general.debug);

    Ok(())
}

#[test]
fn test_partial_configuration_uses_defaults() -> Result<()> {
    let partial = r#"
[animation]
enabled = false
curve = "linear"
"#;

    let config: StrataConfig = toml::from_str(partial)?;

    assert!(!config.animation.enabled);
    assert_eq!(config.animation.curve, "linear");
    // Omitted values fall back to defaults
    assert_eq!(config.animation.duration_ms, 250);
    assert!(!config.stack.ignore_unmanaged);

    Ok(())
}

#[test]
fn test_invalid_curve_is_rejected() {
    let mut config = StrataConfig::default();
    config.animation.curve = "bounce-all-over".to_string();

    assert!(config.validate().is_err());
}

#[test]
fn test_invalid_duration_is_rejected() {
    let mut config = StrataConfig::default();

    config.animation.duration_ms = 0;
    assert!(config.validate().is_err());

    config.animation.duration_ms = 60_000;
    assert!(config.validate().is_err());

    config.animation.duration_ms = 250;
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_rejects_invalid_file() -> Result<()> {
    let dir = tempdir()?;
    let file_path = dir.path().join("bad_config.toml");

    fs::write(&file_path, "[animation]\ncurve = \"wobble\"\nenabled = true\n")?;

    assert!(StrataConfig::load(&file_path).is_err());

    Ok(())
}

#[test]
fn test_load_missing_file_fails_with_context() {
    let result = StrataConfig::load("/definitely/not/a/real/path.toml");
    assert!(result.is_err());
}

#[test]
fn test_save_and_reload() -> Result<()> {
    let dir = tempdir()?;
    let file_path = dir.path().join("saved.toml");

    let mut config = StrataConfig::default();
    config.animation.duration_ms = 175;
    config.stack.ignore_unmanaged = true;

    config.save(&file_path)?;
    let reloaded = StrataConfig::load(&file_path)?;

    assert_eq!(config, reloaded);

    Ok(())
}
