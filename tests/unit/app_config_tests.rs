/*!
 * Tests for application configuration
 */

use newsreel::app_config::{Config, Orientation, SynthesisWire};
use crate::common;

/// Test that the default configuration is valid
#[test]
fn test_default_config_shouldValidate() {
    let config = Config::default();
    assert!(config.validate().is_ok());

    assert_eq!(config.video.fps, 24);
    assert_eq!(config.video.frame_duration_ms, 300);
    assert_eq!(config.video.orientation, Orientation::Landscape);
    assert_eq!(config.narration.primary.wire, SynthesisWire::Streaming);
    assert!(config.narration.fallback.is_some());
}

/// Test orientation dimensions
#[test]
fn test_orientation_dimensions_shouldMatchTarget() {
    assert_eq!(Orientation::Landscape.dimensions(), (1920, 1080));
    assert_eq!(Orientation::Portrait.dimensions(), (1080, 1920));
}

/// Test save/load round trip
#[test]
fn test_config_save_and_load_shouldRoundTrip() -> anyhow::Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let mut config = Config::default();
    config.video.orientation = Orientation::Portrait;
    config.narration.voice = "en-US-GuyNeural".to_string();
    config.save(&path)?;

    let loaded = Config::from_file(&path)?;
    assert_eq!(loaded.video.orientation, Orientation::Portrait);
    assert_eq!(loaded.narration.voice, "en-US-GuyNeural");
    Ok(())
}

/// Test partial config files pick up defaults
#[test]
fn test_config_from_file_withPartialJson_shouldFillDefaults() -> anyhow::Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{"video": {"orientation": "portrait"}}"#,
    )?;

    let config = Config::from_file(&path)?;
    assert_eq!(config.video.orientation, Orientation::Portrait);
    assert_eq!(config.video.fps, 24);
    assert!(!config.narration.voice.is_empty());
    Ok(())
}

/// Test validation failures
#[test]
fn test_validate_withBadValues_shouldFail() {
    let mut config = Config::default();
    config.video.fps = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.video.frame_duration_ms = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.video.background_color = "plaid".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.narration.voice = "  ".to_string();
    assert!(config.validate().is_err());
}

/// Test that a malformed config file is rejected on load
#[test]
fn test_config_from_file_withInvalidValues_shouldFail() -> anyhow::Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{"video": {"background_color": "not-a-color"}}"#,
    )?;

    assert!(Config::from_file(&path).is_err());
    Ok(())
}
