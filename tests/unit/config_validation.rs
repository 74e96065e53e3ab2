//! Unit tests for configuration validation.

use block_lights::config::{validate_config, SystemConfig};
use block_lights::error::{ConfigError, Error, SessionError};

/// Test validation of a valid configuration.
#[test]
fn test_valid_config_passes_validation() {
    let toml_str = r#"
[track]
track_number = 7

[real_time]
laps = 100
lap_time_secs = 120.0

[auto]
total_time_secs = 5.0
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    assert!(validate_config(&config).is_ok());
}

/// Test validation fails for a lane outside the 5-lane layout.
#[test]
fn test_track_number_outside_layout() {
    let toml_str = r#"
[track]
seven_lanes = false
track_number = 6
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    let result = validate_config(&config);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidSettingValue { setting: "trackNumber", .. }))
    ));
}

/// Test validation fails for zone sizes outside 1-5.
#[test]
fn test_zone_size_out_of_range() {
    let config: SystemConfig =
        toml::from_str("[track]\nleading_blocks = 6\n").expect("Failed to parse TOML");
    assert!(validate_config(&config).is_err());

    let config: SystemConfig =
        toml::from_str("[track]\ntrailing_blocks = 0\n").expect("Failed to parse TOML");
    assert!(validate_config(&config).is_err());
}

/// Test validation of the Real-Time lap range.
#[test]
fn test_real_time_laps_out_of_range() {
    let config: SystemConfig =
        toml::from_str("[real_time]\nlaps = 0\n").expect("Failed to parse TOML");
    assert!(matches!(
        validate_config(&config),
        Err(Error::Session(SessionError::InvalidLaps(_)))
    ));

    let config: SystemConfig =
        toml::from_str("[real_time]\nlaps = 101\n").expect("Failed to parse TOML");
    assert!(validate_config(&config).is_err());
}

/// Test validation of the Auto total time, which must stay below 6000 s.
#[test]
fn test_auto_total_time_bounds() {
    let config: SystemConfig =
        toml::from_str("[auto]\ntotal_time_secs = 4.0\n").expect("Failed to parse TOML");
    assert!(matches!(
        validate_config(&config),
        Err(Error::Session(SessionError::InvalidTotalTime(_)))
    ));

    let config: SystemConfig =
        toml::from_str("[auto]\ntotal_time_secs = 6000.0\n").expect("Failed to parse TOML");
    assert!(validate_config(&config).is_err());

    let config: SystemConfig =
        toml::from_str("[auto]\ntotal_time_secs = 5999.0\n").expect("Failed to parse TOML");
    assert!(validate_config(&config).is_ok());
}

/// Test validation of the profile template.
#[test]
fn test_profile_template_checks() {
    let config: SystemConfig = toml::from_str("[profile]\ntemplate = [1.0, 1.0, 1.0]\n")
        .expect("Failed to parse TOML");
    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidProfileLength(3)))
    );

    let config: SystemConfig = toml::from_str(
        "[profile]\ntemplate = [0.5, 0.8, 0.9, 1.0, 0.0, 1.0, 0.97, 0.94, 0.9]\n",
    )
    .expect("Failed to parse TOML");
    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidProfileSample(0.0)))
    );
}

/// Test validation of the tick interval bounds.
#[test]
fn test_tick_interval_bounds() {
    for (ms, ok) in [(9, false), (10, true), (100, true), (101, false)] {
        let toml = format!("[engine]\ntick_interval_ms = {ms}\n");
        let config: SystemConfig = toml::from_str(&toml).expect("Failed to parse TOML");
        assert_eq!(validate_config(&config).is_ok(), ok, "tick interval {ms}");
    }
}
