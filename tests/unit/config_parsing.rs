//! Unit tests for TOML configuration parsing.

use block_lights::config::{load_config, parse_config, SystemConfig};
use block_lights::error::{ConfigError, Error};

/// Test parsing a full configuration from TOML.
#[test]
fn test_parse_full_config() {
    let toml_str = r#"
[track]
seven_lanes = false
track_number = 2
starting_on_500m_side = true
leading_blocks = 3
pacing_blocks = 2
trailing_blocks = 1
show_all_blocks = true

[real_time]
laps = 12
lap_time_secs = 9.5

[auto]
laps = 4.5
total_time_secs = 45.0
countdown = false

[profile]
template = [0.5, 0.8, 0.9, 1.0, 1.0, 1.0, 0.97, 0.94, 0.9]

[engine]
tick_interval_ms = 50
grace_ms = 200
blink_phase_ms = 250
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");

    assert!(!config.track.seven_lanes());
    assert_eq!(config.track.track_number(), 2);
    assert!(config.track.starting_on_500m_side());
    assert_eq!(config.track.leading_blocks(), 3);
    assert_eq!(config.track.pacing_blocks(), 2);
    assert_eq!(config.track.trailing_blocks(), 1);
    assert!(config.track.show_all_blocks());

    assert_eq!(config.real_time.laps, 12);
    assert_eq!(config.real_time.lap_time.0, 9.5);

    assert_eq!(config.auto.laps.value(), 4.5);
    assert_eq!(config.auto.total_time.0, 45.0);
    assert!(!config.auto.countdown);

    assert_eq!(config.profile.template.len(), 9);
    assert_eq!(config.engine.tick_interval_ms, 50);
    assert_eq!(config.engine.blink_phase_ms, 250);
}

/// Test that missing sections fall back to defaults.
#[test]
fn test_parse_partial_config_uses_defaults() {
    let toml_str = r#"
[track]
track_number = 6
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    assert_eq!(config.track.track_number(), 6);
    assert!(config.track.seven_lanes());
    assert_eq!(config.real_time.laps, 5);
    assert_eq!(config.auto.laps.value(), 9.0);
    assert_eq!(config.engine.tick_interval_ms, 20);
}

/// Test that an empty document is the default configuration.
#[test]
fn test_parse_empty_config() {
    let config: SystemConfig = toml::from_str("").expect("Failed to parse TOML");
    assert_eq!(config, SystemConfig::default());
}

/// Test that Auto laps are rounded to half laps while parsing.
#[test]
fn test_auto_laps_rounded() {
    let config: SystemConfig =
        toml::from_str("[auto]\nlaps = 3.3\n").expect("Failed to parse TOML");
    assert_eq!(config.auto.laps.value(), 3.5);
    assert_eq!(config.auto.laps.half_laps(), 7);
}

/// Test that a quarter-lap request below the minimum is rejected.
#[test]
fn test_auto_laps_too_small() {
    let result: Result<SystemConfig, _> = toml::from_str("[auto]\nlaps = 0.1\n");
    assert!(result.is_err());
}

/// Test parse_config maps TOML errors.
#[test]
fn test_parse_config_reports_syntax_errors() {
    let result = parse_config("[track\nseven_lanes = true");
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::ParseError(_)))
    ));
}

/// Test parse_config validates after parsing.
#[test]
fn test_parse_config_validates() {
    let result = parse_config("[track]\nseven_lanes = false\ntrack_number = 7\n");
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidSettingValue { .. }))
    ));
}

/// Test loading a configuration file from disk.
#[test]
fn test_load_config_file() {
    let path = std::env::temp_dir().join(format!("block-lights-load-{}.toml", std::process::id()));
    std::fs::write(&path, "[real_time]\nlaps = 3\n").expect("write config");

    let config = load_config(&path).expect("load config");
    assert_eq!(config.real_time.laps, 3);

    let _ = std::fs::remove_file(&path);
}

/// Test that a missing file is an I/O error.
#[test]
fn test_load_config_missing_file() {
    let result = load_config("/nonexistent/block-lights.toml");
    assert!(matches!(result, Err(Error::Config(ConfigError::IoError(_)))));
}
