//! Configuration loading from files (std only).

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Error, Result};

use super::SystemConfig;

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
///
/// ```rust,ignore
/// use block_lights::load_config;
///
/// let config = load_config("pacing.toml")?;
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SystemConfig> {
    let content = fs::read_to_string(path.as_ref()).map_err(|e| {
        Error::Config(ConfigError::IoError(truncated(&e.to_string())))
    })?;

    parse_config(&content)
}

/// Parse configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_config(content: &str) -> Result<SystemConfig> {
    let config: SystemConfig = toml::from_str(content)
        .map_err(|e| Error::Config(ConfigError::ParseError(truncated(e.message()))))?;

    // Validate the configuration
    super::validation::validate_config(&config)?;

    Ok(config)
}

fn truncated(msg: &str) -> heapless::String<128> {
    let mut out = heapless::String::new();
    for c in msg.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config("").unwrap();
        assert_eq!(config, SystemConfig::default());
    }

    #[test]
    fn test_parse_track_section() {
        let toml = r#"
[track]
seven_lanes = false
track_number = 2
pacing_blocks = 3
"#;

        let config = parse_config(toml).unwrap();
        assert!(!config.track.seven_lanes());
        assert_eq!(config.track.track_number(), 2);
        assert_eq!(config.track.pacing_blocks(), 3);
        assert_eq!(config.track.leading_blocks(), 2);
    }

    #[test]
    fn test_parse_auto_laps_rounded() {
        let toml = r#"
[auto]
laps = 3.3
total_time_secs = 45.0
countdown = false
"#;

        let config = parse_config(toml).unwrap();
        assert_eq!(config.auto.laps.value(), 3.5);
        assert!(!config.auto.countdown);
    }

    #[test]
    fn test_parse_rejects_track_out_of_range() {
        let toml = r#"
[track]
seven_lanes = false
track_number = 7
"#;

        assert!(parse_config(toml).is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = load_config("/nonexistent/pacing.toml");
        assert!(matches!(result, Err(Error::Config(ConfigError::IoError(_)))));
    }
}
