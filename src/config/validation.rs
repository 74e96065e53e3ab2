//! Configuration validation.

use crate::error::Result;

use super::pacing::{check_lap_time, check_real_time_laps, check_total_time};
use super::SystemConfig;

/// Validate a system configuration.
///
/// Checks:
/// - Track number fits the lane layout and zone sizes are 1-5
/// - Real-Time laps and lap time are in range
/// - Auto total time is in range (Auto laps are checked while parsing)
/// - The profile template has nine finite, positive samples
/// - The tick interval is 10-100 ms
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    config.track.validate()?;

    check_real_time_laps(config.real_time.laps)?;
    check_lap_time(config.real_time.lap_time)?;
    check_total_time(config.auto.total_time)?;

    config.profile.samples()?;
    config.engine.validate()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::Seconds;
    use crate::error::{ConfigError, Error, SessionError};

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&SystemConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_lap_time() {
        let mut config = SystemConfig::default();
        config.real_time.lap_time = Seconds(5.0);

        let result = validate_config(&config);
        assert!(matches!(
            result,
            Err(Error::Session(SessionError::InvalidLapTime(_)))
        ));
    }

    #[test]
    fn test_invalid_tick_interval() {
        let mut config = SystemConfig::default();
        config.engine.tick_interval_ms = 5;

        let result = validate_config(&config);
        assert_eq!(
            result,
            Err(Error::Config(ConfigError::InvalidTickInterval(5)))
        );
    }
}
