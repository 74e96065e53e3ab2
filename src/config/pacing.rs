//! Initial parameters for the two pacing modes.

use serde::{Deserialize, Serialize};

use super::units::{Laps, Seconds};
use crate::error::SessionError;

/// Shortest accepted Real-Time lap time.
pub const MIN_LAP_TIME: Seconds = Seconds(7.0);

/// Longest accepted Real-Time lap time.
pub const MAX_LAP_TIME: Seconds = Seconds(120.0);

/// Largest Real-Time lap count.
pub const MAX_REAL_TIME_LAPS: u32 = 100;

/// Shortest accepted Auto total time.
pub const MIN_TOTAL_TIME: Seconds = Seconds(5.0);

/// Auto total time must stay below this.
pub const MAX_TOTAL_TIME: Seconds = Seconds(6000.0);

/// Real-Time pacing parameters from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RealTimeConfig {
    /// Laps to run.
    pub laps: u32,

    /// Constant lap time.
    #[serde(rename = "lap_time_secs")]
    pub lap_time: Seconds,
}

impl Default for RealTimeConfig {
    fn default() -> Self {
        Self {
            laps: 5,
            lap_time: Seconds(10.0),
        }
    }
}

/// Auto pacing parameters from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AutoConfig {
    /// Laps to run, in half-lap steps.
    pub laps: Laps,

    /// Time the whole run should take.
    #[serde(rename = "total_time_secs")]
    pub total_time: Seconds,

    /// Run the start countdown before moving.
    pub countdown: bool,
}

impl Default for AutoConfig {
    fn default() -> Self {
        Self {
            laps: Laps::from_half_laps(18),
            total_time: Seconds(90.0),
            countdown: true,
        }
    }
}

/// Check a Real-Time lap count.
pub fn check_real_time_laps(laps: u32) -> Result<u32, SessionError> {
    if laps == 0 || laps > MAX_REAL_TIME_LAPS {
        Err(SessionError::InvalidLaps(laps as f32))
    } else {
        Ok(laps)
    }
}

/// Check a Real-Time lap time.
pub fn check_lap_time(lap_time: Seconds) -> Result<Seconds, SessionError> {
    if lap_time.0.is_finite() && lap_time >= MIN_LAP_TIME && lap_time <= MAX_LAP_TIME {
        Ok(lap_time)
    } else {
        Err(SessionError::InvalidLapTime(lap_time.0))
    }
}

/// Check an Auto total time.
pub fn check_total_time(total: Seconds) -> Result<Seconds, SessionError> {
    if total.0.is_finite() && total >= MIN_TOTAL_TIME && total < MAX_TOTAL_TIME {
        Ok(total)
    } else {
        Err(SessionError::InvalidTotalTime(total.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let rt = RealTimeConfig::default();
        assert!(check_real_time_laps(rt.laps).is_ok());
        assert!(check_lap_time(rt.lap_time).is_ok());

        let auto = AutoConfig::default();
        assert_eq!(auto.laps.value(), 9.0);
        assert!(check_total_time(auto.total_time).is_ok());
    }

    #[test]
    fn test_ranges() {
        assert!(check_lap_time(Seconds(6.9)).is_err());
        assert!(check_lap_time(Seconds(7.0)).is_ok());
        assert!(check_total_time(Seconds(4.99)).is_err());
        assert!(check_total_time(Seconds(6000.0)).is_err());
        assert!(check_real_time_laps(0).is_err());
    }
}
