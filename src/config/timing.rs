//! Engine timing: tick cadence and the delays of the blink and stop sequences.

use serde::{Deserialize, Serialize};

use super::units::Seconds;
use crate::error::ConfigError;

/// Fastest tick interval (100 Hz).
pub const MIN_TICK_INTERVAL_MS: u32 = 10;

/// Slowest tick interval (10 Hz).
pub const MAX_TICK_INTERVAL_MS: u32 = 100;

/// Timing knobs for the session and diagnostic tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Sleep between session ticks.
    pub tick_interval_ms: u32,

    /// Delay after the final broadcast of a session or blink sequence.
    pub grace_ms: u32,

    /// Length of each on/off phase of a blink.
    pub blink_phase_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 20,
            grace_ms: 100,
            blink_phase_ms: 500,
        }
    }
}

impl TimingConfig {
    /// Tick interval as seconds.
    #[inline]
    pub fn tick_interval(&self) -> Seconds {
        Seconds::from_millis(self.tick_interval_ms)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_TICK_INTERVAL_MS..=MAX_TICK_INTERVAL_MS).contains(&self.tick_interval_ms) {
            return Err(ConfigError::InvalidTickInterval(self.tick_interval_ms));
        }
        Ok(())
    }
}
