//! System configuration - root configuration structure.

use serde::{Deserialize, Serialize};

use super::pacing::{AutoConfig, RealTimeConfig};
use super::profile::ProfileConfig;
use super::settings::Settings;
use super::timing::TimingConfig;

/// Root configuration structure from TOML.
///
/// Every section is optional and falls back to its defaults.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Track layout and block zone sizes.
    pub track: Settings,

    /// Initial Real-Time pacing parameters.
    pub real_time: RealTimeConfig,

    /// Initial Auto pacing parameters.
    pub auto: AutoConfig,

    /// Speed profile template for Auto pacing.
    pub profile: ProfileConfig,

    /// Tick and delay timing for the engine tasks.
    pub engine: TimingConfig,
}
