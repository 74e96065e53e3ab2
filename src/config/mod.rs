//! Configuration module for block-lights.
//!
//! Provides the track settings, initial session parameters, the speed profile
//! template and engine timing, loadable from TOML files (with `std` feature)
//! or built from defaults.

mod pacing;
mod profile;
mod settings;
mod system;
mod timing;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use pacing::{
    check_lap_time, check_real_time_laps, check_total_time, AutoConfig, RealTimeConfig,
    MAX_LAP_TIME, MAX_REAL_TIME_LAPS, MAX_TOTAL_TIME, MIN_LAP_TIME, MIN_TOTAL_TIME,
};
pub use profile::ProfileConfig;
pub use settings::{SettingKey, SettingValue, Settings, MAX_ZONE_BLOCKS, MIN_ZONE_BLOCKS};
pub use system::SystemConfig;
pub use timing::{TimingConfig, MAX_TICK_INTERVAL_MS, MIN_TICK_INTERVAL_MS};
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Laps, Meters, MetersPerSec, Seconds};
