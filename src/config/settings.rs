//! Track settings: lane layout, starting side and block zone sizes.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Smallest leading/pacing/trailing zone size in blocks.
pub const MIN_ZONE_BLOCKS: u8 = 1;

/// Largest leading/pacing/trailing zone size in blocks.
pub const MAX_ZONE_BLOCKS: u8 = 5;

/// Track configuration read by pacing sessions and offset computation.
///
/// Fields are only mutated through the validated setters; a rejected value
/// leaves the previous one in place.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// 7-lane layout when true, 5-lane layout otherwise.
    seven_lanes: bool,
    /// Lane the athlete skates in.
    track_number: u8,
    /// Start from the 500 m side of the track.
    starting_on_500m_side: bool,
    /// Blue blocks ahead of the pacing zone.
    leading_blocks: u8,
    /// Green blocks around the pacing point.
    pacing_blocks: u8,
    /// Red blocks behind the pacing zone.
    trailing_blocks: u8,
    /// Show virtual placeholders for unclaimed numbers.
    show_all_blocks: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seven_lanes: true,
            track_number: 4,
            starting_on_500m_side: false,
            leading_blocks: 2,
            pacing_blocks: 1,
            trailing_blocks: 2,
            show_all_blocks: false,
        }
    }
}

impl Settings {
    /// Whether the 7-lane layout is selected.
    #[inline]
    pub fn seven_lanes(&self) -> bool {
        self.seven_lanes
    }

    /// Number of lanes in the selected layout.
    #[inline]
    pub fn lane_count(&self) -> u8 {
        if self.seven_lanes {
            7
        } else {
            5
        }
    }

    /// Selected lane.
    #[inline]
    pub fn track_number(&self) -> u8 {
        self.track_number
    }

    /// Whether the run starts on the 500 m side.
    #[inline]
    pub fn starting_on_500m_side(&self) -> bool {
        self.starting_on_500m_side
    }

    /// Blue zone size in blocks.
    #[inline]
    pub fn leading_blocks(&self) -> u8 {
        self.leading_blocks
    }

    /// Green zone size in blocks.
    #[inline]
    pub fn pacing_blocks(&self) -> u8 {
        self.pacing_blocks
    }

    /// Red zone size in blocks.
    #[inline]
    pub fn trailing_blocks(&self) -> u8 {
        self.trailing_blocks
    }

    /// Whether virtual placeholders are shown.
    #[inline]
    pub fn show_all_blocks(&self) -> bool {
        self.show_all_blocks
    }

    /// Select the 7-lane (`true`) or 5-lane layout.
    ///
    /// Switching to 5 lanes clamps the track number to 5.
    pub fn set_seven_lanes(&mut self, seven_lanes: bool) {
        self.seven_lanes = seven_lanes;
        if self.track_number > self.lane_count() {
            self.track_number = self.lane_count();
        }
    }

    /// Select the lane.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSettingValue` outside `1..=lane_count`.
    pub fn set_track_number(&mut self, track_number: u8) -> Result<(), ConfigError> {
        if track_number < 1 || track_number > self.lane_count() {
            return Err(ConfigError::InvalidSettingValue {
                setting: SettingKey::TrackNumber.name(),
                value: track_number as f32,
            });
        }
        self.track_number = track_number;
        Ok(())
    }

    /// Select the starting side.
    pub fn set_starting_on_500m_side(&mut self, value: bool) {
        self.starting_on_500m_side = value;
    }

    /// Set the blue zone size.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSettingValue` outside 1-5.
    pub fn set_leading_blocks(&mut self, count: u8) -> Result<(), ConfigError> {
        self.leading_blocks = check_zone(SettingKey::LeadingBlocks, count)?;
        Ok(())
    }

    /// Set the green zone size.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSettingValue` outside 1-5.
    pub fn set_pacing_blocks(&mut self, count: u8) -> Result<(), ConfigError> {
        self.pacing_blocks = check_zone(SettingKey::PacingBlocks, count)?;
        Ok(())
    }

    /// Set the red zone size.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSettingValue` outside 1-5.
    pub fn set_trailing_blocks(&mut self, count: u8) -> Result<(), ConfigError> {
        self.trailing_blocks = check_zone(SettingKey::TrailingBlocks, count)?;
        Ok(())
    }

    /// Show or hide virtual placeholders.
    pub fn set_show_all_blocks(&mut self, value: bool) {
        self.show_all_blocks = value;
    }

    /// Apply a named setting.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSettingValue` for a value of the wrong
    /// kind or out of range. Nothing changes on error.
    pub fn apply(&mut self, key: SettingKey, value: SettingValue) -> Result<(), ConfigError> {
        match key {
            SettingKey::NumberOfTracks => {
                // The UI reports the layout as its lane count
                let seven = match value {
                    SettingValue::Bool(b) => b,
                    SettingValue::Number(7) => true,
                    SettingValue::Number(5) => false,
                    SettingValue::Number(n) => return Err(key.invalid(n as f32)),
                };
                self.set_seven_lanes(seven);
                Ok(())
            }
            SettingKey::TrackNumber => self.set_track_number(value.as_count(key)?),
            SettingKey::StartingOn500mSide => {
                self.set_starting_on_500m_side(value.as_bool(key)?);
                Ok(())
            }
            SettingKey::LeadingBlocks => self.set_leading_blocks(value.as_count(key)?),
            SettingKey::PacingBlocks => self.set_pacing_blocks(value.as_count(key)?),
            SettingKey::TrailingBlocks => self.set_trailing_blocks(value.as_count(key)?),
            SettingKey::ShowAllBlocks => {
                self.set_show_all_blocks(value.as_bool(key)?);
                Ok(())
            }
        }
    }

    /// Check every field against its allowed range.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.track_number < 1 || self.track_number > self.lane_count() {
            return Err(SettingKey::TrackNumber.invalid(self.track_number as f32));
        }
        check_zone(SettingKey::LeadingBlocks, self.leading_blocks)?;
        check_zone(SettingKey::PacingBlocks, self.pacing_blocks)?;
        check_zone(SettingKey::TrailingBlocks, self.trailing_blocks)?;
        Ok(())
    }
}

fn check_zone(key: SettingKey, count: u8) -> Result<u8, ConfigError> {
    if (MIN_ZONE_BLOCKS..=MAX_ZONE_BLOCKS).contains(&count) {
        Ok(count)
    } else {
        Err(key.invalid(count as f32))
    }
}

/// Names of the settings accepted by `Settings::apply`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingKey {
    /// 7-lane or 5-lane layout.
    NumberOfTracks,
    /// Lane number.
    TrackNumber,
    /// Starting side.
    StartingOn500mSide,
    /// Blue zone size.
    LeadingBlocks,
    /// Green zone size.
    PacingBlocks,
    /// Red zone size.
    TrailingBlocks,
    /// Virtual placeholders.
    ShowAllBlocks,
}

impl SettingKey {
    /// Wire name of the setting.
    pub const fn name(self) -> &'static str {
        match self {
            SettingKey::NumberOfTracks => "numberOfTracks",
            SettingKey::TrackNumber => "trackNumber",
            SettingKey::StartingOn500mSide => "startingOn500mSide",
            SettingKey::LeadingBlocks => "numLeadingBlocks",
            SettingKey::PacingBlocks => "numPacingBlocks",
            SettingKey::TrailingBlocks => "numTrailingBlocks",
            SettingKey::ShowAllBlocks => "showAllBlocks",
        }
    }

    fn invalid(self, value: f32) -> ConfigError {
        ConfigError::InvalidSettingValue {
            setting: self.name(),
            value,
        }
    }
}

impl FromStr for SettingKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const ALL: [SettingKey; 7] = [
            SettingKey::NumberOfTracks,
            SettingKey::TrackNumber,
            SettingKey::StartingOn500mSide,
            SettingKey::LeadingBlocks,
            SettingKey::PacingBlocks,
            SettingKey::TrailingBlocks,
            SettingKey::ShowAllBlocks,
        ];
        ALL.into_iter().find(|k| k.name() == s).ok_or_else(|| {
            let mut name = heapless::String::new();
            for c in s.chars().take(32) {
                let _ = name.push(c);
            }
            ConfigError::UnknownSetting(name)
        })
    }
}

/// Value passed to `Settings::apply`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingValue {
    /// Toggle-style settings.
    Bool(bool),
    /// Counter-style settings.
    Number(i32),
}

impl SettingValue {
    fn as_bool(self, key: SettingKey) -> Result<bool, ConfigError> {
        match self {
            SettingValue::Bool(b) => Ok(b),
            SettingValue::Number(0) => Ok(false),
            SettingValue::Number(1) => Ok(true),
            SettingValue::Number(n) => Err(key.invalid(n as f32)),
        }
    }

    fn as_count(self, key: SettingKey) -> Result<u8, ConfigError> {
        match self {
            SettingValue::Number(n) => u8::try_from(n).map_err(|_| key.invalid(n as f32)),
            SettingValue::Bool(b) => Err(key.invalid(b as u8 as f32)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_number_range_follows_layout() {
        let mut settings = Settings::default();
        assert!(settings.set_track_number(7).is_ok());
        settings.set_seven_lanes(false);
        assert_eq!(settings.track_number(), 5);
        assert!(settings.set_track_number(6).is_err());
        assert_eq!(settings.track_number(), 5);
        assert!(settings.set_track_number(0).is_err());
    }

    #[test]
    fn test_zone_sizes_rejected_out_of_range() {
        let mut settings = Settings::default();
        assert!(settings.set_leading_blocks(0).is_err());
        assert!(settings.set_pacing_blocks(6).is_err());
        assert_eq!(settings.leading_blocks(), 2);
        assert_eq!(settings.pacing_blocks(), 1);
        assert!(settings.set_trailing_blocks(5).is_ok());
        assert_eq!(settings.trailing_blocks(), 5);
    }

    #[test]
    fn test_apply_by_name() {
        let mut settings = Settings::default();
        let key: SettingKey = "numPacingBlocks".parse().unwrap();
        settings.apply(key, SettingValue::Number(3)).unwrap();
        assert_eq!(settings.pacing_blocks(), 3);

        settings
            .apply(SettingKey::NumberOfTracks, SettingValue::Number(5))
            .unwrap();
        assert!(!settings.seven_lanes());

        let result = settings.apply(SettingKey::ShowAllBlocks, SettingValue::Number(4));
        assert!(matches!(result, Err(ConfigError::InvalidSettingValue { .. })));
    }

    #[test]
    fn test_unknown_setting() {
        let result: Result<SettingKey, _> = "laneWidth".parse();
        assert!(matches!(result, Err(ConfigError::UnknownSetting(_))));
    }
}
