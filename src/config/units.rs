//! Unit types for physical quantities.
//!
//! Provides type-safe representations of distances, durations, speeds and
//! half-lap quantised lap counts so track metres never get mixed up with
//! seconds.

use core::fmt;
use core::ops::{Add, Sub};

use libm::{floorf, roundf};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Distance along the track in metres.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Meters(pub f32);

impl Meters {
    /// Create a new Meters value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }
}

impl Add for Meters {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Meters {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

/// Duration in seconds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Seconds(pub f32);

impl Seconds {
    /// Create a new Seconds value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// Create from whole milliseconds.
    #[inline]
    pub fn from_millis(ms: u32) -> Self {
        Self(ms as f32 / 1000.0)
    }

    /// Split into whole minutes and remaining seconds.
    pub fn minutes_seconds(self) -> (u32, f32) {
        let mins = floorf(self.0 / 60.0);
        (mins as u32, self.0 - mins * 60.0)
    }
}

/// Speed along the track in metres per second.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct MetersPerSec(pub f32);

impl MetersPerSec {
    /// Create a new MetersPerSec value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// Constant speed that covers `track_length` in `lap_time`.
    #[inline]
    pub fn from_lap_time(track_length: Meters, lap_time: Seconds) -> Self {
        Self(track_length.0 / lap_time.0)
    }

    /// Time one lap of `track_length` takes at this speed.
    ///
    /// Returns `None` when standing still.
    #[inline]
    pub fn lap_time(self, track_length: Meters) -> Option<Seconds> {
        if self.0 > 0.0 {
            Some(Seconds(track_length.0 / self.0))
        } else {
            None
        }
    }
}

/// A lap count quantised to half laps.
///
/// Validated at construction: requests below a quarter lap are rejected,
/// everything else is rounded to the nearest half lap.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Laps(f32);

impl Laps {
    /// Smallest accepted request before rounding.
    pub const MIN_REQUEST: f32 = 0.25;

    /// Largest lap count the speed profile can cover.
    pub const MAX: f32 = 100.0;

    /// Create a new lap count, rounding to the nearest half lap.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidLaps` if the value is below a quarter lap,
    /// above the maximum, or not finite.
    pub fn new(value: f32) -> Result<Self, SessionError> {
        if !value.is_finite() || value < Self::MIN_REQUEST || value > Self::MAX {
            return Err(SessionError::InvalidLaps(value));
        }
        Ok(Self(roundf(2.0 * value) / 2.0))
    }

    /// Create from a number of half laps.
    #[inline]
    pub fn from_half_laps(half_laps: u32) -> Self {
        Self(half_laps as f32 / 2.0)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// Number of half laps.
    #[inline]
    pub fn half_laps(self) -> u32 {
        roundf(2.0 * self.0) as u32
    }

    /// Whole laps, dropping a trailing half lap.
    #[inline]
    pub fn whole(self) -> u32 {
        floorf(self.0) as u32
    }

    /// Whether the count ends in a half lap.
    #[inline]
    pub fn has_half(self) -> bool {
        self.half_laps() % 2 == 1
    }
}

impl fmt::Display for Laps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_half() {
            write!(f, "{:.1}", self.0)
        } else {
            write!(f, "{}", self.whole())
        }
    }
}

impl TryFrom<f32> for Laps {
    type Error = SessionError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for Laps {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use core::fmt::Write;
        let value = f32::deserialize(deserializer)?;
        Laps::new(value).map_err(|e| {
            let mut buf = heapless::String::<128>::new();
            let _ = write!(buf, "{}", e);
            serde::de::Error::custom(buf.as_str())
        })
    }
}

/// Extension trait for creating unit types from primitives.
pub trait UnitExt {
    /// Convert to Meters.
    fn meters(self) -> Meters;
    /// Convert to Seconds.
    fn seconds(self) -> Seconds;
    /// Convert to MetersPerSec.
    fn meters_per_sec(self) -> MetersPerSec;
}

impl UnitExt for f32 {
    #[inline]
    fn meters(self) -> Meters {
        Meters(self)
    }

    #[inline]
    fn seconds(self) -> Seconds {
        Seconds(self)
    }

    #[inline]
    fn meters_per_sec(self) -> MetersPerSec {
        MetersPerSec(self)
    }
}
