//! Parameter records of the two pacing modes.

use core::fmt::Write;

use heapless::String;
use libm::roundf;

use crate::config::units::{Laps, Seconds};
use crate::config::{
    check_lap_time, check_real_time_laps, check_total_time, AutoConfig, RealTimeConfig,
};
use crate::error::SessionError;

/// Status text shown while idle.
pub const STATUS_STOPPED: &str = "Stopped";

/// Status text right after a start.
pub const STATUS_RUNNING: &str = "Running";

/// Status line of a session.
pub type StatusText = String<32>;

/// Which pacing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionKind {
    /// Constant lap time, whole-lap counter.
    RealTime,
    /// Speed profile, half-lap counter, optional countdown.
    Auto,
}

pub(crate) fn status(text: &str) -> StatusText {
    let mut s = String::new();
    let _ = s.push_str(text);
    s
}

pub(crate) fn running_status(lap_time: Seconds) -> StatusText {
    let mut s = String::new();
    let _ = write!(s, "Running. Laptime: {:.2}", lap_time.0);
    s
}

/// Real-Time pacing parameters and live state.
#[derive(Debug, Clone, PartialEq)]
pub struct RealTimePacing {
    pub(crate) status: StatusText,
    pub(crate) laps: u32,
    pub(crate) lap_time: Seconds,
    pub(crate) is_running: bool,
}

impl RealTimePacing {
    /// Step applied by the lap time buttons.
    pub const LAP_TIME_STEP: f32 = 0.1;

    /// Create from configuration.
    pub fn new(config: &RealTimeConfig) -> Self {
        Self {
            status: status(STATUS_STOPPED),
            laps: config.laps,
            lap_time: config.lap_time,
            is_running: false,
        }
    }

    /// Status line.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Laps left (the configured count while idle).
    pub fn laps(&self) -> u32 {
        self.laps
    }

    /// Lap time.
    pub fn lap_time(&self) -> Seconds {
        self.lap_time
    }

    /// Whether the session is running.
    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// Set the lap count.
    ///
    /// # Errors
    ///
    /// `SessionError::AlreadyRunning` while running, `InvalidLaps` outside 1-100.
    pub fn set_laps(&mut self, laps: u32) -> Result<(), SessionError> {
        if self.is_running {
            return Err(SessionError::AlreadyRunning);
        }
        self.laps = check_real_time_laps(laps)?;
        Ok(())
    }

    /// Add one lap.
    pub fn increment_laps(&mut self) -> Result<u32, SessionError> {
        self.set_laps(self.laps + 1)?;
        Ok(self.laps)
    }

    /// Remove one lap, never going below one.
    pub fn decrement_laps(&mut self) -> Result<u32, SessionError> {
        if self.laps > 1 {
            self.set_laps(self.laps - 1)?;
        }
        Ok(self.laps)
    }

    /// Set the lap time. Allowed while running.
    ///
    /// # Errors
    ///
    /// `SessionError::InvalidLapTime` outside 7.0-120.0 s.
    pub fn set_lap_time(&mut self, lap_time: Seconds) -> Result<(), SessionError> {
        let rounded = Seconds(roundf(lap_time.0 * 10.0) / 10.0);
        self.lap_time = check_lap_time(rounded)?;
        Ok(())
    }

    /// Lengthen the lap time by one step.
    pub fn increment_lap_time(&mut self) -> Result<Seconds, SessionError> {
        self.set_lap_time(Seconds(self.lap_time.0 + Self::LAP_TIME_STEP))?;
        Ok(self.lap_time)
    }

    /// Shorten the lap time by one step.
    pub fn decrement_lap_time(&mut self) -> Result<Seconds, SessionError> {
        self.set_lap_time(Seconds(self.lap_time.0 - Self::LAP_TIME_STEP))?;
        Ok(self.lap_time)
    }

    /// Restore the defaults: stopped, 5 laps at 10.0 s.
    pub fn reset(&mut self) {
        *self = Self::new(&RealTimeConfig::default());
    }

    /// Lap count as shown to users.
    pub fn laps_text(&self) -> String<8> {
        let mut s = String::new();
        let _ = write!(s, "{}", self.laps);
        s
    }

    /// Lap time as shown to users, one decimal.
    pub fn lap_time_text(&self) -> String<8> {
        let mut s = String::new();
        let _ = write!(s, "{:.1}", self.lap_time.0);
        s
    }
}

/// Auto pacing parameters and live state.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoPacing {
    pub(crate) status: StatusText,
    /// Half laps left; the configured count while idle.
    pub(crate) half_laps: u32,
    pub(crate) total_time: Seconds,
    pub(crate) countdown: bool,
    pub(crate) is_running: bool,
}

impl AutoPacing {
    /// Create from configuration.
    pub fn new(config: &AutoConfig) -> Self {
        Self {
            status: status(STATUS_STOPPED),
            half_laps: config.laps.half_laps(),
            total_time: config.total_time,
            countdown: config.countdown,
            is_running: false,
        }
    }

    /// Status line.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Laps left, in half-lap steps.
    pub fn laps(&self) -> f32 {
        self.half_laps as f32 / 2.0
    }

    /// Whether the remaining count ends in a half lap.
    pub fn has_half(&self) -> bool {
        self.half_laps % 2 == 1
    }

    /// Total run time.
    pub fn total_time(&self) -> Seconds {
        self.total_time
    }

    /// Whether the start countdown runs.
    pub fn countdown(&self) -> bool {
        self.countdown
    }

    /// Whether the session is running.
    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// Set the lap count, rounded to the nearest half lap.
    ///
    /// # Errors
    ///
    /// `SessionError::AlreadyRunning` while running, `InvalidLaps` below a
    /// quarter lap or above 100.
    pub fn set_laps(&mut self, laps: f32) -> Result<Laps, SessionError> {
        if self.is_running {
            return Err(SessionError::AlreadyRunning);
        }
        let laps = Laps::new(laps)?;
        self.half_laps = laps.half_laps();
        Ok(laps)
    }

    /// Set the total run time.
    ///
    /// # Errors
    ///
    /// `SessionError::AlreadyRunning` while running, `InvalidTotalTime`
    /// outside 5.0 s up to (not including) 6000 s.
    pub fn set_total_time(&mut self, total: Seconds) -> Result<(), SessionError> {
        if self.is_running {
            return Err(SessionError::AlreadyRunning);
        }
        self.total_time = check_total_time(total)?;
        Ok(())
    }

    /// Enable or disable the start countdown.
    ///
    /// # Errors
    ///
    /// `SessionError::AlreadyRunning` while running.
    pub fn set_countdown(&mut self, countdown: bool) -> Result<(), SessionError> {
        if self.is_running {
            return Err(SessionError::AlreadyRunning);
        }
        self.countdown = countdown;
        Ok(())
    }

    /// Flip the countdown setting.
    pub fn toggle_countdown(&mut self) -> Result<bool, SessionError> {
        self.set_countdown(!self.countdown)?;
        Ok(self.countdown)
    }

    /// Lap count as shown to users: whole when whole, else one decimal.
    pub fn laps_text(&self) -> String<8> {
        let mut s = String::new();
        if self.has_half() {
            let _ = write!(s, "{:.1}", self.laps());
        } else {
            let _ = write!(s, "{}", self.half_laps / 2);
        }
        s
    }

    /// Total time as `m:ss.ss`.
    pub fn total_time_text(&self) -> String<16> {
        let (mins, secs) = self.total_time.minutes_seconds();
        let mut s = String::new();
        let _ = write!(s, "{}:{:05.2}", mins, secs);
        s
    }

    /// Countdown flag as shown to users.
    pub fn countdown_text(&self) -> &'static str {
        if self.countdown {
            "Yes"
        } else {
            "No"
        }
    }
}
