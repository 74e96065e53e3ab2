//! The active pacing run.
//!
//! Both modes share the paced position and zone layout in [`RunCommon`]; the
//! variants only differ in how far each tick moves and how the lap counter
//! counts down.

use libm::{fabsf, floorf};

use crate::block::Colour;
use crate::config::units::{Laps, Meters, MetersPerSec, Seconds};
use crate::motion::SpeedProfile;
use crate::track::{
    block_position, colour_band, resolve_position, BandOffsets, HALF_TRACK, TRACK_LENGTH,
};

use super::countdown::{countdown_colour, motion_start};
use super::params::{running_status, AutoPacing, RealTimePacing, SessionKind, StatusText};

/// Smallest lap time change that updates the status line.
const LAP_TIME_EPSILON: f32 = 0.01;

/// What the blocks should show after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Frame {
    /// Every block shows the same countdown colour.
    Countdown(Colour),
    /// Blocks follow the paced position.
    Moving,
}

/// Result of advancing a run by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Step {
    pub frame: Frame,
    pub laps_decremented: u32,
    pub status_changed: bool,
    pub finished: bool,
}

/// State shared by both modes.
#[derive(Debug, Clone)]
pub struct RunCommon {
    distance: Meters,
    start_offset: Meters,
    lateral: Meters,
    bands: BandOffsets,
    elapsed: Seconds,
    last_lap_time: Option<f32>,
}

impl RunCommon {
    pub(crate) fn new(starting_on_500m_side: bool, lateral: Meters, bands: BandOffsets) -> Self {
        Self {
            distance: Meters(0.0),
            start_offset: if starting_on_500m_side {
                HALF_TRACK
            } else {
                Meters(0.0)
            },
            lateral,
            bands,
            elapsed: Seconds(0.0),
            last_lap_time: None,
        }
    }

    /// Distance covered since the start.
    pub fn distance(&self) -> Meters {
        self.distance
    }

    /// Time since the start, countdown included.
    pub fn elapsed(&self) -> Seconds {
        self.elapsed
    }

    /// Paced position on the track, unwrapped.
    pub fn position(&self) -> Meters {
        self.start_offset + self.distance
    }

    /// Colour block `number` shows at the current position.
    pub fn target_colour(&self, number: u8) -> Colour {
        let Some(block) = block_position(number, self.lateral) else {
            return Colour::Off;
        };
        let current = self.position();
        let wrapped = resolve_position(block, current, TRACK_LENGTH);
        colour_band(wrapped, current, &self.bands)
    }

    fn note_lap_time(&mut self, lap_time: Seconds, status: &mut StatusText) -> bool {
        let changed = self
            .last_lap_time
            .map_or(true, |last| fabsf(last - lap_time.0) > LAP_TIME_EPSILON);
        if changed {
            self.last_lap_time = Some(lap_time.0);
            *status = running_status(lap_time);
        }
        changed
    }
}

/// Real-Time run: constant speed from the current lap time.
#[derive(Debug, Clone)]
pub struct RealTimeRun {
    common: RunCommon,
    original_laps: u32,
}

impl RealTimeRun {
    pub(crate) fn new(common: RunCommon, laps: u32) -> Self {
        Self {
            common,
            original_laps: laps,
        }
    }

    /// Lap count the run started with.
    pub fn original_laps(&self) -> u32 {
        self.original_laps
    }

    fn advance(&mut self, dt: Seconds, params: &mut RealTimePacing) -> Step {
        let common = &mut self.common;
        common.elapsed = Seconds(common.elapsed.0 + dt.0);

        let speed = MetersPerSec::from_lap_time(TRACK_LENGTH, params.lap_time);
        common.distance = Meters(common.distance.0 + speed.0 * dt.0);
        let status_changed = common.note_lap_time(params.lap_time, &mut params.status);

        let completed = floorf(common.distance.0 / TRACK_LENGTH.0) as u32;
        let mut laps_decremented = 0;
        while params.laps > 0 && self.original_laps.saturating_sub(params.laps) < completed {
            params.laps -= 1;
            laps_decremented += 1;
        }

        Step {
            frame: Frame::Moving,
            laps_decremented,
            status_changed,
            finished: params.laps == 0,
        }
    }
}

/// Auto run: profile speed, half-lap counter, optional countdown.
#[derive(Debug, Clone)]
pub struct AutoRun {
    common: RunCommon,
    original: Laps,
    starting_on_500m_side: bool,
    profile: SpeedProfile,
    motion_start: Seconds,
}

impl AutoRun {
    pub(crate) fn new(common: RunCommon, laps: Laps, profile: SpeedProfile, countdown: bool) -> Self {
        Self {
            common,
            original: laps,
            starting_on_500m_side: laps.has_half(),
            profile,
            motion_start: motion_start(countdown),
        }
    }

    /// Lap count the run started with.
    pub fn original_laps(&self) -> Laps {
        self.original
    }

    /// Calibrated speed profile.
    pub fn profile(&self) -> &SpeedProfile {
        &self.profile
    }

    /// Whether the start sequence is still showing.
    pub fn in_countdown(&self) -> bool {
        self.common.elapsed < self.motion_start
    }

    /// Distance at which the run ends.
    pub fn total_distance(&self) -> Meters {
        Meters(self.original.value() * TRACK_LENGTH.0)
    }

    fn advance(&mut self, dt: Seconds, params: &mut AutoPacing) -> Step {
        self.common.elapsed = Seconds(self.common.elapsed.0 + dt.0);

        if self.in_countdown() {
            let colour = countdown_colour(self.common.elapsed).unwrap_or(Colour::Green);
            return Step {
                frame: Frame::Countdown(colour),
                laps_decremented: 0,
                status_changed: false,
                finished: false,
            };
        }

        // Only the part of the tick after the start signal moves
        let moving = dt.0.min(self.common.elapsed.0 - self.motion_start.0);
        let speed = self.profile.speed_at_distance(self.common.distance);
        let total = self.total_distance();
        let distance = (self.common.distance.0 + speed.0 * moving).min(total.0);
        self.common.distance = Meters(distance);

        let status_changed = match speed.lap_time(TRACK_LENGTH) {
            Some(lap_time) => self.common.note_lap_time(lap_time, &mut params.status),
            None => false,
        };

        let mut laps_decremented = 0;

        // Half-lap check runs before the full-lap check
        let half_lap_index = floorf(distance / HALF_TRACK.0) as u32;
        if half_lap_index >= 1 && params.has_half() {
            params.half_laps -= 1;
            laps_decremented += 1;
        }

        let side = if self.starting_on_500m_side {
            HALF_TRACK.0
        } else {
            0.0
        };
        while params.half_laps >= 2 {
            let remaining = params.laps();
            let threshold =
                (self.original.whole() as f32 - remaining + 1.0) * TRACK_LENGTH.0 + side;
            if distance < threshold {
                break;
            }
            params.half_laps -= 2;
            laps_decremented += 1;
        }

        // Reaching the total distance settles whatever is left
        if distance >= total.0 {
            while params.half_laps > 0 {
                params.half_laps -= if params.has_half() { 1 } else { 2 };
                laps_decremented += 1;
            }
        }

        Step {
            frame: Frame::Moving,
            laps_decremented,
            status_changed,
            finished: params.half_laps == 0,
        }
    }
}

/// The active run, one of the two modes.
#[derive(Debug, Clone)]
pub enum PacingRun {
    /// Real-Time pacing.
    RealTime(RealTimeRun),
    /// Auto pacing.
    Auto(AutoRun),
}

impl PacingRun {
    /// Mode of this run.
    pub fn kind(&self) -> SessionKind {
        match self {
            PacingRun::RealTime(_) => SessionKind::RealTime,
            PacingRun::Auto(_) => SessionKind::Auto,
        }
    }

    /// Shared position state.
    pub fn common(&self) -> &RunCommon {
        match self {
            PacingRun::RealTime(run) => &run.common,
            PacingRun::Auto(run) => &run.common,
        }
    }

    pub(crate) fn advance(
        &mut self,
        dt: Seconds,
        real_time: &mut RealTimePacing,
        auto: &mut AutoPacing,
    ) -> Step {
        match self {
            PacingRun::RealTime(run) => run.advance(dt, real_time),
            PacingRun::Auto(run) => run.advance(dt, auto),
        }
    }
}
