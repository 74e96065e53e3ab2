//! Session ownership: which run is active and how it starts, ticks and ends.

use heapless::Vec;
use smart_leds::{SmartLedsWrite, RGB8};

use crate::block::{BlockRegistry, Colour, MAX_BLOCKS};
use crate::config::units::{Laps, Seconds};
use crate::config::{
    check_lap_time, check_real_time_laps, check_total_time, AutoConfig, RealTimeConfig, Settings,
    SystemConfig,
};
use crate::error::{ConfigError, SessionError};
use crate::mesh::{dispatch_colour, DeliveryResult, DispatchOutcome, FailurePolicy, Radio};
use crate::motion::{SpeedProfile, TEMPLATE_SAMPLES};
use crate::track::{lateral_offset, BandOffsets, HALF_TRACK};

use super::params::{status, AutoPacing, RealTimePacing, SessionKind, STATUS_RUNNING, STATUS_STOPPED};
use super::run::{AutoRun, Frame, PacingRun, RealTimeRun, RunCommon};

/// Lifecycle state of the session slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// Nothing active.
    Idle,
    /// Auto start sequence showing.
    Countdown,
    /// Paced position moving.
    Running,
    /// Stop requested, termination pending.
    Stopping,
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickEvents {
    /// Blocks whose colour changed.
    pub changed_blocks: usize,
    /// Lap counter decrements (half laps count once).
    pub laps_decremented: u32,
    /// The status line changed.
    pub status_changed: bool,
    /// Colour sends that were not acknowledged.
    pub failed_sends: usize,
    /// The session ended during this tick.
    pub finished: Option<SessionKind>,
}

impl TickEvents {
    /// Whether listeners should get a status broadcast.
    ///
    /// Lap and termination broadcasts are unconditional; otherwise only a
    /// colour or status change is worth sending.
    pub fn should_broadcast(&self) -> bool {
        self.changed_blocks > 0
            || self.laps_decremented > 0
            || self.status_changed
            || self.finished.is_some()
    }
}

/// Both session records and the single active run.
///
/// Starting either mode stops the other first, so at most one run drives
/// the blocks.
#[derive(Debug, Clone)]
pub struct PacingSessions {
    real_time: RealTimePacing,
    auto: AutoPacing,
    template: [f32; TEMPLATE_SAMPLES],
    active: Option<PacingRun>,
}

impl PacingSessions {
    /// Create idle sessions.
    pub fn new(
        real_time: &RealTimeConfig,
        auto: &AutoConfig,
        template: [f32; TEMPLATE_SAMPLES],
    ) -> Self {
        Self {
            real_time: RealTimePacing::new(real_time),
            auto: AutoPacing::new(auto),
            template,
            active: None,
        }
    }

    /// Create idle sessions from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a profile error if the template is unusable.
    pub fn from_config(config: &SystemConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            &config.real_time,
            &config.auto,
            config.profile.samples()?,
        ))
    }

    /// Real-Time record.
    pub fn real_time(&self) -> &RealTimePacing {
        &self.real_time
    }

    /// Real-Time record for the setters.
    pub fn real_time_mut(&mut self) -> &mut RealTimePacing {
        &mut self.real_time
    }

    /// Auto record.
    pub fn auto(&self) -> &AutoPacing {
        &self.auto
    }

    /// Auto record for the setters.
    pub fn auto_mut(&mut self) -> &mut AutoPacing {
        &mut self.auto
    }

    /// The active run.
    pub fn active(&self) -> Option<&PacingRun> {
        self.active.as_ref()
    }

    /// Mode of the active run.
    pub fn active_kind(&self) -> Option<SessionKind> {
        self.active.as_ref().map(PacingRun::kind)
    }

    /// Whether a mode's running flag is set.
    pub fn is_running(&self, kind: SessionKind) -> bool {
        match kind {
            SessionKind::RealTime => self.real_time.is_running,
            SessionKind::Auto => self.auto.is_running,
        }
    }

    /// Lifecycle state.
    pub fn state(&self) -> SessionState {
        match &self.active {
            None => SessionState::Idle,
            Some(run) if !self.is_running(run.kind()) => SessionState::Stopping,
            Some(PacingRun::Auto(run)) if run.in_countdown() => SessionState::Countdown,
            Some(_) => SessionState::Running,
        }
    }

    /// Clear both running flags. The active run notices on its next tick.
    ///
    /// Returns the mode that was running, if any.
    pub fn request_stop(&mut self) -> Option<SessionKind> {
        let was = self.active_kind().filter(|&k| self.is_running(k));
        self.real_time.is_running = false;
        self.auto.is_running = false;
        was
    }

    /// Start a run of `kind`.
    ///
    /// Clears both running flags first and terminates any leftover run.
    /// Auto runs write their starting side back into `settings`: an odd
    /// number of half laps starts on the 500 m side.
    ///
    /// # Errors
    ///
    /// Returns a `SessionError` if the mode's parameters are out of range.
    /// Nothing starts in that case.
    pub fn start<R, W>(
        &mut self,
        kind: SessionKind,
        settings: &mut Settings,
        registry: &mut BlockRegistry,
        radio: &mut R,
        strip: &mut W,
    ) -> Result<(), SessionError>
    where
        R: Radio,
        W: SmartLedsWrite<Color = RGB8>,
    {
        self.request_stop();
        if self.active.is_some() {
            self.terminate(registry, radio, strip);
        }

        let run = match kind {
            SessionKind::RealTime => {
                let laps = check_real_time_laps(self.real_time.laps)?;
                check_lap_time(self.real_time.lap_time)?;
                let common = RunCommon::new(
                    settings.starting_on_500m_side(),
                    lateral_offset(settings),
                    BandOffsets::from_settings(settings),
                );
                PacingRun::RealTime(RealTimeRun::new(common, laps))
            }
            SessionKind::Auto => {
                if self.auto.half_laps == 0 {
                    return Err(SessionError::InvalidLaps(0.0));
                }
                let laps = Laps::from_half_laps(self.auto.half_laps);
                let total = check_total_time(self.auto.total_time)?;
                let profile = SpeedProfile::calibrated(laps, &self.template, total, HALF_TRACK)?;

                settings.set_starting_on_500m_side(laps.has_half());
                let common = RunCommon::new(
                    laps.has_half(),
                    lateral_offset(settings),
                    BandOffsets::from_settings(settings),
                );
                PacingRun::Auto(AutoRun::new(common, laps, profile, self.auto.countdown))
            }
        };

        match kind {
            SessionKind::RealTime => {
                self.real_time.is_running = true;
                self.real_time.status = status(STATUS_RUNNING);
            }
            SessionKind::Auto => {
                self.auto.is_running = true;
                self.auto.status = status(STATUS_RUNNING);
            }
        }
        self.active = Some(run);
        Ok(())
    }

    /// Advance the active run by `dt` and push the resulting colours.
    ///
    /// All colours are computed and dispatched before the caller broadcasts.
    /// A cleared running flag or a finished run terminates the session in
    /// the same call.
    pub fn tick<R, W>(
        &mut self,
        dt: Seconds,
        registry: &mut BlockRegistry,
        radio: &mut R,
        strip: &mut W,
    ) -> TickEvents
    where
        R: Radio,
        W: SmartLedsWrite<Color = RGB8>,
    {
        let mut events = TickEvents::default();
        let Some(kind) = self.active_kind() else {
            return events;
        };
        if !self.is_running(kind) {
            events.finished = self.terminate(registry, radio, strip);
            return events;
        }

        let Self {
            real_time,
            auto,
            active,
            ..
        } = self;
        let Some(run) = active.as_mut() else {
            return events;
        };

        let step = run.advance(dt, real_time, auto);
        events.laps_decremented = step.laps_decremented;
        events.status_changed = step.status_changed;

        if step.finished {
            events.finished = self.terminate(registry, radio, strip);
            return events;
        }

        let numbers: Vec<u8, MAX_BLOCKS> = registry.iter().map(|b| b.number).collect();
        for number in numbers {
            let colour = match step.frame {
                Frame::Countdown(colour) => colour,
                Frame::Moving => run.common().target_colour(number),
            };
            let outcome =
                dispatch_colour(registry, radio, strip, number, colour, FailurePolicy::Ignore);
            if outcome.changed() {
                events.changed_blocks += 1;
            }
            if outcome == DispatchOutcome::Sent(DeliveryResult::Failed) {
                events.failed_sends += 1;
            }
        }
        events
    }

    /// End the active run: every block off, lap counter restored, running
    /// flag cleared and status `Stopped`.
    ///
    /// Returns the mode that ended, `None` if nothing was active.
    pub fn terminate<R, W>(
        &mut self,
        registry: &mut BlockRegistry,
        radio: &mut R,
        strip: &mut W,
    ) -> Option<SessionKind>
    where
        R: Radio,
        W: SmartLedsWrite<Color = RGB8>,
    {
        let run = self.active.take()?;

        let numbers: Vec<u8, MAX_BLOCKS> = registry.iter().map(|b| b.number).collect();
        for number in numbers {
            dispatch_colour(registry, radio, strip, number, Colour::Off, FailurePolicy::Ignore);
        }

        match &run {
            PacingRun::RealTime(rt) => {
                self.real_time.laps = rt.original_laps();
                self.real_time.is_running = false;
                self.real_time.status = status(STATUS_STOPPED);
            }
            PacingRun::Auto(auto) => {
                // Whole laps plus the starting-side half lap, i.e. the original count
                let laps = auto.original_laps();
                self.auto.half_laps = 2 * laps.whole() + u32::from(laps.has_half());
                self.auto.is_running = false;
                self.auto.status = status(STATUS_STOPPED);
            }
        }
        Some(run.kind())
    }
}
