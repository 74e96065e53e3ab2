//! Speed profile calculation.
//!
//! An Auto run follows a normalised speed curve sampled at every half-lap
//! boundary. The curve is stretched to the requested lap count and scaled so
//! the whole run takes the requested time. Between two samples the speed
//! changes with constant acceleration.

use heapless::Vec;
use libm::sqrtf;

use crate::config::units::{Laps, Meters, MetersPerSec, Seconds};
use crate::error::SessionError;

/// Samples in a profile template.
pub const TEMPLATE_SAMPLES: usize = 9;

/// Index where plateau samples are spliced into the template.
pub const PLATEAU_INDEX: usize = 4;

/// Largest number of samples a profile holds (100 laps).
pub const MAX_SAMPLES: usize = 201;

/// Default template: a standing start, a plateau and a slight fade.
pub const DEFAULT_TEMPLATE: [f32; TEMPLATE_SAMPLES] =
    [0.55, 0.85, 0.96, 1.0, 1.0, 1.0, 0.98, 0.95, 0.92];

/// Phase of the run within a half lap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionPhase {
    /// Speed rises across the half lap.
    Accelerating,
    /// Speed holds across the half lap.
    Cruising,
    /// Speed drops across the half lap.
    Decelerating,
    /// Past the last sample.
    Complete,
}

/// Calibrated speed profile for one Auto run.
#[derive(Debug, Clone)]
pub struct SpeedProfile {
    /// Normalised samples, one per half-lap boundary.
    samples: Vec<f32, MAX_SAMPLES>,

    /// Metres per second for a normalised sample of 1.0.
    scale: f32,

    /// Length of one half lap.
    half_lap: Meters,
}

impl SpeedProfile {
    /// Stretch or shrink `template` to `2 * laps + 1` samples.
    ///
    /// Extra samples are full-speed plateau values inserted at
    /// [`PLATEAU_INDEX`], so both ramps stay intact. Runs shorter than the
    /// template drop samples from the middle.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::ProfileTooLong` if the lap count needs more
    /// than [`MAX_SAMPLES`] samples.
    pub fn build(
        laps: Laps,
        template: &[f32; TEMPLATE_SAMPLES],
    ) -> Result<Vec<f32, MAX_SAMPLES>, SessionError> {
        let len = laps.half_laps() as usize + 1;
        if len > MAX_SAMPLES {
            return Err(SessionError::ProfileTooLong { laps: laps.value() });
        }

        let mut samples: Vec<f32, MAX_SAMPLES> = Vec::new();
        for &sample in template.iter() {
            let _ = samples.push(sample);
        }
        while samples.len() < len {
            samples
                .insert(PLATEAU_INDEX, 1.0)
                .map_err(|_| SessionError::ProfileTooLong { laps: laps.value() })?;
        }
        while samples.len() > len {
            samples.remove(samples.len() / 2);
        }
        Ok(samples)
    }

    /// Build a profile for `laps` and scale it so the run lasts `total_time`.
    ///
    /// Each half lap is covered at the average of its two boundary speeds,
    /// so the run time is `sum(2h / (v[i] + v[i+1]))` for half-lap length `h`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::ProfileTooLong` for lap counts the profile
    /// cannot hold and `SessionError::InvalidTotalTime` for a non-positive
    /// total time.
    pub fn calibrated(
        laps: Laps,
        template: &[f32; TEMPLATE_SAMPLES],
        total_time: Seconds,
        half_lap: Meters,
    ) -> Result<Self, SessionError> {
        if !(total_time.0 > 0.0) {
            return Err(SessionError::InvalidTotalTime(total_time.0));
        }
        let samples = Self::build(laps, template)?;

        let inverse_sum: f32 = samples
            .windows(2)
            .map(|pair| 1.0 / (pair[0] + pair[1]))
            .sum();
        let scale = 2.0 * half_lap.0 * inverse_sum / total_time.0;

        Ok(Self {
            samples,
            scale,
            half_lap,
        })
    }

    /// Normalised samples.
    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of half laps the profile covers.
    #[inline]
    pub fn half_lap_count(&self) -> usize {
        self.samples.len().saturating_sub(1)
    }

    /// Speed at a half-lap boundary.
    #[inline]
    pub fn boundary_speed(&self, index: usize) -> MetersPerSec {
        let last = self.samples.len().saturating_sub(1);
        let sample = self.samples.get(index.min(last)).copied().unwrap_or(0.0);
        MetersPerSec(sample * self.scale)
    }

    /// Time spent covering one half lap.
    pub fn half_lap_duration(&self, index: usize) -> Seconds {
        let vp = self.boundary_speed(index).0;
        let vn = self.boundary_speed(index + 1).0;
        if vp + vn > 0.0 {
            Seconds(2.0 * self.half_lap.0 / (vp + vn))
        } else {
            Seconds(0.0)
        }
    }

    /// Time the whole run takes.
    pub fn total_time(&self) -> Seconds {
        Seconds((0..self.half_lap_count()).map(|i| self.half_lap_duration(i).0).sum())
    }

    /// Speed `progress` of the way (by distance, 0.0-1.0) through half lap
    /// `index`.
    ///
    /// Interpolates the squared speed, which is exact for constant
    /// acceleration: `v^2 = vp^2 + (vn^2 - vp^2) * progress`.
    pub fn speed_at(&self, index: usize, progress: f32) -> MetersPerSec {
        if index >= self.half_lap_count() {
            return self.boundary_speed(self.half_lap_count());
        }
        let vp = self.boundary_speed(index).0;
        let vn = self.boundary_speed(index + 1).0;
        let progress = progress.clamp(0.0, 1.0);
        MetersPerSec(sqrtf((vn * vn - vp * vp) * progress + vp * vp))
    }

    /// Speed `fraction` of the way (by time, 0.0-1.0) through half lap `index`.
    pub fn speed_at_time(&self, index: usize, fraction: f32) -> MetersPerSec {
        if index >= self.half_lap_count() {
            return self.boundary_speed(self.half_lap_count());
        }
        let vp = self.boundary_speed(index).0;
        let vn = self.boundary_speed(index + 1).0;
        MetersPerSec(vp + (vn - vp) * fraction.clamp(0.0, 1.0))
    }

    /// Speed after covering `distance` of the run.
    pub fn speed_at_distance(&self, distance: Meters) -> MetersPerSec {
        let (index, progress) = self.locate(distance);
        self.speed_at(index, progress)
    }

    /// Half-lap index and progress within it for a run distance.
    pub fn locate(&self, distance: Meters) -> (usize, f32) {
        if distance.0 <= 0.0 || self.half_lap.0 <= 0.0 {
            return (0, 0.0);
        }
        let halves = distance.0 / self.half_lap.0;
        let index = halves as usize;
        (index, halves - index as f32)
    }

    /// Whether the speed rises, holds or drops across half lap `index`.
    pub fn phase_at(&self, index: usize) -> MotionPhase {
        if index >= self.half_lap_count() {
            return MotionPhase::Complete;
        }
        let vp = self.samples[index];
        let vn = self.samples[index + 1];
        if vn > vp {
            MotionPhase::Accelerating
        } else if vn < vp {
            MotionPhase::Decelerating
        } else {
            MotionPhase::Cruising
        }
    }
}
