//! Motion module for block-lights.
//!
//! Provides the Auto pacing speed profile.

mod profile;

pub use profile::{
    MotionPhase, SpeedProfile, DEFAULT_TEMPLATE, MAX_SAMPLES, PLATEAU_INDEX, TEMPLATE_SAMPLES,
};
