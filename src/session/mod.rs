//! Pacing sessions for block-lights.
//!
//! Provides the Real-Time and Auto parameter records, the Auto start
//! sequence, the active run and the session slot that keeps at most one run
//! driving the blocks.

mod countdown;
mod params;
mod run;
mod sessions;

pub use countdown::{countdown_colour, motion_start, COUNTDOWN, GREEN_HOLD};
pub use params::{
    AutoPacing, RealTimePacing, SessionKind, StatusText, STATUS_RUNNING, STATUS_STOPPED,
};
pub use run::{AutoRun, PacingRun, RealTimeRun, RunCommon};
pub use sessions::{PacingSessions, SessionState, TickEvents};
