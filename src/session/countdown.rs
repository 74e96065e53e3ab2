//! Start sequence shown before an Auto run moves.

use crate::block::Colour;
use crate::config::units::Seconds;

/// Length of the light sequence.
pub const COUNTDOWN: Seconds = Seconds(3.0);

/// Green hold between the sequence and the first movement.
pub const GREEN_HOLD: Seconds = Seconds(1.0);

/// Half-second steps of the light sequence.
const STEPS: [Colour; 6] = [
    Colour::Red,
    Colour::Off,
    Colour::Red,
    Colour::Off,
    Colour::Orange,
    Colour::Off,
];

/// Time from start until the paced position begins to move.
pub fn motion_start(countdown: bool) -> Seconds {
    if countdown {
        Seconds(COUNTDOWN.0 + GREEN_HOLD.0)
    } else {
        Seconds(0.0)
    }
}

/// Colour every block shows `elapsed` into the start sequence.
///
/// Returns `None` once motion has started.
pub fn countdown_colour(elapsed: Seconds) -> Option<Colour> {
    if elapsed.0 < 0.0 {
        return Some(Colour::Off);
    }
    if elapsed < COUNTDOWN {
        let step = (elapsed.0 / 0.5) as usize;
        return STEPS.get(step).copied().or(Some(Colour::Off));
    }
    if elapsed.0 < COUNTDOWN.0 + GREEN_HOLD.0 {
        return Some(Colour::Green);
    }
    None
}
