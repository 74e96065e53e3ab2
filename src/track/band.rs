//! Colour zones around the paced position.

use crate::block::Colour;
use crate::config::units::Meters;
use crate::config::Settings;

use super::geometry::BLOCK_SPACING;

/// Zone boundaries relative to the paced position.
///
/// Each field is the exclusive upper bound of the zone it names, so
/// `off < red < green < blue`. Anything below `off` or at or beyond `blue`
/// is dark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandOffsets {
    /// End of the dark zone behind the runner.
    pub off: Meters,
    /// End of the red (trailing) zone.
    pub red: Meters,
    /// End of the green (pacing) zone.
    pub green: Meters,
    /// End of the blue (leading) zone.
    pub blue: Meters,
}

impl BandOffsets {
    /// Zones sized from the block counts in `settings`.
    ///
    /// The green zone is centred on the paced position, red trails it and
    /// blue leads it. Each block counts for one block spacing.
    pub fn from_settings(settings: &Settings) -> Self {
        let spacing = BLOCK_SPACING.0;
        let half_green = settings.pacing_blocks() as f32 * spacing / 2.0;
        let red_start = -half_green - settings.trailing_blocks() as f32 * spacing;
        let blue_end = half_green + settings.leading_blocks() as f32 * spacing;
        Self {
            off: Meters(red_start),
            red: Meters(-half_green),
            green: Meters(half_green),
            blue: Meters(blue_end),
        }
    }
}

/// Colour a block shows given its resolved position.
///
/// A value on a boundary belongs to the zone above it.
pub fn colour_band(wrapped: Meters, current: Meters, offsets: &BandOffsets) -> Colour {
    let rel = wrapped.0 - current.0;
    if rel < offsets.off.0 {
        Colour::Off
    } else if rel < offsets.red.0 {
        Colour::Red
    } else if rel < offsets.green.0 {
        Colour::Green
    } else if rel < offsets.blue.0 {
        Colour::Blue
    } else {
        Colour::Off
    }
}
