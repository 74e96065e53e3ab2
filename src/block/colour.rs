//! Colours a block can show.

use core::fmt;

use serde::Serialize;
use smart_leds::RGB8;

/// Colour commanded to a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Colour {
    /// Dark.
    #[default]
    Off,
    /// Trailing zone and countdown.
    Red,
    /// Pacing zone and start signal.
    Green,
    /// Leading zone and blink diagnostics.
    Blue,
    /// Last countdown step.
    Orange,
}

impl Colour {
    /// LED value for this colour.
    pub const fn rgb(self) -> RGB8 {
        match self {
            Colour::Off => RGB8 { r: 0, g: 0, b: 0 },
            Colour::Red => RGB8 { r: 255, g: 0, b: 0 },
            Colour::Green => RGB8 { r: 0, g: 255, b: 0 },
            Colour::Blue => RGB8 { r: 0, g: 0, b: 255 },
            Colour::Orange => RGB8 { r: 255, g: 165, b: 0 },
        }
    }

    /// Colour for an LED value, `None` if it is not one of ours.
    pub fn from_rgb(rgb: RGB8) -> Option<Self> {
        [
            Colour::Off,
            Colour::Red,
            Colour::Green,
            Colour::Blue,
            Colour::Orange,
        ]
        .into_iter()
        .find(|c| c.rgb() == rgb)
    }

    /// `#RRGGBB` form shown in status reports.
    ///
    /// Anything other than the four lit colours reports as black.
    pub const fn hex(self) -> &'static str {
        match self {
            Colour::Red => "#FF0000",
            Colour::Green => "#00FF00",
            Colour::Blue => "#0000FF",
            Colour::Orange => "#FFA500",
            Colour::Off => "#000000",
        }
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hex())
    }
}
