//! Closed-loop distance model.

use libm::fmodf;

use crate::config::units::Meters;
use crate::config::Settings;

/// Length of one lap of the track.
pub const TRACK_LENGTH: Meters = Meters(111.1071);

/// Half a lap, the granularity of the Auto speed profile.
pub const HALF_TRACK: Meters = Meters(111.1071 / 2.0);

/// Number of block positions around the track, master included.
pub const BLOCK_COUNT: usize = 14;

/// Distance between two neighbouring blocks.
pub const BLOCK_SPACING: Meters = Meters(111.1071 / 14.0);

/// Position of each block along the track, indexed by block number - 1.
pub const BASE_OFFSETS: [f32; BLOCK_COUNT] = [
    0.0, 7.9362, 15.8724, 23.8087, 31.7449, 39.6811, 47.6173, 55.5536, 63.4898, 71.4260,
    79.3622, 87.2984, 95.2347, 103.1709,
];

/// Fixed track position of a block number.
///
/// Returns `None` for numbers outside 1-14.
#[inline]
pub fn base_offset(number: u8) -> Option<Meters> {
    let index = usize::from(number).checked_sub(1)?;
    BASE_OFFSETS.get(index).copied().map(Meters)
}

/// Shift applied to every block position for the selected lane and side.
///
/// Lanes further out cover more distance per lap, so the blocks are moved
/// along the track to keep the zones level with the athlete.
pub fn lateral_offset(settings: &Settings) -> Meters {
    let side = if settings.starting_on_500m_side() { 1.0 } else { 0.0 };
    let track = settings.track_number() as f32;
    if settings.seven_lanes() {
        Meters((track - 4.0) * 0.7 * (1.0 + side))
    } else {
        Meters((track - 3.0) * (1.0 + side))
    }
}

/// Effective position of a block for one run.
#[inline]
pub fn block_position(number: u8, lateral: Meters) -> Option<Meters> {
    base_offset(number).map(|base| base + lateral)
}

/// Map an absolute travelled distance into `[0, track_length)`.
#[inline]
pub fn wrap_distance(distance: Meters, track_length: Meters) -> Meters {
    Meters(rem_euclid(distance.0, track_length.0))
}

fn rem_euclid(value: f32, modulus: f32) -> f32 {
    let r = fmodf(value, modulus);
    if r < 0.0 {
        r + modulus
    } else {
        r
    }
}

/// Move a block position by whole laps so it lies within half a lap of
/// `current`.
///
/// The comparison window stays centred on the runner, so crossing the
/// start/finish line never produces a jump.
pub fn resolve_position(block_offset: Meters, current: Meters, track_length: Meters) -> Meters {
    let half = track_length.0 / 2.0;
    let mut delta = rem_euclid(block_offset.0 - current.0, track_length.0);
    if delta > half {
        delta -= track_length.0;
    }
    Meters(current.0 + delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_offsets_evenly_spaced() {
        for pair in BASE_OFFSETS.windows(2) {
            assert!((pair[1] - pair[0] - BLOCK_SPACING.0).abs() < 0.001);
        }
        assert_eq!(base_offset(1), Some(Meters(0.0)));
        assert_eq!(base_offset(0), None);
        assert_eq!(base_offset(15), None);
    }

    #[test]
    fn test_lateral_offset() {
        let mut settings = Settings::default();
        assert_eq!(lateral_offset(&settings), Meters(0.0));

        settings.set_track_number(6).unwrap();
        assert!((lateral_offset(&settings).0 - 1.4).abs() < 0.0001);

        settings.set_starting_on_500m_side(true);
        assert!((lateral_offset(&settings).0 - 2.8).abs() < 0.0001);

        settings.set_seven_lanes(false);
        settings.set_track_number(1).unwrap();
        assert!((lateral_offset(&settings).0 + 4.0).abs() < 0.0001);
    }

    #[test]
    fn test_resolve_across_finish_line() {
        let v = resolve_position(Meters(2.0), Meters(110.0), TRACK_LENGTH);
        assert!((v.0 - (2.0 + TRACK_LENGTH.0)).abs() < 0.001);

        let v = resolve_position(Meters(105.0), Meters(1.0), TRACK_LENGTH);
        assert!((v.0 - (105.0 - TRACK_LENGTH.0)).abs() < 0.001);

        let v = resolve_position(Meters(50.0), Meters(40.0), TRACK_LENGTH);
        assert!((v.0 - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_resolve_far_distance() {
        // Several laps in, the block still resolves next to the runner
        let current = Meters(5.0 * TRACK_LENGTH.0 + 3.0);
        let v = resolve_position(Meters(7.9362), current, TRACK_LENGTH);
        assert!((v.0 - current.0 - 4.9362).abs() < 0.01);
    }

    #[test]
    fn test_wrap_distance() {
        let w = wrap_distance(Meters(TRACK_LENGTH.0 + 1.0), TRACK_LENGTH);
        assert!((w.0 - 1.0).abs() < 0.001);
        let w = wrap_distance(Meters(-1.0), TRACK_LENGTH);
        assert!((w.0 - (TRACK_LENGTH.0 - 1.0)).abs() < 0.001);
    }
}
