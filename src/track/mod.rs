//! Track geometry for block-lights.
//!
//! Models the closed track loop, the fixed block positions around it and the
//! coloured zones that follow the paced athlete.

mod band;
mod geometry;

pub use band::{colour_band, BandOffsets};
pub use geometry::{
    base_offset, block_position, lateral_offset, resolve_position, wrap_distance, BASE_OFFSETS,
    BLOCK_COUNT, BLOCK_SPACING, HALF_TRACK, TRACK_LENGTH,
};
