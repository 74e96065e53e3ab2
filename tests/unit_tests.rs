//! Unit tests for block-lights configuration handling.

mod unit;
