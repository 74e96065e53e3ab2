//! # block-lights
//!
//! Pacing and coordination engine for a ring of wireless track lights.
//!
//! Blocks sit at fixed positions around a closed track. A pacing session
//! moves a virtual athlete around the loop and lights every block by its
//! distance to that position: red behind, green alongside, blue ahead. The
//! master block discovers, numbers and commands the other blocks over a
//! peer-to-peer radio.
//!
//! ## Features
//!
//! - **Two pacing modes**: Real-Time (constant lap time) and Auto (speed
//!   profile calibrated to a total time, half-lap counter, start countdown)
//! - **Block registry**: unique numbering, discovery, swaps, virtual
//!   placeholders, durable `MAC;number` records
//! - **Fixed-layout wire messages** shared with the block firmware
//! - **no_std compatible**: Pacing math, registry and protocol work without
//!   the standard library
//! - **Configuration-driven**: Track settings and defaults from TOML files
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use block_lights::{Engine, FileStore, SessionKind, SystemConfig};
//!
//! let config: SystemConfig = block_lights::load_config("block-lights.toml")?;
//! let engine = Engine::new(&config, master_mac, radio, strip, notifier, FileStore::new("blocks.txt"))?;
//!
//! engine.scan_for_blocks()?;
//! engine.start_session(SessionKind::RealTime).await?;
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): TOML loading, file-backed block store and the Tokio
//!   engine
//! - `defmt`: Enables defmt formatting for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

// Core modules
pub mod block;
pub mod config;
pub mod error;
pub mod mesh;
pub mod motion;
pub mod session;
pub mod track;

#[cfg(feature = "std")]
pub mod engine;

// Re-exports for ergonomic API
pub use block::{Block, BlockRegistry, BlockStatus, Colour, MacAddress};
pub use config::{validate_config, SettingKey, SettingValue, Settings, SystemConfig};
pub use error::{Error, Result};
pub use mesh::{DeliveryResult, Message, MessageType, Radio};
pub use motion::{MotionPhase, SpeedProfile};
pub use session::{PacingSessions, SessionKind, SessionState};

#[cfg(feature = "std")]
pub use engine::{BlockStore, Engine, FileStore, Notifier};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::load_config;

// Unit types
pub use config::units::{Laps, Meters, MetersPerSec, Seconds};
