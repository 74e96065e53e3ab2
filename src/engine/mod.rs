//! Async engine for block-lights (std only).
//!
//! Owns the block registry, track settings and pacing sessions behind one
//! lock, runs the session and blink tasks on Tokio, and reports state
//! changes to a [`Notifier`] and the registry to a [`BlockStore`].

mod controller;
mod notifier;
mod report;
mod tasks;

pub use controller::Engine;
pub use notifier::{BlockStore, FileStore, MemoryStore, Notifier, NullNotifier};
pub use report::{
    registry_report, AutoReport, BlockColour, RealTimeReport, RegistryEntry, SessionReport,
    SettingsReport,
};
