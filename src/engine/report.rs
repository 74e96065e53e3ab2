//! Serializable views of the engine state for status listeners.
//!
//! Field names match what the browser UIs consume, so a WebSocket layer can
//! forward these as JSON unchanged.

use serde::Serialize;

use crate::block::{Block, BlockRegistry, BlockStatus, MacAddress};
use crate::config::Settings;
use crate::session::{AutoPacing, PacingSessions, RealTimePacing, SessionKind};

/// Colour of one block in a session report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockColour {
    /// `block<n>`.
    pub id: String,
    /// `#RRGGBB`.
    pub color: String,
}

impl From<&Block> for BlockColour {
    fn from(block: &Block) -> Self {
        Self {
            id: block.id().to_string(),
            color: block.colour.hex().to_string(),
        }
    }
}

/// Real-Time session status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealTimeReport {
    /// Status line.
    pub status: String,
    /// Laps remaining.
    pub lap: String,
    /// Lap time with one decimal.
    pub lap_time: String,
    /// Per-block colours.
    pub circles: Vec<BlockColour>,
}

/// Auto session status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoReport {
    /// Status line.
    pub auto_status: String,
    /// Laps remaining, one decimal when a half lap is left.
    pub auto_laps: String,
    /// Total time as `m:ss.ss`.
    pub auto_time: String,
    /// `Yes` or `No`.
    pub auto_countdown: String,
    /// Per-block colours.
    pub circles: Vec<BlockColour>,
}

/// Status of one pacing mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SessionReport {
    /// Real-Time page.
    RealTime(RealTimeReport),
    /// Auto page.
    Auto(AutoReport),
}

impl SessionReport {
    /// Report for `kind`.
    pub fn new(kind: SessionKind, sessions: &PacingSessions, registry: &BlockRegistry) -> Self {
        match kind {
            SessionKind::RealTime => Self::real_time(sessions.real_time(), registry),
            SessionKind::Auto => Self::auto(sessions.auto(), registry),
        }
    }

    /// Real-Time report.
    pub fn real_time(params: &RealTimePacing, registry: &BlockRegistry) -> Self {
        SessionReport::RealTime(RealTimeReport {
            status: params.status().to_string(),
            lap: params.laps_text().to_string(),
            lap_time: params.lap_time_text().to_string(),
            circles: circles(registry),
        })
    }

    /// Auto report.
    pub fn auto(params: &AutoPacing, registry: &BlockRegistry) -> Self {
        SessionReport::Auto(AutoReport {
            auto_status: params.status().to_string(),
            auto_laps: params.laps_text().to_string(),
            auto_time: params.total_time_text().to_string(),
            auto_countdown: params.countdown_text().to_string(),
            circles: circles(registry),
        })
    }

    /// Mode this report describes.
    pub fn kind(&self) -> SessionKind {
        match self {
            SessionReport::RealTime(_) => SessionKind::RealTime,
            SessionReport::Auto(_) => SessionKind::Auto,
        }
    }

    /// Per-block colours.
    pub fn circles(&self) -> &[BlockColour] {
        match self {
            SessionReport::RealTime(r) => &r.circles,
            SessionReport::Auto(r) => &r.circles,
        }
    }

    /// Status line.
    pub fn status(&self) -> &str {
        match self {
            SessionReport::RealTime(r) => &r.status,
            SessionReport::Auto(r) => &r.auto_status,
        }
    }
}

fn circles(registry: &BlockRegistry) -> Vec<BlockColour> {
    registry.iter().map(BlockColour::from).collect()
}

/// One row of the setup page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegistryEntry {
    /// Hardware address, `AA:BB:CC:DD:EE:FF`.
    #[serde(rename = "MACAddress")]
    pub mac: MacAddress,
    /// Block number.
    pub number: u8,
    /// Liveness label.
    pub status: BlockStatus,
}

impl From<&Block> for RegistryEntry {
    fn from(block: &Block) -> Self {
        Self {
            mac: block.mac,
            number: block.number,
            status: block.status,
        }
    }
}

/// Ordered registry listing.
pub fn registry_report(registry: &BlockRegistry) -> Vec<RegistryEntry> {
    registry.iter().map(RegistryEntry::from).collect()
}

/// Settings page state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsReport {
    /// Selected lane.
    #[serde(serialize_with = "as_text")]
    pub track_number: u8,
    /// Start line side, derived by each Auto start.
    #[serde(rename = "startingOn500mSide")]
    pub starting_on_500m_side: bool,
}

impl From<&Settings> for SettingsReport {
    fn from(settings: &Settings) -> Self {
        Self {
            track_number: settings.track_number(),
            starting_on_500m_side: settings.starting_on_500m_side(),
        }
    }
}

fn as_text<S: serde::Serializer>(value: &u8, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
