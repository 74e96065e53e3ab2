//! Error types for block-lights.
//!
//! Provides unified error handling across configuration, the block registry,
//! the wireless protocol and pacing sessions.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all block-lights operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Block registry error
    Registry(RegistryError),
    /// Wireless protocol error
    Protocol(ProtocolError),
    /// Pacing session error
    Session(SessionError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Setting value outside its allowed range
    InvalidSettingValue {
        /// Setting name
        setting: &'static str,
        /// Rejected value
        value: f32,
    },
    /// Setting name not recognised
    UnknownSetting(heapless::String<32>),
    /// Speed profile sample must be finite and > 0
    InvalidProfileSample(f32),
    /// Speed profile template has the wrong number of samples
    InvalidProfileLength(usize),
    /// Tick interval outside 10-100 ms
    InvalidTickInterval(u32),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Block registry errors.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// Another block already holds this number
    DuplicateNumber(i32),
    /// No free physical slot left
    RegistryFull,
    /// Number outside 1-14
    InvalidNumber(i32),
    /// No block matches the given number or MAC
    BlockNotFound,
    /// The master block cannot be moved or removed
    MasterProtected,
    /// Block is disconnected and cannot be renumbered
    BlockDisconnected(i32),
    /// A persisted record could not be parsed
    InvalidRecord(heapless::String<64>),
}

/// Wireless protocol errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// Send was not acknowledged
    SendFailed,
    /// Adding or removing a wireless peer failed
    PeerRegistration,
    /// Inbound frame has the wrong length
    MalformedMessage {
        /// Received length in bytes
        len: usize,
    },
    /// Inbound frame carries an unknown type tag
    UnknownMessageType(u8),
    /// A blink diagnostic is running
    BlinkInProgress,
}

/// Pacing session errors.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Parameters cannot change while the session runs
    AlreadyRunning,
    /// Lap count out of range
    InvalidLaps(f32),
    /// Lap time out of range
    InvalidLapTime(f32),
    /// Total time out of range
    InvalidTotalTime(f32),
    /// Lap count needs more profile samples than the profile can hold
    ProfileTooLong {
        /// Requested lap count
        laps: f32,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Registry(e) => write!(f, "Registry error: {}", e),
            Error::Protocol(e) => write!(f, "Protocol error: {}", e),
            Error::Session(e) => write!(f, "Session error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidSettingValue { setting, value } => {
                write!(f, "Invalid value {} for setting '{}'", value, setting)
            }
            ConfigError::UnknownSetting(name) => write!(f, "Unknown setting '{}'", name),
            ConfigError::InvalidProfileSample(v) => {
                write!(f, "Invalid profile sample: {}. Must be finite and > 0", v)
            }
            ConfigError::InvalidProfileLength(n) => {
                write!(f, "Profile template has {} samples, expected 9", n)
            }
            ConfigError::InvalidTickInterval(ms) => {
                write!(f, "Invalid tick interval: {} ms. Must be 10-100", ms)
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateNumber(n) => write!(f, "Block number {} already taken", n),
            RegistryError::RegistryFull => write!(f, "Registry full (max 14 blocks)"),
            RegistryError::InvalidNumber(n) => write!(f, "Invalid block number: {}. Must be 1-14", n),
            RegistryError::BlockNotFound => write!(f, "Block not found"),
            RegistryError::MasterProtected => write!(f, "Master block cannot be changed"),
            RegistryError::BlockDisconnected(n) => write!(f, "Block {} is disconnected", n),
            RegistryError::InvalidRecord(rec) => write!(f, "Invalid block record: '{}'", rec),
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::SendFailed => write!(f, "Wireless send not acknowledged"),
            ProtocolError::PeerRegistration => write!(f, "Wireless peer registration failed"),
            ProtocolError::MalformedMessage { len } => {
                write!(f, "Malformed message of {} bytes", len)
            }
            ProtocolError::UnknownMessageType(t) => write!(f, "Unknown message type {}", t),
            ProtocolError::BlinkInProgress => write!(f, "Blink sequence in progress"),
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::AlreadyRunning => write!(f, "Session is running"),
            SessionError::InvalidLaps(v) => write!(f, "Invalid lap count: {}", v),
            SessionError::InvalidLapTime(v) => {
                write!(f, "Invalid lap time: {}. Must be 7.0-120.0 s", v)
            }
            SessionError::InvalidTotalTime(v) => {
                write!(f, "Invalid total time: {}. Must be 5.0-6000.0 s", v)
            }
            SessionError::ProfileTooLong { laps } => {
                write!(f, "Speed profile cannot cover {} laps", laps)
            }
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Error::Registry(e)
    }
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Error::Protocol(e)
    }
}

impl From<SessionError> for Error {
    fn from(e: SessionError) -> Self {
        Error::Session(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for RegistryError {}

#[cfg(feature = "std")]
impl std::error::Error for ProtocolError {}

#[cfg(feature = "std")]
impl std::error::Error for SessionError {}
