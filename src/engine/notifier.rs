//! Outbound collaborators: status listeners and durable block storage.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::warn;

use crate::block::{format_records, parse_records, BlockRecord, MAX_BLOCKS};
use crate::error::{ConfigError, Error, RegistryError};

use super::report::{RegistryEntry, SessionReport, SettingsReport};

/// Receives state broadcasts from the engine.
///
/// Called outside the engine lock with a snapshot, so implementations may
/// block briefly (e.g. push to a WebSocket channel) without stalling ticks.
pub trait Notifier: Send + Sync + 'static {
    /// A pacing session's status changed.
    fn session_status(&self, report: &SessionReport);

    /// The block registry changed.
    fn block_registry(&self, entries: &[RegistryEntry]);

    /// Track settings changed.
    fn settings(&self, report: &SettingsReport);
}

/// Notifier that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn session_status(&self, _report: &SessionReport) {}
    fn block_registry(&self, _entries: &[RegistryEntry]) {}
    fn settings(&self, _report: &SettingsReport) {}
}

/// Durable storage for the block registry.
pub trait BlockStore: Send + Sync + 'static {
    /// Read persisted records. An absent store yields no records.
    ///
    /// # Errors
    ///
    /// Returns an error if the store exists but cannot be read or parsed.
    fn load(&self) -> Result<heapless::Vec<BlockRecord, MAX_BLOCKS>, Error>;

    /// Replace the persisted records.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn save(&self, records: &[BlockRecord]) -> Result<(), Error>;
}

impl<T: BlockStore> BlockStore for Arc<T> {
    fn load(&self) -> Result<heapless::Vec<BlockRecord, MAX_BLOCKS>, Error> {
        (**self).load()
    }

    fn save(&self, records: &[BlockRecord]) -> Result<(), Error> {
        (**self).save(records)
    }
}

/// Block store backed by a single text file in the record format.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BlockStore for FileStore {
    fn load(&self) -> Result<heapless::Vec<BlockRecord, MAX_BLOCKS>, Error> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let parsed = parse_records(&content);
                if parsed.skipped > 0 {
                    warn!(
                        path = %self.path.display(),
                        skipped = parsed.skipped,
                        "Skipped malformed block records"
                    );
                }
                Ok(parsed.records)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(heapless::Vec::new()),
            Err(e) => Err(io_error(e)),
        }
    }

    fn save(&self, records: &[BlockRecord]) -> Result<(), Error> {
        let content = format_records(records.iter().copied());
        fs::write(&self.path, content.as_str()).map_err(io_error)
    }
}

fn io_error(e: io::Error) -> Error {
    let mut msg = heapless::String::<128>::new();
    for c in e.to_string().chars().take(128) {
        if msg.push(c).is_err() {
            break;
        }
    }
    ConfigError::IoError(msg).into()
}

/// In-memory block store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: parking_lot::Mutex<heapless::Vec<BlockRecord, MAX_BLOCKS>>,
}

impl MemoryStore {
    /// Store pre-filled with `records`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::RegistryFull` for more records than blocks.
    pub fn with_records(records: &[BlockRecord]) -> Result<Self, RegistryError> {
        let records =
            heapless::Vec::from_slice(records).map_err(|_| RegistryError::RegistryFull)?;
        Ok(Self {
            records: parking_lot::Mutex::new(records),
        })
    }

    /// Records currently stored.
    pub fn records(&self) -> heapless::Vec<BlockRecord, MAX_BLOCKS> {
        self.records.lock().clone()
    }
}

impl BlockStore for MemoryStore {
    fn load(&self) -> Result<heapless::Vec<BlockRecord, MAX_BLOCKS>, Error> {
        Ok(self.records())
    }

    fn save(&self, records: &[BlockRecord]) -> Result<(), Error> {
        let mut stored = self.records.lock();
        stored.clear();
        for record in records.iter().take(MAX_BLOCKS) {
            let _ = stored.push(*record);
        }
        Ok(())
    }
}
