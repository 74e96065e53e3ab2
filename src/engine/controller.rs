//! The engine: single owner of the registry, settings and pacing sessions.
//!
//! All shared state sits behind one `parking_lot` mutex held only for short,
//! non-blocking sections. Radio sends happen under the lock so a scan reply
//! can never interleave with a half-applied tick or swap; listener and
//! storage calls happen after the lock is released, on snapshots.

use std::sync::Arc;

use parking_lot::Mutex;
use smart_leds::{SmartLedsWrite, RGB8};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::block::{Block, BlockRecord, BlockRegistry, Colour, MacAddress};
use crate::config::units::{Laps, Seconds};
use crate::config::{validate_config, SettingKey, SettingValue, Settings, SystemConfig, TimingConfig};
use crate::error::{Error, ProtocolError, RegistryError, SessionError};
use crate::mesh::{self, DeliveryResult, Message, MessageType, Radio, ReplyOutcome, SwapOutcome};
use crate::session::{
    AutoPacing, PacingSessions, RealTimePacing, SessionKind, SessionState, TickEvents,
};

use super::notifier::{BlockStore, Notifier};
use super::report::{registry_report, RegistryEntry, SessionReport, SettingsReport};
use super::tasks::{run_blink, run_session, BlinkPlan};

/// State guarded by the engine lock.
pub(crate) struct Core<R, W> {
    pub(crate) settings: Settings,
    pub(crate) registry: BlockRegistry,
    pub(crate) sessions: PacingSessions,
    pub(crate) radio: R,
    pub(crate) strip: W,
    pub(crate) blinking: bool,
}

impl<R, W> Core<R, W>
where
    R: Radio,
    W: SmartLedsWrite<Color = RGB8>,
{
    fn ensure_not_blinking(&self) -> Result<(), Error> {
        if self.blinking {
            Err(ProtocolError::BlinkInProgress.into())
        } else {
            Ok(())
        }
    }

    fn refresh_placeholders(&mut self) {
        if self.settings.show_all_blocks() {
            self.registry.set_virtual_placeholders(true);
        }
    }

    fn records(&self) -> Vec<BlockRecord> {
        self.registry.records().collect()
    }
}

/// A running session task.
pub(crate) struct SessionTask {
    pub(crate) kind: SessionKind,
    pub(crate) token: CancellationToken,
    pub(crate) handle: JoinHandle<()>,
}

impl SessionTask {
    /// Cancel the task and wait for its termination sequence.
    pub(crate) async fn stop(self) {
        self.token.cancel();
        if let Err(e) = self.handle.await {
            warn!(error = %e, kind = ?self.kind, "Session task did not exit cleanly");
        }
    }
}

pub(crate) struct Inner<R, W, N, S> {
    pub(crate) core: Mutex<Core<R, W>>,
    pub(crate) notifier: N,
    pub(crate) store: S,
    pub(crate) timing: TimingConfig,
    session: tokio::sync::Mutex<Option<SessionTask>>,
    blink: Mutex<Option<JoinHandle<()>>>,
}

impl<R, W, N, S> Inner<R, W, N, S>
where
    R: Radio + Send + 'static,
    W: SmartLedsWrite<Color = RGB8> + Send + 'static,
    N: Notifier,
    S: BlockStore,
{
    pub(crate) fn broadcast_registry(&self, entries: &[RegistryEntry]) {
        self.notifier.block_registry(entries);
    }

    pub(crate) fn persist(&self, records: &[BlockRecord]) {
        match self.store.save(records) {
            Ok(()) => debug!(count = records.len(), "Block registry saved"),
            Err(e) => warn!(error = %e, "Failed to save block registry"),
        }
    }

    /// Advance the active run one tick.
    ///
    /// Returns `None` once nothing is active, otherwise the tick's events
    /// and, if it warrants a broadcast, the report to send.
    pub(crate) fn tick_session(&self, dt: Seconds) -> Option<(TickEvents, Option<SessionReport>)> {
        let mut core = self.core.lock();
        let Core {
            registry,
            sessions,
            radio,
            strip,
            ..
        } = &mut *core;

        let kind = sessions.active_kind()?;
        let events = sessions.tick(dt, registry, radio, strip);
        let report = events
            .should_broadcast()
            .then(|| SessionReport::new(kind, sessions, registry));
        Some((events, report))
    }

    /// Run the termination sequence if a run is still active.
    pub(crate) fn finish_session(&self) -> Option<SessionKind> {
        let (kind, report) = {
            let mut core = self.core.lock();
            let Core {
                registry,
                sessions,
                radio,
                strip,
                ..
            } = &mut *core;
            let kind = sessions.terminate(registry, radio, strip)?;
            (kind, SessionReport::new(kind, sessions, registry))
        };
        info!(?kind, "Pacing session stopped");
        self.notifier.session_status(&report);
        Some(kind)
    }
}

/// Engine driving the blocks.
///
/// Cheap to clone; clones share the same state. Session and blink
/// operations spawn Tokio tasks and must be called from within a runtime.
pub struct Engine<R, W, N, S> {
    inner: Arc<Inner<R, W, N, S>>,
}

impl<R, W, N, S> Clone for Engine<R, W, N, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R, W, N, S> Engine<R, W, N, S>
where
    R: Radio + Send + 'static,
    W: SmartLedsWrite<Color = RGB8> + Send + 'static,
    N: Notifier,
    S: BlockStore,
{
    /// Create an engine and restore the persisted registry.
    ///
    /// Restored blocks are registered as radio peers and start
    /// `Disconnected` until they answer a scan. An unreadable store is
    /// logged and the engine starts with the master only.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn new(
        config: &SystemConfig,
        master: MacAddress,
        mut radio: R,
        strip: W,
        notifier: N,
        store: S,
    ) -> Result<Self, Error> {
        validate_config(config)?;
        let sessions = PacingSessions::from_config(config)?;

        let mut registry = BlockRegistry::new(master);
        match store.load() {
            Ok(records) => {
                let restored = registry.restore_from_records(&records);
                for block in registry.iter().filter(|b| b.is_remote()) {
                    if radio.add_peer(&block.mac).is_err() {
                        warn!(mac = %block.mac, "Failed to register restored peer");
                    }
                }
                info!(restored, "Block registry restored");
            }
            Err(e) => warn!(error = %e, "Failed to load block registry, starting empty"),
        }
        registry.set_virtual_placeholders(config.track.show_all_blocks());

        let core = Core {
            settings: config.track.clone(),
            registry,
            sessions,
            radio,
            strip,
            blinking: false,
        };

        Ok(Self {
            inner: Arc::new(Inner {
                core: Mutex::new(core),
                notifier,
                store,
                timing: config.engine,
                session: tokio::sync::Mutex::new(None),
                blink: Mutex::new(None),
            }),
        })
    }

    // ---------------------------------------------------------------------
    // Snapshots
    // ---------------------------------------------------------------------

    /// Current track settings.
    pub fn settings(&self) -> Settings {
        self.inner.core.lock().settings.clone()
    }

    /// Current registry, sorted by number.
    pub fn blocks(&self) -> Vec<Block> {
        self.inner.core.lock().registry.as_slice().to_vec()
    }

    /// Block with this number.
    pub fn block(&self, number: u8) -> Option<Block> {
        self.inner.core.lock().registry.get(number).copied()
    }

    /// Real-Time parameters and live state.
    pub fn real_time(&self) -> RealTimePacing {
        self.inner.core.lock().sessions.real_time().clone()
    }

    /// Auto parameters and live state.
    pub fn auto(&self) -> AutoPacing {
        self.inner.core.lock().sessions.auto().clone()
    }

    /// Mode of the active run.
    pub fn active_session(&self) -> Option<SessionKind> {
        self.inner.core.lock().sessions.active_kind()
    }

    /// Lifecycle state of the session slot.
    pub fn session_state(&self) -> SessionState {
        self.inner.core.lock().sessions.state()
    }

    /// Whether a blink sequence is running.
    pub fn is_blinking(&self) -> bool {
        self.inner.core.lock().blinking
    }

    /// Status report for `kind`.
    pub fn session_report(&self, kind: SessionKind) -> SessionReport {
        let core = self.inner.core.lock();
        SessionReport::new(kind, &core.sessions, &core.registry)
    }

    /// Registry report.
    pub fn registry_report(&self) -> Vec<RegistryEntry> {
        registry_report(&self.inner.core.lock().registry)
    }

    /// Settings report.
    pub fn settings_report(&self) -> SettingsReport {
        SettingsReport::from(&self.inner.core.lock().settings)
    }

    // ---------------------------------------------------------------------
    // Settings
    // ---------------------------------------------------------------------

    /// Apply a setting by wire name.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownSetting` for an unknown name, otherwise
    /// as [`Engine::apply_setting`].
    pub fn apply_named_setting(&self, name: &str, value: SettingValue) -> Result<SettingsReport, Error> {
        let key: SettingKey = name.parse()?;
        self.apply_setting(key, value)
    }

    /// Apply a setting and broadcast the new settings.
    ///
    /// Toggling `showAllBlocks` adds or removes the virtual placeholders.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSettingValue` for a rejected value; the
    /// previous value stays.
    pub fn apply_setting(&self, key: SettingKey, value: SettingValue) -> Result<SettingsReport, Error> {
        let (report, entries) = {
            let mut core = self.inner.core.lock();
            core.settings.apply(key, value)?;
            let show = core.settings.show_all_blocks();
            let entries = (key == SettingKey::ShowAllBlocks
                && core.registry.set_virtual_placeholders(show))
            .then(|| registry_report(&core.registry));
            (SettingsReport::from(&core.settings), entries)
        };

        debug!(setting = key.name(), ?value, "Setting applied");
        self.inner.notifier.settings(&report);
        if let Some(entries) = entries {
            self.inner.broadcast_registry(&entries);
        }
        Ok(report)
    }

    /// Show or hide virtual placeholders for unclaimed numbers.
    ///
    /// Returns whether the registry changed.
    pub fn toggle_virtual_placeholders(&self, show: bool) -> bool {
        let entries = {
            let mut core = self.inner.core.lock();
            core.settings.set_show_all_blocks(show);
            core.registry
                .set_virtual_placeholders(show)
                .then(|| registry_report(&core.registry))
        };
        match entries {
            Some(entries) => {
                self.inner.broadcast_registry(&entries);
                true
            }
            None => false,
        }
    }

    // ---------------------------------------------------------------------
    // Session parameters
    // ---------------------------------------------------------------------

    fn update_session<T>(
        &self,
        kind: SessionKind,
        f: impl FnOnce(&mut PacingSessions) -> Result<T, SessionError>,
    ) -> Result<T, Error> {
        let (value, report) = {
            let mut core = self.inner.core.lock();
            let value = f(&mut core.sessions)?;
            (value, SessionReport::new(kind, &core.sessions, &core.registry))
        };
        self.inner.notifier.session_status(&report);
        Ok(value)
    }

    /// Set the Real-Time lap count.
    ///
    /// # Errors
    ///
    /// `SessionError::AlreadyRunning` while Real-Time runs, `InvalidLaps`
    /// outside 1-100.
    pub fn set_real_time_laps(&self, laps: u32) -> Result<(), Error> {
        self.update_session(SessionKind::RealTime, |s| s.real_time_mut().set_laps(laps))
    }

    /// Add one Real-Time lap.
    ///
    /// # Errors
    ///
    /// As [`Engine::set_real_time_laps`].
    pub fn increment_real_time_laps(&self) -> Result<u32, Error> {
        self.update_session(SessionKind::RealTime, |s| s.real_time_mut().increment_laps())
    }

    /// Remove one Real-Time lap, stopping at one.
    ///
    /// # Errors
    ///
    /// As [`Engine::set_real_time_laps`].
    pub fn decrement_real_time_laps(&self) -> Result<u32, Error> {
        self.update_session(SessionKind::RealTime, |s| s.real_time_mut().decrement_laps())
    }

    /// Set the Real-Time lap time, rounded to 0.1 s. A running session
    /// picks it up on its next tick.
    ///
    /// # Errors
    ///
    /// `SessionError::InvalidLapTime` outside 7.0-120.0 s.
    pub fn set_real_time_lap_time(&self, lap_time: Seconds) -> Result<(), Error> {
        self.update_session(SessionKind::RealTime, |s| {
            s.real_time_mut().set_lap_time(lap_time)
        })
    }

    /// Lengthen the Real-Time lap time by 0.1 s.
    ///
    /// # Errors
    ///
    /// As [`Engine::set_real_time_lap_time`].
    pub fn increment_real_time_lap_time(&self) -> Result<Seconds, Error> {
        self.update_session(SessionKind::RealTime, |s| {
            s.real_time_mut().increment_lap_time()
        })
    }

    /// Shorten the Real-Time lap time by 0.1 s.
    ///
    /// # Errors
    ///
    /// As [`Engine::set_real_time_lap_time`].
    pub fn decrement_real_time_lap_time(&self) -> Result<Seconds, Error> {
        self.update_session(SessionKind::RealTime, |s| {
            s.real_time_mut().decrement_lap_time()
        })
    }

    /// Restore the Real-Time defaults.
    ///
    /// # Errors
    ///
    /// `SessionError::AlreadyRunning` while Real-Time runs.
    pub fn reset_real_time(&self) -> Result<(), Error> {
        self.update_session(SessionKind::RealTime, |s| {
            if s.real_time().is_running() {
                return Err(SessionError::AlreadyRunning);
            }
            s.real_time_mut().reset();
            Ok(())
        })
    }

    /// Set the Auto lap count, rounded to half laps.
    ///
    /// # Errors
    ///
    /// `SessionError::AlreadyRunning` while Auto runs, `InvalidLaps` below a
    /// quarter lap or above 100.
    pub fn set_auto_laps(&self, laps: f32) -> Result<Laps, Error> {
        self.update_session(SessionKind::Auto, |s| s.auto_mut().set_laps(laps))
    }

    /// Set the Auto total time.
    ///
    /// # Errors
    ///
    /// `SessionError::AlreadyRunning` while Auto runs, `InvalidTotalTime`
    /// outside 5.0-6000.0 s.
    pub fn set_auto_total_time(&self, total: Seconds) -> Result<(), Error> {
        self.update_session(SessionKind::Auto, |s| s.auto_mut().set_total_time(total))
    }

    /// Enable or disable the Auto countdown.
    ///
    /// # Errors
    ///
    /// `SessionError::AlreadyRunning` while Auto runs.
    pub fn set_auto_countdown(&self, countdown: bool) -> Result<(), Error> {
        self.update_session(SessionKind::Auto, |s| s.auto_mut().set_countdown(countdown))
    }

    /// Flip the Auto countdown.
    ///
    /// # Errors
    ///
    /// `SessionError::AlreadyRunning` while Auto runs.
    pub fn toggle_auto_countdown(&self) -> Result<bool, Error> {
        self.update_session(SessionKind::Auto, |s| s.auto_mut().toggle_countdown())
    }

    // ---------------------------------------------------------------------
    // Session lifecycle
    // ---------------------------------------------------------------------

    /// Start a pacing session, stopping whichever one is running.
    ///
    /// The previous session's task finishes its termination sequence before
    /// the new one starts.
    ///
    /// # Errors
    ///
    /// Returns a `SessionError` for out-of-range parameters. The previous
    /// session is stopped even then.
    pub async fn start_session(&self, kind: SessionKind) -> Result<(), Error> {
        let mut slot = self.inner.session.lock().await;
        if let Some(task) = slot.take() {
            self.inner.core.lock().sessions.request_stop();
            task.stop().await;
        }

        let (report, settings_report) = {
            let mut core = self.inner.core.lock();
            let Core {
                settings,
                registry,
                sessions,
                radio,
                strip,
                ..
            } = &mut *core;
            sessions.start(kind, settings, registry, radio, strip)?;
            // Auto derives the starting side from its lap count
            let settings_report =
                (kind == SessionKind::Auto).then(|| SettingsReport::from(&*settings));
            (SessionReport::new(kind, sessions, registry), settings_report)
        };
        info!(?kind, "Pacing session started");
        self.inner.notifier.session_status(&report);
        if let Some(settings_report) = settings_report {
            self.inner.notifier.settings(&settings_report);
        }

        let token = CancellationToken::new();
        let handle = tokio::spawn(run_session(Arc::clone(&self.inner), token.clone()));
        *slot = Some(SessionTask {
            kind,
            token,
            handle,
        });
        Ok(())
    }

    /// Stop every session, wait for its termination sequence, then turn
    /// every block off.
    ///
    /// Returns the mode that was running.
    pub async fn stop_all_sessions(&self) -> Option<SessionKind> {
        let mut slot = self.inner.session.lock().await;
        let requested = self.inner.core.lock().sessions.request_stop();
        let task = slot.take();
        let stopped = task.as_ref().map(|t| t.kind).or(requested);
        if let Some(task) = task {
            task.stop().await;
        }
        // A run left without a task still gets its termination sequence
        self.inner.finish_session();

        let (failed, reports) = {
            let mut core = self.inner.core.lock();
            let Core {
                registry,
                sessions,
                radio,
                strip,
                ..
            } = &mut *core;
            let failed = mesh::push_all(registry, radio, strip, Colour::Off);
            let reports = stopped.map(|kind| SessionReport::new(kind, sessions, registry));
            (failed, reports)
        };
        if failed > 0 {
            warn!(failed, "Blocks did not acknowledge the off command");
        }
        if let Some(report) = reports {
            self.inner.notifier.session_status(&report);
        }
        stopped
    }

    /// Wait for the current session task to end on its own.
    pub async fn wait_for_session(&self) {
        let task = self.inner.session.lock().await.take();
        if let Some(task) = task {
            if let Err(e) = task.handle.await {
                warn!(error = %e, kind = ?task.kind, "Session task did not exit cleanly");
            }
        }
    }

    // ---------------------------------------------------------------------
    // Block setup
    // ---------------------------------------------------------------------

    /// Broadcast a scan so unregistered nodes reply.
    ///
    /// # Errors
    ///
    /// `ProtocolError::BlinkInProgress` while a blink runs.
    pub fn scan_for_blocks(&self) -> Result<DeliveryResult, Error> {
        let delivery = {
            let mut core = self.inner.core.lock();
            core.ensure_not_blinking()?;
            let Core { registry, radio, .. } = &mut *core;
            mesh::scan(registry, radio)
        };
        if delivery.is_delivered() {
            debug!("Scan broadcast sent");
        } else {
            warn!("Scan broadcast failed");
        }
        Ok(delivery)
    }

    /// Handle an inbound frame from `from`.
    ///
    /// Scan replies update the registry; other message types are not meant
    /// for the master and are ignored.
    ///
    /// # Errors
    ///
    /// Returns a `ProtocolError` for frames that do not decode.
    pub fn handle_message(&self, from: MacAddress, bytes: &[u8]) -> Result<Option<ReplyOutcome>, Error> {
        let message = Message::decode(bytes).map_err(|e| {
            warn!(%from, error = %e, "Dropping malformed frame");
            e
        })?;
        match message.kind {
            MessageType::SlaveReply => Ok(Some(self.handle_reply(from, message.number))),
            other => {
                debug!(%from, kind = ?other, "Ignoring message not addressed to the master");
                Ok(None)
            }
        }
    }

    /// Apply a scan reply from `mac` claiming number `claimed`.
    pub fn handle_reply(&self, mac: MacAddress, claimed: i32) -> ReplyOutcome {
        let (outcome, entries, records) = {
            let mut core = self.inner.core.lock();
            let Core { registry, radio, .. } = &mut *core;
            let outcome = mesh::handle_reply(registry, radio, mac, claimed);
            let entries = outcome
                .registry_changed()
                .then(|| registry_report(&core.registry));
            let records = outcome.registered().then(|| core.records());
            (outcome, entries, records)
        };

        match outcome {
            ReplyOutcome::Confirmed { number } => debug!(%mac, number, "Block confirmed"),
            ReplyOutcome::Corrected {
                number,
                claimed,
                delivery,
            } => info!(%mac, number, claimed, ?delivery, "Block number corrected"),
            ReplyOutcome::Registered { number } => info!(%mac, number, "Block registered"),
            ReplyOutcome::Reassigned {
                number,
                claimed,
                delivery,
            } => info!(%mac, number, claimed, ?delivery, "Block registered with reassigned number"),
            ReplyOutcome::IgnoredMaster => debug!("Ignoring reply from own address"),
            ReplyOutcome::IgnoredFull => warn!(%mac, "Registry full, ignoring reply"),
        }

        if let Some(records) = records {
            self.inner.persist(&records);
        }
        if let Some(entries) = entries {
            self.inner.broadcast_registry(&entries);
        }
        outcome
    }

    /// Move block `from` to number `to`, swapping with any block there.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::BlinkInProgress` while a blink runs
    /// - `RegistryError::MasterProtected` if either number is 1
    /// - `RegistryError::BlockDisconnected` if `from` is disconnected
    /// - `RegistryError::BlockNotFound` / `InvalidNumber` otherwise
    pub fn set_block_number(&self, from: u8, to: u8) -> Result<SwapOutcome, Error> {
        let (outcome, entries, records) = {
            let mut core = self.inner.core.lock();
            core.ensure_not_blinking()?;
            let Core { registry, radio, .. } = &mut *core;
            let outcome = mesh::set_block_number(registry, radio, from, to)?;
            (outcome, registry_report(&core.registry), core.records())
        };

        for delivery in [outcome.moved_delivery, outcome.displaced_delivery]
            .into_iter()
            .flatten()
            .filter(|d| !d.is_delivered())
        {
            warn!(?delivery, from, to, "Block number push failed");
        }
        info!(from, to, "Block renumbered");
        self.inner.persist(&records);
        self.inner.broadcast_registry(&entries);
        Ok(outcome)
    }

    /// Release the peer of the block with this address, then remove it.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::BlinkInProgress` while a blink runs
    /// - `RegistryError::BlockNotFound` for an unknown address
    /// - `RegistryError::MasterProtected` for the master
    /// - `ProtocolError::PeerRegistration` when the radio keeps the peer;
    ///   the block stays registered
    pub fn clear_block(&self, mac: &MacAddress) -> Result<Block, Error> {
        let (removed, entries, records) = {
            let mut core = self.inner.core.lock();
            core.ensure_not_blinking()?;
            let Core { registry, radio, .. } = &mut *core;
            let removed = match mesh::clear_block(registry, radio, mac) {
                Ok(removed) => removed,
                Err(e) => {
                    warn!(%mac, error = %e, "Block not removed");
                    return Err(e);
                }
            };
            core.refresh_placeholders();
            (removed, registry_report(&core.registry), core.records())
        };
        info!(%mac, number = removed.number, "Block removed");
        self.inner.persist(&records);
        self.inner.broadcast_registry(&entries);
        Ok(removed)
    }

    /// Remove every block except the master.
    ///
    /// Returns how many real blocks were removed.
    ///
    /// # Errors
    ///
    /// `ProtocolError::BlinkInProgress` while a blink runs.
    pub fn clear_all_blocks(&self) -> Result<usize, Error> {
        let (removed, entries, records) = {
            let mut core = self.inner.core.lock();
            core.ensure_not_blinking()?;
            let Core { registry, radio, .. } = &mut *core;
            let removed = mesh::clear_all(registry, radio);
            core.refresh_placeholders();
            (removed, registry_report(&core.registry), core.records())
        };
        info!(removed, "All blocks removed");
        self.inner.persist(&records);
        self.inner.broadcast_registry(&entries);
        Ok(removed)
    }

    // ---------------------------------------------------------------------
    // Diagnostics
    // ---------------------------------------------------------------------

    /// Flash one block blue three times.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::BlinkInProgress` while another blink runs
    /// - `RegistryError::BlockNotFound` for an unknown or virtual address
    pub fn blink_block(&self, mac: &MacAddress) -> Result<(), Error> {
        let plan = {
            let mut core = self.inner.core.lock();
            core.ensure_not_blinking()?;
            let block = core
                .registry
                .find_by_mac(mac)
                .filter(|b| !b.is_virtual())
                .ok_or(RegistryError::BlockNotFound)?;
            let plan = BlinkPlan::single(block.mac);
            core.blinking = true;
            plan
        };
        self.spawn_blink(plan);
        Ok(())
    }

    /// Flash every real block blue once, one after another.
    ///
    /// # Errors
    ///
    /// `ProtocolError::BlinkInProgress` while another blink runs.
    pub fn blink_all(&self) -> Result<(), Error> {
        let plan = {
            let mut core = self.inner.core.lock();
            core.ensure_not_blinking()?;
            let plan = BlinkPlan::all(core.registry.iter().filter(|b| !b.is_virtual()).map(|b| b.mac));
            core.blinking = true;
            plan
        };
        self.spawn_blink(plan);
        Ok(())
    }

    fn spawn_blink(&self, plan: BlinkPlan) {
        info!(blocks = plan.targets.len(), flashes = plan.flashes, "Blink started");
        let handle = tokio::spawn(run_blink(Arc::clone(&self.inner), plan));
        *self.inner.blink.lock() = Some(handle);
    }

    /// Wait for the current blink sequence to finish.
    pub async fn wait_for_blink(&self) {
        let handle = self.inner.blink.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "Blink task did not exit cleanly");
            }
        }
    }

    /// Stop sessions and wait for running tasks.
    pub async fn shutdown(&self) {
        self.stop_all_sessions().await;
        self.wait_for_blink().await;
    }
}
