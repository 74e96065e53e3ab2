//! Test doubles shared by the integration suites.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use block_lights::engine::{Notifier, RegistryEntry, SessionReport, SettingsReport};
use block_lights::error::ProtocolError;
use block_lights::{DeliveryResult, MacAddress, Message, MessageType, Radio};
use parking_lot::Mutex;
use smart_leds::{SmartLedsWrite, RGB8};

pub fn mac(last: u8) -> MacAddress {
    MacAddress::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, last])
}

pub fn master_mac() -> MacAddress {
    MacAddress::new([0x24, 0x0A, 0xC4, 0x00, 0x00, 0x01])
}

/// Radio that records every send and fails for chosen peers.
///
/// Clones share state, so a test keeps one handle after moving the other
/// into the engine.
#[derive(Clone, Default)]
pub struct RecordingRadio {
    sent: Arc<Mutex<Vec<(MacAddress, Message)>>>,
    peers: Arc<Mutex<HashSet<MacAddress>>>,
    failing: Arc<Mutex<HashSet<MacAddress>>>,
    pinned: Arc<Mutex<HashSet<MacAddress>>>,
}

impl RecordingRadio {
    pub fn fail(&self, peer: MacAddress) {
        self.failing.lock().insert(peer);
    }

    pub fn recover(&self, peer: MacAddress) {
        self.failing.lock().remove(&peer);
    }

    pub fn sent(&self) -> Vec<(MacAddress, Message)> {
        self.sent.lock().clone()
    }

    pub fn sent_to(&self, peer: MacAddress, kind: MessageType) -> Vec<Message> {
        self.sent
            .lock()
            .iter()
            .filter(|(p, m)| *p == peer && m.kind == kind)
            .map(|(_, m)| *m)
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().clear();
    }

    /// Make `remove_peer` fail for this peer.
    pub fn pin_peer(&self, peer: MacAddress) {
        self.pinned.lock().insert(peer);
    }

    pub fn unpin_peer(&self, peer: MacAddress) {
        self.pinned.lock().remove(&peer);
    }

    pub fn peers(&self) -> HashSet<MacAddress> {
        self.peers.lock().clone()
    }
}

impl Radio for RecordingRadio {
    fn send(&mut self, peer: &MacAddress, message: &Message) -> DeliveryResult {
        self.sent.lock().push((*peer, *message));
        (!self.failing.lock().contains(peer)).into()
    }

    fn add_peer(&mut self, peer: &MacAddress) -> Result<(), ProtocolError> {
        self.peers.lock().insert(*peer);
        Ok(())
    }

    fn remove_peer(&mut self, peer: &MacAddress) -> Result<(), ProtocolError> {
        if self.pinned.lock().contains(peer) {
            return Err(ProtocolError::PeerRegistration);
        }
        self.peers.lock().remove(peer);
        Ok(())
    }
}

/// LED strip keeping the last frame written.
#[derive(Clone, Default)]
pub struct VecStrip {
    frame: Arc<Mutex<Vec<RGB8>>>,
}

impl VecStrip {
    pub fn frame(&self) -> Vec<RGB8> {
        self.frame.lock().clone()
    }
}

impl SmartLedsWrite for VecStrip {
    type Error = ();
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), ()>
    where
        T: IntoIterator<Item = I>,
        I: Into<RGB8>,
    {
        *self.frame.lock() = iterator.into_iter().map(Into::into).collect();
        Ok(())
    }
}

/// Notifier that keeps every broadcast.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sessions: Arc<Mutex<Vec<SessionReport>>>,
    registries: Arc<Mutex<Vec<Vec<RegistryEntry>>>>,
    settings: Arc<Mutex<Vec<SettingsReport>>>,
}

impl RecordingNotifier {
    pub fn sessions(&self) -> Vec<SessionReport> {
        self.sessions.lock().clone()
    }

    pub fn last_session(&self) -> Option<SessionReport> {
        self.sessions.lock().last().cloned()
    }

    pub fn registries(&self) -> Vec<Vec<RegistryEntry>> {
        self.registries.lock().clone()
    }

    pub fn settings_reports(&self) -> Vec<SettingsReport> {
        self.settings.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn session_status(&self, report: &SessionReport) {
        self.sessions.lock().push(report.clone());
    }

    fn block_registry(&self, entries: &[RegistryEntry]) {
        self.registries.lock().push(entries.to_vec());
    }

    fn settings(&self, report: &SettingsReport) {
        self.settings.lock().push(*report);
    }
}
