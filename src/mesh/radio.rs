//! Wireless transport seam.

use crate::block::MacAddress;
use crate::error::ProtocolError;

use super::message::Message;

/// Whether a send was acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeliveryResult {
    /// The peer acknowledged the message.
    Delivered,
    /// The send failed or was not acknowledged.
    Failed,
}

impl DeliveryResult {
    /// Whether the message got through.
    #[inline]
    pub fn is_delivered(self) -> bool {
        self == DeliveryResult::Delivered
    }
}

impl From<bool> for DeliveryResult {
    fn from(ok: bool) -> Self {
        if ok {
            DeliveryResult::Delivered
        } else {
            DeliveryResult::Failed
        }
    }
}

/// Peer-to-peer radio used to reach the block nodes.
///
/// `send` reports the delivery outcome to the caller, which owns the
/// registry and applies the outcome to it directly.
pub trait Radio {
    /// Send a message to one peer, or to everyone via
    /// [`MacAddress::BROADCAST`].
    fn send(&mut self, peer: &MacAddress, message: &Message) -> DeliveryResult;

    /// Register a peer before sending to it.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::PeerRegistration` if the transport refuses.
    fn add_peer(&mut self, peer: &MacAddress) -> Result<(), ProtocolError>;

    /// Release a peer.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::PeerRegistration` if the transport refuses.
    fn remove_peer(&mut self, peer: &MacAddress) -> Result<(), ProtocolError>;
}

