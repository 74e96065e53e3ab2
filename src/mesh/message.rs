//! Wire messages exchanged with block nodes.
//!
//! Every message is a fixed 16-byte record laid out like the C struct the
//! node firmware uses: type tag, MAC, RGB colour, two padding bytes and a
//! little-endian `i32` number.

use bytemuck::{Pod, Zeroable};
use smart_leds::RGB8;

use crate::block::{Colour, MacAddress};
use crate::error::ProtocolError;

/// Encoded message length in bytes.
pub const MESSAGE_LEN: usize = core::mem::size_of::<WireMessage>();

/// Message type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MessageType {
    /// Master looking for nodes; carries the master's MAC.
    Scan = 0,
    /// New colour for a node.
    LedColorChange = 1,
    /// New number for a node.
    SlaveBlockUpdate = 2,
    /// Node answering a scan with the number it believes it has.
    SlaveReply = 3,
}

impl TryFrom<u8> for MessageType {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MessageType::Scan),
            1 => Ok(MessageType::LedColorChange),
            2 => Ok(MessageType::SlaveBlockUpdate),
            3 => Ok(MessageType::SlaveReply),
            other => Err(ProtocolError::UnknownMessageType(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
struct WireMessage {
    kind: u8,
    mac: [u8; 6],
    colour: [u8; 3],
    _padding: [u8; 2],
    number: [u8; 4],
}

/// A decoded message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    /// Type tag.
    pub kind: MessageType,
    /// MAC carried in the payload.
    pub mac: MacAddress,
    /// Colour carried in the payload.
    pub colour: RGB8,
    /// Number carried in the payload.
    pub number: i32,
}

impl Message {
    fn empty(kind: MessageType) -> Self {
        Self {
            kind,
            mac: MacAddress::default(),
            colour: Colour::Off.rgb(),
            number: 0,
        }
    }

    /// Scan announcing the master.
    pub fn scan(master: MacAddress) -> Self {
        Self {
            mac: master,
            ..Self::empty(MessageType::Scan)
        }
    }

    /// Colour change for a node.
    pub fn colour_change(colour: Colour) -> Self {
        Self {
            colour: colour.rgb(),
            ..Self::empty(MessageType::LedColorChange)
        }
    }

    /// Number update for a node.
    pub fn block_update(number: u8) -> Self {
        Self {
            number: i32::from(number),
            ..Self::empty(MessageType::SlaveBlockUpdate)
        }
    }

    /// Reply from a node claiming `number`.
    pub fn reply(mac: MacAddress, number: i32) -> Self {
        Self {
            mac,
            number,
            ..Self::empty(MessageType::SlaveReply)
        }
    }

    /// Encode to the wire layout.
    pub fn encode(&self) -> [u8; MESSAGE_LEN] {
        let wire = WireMessage {
            kind: self.kind as u8,
            mac: self.mac.0,
            colour: [self.colour.r, self.colour.g, self.colour.b],
            _padding: [0; 2],
            number: self.number.to_le_bytes(),
        };
        bytemuck::cast(wire)
    }

    /// Decode from the wire layout.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::MalformedMessage` for a frame of the wrong
    /// length and `ProtocolError::UnknownMessageType` for an unknown tag.
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let wire: &WireMessage = bytemuck::try_from_bytes(bytes)
            .map_err(|_| ProtocolError::MalformedMessage { len: bytes.len() })?;
        Ok(Self {
            kind: MessageType::try_from(wire.kind)?,
            mac: MacAddress(wire.mac),
            colour: RGB8 {
                r: wire.colour[0],
                g: wire.colour[1],
                b: wire.colour[2],
            },
            number: i32::from_le_bytes(wire.number),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        assert_eq!(MESSAGE_LEN, 16);
        let bytes = Message::block_update(5).encode();
        assert_eq!(bytes[0], 2);
        assert_eq!(&bytes[12..], &[5, 0, 0, 0]);
    }

    #[test]
    fn test_colour_bytes() {
        let bytes = Message::colour_change(Colour::Orange).encode();
        assert_eq!(bytes[0], 1);
        assert_eq!(&bytes[7..10], &[255, 165, 0]);
    }

    #[test]
    fn test_decode_reply() {
        let mac = MacAddress::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0x01]);
        let decoded = Message::decode(&Message::reply(mac, 3).encode()).unwrap();
        assert_eq!(decoded.kind, MessageType::SlaveReply);
        assert_eq!(decoded.mac, mac);
        assert_eq!(decoded.number, 3);
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(
            Message::decode(&[0u8; 10]),
            Err(ProtocolError::MalformedMessage { len: 10 })
        );
        let mut bytes = Message::scan(MacAddress::default()).encode();
        bytes[0] = 9;
        assert_eq!(
            Message::decode(&bytes),
            Err(ProtocolError::UnknownMessageType(9))
        );
    }
}
