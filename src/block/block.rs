//! A single block in the registry.

use core::fmt::{self, Write};

use serde::Serialize;

use super::colour::Colour;
use super::mac::MacAddress;

/// Number of the master block.
pub const MASTER_NUMBER: u8 = 1;

/// Highest block number.
pub const MAX_NUMBER: u8 = 14;

/// Liveness of a block as seen by the master.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BlockStatus {
    /// The node running the engine.
    Master,
    /// Answered its last message.
    Working,
    /// Failed a send or not yet heard from since startup.
    Disconnected,
    /// Part of a running blink diagnostic.
    #[serde(rename = "Blinking...")]
    Blinking,
    /// Placeholder for an unclaimed number.
    Virtual,
}

impl BlockStatus {
    /// Label shown in registry reports.
    pub const fn label(self) -> &'static str {
        match self {
            BlockStatus::Master => "Master",
            BlockStatus::Working => "Working",
            BlockStatus::Disconnected => "Disconnected",
            BlockStatus::Blinking => "Blinking...",
            BlockStatus::Virtual => "Virtual",
        }
    }
}

impl fmt::Display for BlockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One light node, physical or placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// Hardware identity.
    pub mac: MacAddress,
    /// Position number, 1-14.
    pub number: u8,
    /// Liveness.
    pub status: BlockStatus,
    /// Last commanded colour.
    pub colour: Colour,
}

impl Block {
    /// The master block.
    pub const fn master(mac: MacAddress) -> Self {
        Self {
            mac,
            number: MASTER_NUMBER,
            status: BlockStatus::Master,
            colour: Colour::Off,
        }
    }

    /// A newly discovered or restored node.
    pub const fn physical(mac: MacAddress, number: u8, status: BlockStatus) -> Self {
        Self {
            mac,
            number,
            status,
            colour: Colour::Off,
        }
    }

    /// A placeholder for an unclaimed number.
    pub const fn placeholder(number: u8) -> Self {
        Self {
            mac: MacAddress::virtual_for(number),
            number,
            status: BlockStatus::Virtual,
            colour: Colour::Off,
        }
    }

    /// Whether this is the master block.
    ///
    /// The master always holds number 1, whatever its transient status.
    #[inline]
    pub fn is_master(&self) -> bool {
        self.number == MASTER_NUMBER
    }

    /// Whether this is a virtual placeholder.
    #[inline]
    pub fn is_virtual(&self) -> bool {
        self.status == BlockStatus::Virtual || self.mac.is_virtual()
    }

    /// Whether wireless messages go to this block.
    #[inline]
    pub fn is_remote(&self) -> bool {
        !self.is_master() && !self.is_virtual()
    }

    /// Identifier used by UIs, `block<n>`.
    pub fn id(&self) -> heapless::String<8> {
        let mut id = heapless::String::new();
        let _ = write!(id, "block{}", self.number);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id() {
        let block = Block::placeholder(12);
        assert_eq!(block.id().as_str(), "block12");
        assert!(block.is_virtual());
        assert!(!block.is_remote());
    }

    #[test]
    fn test_blinking_master_stays_master() {
        let mut block = Block::master(MacAddress::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0x01]));
        block.status = BlockStatus::Blinking;
        assert!(block.is_master());
        assert!(!block.is_remote());

        block.number = 2;
        assert!(!block.is_master());
        assert!(block.is_remote());
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(BlockStatus::Blinking.label(), "Blinking...");
        assert_eq!(format!("{}", BlockStatus::Disconnected), "Disconnected");
    }
}
