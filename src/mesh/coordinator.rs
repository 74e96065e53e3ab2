//! Discovery, numbering and removal of block nodes.
//!
//! Every operation mutates the registry and talks to the radio in one call,
//! so a caller holding the registry lock applies the whole transition
//! atomically. Delivery failures never surface as errors: the affected
//! block is marked `Disconnected` and the next scan recovers it.

use crate::block::{Block, BlockRegistry, BlockStatus, MacAddress, Swap, MASTER_NUMBER, MAX_NUMBER};
use crate::error::{Error, ProtocolError, RegistryError};

use super::message::Message;
use super::radio::{DeliveryResult, Radio};

/// What handling a scan reply did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// Known node reporting its stored number; now `Working`.
    Confirmed {
        /// Its number.
        number: u8,
    },
    /// Known node reporting a different number; the stored one was pushed.
    Corrected {
        /// Stored number.
        number: u8,
        /// Number the node claimed.
        claimed: i32,
        /// Outcome of the push.
        delivery: DeliveryResult,
    },
    /// New node registered with the number it claimed.
    Registered {
        /// Its number.
        number: u8,
    },
    /// New node whose claim was taken; it got the lowest free number.
    Reassigned {
        /// Number assigned.
        number: u8,
        /// Number the node claimed.
        claimed: i32,
        /// Outcome of the push.
        delivery: DeliveryResult,
    },
    /// Reply from the master's own address.
    IgnoredMaster,
    /// No free number left.
    IgnoredFull,
}

impl ReplyOutcome {
    /// Whether the registry changed and listeners should hear about it.
    pub fn registry_changed(&self) -> bool {
        !matches!(self, ReplyOutcome::IgnoredMaster | ReplyOutcome::IgnoredFull)
    }

    /// Whether the registry gained an entry that must be persisted.
    pub fn registered(&self) -> bool {
        matches!(
            self,
            ReplyOutcome::Registered { .. } | ReplyOutcome::Reassigned { .. }
        )
    }
}

/// What a number swap pushed to the nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapOutcome {
    /// The registry change.
    pub swap: Swap,
    /// Push to the moved block, `None` for virtual blocks.
    pub moved_delivery: Option<DeliveryResult>,
    /// Push to the displaced block, `None` if there was none or it is virtual.
    pub displaced_delivery: Option<DeliveryResult>,
}

/// Broadcast a scan carrying the master's address.
pub fn scan<R: Radio>(registry: &BlockRegistry, radio: &mut R) -> DeliveryResult {
    radio.send(&MacAddress::BROADCAST, &Message::scan(registry.master().mac))
}

/// Apply a scan reply from `mac` claiming `claimed`.
pub fn handle_reply<R: Radio>(
    registry: &mut BlockRegistry,
    radio: &mut R,
    mac: MacAddress,
    claimed: i32,
) -> ReplyOutcome {
    if mac == registry.master().mac {
        return ReplyOutcome::IgnoredMaster;
    }

    if let Some(known) = registry.find_by_mac(&mac).copied() {
        if i32::from(known.number) == claimed {
            registry.set_status(known.number, BlockStatus::Working);
            return ReplyOutcome::Confirmed {
                number: known.number,
            };
        }
        let delivery = push_number(registry, radio, known.number);
        if delivery.is_delivered() {
            registry.set_status(known.number, BlockStatus::Working);
        }
        return ReplyOutcome::Corrected {
            number: known.number,
            claimed,
            delivery,
        };
    }

    let claim = u8::try_from(claimed)
        .ok()
        .filter(|&n| n > MASTER_NUMBER && n <= MAX_NUMBER && !registry.is_claimed(n));

    let number = match claim.or_else(|| registry.smallest_unclaimed_number()) {
        Some(number) => number,
        None => return ReplyOutcome::IgnoredFull,
    };

    // Peer registration failures show up as failed sends later on
    let _ = radio.add_peer(&mac);

    if registry
        .claim(Block::physical(mac, number, BlockStatus::Working))
        .is_err()
    {
        let _ = radio.remove_peer(&mac);
        return ReplyOutcome::IgnoredFull;
    }

    if claim.is_some() {
        return ReplyOutcome::Registered { number };
    }

    let delivery = push_number(registry, radio, number);
    ReplyOutcome::Reassigned {
        number,
        claimed,
        delivery,
    }
}

/// Push a block's current number to its node.
///
/// A failed push marks the block `Disconnected`. Returns `None` for the
/// master, virtual blocks and unknown numbers.
pub fn update_block_number<R: Radio>(
    registry: &mut BlockRegistry,
    radio: &mut R,
    number: u8,
) -> Option<DeliveryResult> {
    match registry.get(number) {
        Some(block) if block.is_remote() => Some(push_number(registry, radio, number)),
        _ => None,
    }
}

fn push_number<R: Radio>(registry: &mut BlockRegistry, radio: &mut R, number: u8) -> DeliveryResult {
    let Some(mac) = registry.get(number).map(|b| b.mac) else {
        return DeliveryResult::Failed;
    };
    let delivery = radio.send(&mac, &Message::block_update(number));
    if !delivery.is_delivered() {
        registry.set_status(number, BlockStatus::Disconnected);
    }
    delivery
}

/// Move block `from` to number `to`, swapping with any block already there,
/// and push the new numbers to both nodes.
///
/// The local numbers change even if a push fails; the failed node is marked
/// `Disconnected` until the next scan.
///
/// # Errors
///
/// - `RegistryError::MasterProtected` if either number is 1
/// - `RegistryError::BlockDisconnected` if `from` is disconnected
/// - `RegistryError::BlockNotFound` / `InvalidNumber` from the swap
pub fn set_block_number<R: Radio>(
    registry: &mut BlockRegistry,
    radio: &mut R,
    from: u8,
    to: u8,
) -> Result<SwapOutcome, Error> {
    if from == MASTER_NUMBER || to == MASTER_NUMBER {
        return Err(RegistryError::MasterProtected.into());
    }
    let block = registry.get(from).ok_or(RegistryError::BlockNotFound)?;
    if block.status == BlockStatus::Disconnected {
        return Err(RegistryError::BlockDisconnected(i32::from(from)).into());
    }

    let swap = registry.swap_numbers(from, to)?;
    let moved_delivery = update_block_number(registry, radio, swap.moved.number);
    let displaced_delivery = swap
        .displaced
        .and_then(|d| update_block_number(registry, radio, d.number));

    Ok(SwapOutcome {
        swap,
        moved_delivery,
        displaced_delivery,
    })
}

/// Release the peer of the block with this address, then remove it.
///
/// The registry is only touched once the peer is released, so a failed
/// release leaves the block registered.
///
/// # Errors
///
/// Returns `RegistryError::BlockNotFound` for an unknown address,
/// `RegistryError::MasterProtected` for the master and
/// `ProtocolError::PeerRegistration` when the radio keeps the peer.
pub fn clear_block<R: Radio>(
    registry: &mut BlockRegistry,
    radio: &mut R,
    mac: &MacAddress,
) -> Result<Block, Error> {
    let block = *registry.find_by_mac(mac).ok_or(RegistryError::BlockNotFound)?;
    if block.is_master() {
        return Err(RegistryError::MasterProtected.into());
    }
    if block.is_remote() {
        radio
            .remove_peer(&block.mac)
            .map_err(|_| Error::Protocol(ProtocolError::PeerRegistration))?;
    }
    Ok(registry.remove(block.number)?)
}

/// Remove every block except the master and release their peers.
///
/// Returns how many real blocks were removed.
pub fn clear_all<R: Radio>(registry: &mut BlockRegistry, radio: &mut R) -> usize {
    let removed = registry.clear_all();
    for block in removed.iter() {
        let _ = radio.remove_peer(&block.mac);
    }
    removed.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MessageType;

    #[derive(Default)]
    struct TestRadio {
        sent: std::vec::Vec<(MacAddress, Message)>,
        peers: std::vec::Vec<MacAddress>,
        fail: bool,
        keep_peers: bool,
    }

    impl Radio for TestRadio {
        fn send(&mut self, peer: &MacAddress, message: &Message) -> DeliveryResult {
            self.sent.push((*peer, *message));
            (!self.fail).into()
        }

        fn add_peer(&mut self, peer: &MacAddress) -> Result<(), ProtocolError> {
            self.peers.push(*peer);
            Ok(())
        }

        fn remove_peer(&mut self, peer: &MacAddress) -> Result<(), ProtocolError> {
            if self.keep_peers {
                return Err(ProtocolError::PeerRegistration);
            }
            self.peers.retain(|p| p != peer);
            Ok(())
        }
    }

    fn mac(last: u8) -> MacAddress {
        MacAddress::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, last])
    }

    fn master() -> MacAddress {
        MacAddress::new([0x24, 0x0A, 0xC4, 0x00, 0x00, 0x01])
    }

    #[test]
    fn test_scan_broadcasts_master_mac() {
        let registry = BlockRegistry::new(master());
        let mut radio = TestRadio::default();
        scan(&registry, &mut radio);
        let (peer, msg) = radio.sent[0];
        assert_eq!(peer, MacAddress::BROADCAST);
        assert_eq!(msg.kind, MessageType::Scan);
        assert_eq!(msg.mac, master());
    }

    #[test]
    fn test_new_node_keeps_free_claim() {
        let mut registry = BlockRegistry::new(master());
        let mut radio = TestRadio::default();
        let outcome = handle_reply(&mut registry, &mut radio, mac(1), 6);
        assert_eq!(outcome, ReplyOutcome::Registered { number: 6 });
        assert!(radio.sent.is_empty());
        assert_eq!(radio.peers, [mac(1)]);
        assert_eq!(registry.get(6).unwrap().status, BlockStatus::Working);
    }

    #[test]
    fn test_known_node_with_wrong_number_gets_stored_one() {
        let mut registry = BlockRegistry::new(master());
        let mut radio = TestRadio::default();
        handle_reply(&mut registry, &mut radio, mac(1), 4);

        radio.fail = true;
        let outcome = handle_reply(&mut registry, &mut radio, mac(1), 9);
        assert!(matches!(
            outcome,
            ReplyOutcome::Corrected { number: 4, delivery: DeliveryResult::Failed, .. }
        ));
        assert_eq!(radio.sent[0].1.number, 4);
        assert_eq!(registry.get(4).unwrap().status, BlockStatus::Disconnected);

        radio.fail = false;
        let outcome = handle_reply(&mut registry, &mut radio, mac(1), 4);
        assert_eq!(outcome, ReplyOutcome::Confirmed { number: 4 });
        assert_eq!(registry.get(4).unwrap().status, BlockStatus::Working);
    }

    #[test]
    fn test_master_reply_ignored() {
        let mut registry = BlockRegistry::new(master());
        let mut radio = TestRadio::default();
        assert_eq!(
            handle_reply(&mut registry, &mut radio, master(), 1),
            ReplyOutcome::IgnoredMaster
        );
    }

    #[test]
    fn test_full_registry_ignores_reply() {
        let mut registry = BlockRegistry::new(master());
        let mut radio = TestRadio::default();
        for n in 2..=14u8 {
            handle_reply(&mut registry, &mut radio, mac(n), i32::from(n));
        }
        let outcome = handle_reply(&mut registry, &mut radio, mac(99), 3);
        assert_eq!(outcome, ReplyOutcome::IgnoredFull);
        assert_eq!(registry.physical_count(), 14);
        assert!(!radio.peers.contains(&mac(99)));
    }

    #[test]
    fn test_clear_block_releases_peer() {
        let mut registry = BlockRegistry::new(master());
        let mut radio = TestRadio::default();
        handle_reply(&mut registry, &mut radio, mac(1), 3);
        let removed = clear_block(&mut registry, &mut radio, &mac(1)).unwrap();
        assert_eq!(removed.number, 3);
        assert!(radio.peers.is_empty());
        assert!(matches!(
            clear_block(&mut registry, &mut radio, &master()),
            Err(Error::Registry(RegistryError::MasterProtected))
        ));
    }

    #[test]
    fn test_clear_block_keeps_block_when_peer_stays() {
        let mut registry = BlockRegistry::new(master());
        let mut radio = TestRadio::default();
        handle_reply(&mut registry, &mut radio, mac(1), 3);
        radio.keep_peers = true;
        assert!(matches!(
            clear_block(&mut registry, &mut radio, &mac(1)),
            Err(Error::Protocol(ProtocolError::PeerRegistration))
        ));
        assert_eq!(registry.find_by_mac(&mac(1)).map(|b| b.number), Some(3));
        assert_eq!(registry.records().count(), 1);

        radio.keep_peers = false;
        assert_eq!(clear_block(&mut registry, &mut radio, &mac(1)).unwrap().number, 3);
        assert!(registry.find_by_mac(&mac(1)).is_none());
    }

    #[test]
    fn test_set_block_number_refuses_disconnected() {
        let mut registry = BlockRegistry::new(master());
        let mut radio = TestRadio::default();
        registry
            .add(Block::physical(mac(2), 2, BlockStatus::Disconnected))
            .unwrap();
        assert_eq!(
            set_block_number(&mut registry, &mut radio, 2, 5),
            Err(Error::Registry(RegistryError::BlockDisconnected(2)))
        );
    }
}
