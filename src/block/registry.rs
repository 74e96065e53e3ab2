//! Ordered registry of blocks.

use heapless::Vec;

use super::block::{Block, BlockStatus, MASTER_NUMBER, MAX_NUMBER};
use super::colour::Colour;
use super::mac::MacAddress;
use super::record::BlockRecord;
use crate::error::RegistryError;

/// Maximum number of entries, master and placeholders included.
pub const MAX_BLOCKS: usize = MAX_NUMBER as usize;

/// Outcome of a number swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swap {
    /// Block that moved to the requested number.
    pub moved: Block,
    /// Block that previously held the requested number, now at the old one.
    pub displaced: Option<Block>,
}

/// Registry of every known block, kept sorted by number.
///
/// Numbers are unique across all entries and the master always holds
/// number 1.
#[derive(Debug, Clone)]
pub struct BlockRegistry {
    blocks: Vec<Block, MAX_BLOCKS>,
}

impl BlockRegistry {
    /// Create a registry holding only the master.
    pub fn new(master_mac: MacAddress) -> Self {
        let mut blocks = Vec::new();
        let _ = blocks.push(Block::master(master_mac));
        Self { blocks }
    }

    /// The master block.
    pub fn master(&self) -> &Block {
        // Index 0 always holds the master since it has the lowest number
        &self.blocks[0]
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the registry is empty. Never true once created.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Entries in number order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    /// Entries as a slice, in number order.
    #[inline]
    pub fn as_slice(&self) -> &[Block] {
        &self.blocks
    }

    /// Look up a block by number.
    pub fn get(&self, number: u8) -> Option<&Block> {
        self.blocks.iter().find(|b| b.number == number)
    }

    /// Look up a block by hardware address.
    pub fn find_by_mac(&self, mac: &MacAddress) -> Option<&Block> {
        self.blocks.iter().find(|b| b.mac == *mac)
    }

    fn get_mut(&mut self, number: u8) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.number == number)
    }

    /// Entries that are not virtual placeholders.
    pub fn physical_count(&self) -> usize {
        self.blocks.iter().filter(|b| !b.is_virtual()).count()
    }

    /// Whether a real block holds `number`.
    pub fn is_claimed(&self, number: u8) -> bool {
        self.get(number).is_some_and(|b| !b.is_virtual())
    }

    /// Smallest number in 2-14 not held by any entry.
    pub fn smallest_free_number(&self) -> Option<u8> {
        (MASTER_NUMBER + 1..=MAX_NUMBER).find(|&n| self.get(n).is_none())
    }

    /// Smallest number in 2-14 not held by a real block.
    ///
    /// Numbers held by virtual placeholders count as free.
    pub fn smallest_unclaimed_number(&self) -> Option<u8> {
        (MASTER_NUMBER + 1..=MAX_NUMBER).find(|&n| !self.is_claimed(n))
    }

    /// Add a block.
    ///
    /// # Errors
    ///
    /// - `RegistryError::InvalidNumber` outside 1-14
    /// - `RegistryError::DuplicateNumber` if the number is taken
    /// - `RegistryError::RegistryFull` if there is no room left
    pub fn add(&mut self, block: Block) -> Result<(), RegistryError> {
        if block.number < MASTER_NUMBER || block.number > MAX_NUMBER {
            return Err(RegistryError::InvalidNumber(i32::from(block.number)));
        }
        if self.get(block.number).is_some() {
            return Err(RegistryError::DuplicateNumber(i32::from(block.number)));
        }
        self.blocks
            .push(block)
            .map_err(|_| RegistryError::RegistryFull)?;
        self.sort();
        Ok(())
    }

    /// Add a real block, replacing a virtual placeholder holding its number.
    ///
    /// # Errors
    ///
    /// Same as [`add`](Self::add) when the number is held by a real block.
    pub fn claim(&mut self, block: Block) -> Result<(), RegistryError> {
        if self.get(block.number).is_some_and(|b| b.is_virtual()) {
            self.blocks.retain(|b| b.number != block.number);
        }
        self.add(block)
    }

    /// Remove a block.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::MasterProtected` for number 1 and
    /// `RegistryError::BlockNotFound` if nothing holds the number.
    pub fn remove(&mut self, number: u8) -> Result<Block, RegistryError> {
        if number == MASTER_NUMBER {
            return Err(RegistryError::MasterProtected);
        }
        let index = self
            .blocks
            .iter()
            .position(|b| b.number == number)
            .ok_or(RegistryError::BlockNotFound)?;
        Ok(self.blocks.remove(index))
    }

    /// Remove every block except the master.
    ///
    /// Returns the removed real blocks so their peers can be released.
    pub fn clear_all(&mut self) -> Vec<Block, MAX_BLOCKS> {
        let mut removed = Vec::new();
        for block in self.blocks.iter().filter(|b| !b.is_master() && !b.is_virtual()) {
            let _ = removed.push(*block);
        }
        self.blocks.retain(|b| b.is_master());
        removed
    }

    /// Move block `from` to number `to`.
    ///
    /// A block already at `to` takes `from` in exchange. Virtual blocks
    /// follow their number with a rewritten placeholder address. The local
    /// numbers change immediately; pushing them to the nodes is the
    /// caller's job.
    ///
    /// # Errors
    ///
    /// - `RegistryError::MasterProtected` if either number is 1
    /// - `RegistryError::InvalidNumber` if `to` is outside 2-14
    /// - `RegistryError::BlockNotFound` if nothing holds `from`
    pub fn swap_numbers(&mut self, from: u8, to: u8) -> Result<Swap, RegistryError> {
        if from == MASTER_NUMBER || to == MASTER_NUMBER {
            return Err(RegistryError::MasterProtected);
        }
        if to > MAX_NUMBER || to < MASTER_NUMBER {
            return Err(RegistryError::InvalidNumber(i32::from(to)));
        }
        let from_index = self
            .blocks
            .iter()
            .position(|b| b.number == from)
            .ok_or(RegistryError::BlockNotFound)?;
        let to_index = if from == to {
            None
        } else {
            self.blocks.iter().position(|b| b.number == to)
        };

        if let Some(index) = to_index {
            renumber(&mut self.blocks[index], from);
        }
        renumber(&mut self.blocks[from_index], to);
        let moved = self.blocks[from_index];
        let displaced = to_index.map(|index| self.blocks[index]);

        self.sort();
        Ok(Swap { moved, displaced })
    }

    /// Set the status of a block.
    pub fn set_status(&mut self, number: u8, status: BlockStatus) -> bool {
        match self.get_mut(number) {
            Some(block) => {
                block.status = status;
                true
            }
            None => false,
        }
    }

    /// Set the status of the block with this address.
    pub fn set_status_by_mac(&mut self, mac: &MacAddress, status: BlockStatus) -> bool {
        match self.blocks.iter_mut().find(|b| b.mac == *mac) {
            Some(block) => {
                block.status = status;
                true
            }
            None => false,
        }
    }

    /// Record the colour a block was commanded to show.
    pub fn set_colour(&mut self, number: u8, colour: Colour) -> bool {
        match self.get_mut(number) {
            Some(block) => {
                block.colour = colour;
                true
            }
            None => false,
        }
    }

    /// Add or remove virtual placeholders for every free number in 2-14.
    ///
    /// Returns whether anything changed.
    pub fn set_virtual_placeholders(&mut self, show: bool) -> bool {
        let before = self.blocks.len();
        if show {
            for number in MASTER_NUMBER + 1..=MAX_NUMBER {
                if self.get(number).is_none() {
                    let _ = self.blocks.push(Block::placeholder(number));
                }
            }
            self.sort();
        } else {
            self.blocks.retain(|b| !b.is_virtual());
        }
        self.blocks.len() != before
    }

    /// Populate the registry from persisted records.
    ///
    /// Placeholder addresses, the master number, duplicates and anything past
    /// 14 records are skipped. Restored blocks start `Disconnected` until they
    /// answer a scan. Returns how many were added.
    pub fn restore_from_records(&mut self, records: &[BlockRecord]) -> usize {
        let mut added = 0;
        for record in records.iter().take(MAX_BLOCKS) {
            if record.mac.is_virtual()
                || record.number == MASTER_NUMBER
                || self.find_by_mac(&record.mac).is_some()
            {
                continue;
            }
            let block = Block::physical(record.mac, record.number, BlockStatus::Disconnected);
            if self.claim(block).is_ok() {
                added += 1;
            }
        }
        added
    }

    /// Records to persist: every real block except the master.
    pub fn records(&self) -> impl Iterator<Item = BlockRecord> + '_ {
        self.blocks
            .iter()
            .filter(|b| b.is_remote())
            .map(|b| BlockRecord {
                mac: b.mac,
                number: b.number,
            })
    }

    fn sort(&mut self) {
        // Numbers are unique so stability does not matter
        self.blocks.sort_unstable_by_key(|b| b.number);
    }
}

fn renumber(block: &mut Block, number: u8) {
    block.number = number;
    if block.is_virtual() {
        block.mac = MacAddress::virtual_for(number);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mac(last: u8) -> MacAddress {
        MacAddress::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, last])
    }

    fn registry_with(numbers: &[u8]) -> BlockRegistry {
        let mut registry = BlockRegistry::new(mac(0xF0));
        for &n in numbers {
            registry
                .add(Block::physical(mac(n), n, BlockStatus::Working))
                .unwrap();
        }
        registry
    }

    #[test]
    fn test_new_has_master() {
        let registry = BlockRegistry::new(mac(0xF0));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.master().number, 1);
        assert_eq!(registry.master().status, BlockStatus::Master);
    }

    #[test]
    fn test_add_keeps_sorted() {
        let registry = registry_with(&[5, 2, 9]);
        let numbers: std::vec::Vec<u8> = registry.iter().map(|b| b.number).collect();
        assert_eq!(numbers, [1, 2, 5, 9]);
    }

    #[test]
    fn test_add_rejects_duplicate_and_invalid() {
        let mut registry = registry_with(&[3]);
        assert_eq!(
            registry.add(Block::physical(mac(9), 3, BlockStatus::Working)),
            Err(RegistryError::DuplicateNumber(3))
        );
        assert_eq!(
            registry.add(Block::physical(mac(9), 15, BlockStatus::Working)),
            Err(RegistryError::InvalidNumber(15))
        );
    }

    #[test]
    fn test_swap_with_existing() {
        let mut registry = registry_with(&[2, 5]);
        let swap = registry.swap_numbers(2, 5).unwrap();
        assert_eq!(swap.moved.mac, mac(2));
        assert_eq!(swap.moved.number, 5);
        assert_eq!(swap.displaced.unwrap().mac, mac(5));
        assert_eq!(registry.get(2).unwrap().mac, mac(5));
        assert_eq!(registry.get(5).unwrap().mac, mac(2));
    }

    #[test]
    fn test_swap_to_free_number() {
        let mut registry = registry_with(&[2]);
        let swap = registry.swap_numbers(2, 7).unwrap();
        assert!(swap.displaced.is_none());
        assert!(registry.get(2).is_none());
        assert_eq!(registry.get(7).unwrap().mac, mac(2));
    }

    #[test]
    fn test_swap_rewrites_virtual_mac() {
        let mut registry = registry_with(&[2]);
        registry.set_virtual_placeholders(true);
        registry.swap_numbers(2, 4).unwrap();
        let placeholder = registry.get(2).unwrap();
        assert!(placeholder.is_virtual());
        assert_eq!(placeholder.mac, MacAddress::virtual_for(2));
    }

    #[test]
    fn test_master_protected() {
        let mut registry = registry_with(&[2]);
        assert_eq!(registry.remove(1), Err(RegistryError::MasterProtected));
        assert_eq!(registry.swap_numbers(2, 1), Err(RegistryError::MasterProtected));
    }

    #[test]
    fn test_placeholders_fill_and_clear() {
        let mut registry = registry_with(&[3]);
        assert!(registry.set_virtual_placeholders(true));
        assert_eq!(registry.len(), 14);
        assert_eq!(registry.physical_count(), 2);
        assert_eq!(registry.smallest_free_number(), None);
        assert_eq!(registry.smallest_unclaimed_number(), Some(2));

        assert!(registry.set_virtual_placeholders(false));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_claim_replaces_placeholder() {
        let mut registry = registry_with(&[]);
        registry.set_virtual_placeholders(true);
        registry
            .claim(Block::physical(mac(6), 6, BlockStatus::Working))
            .unwrap();
        assert_eq!(registry.get(6).unwrap().mac, mac(6));
        assert_eq!(registry.len(), 14);
    }

    #[test]
    fn test_restore_skips_virtual_and_marks_disconnected() {
        let mut registry = BlockRegistry::new(mac(0xF0));
        let records = [
            BlockRecord { mac: mac(2), number: 2 },
            BlockRecord { mac: MacAddress::virtual_for(3), number: 3 },
            BlockRecord { mac: mac(4), number: 4 },
        ];
        assert_eq!(registry.restore_from_records(&records), 2);
        assert_eq!(registry.get(2).unwrap().status, BlockStatus::Disconnected);
        assert!(registry.get(3).is_none());
    }

    #[test]
    fn test_clear_all_keeps_master() {
        let mut registry = registry_with(&[2, 3]);
        registry.set_virtual_placeholders(true);
        let removed = registry.clear_all();
        assert_eq!(removed.len(), 2);
        assert_eq!(registry.len(), 1);
        assert!(registry.master().is_master());
    }

    #[test]
    fn test_master_survives_status_changes() {
        let mut registry = registry_with(&[2]);
        assert!(registry.set_status_by_mac(&mac(0xF0), BlockStatus::Blinking));
        assert!(registry.master().is_master());
        assert_eq!(registry.records().count(), 1);

        registry.set_status(1, BlockStatus::Working);
        let removed = registry.clear_all();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].number, 2);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.master().mac, mac(0xF0));
        assert_eq!(registry.records().count(), 0);
    }
}
