//! Dense index ↔ address bimap.

use crate::types::Address;
use ahash::RandomState;
use std::collections::HashMap;

/// Two-way mapping between dense indices and addresses, O(1) both ways.
///
/// Indices are issued by insertion order, starting at 0. The forward side is
/// the source of truth; the reverse side is derived and always consistent.
#[derive(Debug, Default)]
pub struct Bimap {
    forward: Vec<Address>,
    reverse: HashMap<Address, u32, RandomState>,
}

impl Bimap {
    /// Appends an address, returning its index.
    ///
    /// Re-inserting a known address returns its existing index unchanged;
    /// the derivation bijection guarantees this does not happen for distinct
    /// indices.
    pub fn insert(&mut self, address: Address) -> u32 {
        if let Some(&index) = self.reverse.get(&address) {
            return index;
        }
        let index = self.forward.len() as u32;
        self.forward.push(address.clone());
        self.reverse.insert(address, index);
        index
    }

    #[must_use]
    pub fn index_of(&self, address: &Address) -> Option<u32> {
        self.reverse.get(address).copied()
    }

    #[must_use]
    pub fn address_at(&self, index: u32) -> Option<&Address> {
        self.forward.get(index as usize)
    }

    /// Number of entries; also the next index to be issued.
    #[must_use]
    pub fn len(&self) -> u32 {
        self.forward.len() as u32
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Iterates addresses in index order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Address)> {
        self.forward.iter().enumerate().map(|(i, a)| (i as u32, a))
    }
}
