//! Chain-side indexed state.
//!
//! Three structures hold what discovery learns, and their invariants stay
//! aligned through the single writer that owns them
//! ([`ChainDiscovery`](crate::discovery::ChainDiscovery)):
//!
//! - [`Chain`]: the derived prefix, every address materialised so far and
//!   its two-way index mapping.
//! - [`TxDatabase`]: the account-wide transaction registry, content
//!   addressed by transaction id, densely indexed.
//! - [`ChainHistory`]: the used prefix, which address indices have history,
//!   as lists of database indices in observation order.
//!
//! `Chain.next_index()` (derived) minus `ChainHistory.next_index()` (used) is
//! the **gap** that the BIP44 termination rule watches.

mod bimap;
mod database;
mod history;

pub use bimap::Bimap;
pub use database::{TxDatabase, UpdateOutcome};
pub use history::ChainHistory;

use crate::source::{AddressSource, CachingSource, DerivationError};
use crate::types::Address;
use tracing::debug;

/// The derived address sequence of one HD chain.
///
/// Owns the derivation pipeline's outer end and the frozen
/// index ↔ address mapping. Addresses are derived in fixed-size chunks;
/// after `k` successful chunks, `next_index() == k * chunk_size` and the
/// bimap holds exactly that many entries.
pub struct Chain {
    source: CachingSource,
    addresses: Bimap,
    chunk_size: u32,
}

impl Chain {
    /// Creates an empty chain over a derivation source.
    #[must_use]
    pub fn new(source: CachingSource, chunk_size: u32) -> Self {
        debug_assert!(chunk_size > 0);
        Self { source, addresses: Bimap::default(), chunk_size }
    }

    /// Index of a derived address, if this chain derived it.
    #[must_use]
    pub fn index_of(&self, address: &Address) -> Option<u32> {
        self.addresses.index_of(address)
    }

    /// Address at a derived index.
    #[must_use]
    pub fn address_of(&self, index: u32) -> Option<&Address> {
        self.addresses.address_at(index)
    }

    /// First index that has not been derived yet.
    #[must_use]
    pub fn next_index(&self) -> u32 {
        self.addresses.len()
    }

    #[must_use]
    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// The memoising source, for persistence access.
    #[must_use]
    pub fn source(&self) -> &CachingSource {
        &self.source
    }

    /// Derives the next chunk and freezes it into the index.
    ///
    /// Returns the newly derived addresses, in index order. Calls must not
    /// overlap for one chain; the discovery loop chains them.
    pub async fn next_chunk(&mut self) -> Result<Vec<Address>, DerivationError> {
        let first = self.next_index();
        let last = first + self.chunk_size - 1;
        let chunk = self.source.derive_range(first, last).await?;

        for address in &chunk {
            self.addresses.insert(address.clone());
        }
        debug!(first, last, next_index = self.next_index(), "chain chunk installed");
        Ok(chunk)
    }
}
