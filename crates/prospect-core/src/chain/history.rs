//! Per-chain transaction timeline.

use crate::chain::TxDatabase;
use crate::persist::{HistoryBlob, SerializationError};
use crate::types::{BlockHash, TxInfo};
use tracing::trace;

/// Which transactions touch each used address index, in observation order.
///
/// Entries hold [`TxDatabase`] indices, not records: block-context updates
/// applied to the database are visible here on the next read, with no aliased
/// copies to keep in sync. The database is passed in at read time; its
/// lifetime is managed by the discovery engine that owns both.
///
/// `next_index()` is the highest used address index plus one: the *used*
/// prefix, as opposed to [`Chain::next_index`](crate::chain::Chain::next_index),
/// the *derived* prefix. The difference between the two is the gap the BIP44
/// termination rule watches.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChainHistory {
    /// Positional by address index; `None` marks an unused index below a
    /// used one. The last entry, if any, is always `Some`.
    entries: Vec<Option<Vec<u32>>>,
    until_block: Option<BlockHash>,
}

impl ChainHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest used address index plus one; 0 when nothing is used.
    #[must_use]
    pub fn next_index(&self) -> u32 {
        self.entries.len() as u32
    }

    /// Whether any transaction touches the given address index.
    #[must_use]
    pub fn is_used(&self, address_index: u32) -> bool {
        matches!(self.entries.get(address_index as usize), Some(Some(_)))
    }

    /// Records that the transaction at `db_index` touches `address_index`.
    ///
    /// Appends in observation order; re-recording a known pair is a no-op.
    /// Returns whether the entry was new.
    pub fn record(&mut self, address_index: u32, db_index: u32) -> bool {
        let slot = address_index as usize;
        if slot >= self.entries.len() {
            self.entries.resize(slot + 1, None);
        }
        let list = self.entries[slot].get_or_insert_with(Vec::new);
        if list.contains(&db_index) {
            return false;
        }
        list.push(db_index);
        trace!(address_index, db_index, "history entry recorded");
        true
    }

    /// Most recent block hash incorporated by the scan.
    #[must_use]
    pub fn until_block(&self) -> Option<&BlockHash> {
        self.until_block.as_ref()
    }

    pub fn set_until_block(&mut self, hash: BlockHash) {
        self.until_block = Some(hash);
    }

    /// The transactions touching one address index, dereferenced through the
    /// database, in observation order.
    #[must_use]
    pub fn transactions_for<'db>(
        &self,
        address_index: u32,
        database: &'db TxDatabase,
    ) -> Vec<&'db TxInfo> {
        match self.entries.get(address_index as usize) {
            Some(Some(list)) => {
                list.iter().filter_map(|&index| database.info_of(index)).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Iterates `(address_index, database indices)` over used indices only.
    pub fn iter_used(&self) -> impl Iterator<Item = (u32, &[u32])> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| entry.as_deref().map(|list| (i as u32, list)))
    }

    /// Serialises the timeline as the per-chain `history` blob.
    #[must_use]
    pub fn store(&self) -> HistoryBlob {
        HistoryBlob { until_block: self.until_block.clone(), list: self.entries.clone() }
    }

    /// Rebuilds a timeline from a blob, validating it against the database
    /// it was stored with.
    ///
    /// # Errors
    ///
    /// Rejects blobs referencing database indices that do not exist.
    pub fn restore(blob: &HistoryBlob, database: &TxDatabase) -> Result<Self, SerializationError> {
        let len = database.len();
        for entry in blob.list.iter().flatten() {
            for &index in entry {
                if index as usize >= len {
                    return Err(SerializationError::IndexOutOfRange { index, len });
                }
            }
        }

        let mut entries = blob.list.clone();
        // Normalise away trailing gaps so next_index() lands on a used index.
        while matches!(entries.last(), Some(None)) {
            entries.pop();
        }
        Ok(Self { entries, until_block: blob.until_block.clone() })
    }
}
