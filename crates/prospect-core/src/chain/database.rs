//! Account-wide transaction registry.

use crate::persist::{DatabaseBlob, SerializationError};
use crate::types::{TxId, TxInfo};
use ahash::RandomState;
use std::collections::HashMap;
use tracing::trace;

/// What a [`TxDatabase::update`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The transaction was unknown; it now holds the given index.
    Inserted(u32),
    /// The transaction was known and its record changed in place
    /// (typically a block-context overwrite). The index is unchanged.
    Updated(u32),
    /// The transaction was known and the record is identical.
    Unchanged(u32),
}

impl UpdateOutcome {
    /// The record's internal index, whatever happened.
    #[must_use]
    pub fn index(self) -> u32 {
        match self {
            Self::Inserted(i) | Self::Updated(i) | Self::Unchanged(i) => i,
        }
    }

    /// Whether the stored state differs from before the call.
    #[must_use]
    pub fn changed(self) -> bool {
        !matches!(self, Self::Unchanged(_))
    }
}

/// Content-addressed transaction store with dense internal indices.
///
/// One database serves a whole account; both of its chains reference records
/// here by index. Indices are stable within a process lifetime but **not**
/// across [`restore`](Self::restore), which reassigns them by blob order.
/// That is why history and database blobs must be restored together.
#[derive(Debug, Default)]
pub struct TxDatabase {
    infos: Vec<TxInfo>,
    index_by_id: HashMap<TxId, u32, RandomState>,
}

impl TxDatabase {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record, or overwrites the existing one in place.
    ///
    /// Block context follows last-write-wins: a later notification for the
    /// same id replaces whatever context was stored, including replacing a
    /// mined context with `None` if the backend says so.
    pub fn update(&mut self, info: TxInfo) -> UpdateOutcome {
        if let Some(&index) = self.index_by_id.get(&info.id) {
            let slot = &mut self.infos[index as usize];
            if *slot == info {
                return UpdateOutcome::Unchanged(index);
            }
            trace!(id = %info.id, index, "transaction record overwritten");
            *slot = info;
            return UpdateOutcome::Updated(index);
        }

        let index = self.infos.len() as u32;
        self.index_by_id.insert(info.id.clone(), index);
        trace!(id = %info.id, index, "transaction record inserted");
        self.infos.push(info);
        UpdateOutcome::Inserted(index)
    }

    #[must_use]
    pub fn index_of(&self, id: &TxId) -> Option<u32> {
        self.index_by_id.get(id).copied()
    }

    #[must_use]
    pub fn info_of(&self, index: u32) -> Option<&TxInfo> {
        self.infos.get(index as usize)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Serialises the registry as the per-account `database` blob.
    ///
    /// Position in the list is the internal index.
    #[must_use]
    pub fn store(&self) -> DatabaseBlob {
        self.infos.clone()
    }

    /// Rebuilds a registry from a blob, reassigning indices by position.
    ///
    /// # Errors
    ///
    /// Rejects blobs listing the same transaction id twice.
    pub fn restore(blob: DatabaseBlob) -> Result<Self, SerializationError> {
        let mut database = Self::default();
        for info in blob {
            if database.index_by_id.contains_key(&info.id) {
                return Err(SerializationError::DuplicateTxId(info.id.to_string()));
            }
            database.update(info);
        }
        Ok(database)
    }
}
