//! Persisted state formats.
//!
//! A discovery session persists as three blobs, restored together:
//!
//! - **database** (per account): the ordered list of transaction records.
//!   Position in the list *is* the internal index, so
//!   [`HistoryBlob`] entries referencing those indices are only meaningful
//!   against the database blob they were stored with.
//! - **history** (per chain): per-address-index lists of database indices,
//!   positionally encoded with `null` gaps for unused indices, plus the
//!   `until_block` checkpoint.
//! - **source** (per chain): the exact-range address cache. The prefetch
//!   slot is transient and never persisted.
//!
//! Restore is strict: blobs that disagree (an index past the end of the
//! database, a malformed range key) fail with [`SerializationError`], and the
//! caller's recovery is to discard the blobs and scan cold.

use crate::types::{Address, BlockHash, TxInfo};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Per-account database blob: `TxInfo` records ordered by internal index.
pub type DatabaseBlob = Vec<TxInfo>;

/// Per-chain history blob.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryBlob {
    /// Most recent block hash incorporated by the scan, if any.
    pub until_block: Option<BlockHash>,
    /// Positional array indexed by address index; `None` marks an address
    /// with no history between used ones. Values are database indices in
    /// observation order.
    pub list: Vec<Option<Vec<u32>>>,
}

/// Per-chain source blob: the exact-range address cache keyed `"<f>-<l>"`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceBlob {
    pub cache: BTreeMap<String, Vec<Address>>,
}

/// Everything one chain persists (the account database travels separately).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub history: HistoryBlob,
    pub source: SourceBlob,
}

/// Errors raised while restoring persisted blobs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SerializationError {
    /// A history entry references a database index that does not exist.
    #[error("history references database index {index}, but the database holds {len} records")]
    IndexOutOfRange { index: u32, len: usize },

    /// The database blob lists the same transaction id twice.
    #[error("duplicate transaction id in database blob: {0}")]
    DuplicateTxId(String),

    /// A source cache key does not have the `"<first>-<last>"` shape.
    #[error("malformed cache range key: {0:?}")]
    MalformedRangeKey(String),

    /// A cached range's address count does not match its key.
    #[error("cache entry {key:?} holds {actual} addresses, expected {expected}")]
    RangeLengthMismatch { key: String, expected: usize, actual: usize },
}

/// Parses a `"<first>-<last>"` cache key.
pub(crate) fn parse_range_key(key: &str) -> Result<(u32, u32), SerializationError> {
    let malformed = || SerializationError::MalformedRangeKey(key.to_string());
    let (first, last) = key.split_once('-').ok_or_else(malformed)?;
    let first: u32 = first.parse().map_err(|_| malformed())?;
    let last: u32 = last.parse().map_err(|_| malformed())?;
    if last < first {
        return Err(malformed());
    }
    Ok((first, last))
}

/// Formats a range as its cache key.
pub(crate) fn format_range_key(first: u32, last: u32) -> String {
    format!("{first}-{last}")
}
