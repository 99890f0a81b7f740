//! The blockchain backend boundary.
//!
//! The engine consumes a backend purely through the [`Blockchain`] trait:
//! block-index lookups to resolve the scan window, batched transaction
//! lookups over address sets, and a fire-and-forget live subscription whose
//! matches arrive on the stream returned by
//! [`transaction_stream`](Blockchain::transaction_stream). Transport, retry
//! and timeout policy all live behind the implementation.

use crate::types::{Address, BlockHash, TxMatch};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from backend calls. Any of these is fatal to the discovery that
/// issued the call; retry policy belongs to the caller wrapping the backend.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BackendError {
    /// The backend could not be reached or the call failed in transit.
    #[error("backend network error: {0}")]
    Network(String),

    /// The backend answered with something the implementation could not use.
    #[error("invalid backend response: {0}")]
    InvalidResponse(String),

    /// The live subscription could not be established.
    #[error("backend subscription failed: {0}")]
    Subscription(String),
}

/// A block's position in the chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockIndex {
    pub height: u32,
    pub hash: BlockHash,
}

/// Consumed interface of the blockchain backend.
#[async_trait]
pub trait Blockchain: Send + Sync {
    /// Hash of the current best block.
    async fn lookup_best_block_hash(&self) -> Result<BlockHash, BackendError>;

    /// Position of the block with the given hash.
    async fn lookup_block_index(&self, hash: &BlockHash) -> Result<BlockIndex, BackendError>;

    /// Every transaction in the inclusive height window
    /// `[since_height, until_height]` touching any of the given addresses.
    /// Unconfirmed transactions are always in the window.
    async fn lookup_txs(
        &self,
        addresses: &[Address],
        until_height: u32,
        since_height: u32,
    ) -> Result<Vec<TxMatch>, BackendError>;

    /// Adds addresses to the live subscription. Fire and forget: matches
    /// surface later on the transaction stream.
    async fn subscribe(&self, addresses: &[Address]) -> Result<(), BackendError>;

    /// A fresh receiver of live transaction notifications. The stream ends
    /// when the backend connection goes away.
    fn transaction_stream(&self) -> mpsc::UnboundedReceiver<TxMatch>;
}
