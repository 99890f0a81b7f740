//! Scripted blockchain backend.

use async_trait::async_trait;
use parking_lot::Mutex;
use prospect_core::backend::{BackendError, BlockIndex, Blockchain};
use prospect_core::types::{Address, BlockHash, TxMatch};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

/// In-process [`Blockchain`] with scripted fixtures.
///
/// Historical transactions are registered up front with
/// [`add_transaction`](Self::add_transaction); `lookup_txs` returns the ones
/// touching a requested address whose block height falls inside the queried
/// window (unconfirmed fixtures always match). Live notifications are pushed
/// through [`send_live`](Self::send_live) and the stream is ended with
/// [`close_stream`](Self::close_stream).
pub struct MockBlockchain {
    tip: BlockIndex,
    blocks: Mutex<HashMap<BlockHash, u32>>,
    fixtures: Mutex<Vec<TxMatch>>,
    fail_lookup_call: Mutex<Option<usize>>,
    lookup_calls: AtomicUsize,
    subscribed: Mutex<Vec<Address>>,
    senders: Mutex<Vec<mpsc::UnboundedSender<TxMatch>>>,
}

impl MockBlockchain {
    /// Creates a backend whose best block is `block-<tip_height>`.
    pub fn new(tip_height: u32) -> Self {
        let tip_hash = BlockHash::new(format!("block-{tip_height}"));
        let mut blocks = HashMap::new();
        blocks.insert(tip_hash.clone(), tip_height);
        Self {
            tip: BlockIndex { height: tip_height, hash: tip_hash },
            blocks: Mutex::new(blocks),
            fixtures: Mutex::new(Vec::new()),
            fail_lookup_call: Mutex::new(None),
            lookup_calls: AtomicUsize::new(0),
            subscribed: Mutex::new(Vec::new()),
            senders: Mutex::new(Vec::new()),
        }
    }

    /// Registers a historical transaction. Its block, if any, becomes
    /// resolvable through `lookup_block_index`.
    pub fn add_transaction(&self, tx_match: TxMatch) {
        if let Some(block) = &tx_match.info.block {
            self.blocks.lock().insert(block.hash.clone(), block.height);
        }
        self.fixtures.lock().push(tx_match);
    }

    /// Makes the n-th `lookup_txs` call (1-based) fail.
    pub fn fail_lookup_on_call(&self, call: usize) {
        *self.fail_lookup_call.lock() = Some(call);
    }

    /// Pushes a live notification to every open stream; returns how many
    /// receivers it reached.
    pub fn send_live(&self, tx_match: TxMatch) -> usize {
        let senders = self.senders.lock();
        let mut reached = 0;
        for sender in senders.iter() {
            if sender.send(tx_match.clone()).is_ok() {
                reached += 1;
            }
        }
        reached
    }

    /// Ends every open notification stream.
    pub fn close_stream(&self) {
        self.senders.lock().clear();
    }

    /// Addresses subscribed so far, in subscription order.
    pub fn subscribed(&self) -> Vec<Address> {
        self.subscribed.lock().clone()
    }

    /// Number of `lookup_txs` calls made.
    pub fn lookup_count(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Blockchain for MockBlockchain {
    async fn lookup_best_block_hash(&self) -> Result<BlockHash, BackendError> {
        Ok(self.tip.hash.clone())
    }

    async fn lookup_block_index(&self, hash: &BlockHash) -> Result<BlockIndex, BackendError> {
        match self.blocks.lock().get(hash) {
            Some(&height) => Ok(BlockIndex { height, hash: hash.clone() }),
            None => Err(BackendError::InvalidResponse(format!("unknown block {hash}"))),
        }
    }

    async fn lookup_txs(
        &self,
        addresses: &[Address],
        until_height: u32,
        since_height: u32,
    ) -> Result<Vec<TxMatch>, BackendError> {
        let call = self.lookup_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if *self.fail_lookup_call.lock() == Some(call) {
            return Err(BackendError::Network("scripted outage".into()));
        }

        Ok(self
            .fixtures
            .lock()
            .iter()
            .filter(|m| {
                let in_window = match &m.info.block {
                    Some(block) => (since_height..=until_height).contains(&block.height),
                    None => true,
                };
                in_window && m.addresses.iter().any(|a| addresses.contains(a))
            })
            .cloned()
            .collect())
    }

    async fn subscribe(&self, addresses: &[Address]) -> Result<(), BackendError> {
        self.subscribed.lock().extend_from_slice(addresses);
        Ok(())
    }

    fn transaction_stream(&self) -> mpsc::UnboundedReceiver<TxMatch> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.lock().push(tx);
        rx
    }
}
