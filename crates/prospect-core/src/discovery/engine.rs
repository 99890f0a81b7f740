//! The discovery state machine.

use crate::backend::Blockchain;
use crate::chain::{Chain, ChainHistory, TxDatabase};
use crate::discovery::{DiscoveryError, DiscoveryEvent, DiscoveryState};
use crate::persist::ChainSnapshot;
use crate::types::TxMatch;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Resolved scan window: the inclusive height range every chunk lookup uses.
struct ScanWindow {
    since_height: u32,
    until_height: u32,
}

/// Discovers the transaction history of one HD chain.
///
/// Owns the chain's derived state ([`Chain`]) and used state
/// ([`ChainHistory`]); shares the account's [`TxDatabase`] and the backend by
/// reference. One engine serves one chain; an account runs two, one for the
/// external chain and one for change, over the same database.
///
/// # Lifecycle
///
/// [`run`](Self::run) resolves the scan window, subscribes to live
/// notifications, then alternates chunk derivation with history lookups
/// until the trailing gap of unused addresses reaches the configured length.
/// At that point it emits [`DiscoveryEvent::History`] and goes live,
/// re-entering the scan whenever a live notification shrinks the gap below
/// the limit. Any failure emits [`DiscoveryEvent::Error`] and parks the
/// engine in [`DiscoveryState::Failed`].
///
/// # Concurrency
///
/// The engine is single-task: all state advances inside `run`. Chunk
/// derivations never overlap for one chain, which is what keeps the chain's
/// index dense and the worker channel's FIFO usage safe.
pub struct ChainDiscovery {
    chain: Chain,
    history: ChainHistory,
    database: Arc<RwLock<TxDatabase>>,
    backend: Arc<dyn Blockchain>,
    events: mpsc::UnboundedSender<DiscoveryEvent>,
    state: DiscoveryState,
    gap_length: u32,
}

impl ChainDiscovery {
    /// Creates an engine and the receiving end of its event stream.
    ///
    /// Pass a restored [`ChainHistory`] (and a chain whose source cache was
    /// restored) to resume incrementally; the engine then scans only the
    /// window past the history's `until_block` checkpoint.
    #[must_use]
    pub fn new(
        chain: Chain,
        history: ChainHistory,
        database: Arc<RwLock<TxDatabase>>,
        backend: Arc<dyn Blockchain>,
        gap_length: u32,
    ) -> (Self, mpsc::UnboundedReceiver<DiscoveryEvent>) {
        debug_assert!(gap_length > 0);
        let (events, events_rx) = mpsc::unbounded_channel();
        let engine = Self {
            chain,
            history,
            database,
            backend,
            events,
            state: DiscoveryState::Idle,
            gap_length,
        };
        (engine, events_rx)
    }

    #[must_use]
    pub fn state(&self) -> DiscoveryState {
        self.state
    }

    #[must_use]
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    #[must_use]
    pub fn history(&self) -> &ChainHistory {
        &self.history
    }

    /// Trailing run of derived-but-unused addresses.
    #[must_use]
    pub fn gap(&self) -> u32 {
        self.chain.next_index().saturating_sub(self.history.next_index())
    }

    /// Bundles this chain's persistable state. The account database blob is
    /// taken separately from the shared [`TxDatabase`].
    #[must_use]
    pub fn snapshot(&self) -> ChainSnapshot {
        ChainSnapshot { history: self.history.store(), source: self.chain.source().store() }
    }

    /// Drives the discovery to completion.
    ///
    /// Returns when the backend's notification stream ends or the discovery
    /// fails; a settled engine otherwise stays in this call following live
    /// updates. Cancel by dropping the future.
    pub async fn run(&mut self) {
        let (window, mut notifications) = match self.begin().await {
            Ok(resolved) => resolved,
            Err(error) => {
                self.fail(error);
                return;
            }
        };

        loop {
            match self.state {
                DiscoveryState::Scanning => {
                    // Live notifications that raced the scan are folded in
                    // first so the gap check below sees them.
                    while let Ok(batch) = notifications.try_recv() {
                        self.apply_matches(vec![batch]);
                    }

                    if let Err(error) = self.scan_chunk(&window).await {
                        self.fail(error);
                        return;
                    }

                    if self.gap() >= self.gap_length {
                        self.settle();
                    }
                }
                DiscoveryState::Live => match notifications.recv().await {
                    Some(batch) => {
                        self.apply_matches(vec![batch]);
                        if self.gap() < self.gap_length {
                            info!(gap = self.gap(), "live update shrank the gap, rescanning");
                            self.state = DiscoveryState::Scanning;
                        }
                    }
                    None => {
                        debug!("notification stream ended");
                        return;
                    }
                },
                DiscoveryState::Idle | DiscoveryState::ResolvingRange | DiscoveryState::Failed => {
                    return;
                }
            }
        }
    }

    /// Resolves the scan window and attaches the live stream.
    async fn begin(
        &mut self,
    ) -> Result<(ScanWindow, mpsc::UnboundedReceiver<TxMatch>), DiscoveryError> {
        self.state = DiscoveryState::ResolvingRange;

        let best = self.backend.lookup_best_block_hash().await?;
        let tip = self.backend.lookup_block_index(&best).await?;
        let since_height = match self.history.until_block().cloned() {
            Some(checkpoint) => self.backend.lookup_block_index(&checkpoint).await?.height,
            None => 0,
        };

        info!(
            since_height,
            until_height = tip.height,
            until_block = %tip.hash,
            "scan window resolved"
        );

        let notifications = self.backend.transaction_stream();

        // Every lookup in this session reaches through the resolved tip, so
        // the checkpoint moves forward now.
        self.history.set_until_block(tip.hash.clone());

        self.state = DiscoveryState::Scanning;
        Ok((ScanWindow { since_height, until_height: tip.height }, notifications))
    }

    /// One scanning iteration: derive a chunk, subscribe it, look up its
    /// history, fold in the results.
    ///
    /// The next iteration is issued as soon as this one completes, whether or
    /// not it matched anything: progression is driven by derivation
    /// outpacing use, not by finding transactions.
    async fn scan_chunk(&mut self, window: &ScanWindow) -> Result<(), DiscoveryError> {
        let chunk = self.chain.next_chunk().await?;
        self.backend.subscribe(&chunk).await?;

        let results = self
            .backend
            .lookup_txs(&chunk, window.until_height, window.since_height)
            .await?;

        let touched = self.apply_matches(results);
        debug!(
            derived = self.chain.next_index(),
            used = self.history.next_index(),
            gap = self.gap(),
            touched,
            "chunk scanned"
        );
        Ok(())
    }

    /// Folds lookup results or live notifications into the chain state.
    ///
    /// Returns how many transactions touched an address of this chain. A
    /// `transaction` event fires only when the account database actually
    /// changed or a new history link appeared. Redelivered records are
    /// silent, which keeps resumed scans from replaying their history.
    fn apply_matches(&mut self, matches: Vec<TxMatch>) -> usize {
        let mut touched = 0;

        for TxMatch { info, addresses } in matches {
            let matched: Vec<u32> =
                addresses.iter().filter_map(|a| self.chain.index_of(a)).collect();
            if matched.is_empty() {
                // The live stream is shared; other chains' matches pass by.
                continue;
            }

            let outcome = self.database.write().update(info.clone());
            let mut linked = false;
            for address_index in matched {
                linked |= self.history.record(address_index, outcome.index());
            }

            touched += 1;
            if outcome.changed() || linked {
                let _ = self.events.send(DiscoveryEvent::Transaction(info));
            }
        }
        touched
    }

    /// The gap limit is satisfied: publish the history and go live.
    fn settle(&mut self) {
        info!(
            next_index = self.history.next_index(),
            derived = self.chain.next_index(),
            gap = self.gap(),
            "gap limit satisfied, going live"
        );
        let _ = self.events.send(DiscoveryEvent::History(self.history.clone()));
        self.state = DiscoveryState::Live;
    }

    fn fail(&mut self, error: DiscoveryError) {
        warn!(%error, "discovery failed");
        let _ = self.events.send(DiscoveryEvent::Error(error));
        self.state = DiscoveryState::Failed;
    }
}
