//! # Prospect Core
//!
//! Core library for the Prospect HD-wallet chain discovery engine.
//!
//! Given a BIP32 public-key node, the engine materialises the chain's address
//! sequence, discovers every historical transaction touching those addresses
//! through a blockchain backend, follows live updates, and keeps a
//! persistable index for wallet display and incremental resumption.
//!
//! This crate provides the foundational components for:
//!
//! - **[`source`]**: The address derivation pipeline: a worker-backed or
//!   in-process derivation source wrapped by one-slot prefetching and
//!   exact-range memoisation.
//!
//! - **[`worker`]**: Strict-FIFO RPC over the external key-derivation worker,
//!   including the tagged wire protocol.
//!
//! - **[`chain`]**: The three indexed structures discovery maintains: the
//!   derived address bimap, the account transaction registry, and the
//!   per-chain history timeline.
//!
//! - **[`discovery`]**: The orchestrating state machine implementing the
//!   BIP44 gap-limit scan and the live-update loop.
//!
//! - **[`backend`]**: The consumed blockchain interface (lookups and
//!   subscription stream).
//!
//! - **[`persist`]**: The three serialised blobs a session stores and
//!   restores without replaying history.
//!
//! ## Architecture
//!
//! ```text
//!  AddressSource ──► PrefetchingSource ──► CachingSource ──► Chain ─┐
//!        (derivation)    (look-ahead)        (memoisation)          │
//!                                                                   ▼
//!                              TxDatabase ◄── ChainHistory ◄── ChainDiscovery ◄── Blockchain
//! ```
//!
//! Data flows left to right; control (the gap-limit feedback deciding
//! whether another chunk is derived) flows right to left. Each decorating
//! source exclusively owns the source it wraps; the discovery engine
//! exclusively owns the chain-side state and shares the backend, the worker
//! channel and the account database with its sibling chain.
//!
//! ## Discovery Flow
//!
//! ```text
//! run()
//!   │
//!   ▼
//! ┌────────────────┐
//! │ ResolvingRange │  best block + checkpoint → [since, until] window
//! └───────┬────────┘
//!         ▼
//! ┌────────────────┐   derive chunk → subscribe → lookupTxs → fold in
//! │    Scanning    │◄──────────────┐
//! └───────┬────────┘               │ gap < gap_length
//!         │ gap ≥ gap_length       │
//!         ▼                        │
//!   emit History                   │
//!         │                        │
//!         ▼                        │
//! ┌────────────────┐  live match   │
//! │      Live      │──────────────►┘
//! └───────┬────────┘
//!         │ failure (any state)
//!         ▼
//!      Failed  → emit Error
//! ```
//!
//! ## Concurrency Model
//!
//! A discovery engine is single-task: every state transition happens inside
//! [`ChainDiscovery::run`](discovery::ChainDiscovery::run). The worker
//! channel and the prefetch slot run as background tasks, but their results
//! re-enter the engine only through awaited futures, so the three indexed
//! structures never see concurrent writers.

pub mod backend;
pub mod chain;
pub mod config;
pub mod discovery;
pub mod persist;
pub mod source;
pub mod types;
pub mod utils;
pub mod worker;

pub use backend::{BackendError, BlockIndex, Blockchain};
pub use chain::{Chain, ChainHistory, TxDatabase};
pub use config::DiscoveryConfig;
pub use discovery::{ChainDiscovery, DiscoveryError, DiscoveryEvent, DiscoveryState};
pub use persist::{ChainSnapshot, DatabaseBlob, HistoryBlob, SerializationError, SourceBlob};
pub use source::{
    AddressSource, CachingSource, DerivationError, NativeAddressSource, PrefetchingSource,
};
pub use types::{Address, BlockContext, BlockHash, HdNodeParts, TxId, TxInfo, TxMatch};
pub use worker::{WorkerAddressSource, WorkerChannel, WorkerError, WorkerReply, WorkerRequest};
