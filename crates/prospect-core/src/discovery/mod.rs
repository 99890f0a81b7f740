//! The discovery orchestrator.
//!
//! [`ChainDiscovery`] drives the whole pipeline for one chain: it resolves
//! the scan window against the backend, walks the address space chunk by
//! chunk, feeds lookups and live notifications into the chain state, and
//! settles once the BIP44 gap limit is satisfied, while staying subscribed
//! for live updates that can reopen the scan.

mod engine;
mod events;

pub use engine::ChainDiscovery;
pub use events::{DiscoveryError, DiscoveryEvent, DiscoveryState};
