//! Observable surface of a discovery.

use crate::backend::BackendError;
use crate::chain::ChainHistory;
use crate::source::DerivationError;
use crate::types::TxInfo;
use thiserror::Error;

/// Lifecycle states of a [`ChainDiscovery`](crate::discovery::ChainDiscovery).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryState {
    /// Constructed, not yet started.
    Idle,
    /// Resolving the scan window from the backend.
    ResolvingRange,
    /// Walking the address space chunk by chunk.
    Scanning,
    /// Gap limit satisfied; following live notifications.
    Live,
    /// A derivation or backend failure ended the discovery.
    Failed,
}

/// Failures funnelled to the [`DiscoveryEvent::Error`] event.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DiscoveryError {
    #[error(transparent)]
    Derivation(#[from] DerivationError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Events emitted over the discovery's output channel.
///
/// A tagged stream rather than separate callbacks, so consumers get
/// backpressure and cancellation from the channel itself.
#[derive(Debug)]
pub enum DiscoveryEvent {
    /// A transaction was discovered, or a known record changed
    /// (e.g. it gained a block context). Fires during scanning and live.
    Transaction(TxInfo),

    /// The gap limit became satisfied. Carries the history as of that
    /// moment; fires again if live updates reopen and re-settle the scan.
    History(ChainHistory),

    /// The discovery failed and will make no more progress.
    Error(DiscoveryError),
}
