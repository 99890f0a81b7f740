//! Address derivation sources.
//!
//! An [`AddressSource`] produces the addresses of a contiguous index range.
//! The production pipeline stacks three implementations:
//!
//! ```text
//! WorkerAddressSource ──► PrefetchingSource ──► CachingSource ──► Chain
//!     (derivation)          (look-ahead)        (memoisation)
//! ```
//!
//! [`WorkerAddressSource`](crate::worker::WorkerAddressSource) performs the
//! expensive derivation round-trip; [`PrefetchingSource`] hides that latency
//! by speculatively deriving the next range; [`CachingSource`] makes restored
//! sessions and repeated scans free. [`NativeAddressSource`] derives in
//! process and stands in for the worker in tests and single-process setups.

mod cache;
mod native;
mod prefetch;

pub use cache::CachingSource;
pub use native::NativeAddressSource;
pub use prefetch::PrefetchingSource;

use crate::types::Address;
use crate::worker::WorkerError;
use async_trait::async_trait;
use thiserror::Error;

/// Errors produced while deriving an address range.
///
/// Any of these is fatal to the discovery that issued the derivation; there
/// is no retry at this layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DerivationError {
    /// The derivation worker failed or the channel to it broke.
    #[error("worker derivation failed: {0}")]
    Worker(#[from] WorkerError),

    /// The worker replied with the wrong number of addresses.
    #[error("malformed derivation reply: expected {expected} addresses, got {actual}")]
    MalformedReply { expected: usize, actual: usize },

    /// The supplied node projection does not describe a valid public key node.
    #[error("invalid HD node: {0}")]
    InvalidNode(String),

    /// BIP32 arithmetic failed (hardened index requested from a public node,
    /// index out of range, or a non-derivable child).
    #[error("BIP32 derivation error: {0}")]
    Bip32(#[from] bitcoin::bip32::Error),

    /// A prefetch task died without producing a result.
    #[error("derivation task failed: {0}")]
    Internal(String),
}

/// Capability to derive the addresses of an inclusive index range.
///
/// # Contract
///
/// For `derive_range(first, last)` with `last >= first`, a successful result
/// holds exactly `last - first + 1` addresses in ascending index order.
/// Ranges are contiguous and non-empty; callers keep to fixed-size chunking
/// (see [`Chain`](crate::chain::Chain)), which is what makes the exact-range
/// memoisation of [`CachingSource`] effective.
#[async_trait]
pub trait AddressSource: Send + Sync {
    /// Derives the addresses of the inclusive range `[first, last]`.
    async fn derive_range(&self, first: u32, last: u32) -> Result<Vec<Address>, DerivationError>;
}

#[async_trait]
impl<S: AddressSource + ?Sized> AddressSource for Box<S> {
    async fn derive_range(&self, first: u32, last: u32) -> Result<Vec<Address>, DerivationError> {
        (**self).derive_range(first, last).await
    }
}

#[async_trait]
impl<S: AddressSource + ?Sized> AddressSource for std::sync::Arc<S> {
    async fn derive_range(&self, first: u32, last: u32) -> Result<Vec<Address>, DerivationError> {
        (**self).derive_range(first, last).await
    }
}
