//! Worker-backed address derivation.

use crate::source::{AddressSource, DerivationError};
use crate::types::{Address, HdNodeParts};
use crate::worker::{WorkerChannel, WorkerReply, WorkerRequest};
use async_trait::async_trait;
use tracing::trace;

/// Derives addresses by round-tripping through the derivation worker.
///
/// Each call posts one [`WorkerRequest::DeriveAddressRange`] and validates
/// the paired reply. The node projection and the address version prefix are
/// fixed per source; the caller supplies both explicitly.
pub struct WorkerAddressSource {
    channel: WorkerChannel,
    node: HdNodeParts,
    version: u32,
}

impl WorkerAddressSource {
    #[must_use]
    pub fn new(channel: WorkerChannel, node: HdNodeParts, version: u32) -> Self {
        Self { channel, node, version }
    }
}

#[async_trait]
impl AddressSource for WorkerAddressSource {
    async fn derive_range(&self, first: u32, last: u32) -> Result<Vec<Address>, DerivationError> {
        let request = WorkerRequest::DeriveAddressRange {
            node: self.node.clone(),
            version: self.version,
            first_index: first,
            last_index: last,
        };

        let WorkerReply { addresses } = self.channel.post(request).await?;

        let expected = (last - first + 1) as usize;
        if addresses.len() != expected {
            return Err(DerivationError::MalformedReply { expected, actual: addresses.len() });
        }

        trace!(first, last, "derived address range via worker");
        Ok(addresses.into_iter().map(Address::from).collect())
    }
}
