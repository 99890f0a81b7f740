//! Worker wire protocol.
//!
//! Requests are a tagged union keyed by a `type` field so that additional
//! request kinds can join the same strict-FIFO channel later. The only kind
//! today is address-range derivation.

use crate::types::HdNodeParts;
use serde::{Deserialize, Serialize};

/// A request posted to the derivation worker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorkerRequest {
    /// Derive the addresses of the inclusive index range
    /// `[first_index, last_index]` under `node`, encoded with the given
    /// address version prefix.
    #[serde(rename_all = "camelCase")]
    DeriveAddressRange {
        node: HdNodeParts,
        /// Address version prefix; network-dependent, no default.
        version: u32,
        first_index: u32,
        last_index: u32,
    },
}

/// A reply from the derivation worker.
///
/// For [`WorkerRequest::DeriveAddressRange`] the reply holds exactly
/// `last_index - first_index + 1` addresses in ascending index order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkerReply {
    pub addresses: Vec<String>,
}
