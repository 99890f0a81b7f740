//! Core value types shared across the discovery pipeline.
//!
//! Addresses, transaction ids and block hashes are opaque strings assigned by
//! the derivation worker and the blockchain backend respectively; the engine
//! never parses them, it only compares and indexes them. [`TxInfo`] carries an
//! opaque JSON payload end to end so that backend-specific transaction detail
//! survives a store/restore cycle byte for byte.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A derived wallet address (base58 or bech32, backend-dependent).
///
/// Within one chain an address is in bijection with its address index; the
/// mapping is frozen inside [`Chain`](crate::chain::Chain) once derived.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A transaction id, unique per transaction for the lifetime of a wallet.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(String);

impl TxId {
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TxId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A block hash as reported by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockHash(String);

impl BlockHash {
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockHash {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Where a transaction sits in the chain, if mined.
///
/// Later notifications for the same transaction overwrite this wholesale
/// (last-write-wins): a mempool transaction gains a context once mined, and a
/// reorged transaction gets the context of its new block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockContext {
    /// Height of the containing block.
    pub height: u32,
    /// Hash of the containing block.
    pub hash: BlockHash,
    /// Position of the transaction within the block.
    pub index: u32,
}

/// A transaction record plus its block context and the backend's raw payload.
///
/// The `payload` is pass-through JSON: the engine stores and returns it
/// without interpretation, so whatever shape the backend emits round-trips
/// through [`TxDatabase::store`](crate::chain::TxDatabase::store) unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TxInfo {
    /// Backend-assigned transaction id.
    pub id: TxId,
    /// Block context; `None` while unconfirmed.
    #[serde(default)]
    pub block: Option<BlockContext>,
    /// Opaque backend payload.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl TxInfo {
    /// Creates an unconfirmed transaction record with an empty payload.
    #[must_use]
    pub fn new(id: TxId) -> Self {
        Self { id, block: None, payload: serde_json::Value::Null }
    }

    /// Attaches a block context.
    #[must_use]
    pub fn with_block(mut self, block: BlockContext) -> Self {
        self.block = Some(block);
        self
    }

    /// Attaches a raw payload.
    #[must_use]
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// One backend lookup or subscription result: a transaction and every input
/// address it touched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TxMatch {
    pub info: TxInfo,
    pub addresses: Vec<Address>,
}

/// Projection of a BIP32 extended public key node.
///
/// This is everything the derivation worker needs to derive child addresses:
/// the serialized public key, the chain code, and the node metadata. The
/// private half never crosses this boundary. Byte fields travel as hex on the
/// wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HdNodeParts {
    /// Depth of the node below the master key.
    pub depth: u8,
    /// Child number under which this node was derived (raw, hardened bit included).
    pub child_num: u32,
    /// Fingerprint of the parent node.
    pub fingerprint: u32,
    /// BIP32 chain code.
    #[serde(with = "crate::utils::hex")]
    pub chain_code: [u8; 32],
    /// Compressed secp256k1 public key.
    #[serde(with = "crate::utils::hex")]
    pub public_key: [u8; 33],
}
