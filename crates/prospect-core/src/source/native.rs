//! In-process address derivation.

use crate::source::{AddressSource, DerivationError};
use crate::types::{Address, HdNodeParts};
use async_trait::async_trait;
use bitcoin::base58;
use bitcoin::bip32::{ChildNumber, Xpub};
use bitcoin::hashes::{hash160, Hash};
use bitcoin::secp256k1::{Secp256k1, VerifyOnly};
use tracing::trace;

/// BIP32 mainnet public serialization magic. Only used to feed the codec;
/// the address network is determined by the explicit `version` prefix.
const XPUB_MAGIC: [u8; 4] = [0x04, 0x88, 0xB2, 0x1E];

/// Derives addresses directly from an extended public key, in process.
///
/// This is the fallback and test implementation of [`AddressSource`]; real
/// deployments push derivation to a worker via
/// [`WorkerAddressSource`](crate::worker::WorkerAddressSource) because CKD is
/// the most expensive step of a scan. Both sources produce identical
/// addresses for the same node and version.
///
/// The address `version` is the base58check prefix and must be supplied by
/// the caller; there is no default network.
pub struct NativeAddressSource {
    secp: Secp256k1<VerifyOnly>,
    node: Xpub,
    version: u32,
}

impl NativeAddressSource {
    /// Builds a source from a node projection and an address version prefix.
    ///
    /// # Errors
    ///
    /// Returns [`DerivationError::InvalidNode`] if the projection does not
    /// describe a valid compressed public key node.
    pub fn new(node: &HdNodeParts, version: u32) -> Result<Self, DerivationError> {
        let mut data = [0u8; 78];
        data[0..4].copy_from_slice(&XPUB_MAGIC);
        data[4] = node.depth;
        data[5..9].copy_from_slice(&node.fingerprint.to_be_bytes());
        data[9..13].copy_from_slice(&node.child_num.to_be_bytes());
        data[13..45].copy_from_slice(&node.chain_code);
        data[45..78].copy_from_slice(&node.public_key);

        let xpub = Xpub::decode(&data)
            .map_err(|e| DerivationError::InvalidNode(e.to_string()))?;

        Ok(Self { secp: Secp256k1::verification_only(), node: xpub, version })
    }
}

#[async_trait]
impl AddressSource for NativeAddressSource {
    async fn derive_range(&self, first: u32, last: u32) -> Result<Vec<Address>, DerivationError> {
        let mut addresses = Vec::with_capacity((last.saturating_sub(first) + 1) as usize);
        for index in first..=last {
            let child = ChildNumber::from_normal_idx(index)?;
            let derived = self.node.ckd_pub(&self.secp, child)?;
            let hash = hash160::Hash::hash(&derived.public_key.serialize()).to_byte_array();
            addresses.push(encode_base58_address(self.version, &hash));
        }
        trace!(first, last, "derived address range natively");
        Ok(addresses)
    }
}

/// Base58check-encodes a pubkey hash under the given version prefix.
///
/// The prefix is the minimal big-endian encoding of `version`, at least one
/// byte, which covers both single-byte networks (Bitcoin `0`, Dogecoin `30`)
/// and two-byte ones (Zcash transparent `0x1CB8`).
fn encode_base58_address(version: u32, pubkey_hash: &[u8; 20]) -> Address {
    let version_bytes = version.to_be_bytes();
    let skip = version_bytes.iter().take_while(|b| **b == 0).count().min(3);

    let mut payload = Vec::with_capacity(4 - skip + pubkey_hash.len());
    payload.extend_from_slice(&version_bytes[skip..]);
    payload.extend_from_slice(pubkey_hash);
    Address::new(base58::encode_check(&payload))
}
