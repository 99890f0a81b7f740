//! Exact-range derivation memoisation.

use crate::persist::{format_range_key, parse_range_key, SerializationError, SourceBlob};
use crate::source::{AddressSource, DerivationError};
use crate::types::Address;
use ahash::RandomState;
use async_trait::async_trait;
use dashmap::DashMap;
use tracing::trace;

/// Memoises successful derivations by their exact `(first, last)` range.
///
/// Lookups are by exact range: two overlapping but unequal ranges miss
/// independently. That matches the caller's fixed-size chunking discipline:
/// [`Chain`](crate::chain::Chain) always asks for the same chunk boundaries,
/// so a restored cache turns a rescan's derivations into map reads.
///
/// Failures are never cached. Entries are immutable once written.
pub struct CachingSource {
    inner: Box<dyn AddressSource>,
    cache: DashMap<(u32, u32), Vec<Address>, RandomState>,
}

impl CachingSource {
    pub fn new(inner: impl AddressSource + 'static) -> Self {
        Self { inner: Box::new(inner), cache: DashMap::with_hasher(RandomState::new()) }
    }

    /// Serialises the cache as the per-chain `source` blob.
    #[must_use]
    pub fn store(&self) -> SourceBlob {
        let mut blob = SourceBlob::default();
        for entry in self.cache.iter() {
            let (first, last) = *entry.key();
            blob.cache.insert(format_range_key(first, last), entry.value().clone());
        }
        blob
    }

    /// Replaces the cache with a restored blob.
    ///
    /// # Errors
    ///
    /// Rejects malformed range keys and entries whose address count does not
    /// match their range; the cache is left empty in that case.
    pub fn restore(&self, blob: &SourceBlob) -> Result<(), SerializationError> {
        self.cache.clear();
        for (key, addresses) in &blob.cache {
            let (first, last) = match parse_range_key(key) {
                Ok(range) => range,
                Err(e) => {
                    self.cache.clear();
                    return Err(e);
                }
            };
            let expected = (last - first + 1) as usize;
            if addresses.len() != expected {
                self.cache.clear();
                return Err(SerializationError::RangeLengthMismatch {
                    key: key.clone(),
                    expected,
                    actual: addresses.len(),
                });
            }
            self.cache.insert((first, last), addresses.clone());
        }
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[async_trait]
impl AddressSource for CachingSource {
    async fn derive_range(&self, first: u32, last: u32) -> Result<Vec<Address>, DerivationError> {
        if let Some(hit) = self.cache.get(&(first, last)) {
            trace!(first, last, "address range cache hit");
            return Ok(hit.clone());
        }

        let addresses = self.inner.derive_range(first, last).await?;
        self.cache.insert((first, last), addresses.clone());
        Ok(addresses)
    }
}
