//! One-slot speculative look-ahead for address derivation.

use crate::source::{AddressSource, DerivationError};
use crate::types::Address;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::trace;

struct PrefetchSlot {
    first: u32,
    last: u32,
    task: JoinHandle<Result<Vec<Address>, DerivationError>>,
}

/// Decorator that speculatively derives the next contiguous range.
///
/// After each successful request `[f, l]`, the source immediately starts an
/// inner derivation for `[l+1, l+1+(l-f)]`, the next range of the same size.
/// When the caller's chunking is contiguous and fixed-size (as
/// [`Chain`](crate::chain::Chain)'s is), every request after the first adopts
/// a derivation that is already in flight, hiding the worker round-trip
/// behind the caller's own processing.
///
/// At most one prefetch is outstanding. A request that does not match the
/// slot discards the speculation: the orphaned task is aborted and its result
/// never observed, so a speculative failure cannot surface anywhere except
/// through a caller that actually adopted it.
pub struct PrefetchingSource {
    inner: Arc<dyn AddressSource>,
    slot: Mutex<Option<PrefetchSlot>>,
}

impl PrefetchingSource {
    pub fn new(inner: impl AddressSource + 'static) -> Self {
        Self { inner: Arc::new(inner), slot: Mutex::new(None) }
    }

    /// Installs the speculative derivation for the range following `[first, last]`.
    fn install_next(&self, first: u32, last: u32) {
        let size = last - first;
        let Some(next_last) = last.checked_add(1).and_then(|nf| nf.checked_add(size)) else {
            // Index space exhausted; nothing left to speculate on.
            return;
        };
        let next_first = last + 1;

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move { inner.derive_range(next_first, next_last).await });
        trace!(next_first, next_last, "prefetch slot installed");
        *self.slot.lock() = Some(PrefetchSlot { first: next_first, last: next_last, task });
    }
}

#[async_trait]
impl AddressSource for PrefetchingSource {
    async fn derive_range(&self, first: u32, last: u32) -> Result<Vec<Address>, DerivationError> {
        // Take the slot unconditionally; it is spent whether or not it matches.
        let adopted = {
            let mut slot = self.slot.lock();
            match slot.take() {
                Some(s) if s.first == first && s.last == last => {
                    trace!(first, last, "adopting prefetched range");
                    Some(s.task)
                }
                Some(s) => {
                    trace!(
                        requested_first = first,
                        requested_last = last,
                        slot_first = s.first,
                        slot_last = s.last,
                        "prefetch slot mismatch, discarding speculation"
                    );
                    s.task.abort();
                    None
                }
                None => None,
            }
        };

        let result = match adopted {
            Some(task) => task
                .await
                .unwrap_or_else(|e| Err(DerivationError::Internal(e.to_string()))),
            None => self.inner.derive_range(first, last).await,
        };

        // Install the follow-up speculation before handing the result back,
        // so the immediately-following contiguous request adopts it.
        if result.is_ok() {
            self.install_next(first, last);
        }
        result
    }
}

impl Drop for PrefetchingSource {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.get_mut().take() {
            slot.task.abort();
        }
    }
}
