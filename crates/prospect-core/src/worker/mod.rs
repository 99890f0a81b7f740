//! The derivation worker boundary.
//!
//! Key derivation is the most expensive step of a chain scan, so it runs in a
//! dedicated worker process reached through a message channel. The worker
//! replies **linearly**: the n-th request posted corresponds to the n-th
//! reply received. [`WorkerChannel`] is the strict-FIFO RPC layer that turns
//! that linearity into paired request/reply futures; everything else in the
//! engine is insulated from the wire by [`WorkerAddressSource`].
//!
//! The channel requires exclusive access: all posts must funnel through one
//! handle family, because correctness hinges on post order equalling reply
//! order. Cloned handles share the single internal dispatch queue, which
//! preserves this.

mod channel;
mod protocol;
mod source;

pub use channel::{PendingReply, WorkerChannel, WorkerFrame, WorkerReceiver, WorkerSender};
pub use protocol::{WorkerReply, WorkerRequest};
pub use source::WorkerAddressSource;

use thiserror::Error;

/// Errors surfaced by the worker channel.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WorkerError {
    /// The channel was closed (explicitly, or because the worker or the
    /// dispatch task went away) before this request got its reply.
    #[error("worker channel closed")]
    ChannelClosed,

    /// The worker reported a transport-level failure. Only the oldest
    /// outstanding request observes this; later requests may still complete.
    #[error("worker transport error: {0}")]
    Transport(String),
}
