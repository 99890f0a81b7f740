//! Strict-FIFO request/reply channel over the derivation worker.

use crate::worker::{WorkerError, WorkerReply, WorkerRequest};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

/// Sending half of the worker transport (engine → worker).
pub type WorkerSender = mpsc::UnboundedSender<WorkerRequest>;
/// Receiving half of the worker transport (worker → engine).
pub type WorkerReceiver = mpsc::UnboundedReceiver<WorkerFrame>;

/// One event arriving from the worker side of the transport.
#[derive(Debug)]
pub enum WorkerFrame {
    /// A reply message. Pairs with the oldest outstanding request.
    Reply(WorkerReply),
    /// A transport-level error event. Rejects the oldest outstanding request
    /// only; the worker may still reply, in order, to the rest.
    Error(String),
}

enum Command {
    Post {
        request: WorkerRequest,
        reply: oneshot::Sender<Result<WorkerReply, WorkerError>>,
    },
    Close,
}

/// Handle to a strict-FIFO RPC channel over a long-lived worker.
///
/// The channel pairs the n-th posted request with the n-th received reply.
/// That pairing lives in a dispatch task owning the pending-reply queue;
/// this handle is a cheap clone of its command sender.
///
/// # Ordering
///
/// [`post`](Self::post) enqueues and transmits synchronously, before it
/// returns: two `post` calls made back to back are dispatched in call
/// order even if their reply futures are polled out of order, or never.
///
/// # Closing
///
/// [`close`](Self::close) detaches the dispatch task from the transport.
/// Requests still outstanding at that point resolve with
/// [`WorkerError::ChannelClosed`]; they are not silently dropped. Dropping
/// every handle has the same effect.
#[derive(Clone)]
pub struct WorkerChannel {
    commands: mpsc::UnboundedSender<Command>,
}

impl WorkerChannel {
    /// Opens a channel over an established transport pair and spawns its
    /// dispatch task.
    #[must_use]
    pub fn open(outbound: WorkerSender, inbound: WorkerReceiver) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        tokio::spawn(dispatch(outbound, inbound, command_rx));
        Self { commands }
    }

    /// Posts a request and returns the future of its paired reply.
    ///
    /// The request is transmitted before this returns. The returned future
    /// resolves once the worker's matching reply arrives, or with an error
    /// if the transport fails while this request is the oldest outstanding
    /// one, or with [`WorkerError::ChannelClosed`] if the channel goes away
    /// first.
    pub fn post(&self, request: WorkerRequest) -> PendingReply {
        let (tx, rx) = oneshot::channel();
        // A failed send drops `tx`, which resolves the future as closed.
        let _ = self.commands.send(Command::Post { request, reply: tx });
        PendingReply { rx }
    }

    /// Closes the channel, detaching it from the transport.
    pub fn close(&self) {
        let _ = self.commands.send(Command::Close);
    }
}

/// Future of one posted request's reply.
pub struct PendingReply {
    rx: oneshot::Receiver<Result<WorkerReply, WorkerError>>,
}

impl Future for PendingReply {
    type Output = Result<WorkerReply, WorkerError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|res| match res {
            Ok(outcome) => outcome,
            Err(_) => Err(WorkerError::ChannelClosed),
        })
    }
}

/// Dispatch loop: forwards posts to the worker and pairs inbound frames with
/// the oldest pending reply slot.
async fn dispatch(
    outbound: WorkerSender,
    mut inbound: WorkerReceiver,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    let mut pending: VecDeque<oneshot::Sender<Result<WorkerReply, WorkerError>>> = VecDeque::new();

    loop {
        // Biased toward the command queue: a reply can only be in flight for
        // a request that was posted earlier, so its Post command is already
        // queued and must be registered before the reply is paired.
        tokio::select! {
            biased;

            command = commands.recv() => match command {
                Some(Command::Post { request, reply }) => {
                    if outbound.send(request).is_err() {
                        let _ = reply.send(Err(WorkerError::ChannelClosed));
                        continue;
                    }
                    pending.push_back(reply);
                }
                Some(Command::Close) | None => {
                    debug!(outstanding = pending.len(), "worker channel closed");
                    // Dropping `pending` resolves outstanding requests as closed.
                    return;
                }
            },
            frame = inbound.recv() => match frame {
                Some(WorkerFrame::Reply(reply)) => match pending.pop_front() {
                    Some(slot) => {
                        let _ = slot.send(Ok(reply));
                    }
                    None => {
                        // FIFO invariant violated: a reply we never asked for.
                        // The pairing is unrecoverable from here on.
                        error!("worker reply without a pending request, closing channel");
                        return;
                    }
                },
                Some(WorkerFrame::Error(message)) => match pending.pop_front() {
                    Some(slot) => {
                        let _ = slot.send(Err(WorkerError::Transport(message)));
                    }
                    None => warn!(%message, "worker error event with no pending request"),
                },
                None => {
                    debug!(outstanding = pending.len(), "worker transport ended");
                    return;
                }
            },
        }
    }
}
