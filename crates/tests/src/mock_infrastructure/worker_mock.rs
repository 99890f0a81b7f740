//! In-process derivation workers.
//!
//! Both mocks speak the real wire protocol over the real transport: requests
//! and replies are round-tripped through their JSON encoding, so a test that
//! passes here would also pass against an out-of-process worker.

use prospect_core::source::{AddressSource, NativeAddressSource};
use prospect_core::worker::{WorkerChannel, WorkerFrame, WorkerReply, WorkerRequest};
use tokio::sync::mpsc;

/// Spawns a worker that answers every derivation with synthetic addresses
/// (`w-addr-<index>`), replying strictly in request order.
///
/// Returns the channel plus a handle for scripting transport errors: sending
/// a string down the handle injects a [`WorkerFrame::Error`] between replies.
pub fn spawn_scripted_worker() -> (WorkerChannel, mpsc::UnboundedSender<String>) {
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<WorkerRequest>();
    let (in_tx, in_rx) = mpsc::unbounded_channel::<WorkerFrame>();
    let (fault_tx, mut fault_rx) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        while let Some(request) = out_rx.recv().await {
            if let Ok(message) = fault_rx.try_recv() {
                if in_tx.send(WorkerFrame::Error(message)).is_err() {
                    return;
                }
                continue;
            }

            let request = json_round_trip(&request);
            let WorkerRequest::DeriveAddressRange { first_index, last_index, .. } = request;
            let reply = WorkerReply {
                addresses: (first_index..=last_index).map(|i| format!("w-addr-{i}")).collect(),
            };
            if in_tx.send(WorkerFrame::Reply(json_round_trip(&reply))).is_err() {
                return;
            }
        }
    });

    (WorkerChannel::open(out_tx, in_rx), fault_tx)
}

/// Spawns a worker backed by real in-process derivation.
///
/// The worker derives with its own [`NativeAddressSource`] built from each
/// request's node and version, exactly as an external worker process would.
pub fn spawn_native_worker() -> WorkerChannel {
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<WorkerRequest>();
    let (in_tx, in_rx) = mpsc::unbounded_channel::<WorkerFrame>();

    tokio::spawn(async move {
        while let Some(request) = out_rx.recv().await {
            let request = json_round_trip(&request);
            let WorkerRequest::DeriveAddressRange { node, version, first_index, last_index } =
                request;

            let frame = match NativeAddressSource::new(&node, version) {
                Ok(source) => match source.derive_range(first_index, last_index).await {
                    Ok(addresses) => WorkerFrame::Reply(json_round_trip(&WorkerReply {
                        addresses: addresses.into_iter().map(|a| a.as_str().to_owned()).collect(),
                    })),
                    Err(e) => WorkerFrame::Error(e.to_string()),
                },
                Err(e) => WorkerFrame::Error(e.to_string()),
            };
            if in_tx.send(frame).is_err() {
                return;
            }
        }
    });

    WorkerChannel::open(out_tx, in_rx)
}

/// Round-trips a value through its JSON encoding, proving the wire format.
fn json_round_trip<T: serde::Serialize + serde::de::DeserializeOwned>(value: &T) -> T {
    let json = serde_json::to_value(value).expect("wire type serializes");
    serde_json::from_value(json).expect("wire type deserializes")
}
