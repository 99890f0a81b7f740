//! FIFO stress and derivation equivalence through the real wire protocol.

use crate::mock_infrastructure::{spawn_native_worker, spawn_scripted_worker};
use prospect_core::source::{AddressSource, NativeAddressSource};
use prospect_core::types::HdNodeParts;
use prospect_core::worker::{WorkerAddressSource, WorkerError, WorkerRequest};

fn request(first: u32, last: u32) -> WorkerRequest {
    WorkerRequest::DeriveAddressRange {
        node: test_node(),
        version: 0,
        first_index: first,
        last_index: last,
    }
}

/// Public node of the BIP32 test vector 1 master key.
fn test_node() -> HdNodeParts {
    HdNodeParts {
        depth: 0,
        child_num: 0,
        fingerprint: 0,
        chain_code: decode32("873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508"),
        public_key: decode33("0339a36013301597daef41fbe593a02cc513d0b55527ec2df1050e2e8ff49c85c2"),
    }
}

fn decode32(s: &str) -> [u8; 32] {
    decode(s).try_into().unwrap()
}

fn decode33(s: &str) -> [u8; 33] {
    decode(s).try_into().unwrap()
}

fn decode(s: &str) -> Vec<u8> {
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
        .collect()
}

#[tokio::test]
async fn test_fifo_stress_one_thousand_posts() {
    let (channel, _faults) = spawn_scripted_worker();

    // Post everything up front, then await in order: every future must carry
    // the payload of its own request, not a neighbour's.
    let pending: Vec<_> = (0..1000u32).map(|i| channel.post(request(i, i))).collect();

    for (i, reply) in pending.into_iter().enumerate() {
        let reply = reply.await.unwrap();
        assert_eq!(reply.addresses, vec![format!("w-addr-{i}")]);
    }
}

#[tokio::test]
async fn test_fifo_pairing_survives_interleaved_await_order() {
    let (channel, _faults) = spawn_scripted_worker();

    let a = channel.post(request(0, 19));
    let b = channel.post(request(20, 39));
    let c = channel.post(request(40, 59));

    // Await newest first.
    let c = c.await.unwrap();
    let a = a.await.unwrap();
    let b = b.await.unwrap();

    assert_eq!(a.addresses[0], "w-addr-0");
    assert_eq!(b.addresses[0], "w-addr-20");
    assert_eq!(c.addresses[0], "w-addr-40");
}

#[tokio::test]
async fn test_transport_error_hits_oldest_request_only() {
    let (channel, faults) = spawn_scripted_worker();

    // The fault fires on the first request the worker sees.
    faults.send("scripted transport failure".into()).unwrap();

    let first = channel.post(request(0, 0));
    let second = channel.post(request(1, 1));

    assert!(matches!(first.await, Err(WorkerError::Transport(_))));
    assert_eq!(second.await.unwrap().addresses, vec!["w-addr-1".to_string()]);
}

#[tokio::test]
async fn test_worker_source_matches_native_derivation() {
    let node = test_node();
    let native = NativeAddressSource::new(&node, 0).unwrap();
    let via_worker = WorkerAddressSource::new(spawn_native_worker(), node, 0);

    let direct = native.derive_range(0, 39).await.unwrap();
    let remote = via_worker.derive_range(0, 39).await.unwrap();

    assert_eq!(direct, remote);
    assert_eq!(direct.len(), 40);
}
