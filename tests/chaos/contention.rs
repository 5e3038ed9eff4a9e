//! Independent nodes racing on one bootstrap record.
//!
//! Each peer has its own lock, so only the store's compare-and-swap keeps
//! the pointer consistent.

use std::sync::Arc;

use packpoint_engine::{PackNode, PackNodeConfig, PublishRequest};
use packpoint_integration_tests::{Backend, Harness, harness_config};
use packpoint_store::RecordStore;
use packpoint_types::{RecordId, fields};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_peers_publishing_concurrently() {
    for backend in Backend::ALL {
        let h = Harness::faulty(backend, 3);
        // Enough attempts for every peer to lose to every other once.
        let peers: Vec<Arc<PackNode>> = (0..6)
            .map(|_| {
                Arc::new(PackNode::new(
                    PackNodeConfig {
                        pointer_max_attempts: 6,
                        ..harness_config()
                    },
                    h.store.clone(),
                ))
            })
            .collect();

        let mut handles = Vec::new();
        for (i, peer) in peers.iter().enumerate() {
            let peer = Arc::clone(peer);
            handles.push(tokio::spawn(async move {
                peer.publish(PublishRequest::new(i as i64 + 1))
                    .await
                    .unwrap()
                    .pack_id
            }));
        }
        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }

        let state = h.node.pointer_state().await.unwrap();
        let latest = state.latest.clone().unwrap();
        assert!(ids.contains(&latest), "{backend:?}");

        // Reference and version always come from the same publish.
        let record = h.store.fetch(&latest).await.unwrap().unwrap();
        assert_eq!(record.int(fields::VERSION), Some(state.version));

        // One successful save per publish.
        let bootstrap = h
            .store
            .fetch(&RecordId::from(packpoint_integration_tests::BOOTSTRAP))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(bootstrap.change_tag, ids.len() as u64);

        // The pointer follows the last writer, so it may not be on the head
        // yet; reconcile settles it.
        h.node.reconcile().await.unwrap();
        h.assert_pointer_on_head().await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_peer_delete_and_publish_race() {
    let h = Harness::faulty(Backend::Memory, 2);
    let peer = h.peer();
    let base = h.publish_files(1, &[("a", b"a")]).await;
    let doomed = h.publish_files(2, &[("b", b"b")]).await;

    let (deleted, published) = tokio::join!(
        h.node.delete_pack(&doomed.pack_id),
        peer.publish(PublishRequest::new(3)),
    );
    deleted.unwrap();
    let published = published.unwrap();

    // Either order is valid; after reconcile the head is version 3.
    h.node.reconcile().await.unwrap();
    let state = h.node.pointer_state().await.unwrap();
    assert_eq!(state.latest, Some(published.pack_id));
    assert_eq!(state.version, 3);
    assert!(h.store.fetch(&base.pack_id).await.unwrap().is_some());
}
