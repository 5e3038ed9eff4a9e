//! Random store failures during publish and delete.
//!
//! Whatever fails, a subsequent reconcile must put the pointer back on the
//! highest surviving version.

use packpoint_engine::{EngineError, PublishError, PublishRequest};
use packpoint_integration_tests::{Backend, Harness};
use packpoint_store::StoreOp;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const OPS: [StoreOp; 5] = [
    StoreOp::Create,
    StoreOp::Fetch,
    StoreOp::Save,
    StoreOp::Delete,
    StoreOp::Query,
];

#[tokio::test]
async fn test_random_failures_then_reconcile() {
    for backend in Backend::ALL {
        let h = Harness::faulty(backend, 0);
        let mut rng = StdRng::seed_from_u64(0x5EED);
        let mut published = Vec::new();

        for round in 0..40i64 {
            if rng.random_bool(0.3) {
                let op = OPS[rng.random_range(0..OPS.len())];
                h.faults().fail_next(op, 1);
            }

            let delete = !published.is_empty() && rng.random_bool(0.35);
            if delete {
                let idx = rng.random_range(0..published.len());
                let id = published.swap_remove(idx);
                match h.node.delete_pack(&id).await {
                    Ok(_) | Err(EngineError::PointerRecompute { .. }) => {}
                    // The pack survived; keep tracking it.
                    Err(EngineError::StoreRead(_) | EngineError::StoreDelete(_)) => {
                        published.push(id)
                    }
                    Err(e) => panic!("unexpected delete error: {e}"),
                }
            } else {
                match h.node.publish(PublishRequest::new(round)).await {
                    Ok(receipt) => published.push(receipt.pack_id),
                    Err(EngineError::PointerUpdate { pack_id, .. }) => published.push(pack_id),
                    Err(EngineError::Publish(PublishError::StoreWrite(_))) => {}
                    Err(e) => panic!("unexpected publish error: {e}"),
                }
            }

            h.faults().disarm();
            h.node.reconcile().await.unwrap();
            h.assert_pointer_on_head().await;
        }

        let history = h.node.list_packs(usize::MAX).await.unwrap();
        assert_eq!(history.len(), published.len(), "{backend:?}");
    }
}

#[tokio::test]
async fn test_interrupted_delete_is_visible_until_reconciled() {
    let h = Harness::faulty(Backend::Fjall, 0);
    let older = h.publish_files(1, &[("a", b"a")]).await;
    let head = h.publish_files(2, &[("b", b"b")]).await;

    // The pack is gone but the pointer save after it fails.
    h.faults().fail_next(StoreOp::Save, 1);
    let err = h.node.delete_pack(&head.pack_id).await.unwrap_err();
    let EngineError::PointerRecompute { deleted, source } = err else {
        panic!("expected PointerRecompute");
    };
    assert_eq!(deleted, head.pack_id);
    assert!(matches!(*source, EngineError::StoreWrite(_)));

    // Stale until reconciled.
    assert_eq!(h.node.resolve_latest().await.unwrap(), Some(head.pack_id));
    let outcome = h.node.reconcile().await.unwrap();
    assert_eq!(outcome.pointer.latest, Some(older.pack_id));
    h.assert_pointer_on_head().await;
}
