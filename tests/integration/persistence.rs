//! Durable backend: state survives reopen and pages like the memory store.

use packpoint_engine::PackNodeConfig;
use packpoint_integration_tests::{Backend, Harness, harness_config, publish_empty};

#[tokio::test]
async fn test_packs_and_pointer_survive_reopen() {
    let h = Harness::new(Backend::Fjall);
    assert!(h.fjall_path().is_some());
    let old = h.publish_files(1, &[("a.txt", b"alpha")]).await;
    let new = h.publish_files(2, &[("b.txt", b"beta")]).await;

    let h = h.reopen();
    let history = h.node.list_packs(10).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, new.pack_id);
    assert_eq!(h.node.resolve_latest().await.unwrap(), Some(new.pack_id.clone()));

    let assets = h.node.pack_assets(&old.pack_id).await.unwrap();
    assert_eq!(assets[0].payload.as_deref(), Some(&b"alpha"[..]));

    // Mutations after reopen continue from the stored change tags.
    h.node.delete_pack(&new.pack_id).await.unwrap();
    let h = h.reopen();
    assert_eq!(h.node.resolve_latest().await.unwrap(), Some(old.pack_id));
}

#[tokio::test]
async fn test_pagination_matches_across_backends() {
    let mut listings = Vec::new();
    for backend in Backend::ALL {
        let h = Harness::with_config(
            backend,
            PackNodeConfig {
                history_page_size: 3,
                ..harness_config()
            },
        );
        for version in [4, 9, 1, 7, 7, 2, 8, 3] {
            publish_empty(&h.node, version).await;
        }

        let versions: Vec<i64> = h
            .node
            .list_packs(6)
            .await
            .unwrap()
            .iter()
            .map(|p| p.version)
            .collect();
        listings.push(versions);
    }

    assert_eq!(listings[0], vec![9, 8, 7, 7, 4, 3]);
    assert_eq!(listings[0], listings[1]);
}
