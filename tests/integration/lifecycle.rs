//! End-to-end publish → list → resolve → delete lifecycle on every backend.

use packpoint_cas::digest;
use packpoint_engine::{PackService, PublishRequest};
use packpoint_integration_tests::{Backend, Harness, asset_folder, publish_empty, test_data};

#[tokio::test]
async fn test_full_lifecycle() {
    for backend in Backend::ALL {
        let h = Harness::new(backend);
        let logo = test_data(4096);

        let v1 = h
            .publish_files(1, &[("logo.png", &logo), ("strings.json", b"{}")])
            .await;
        let v2 = h.publish_files(2, &[("logo.png", &logo)]).await;
        let v3 = h.publish_files(3, &[]).await;
        assert_eq!(v1.asset_count, 2);
        assert_eq!(v3.asset_count, 0);

        let history = h.node.list_packs(200).await.unwrap();
        let versions: Vec<i64> = history.iter().map(|p| p.version).collect();
        assert_eq!(versions, vec![3, 2, 1], "{backend:?}");
        assert_eq!(history[2].asset_count, 2);
        assert_eq!(h.node.resolve_latest().await.unwrap(), Some(v3.pack_id.clone()));

        // Asset detail comes from the manifest, with payloads attached.
        let assets = h.node.pack_assets(&v1.pack_id).await.unwrap();
        assert_eq!(assets[0].filename, "logo.png");
        assert_eq!(assets[0].sha256.as_deref(), Some(digest(&logo).as_str()));
        assert_eq!(assets[0].payload.as_deref(), Some(&logo[..]));

        // Deleting the head falls back to the next version.
        h.node.delete_pack(&v3.pack_id).await.unwrap();
        let state = h.node.pointer_state().await.unwrap();
        assert_eq!(state.latest, Some(v2.pack_id.clone()));
        assert_eq!(state.version, 2);

        // Deleting an older pack leaves the pointer where it is.
        h.node.delete_pack(&v1.pack_id).await.unwrap();
        assert_eq!(h.node.resolve_latest().await.unwrap(), Some(v2.pack_id.clone()));

        // Deleting the last pack clears it.
        h.node.delete_pack(&v2.pack_id).await.unwrap();
        let state = h.node.pointer_state().await.unwrap();
        assert!(state.is_cleared());
        assert_eq!(state.version, 0);
        assert!(h.node.list_packs(200).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_custom_urls_truncated_to_five() {
    for backend in Backend::ALL {
        let h = Harness::new(backend);
        let urls: Vec<String> = (0..7).map(|i| format!("https://cdn.example.com/{i}")).collect();
        let request = PublishRequest {
            custom_urls: urls.clone(),
            ..PublishRequest::new(1)
        };

        let receipt = h.node.publish(request).await.unwrap();
        let stored = h.node.custom_urls(&receipt.pack_id).await.unwrap();
        assert_eq!(stored, urls[..5].to_vec());
    }
}

#[tokio::test]
async fn test_colliding_filenames_across_folder_and_extra_files() {
    for backend in Backend::ALL {
        let h = Harness::new(backend);
        let folder = asset_folder(&[("icon 1.png", b"a")]);
        let other = asset_folder(&[("icon-1.png", b"b")]);

        let receipt = h
            .node
            .publish(
                PublishRequest::new(1)
                    .folder(folder.path())
                    .file(other.path().join("icon-1.png")),
            )
            .await
            .unwrap();

        let assets = h.node.pack_assets(&receipt.pack_id).await.unwrap();
        let keys: Vec<&str> = assets.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, vec!["asset_icon_1_png", "asset_icon_1_png_2"]);
        assert!(keys.iter().all(|k| k.len() <= 255));
    }
}

#[tokio::test]
async fn test_service_trait_object() {
    let h = Harness::new(Backend::Memory);
    let service: &dyn PackService = &h.node;

    let id = publish_empty(service, 10).await;
    assert_eq!(service.resolve_latest().await.unwrap(), Some(id));

    let link = service.bootstrap_link().to_string();
    assert_eq!(
        link,
        "packpoint://bootstrap?container=it.container&record=bootstrap-it"
    );
}
