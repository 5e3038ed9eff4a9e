//! Shared test utilities for packpoint-engine tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use packpoint_store::{FaultyStore, MemoryStore, RecordStore};
use packpoint_types::RecordId;
use tempfile::TempDir;

use crate::node::{PackNode, PackNodeConfig};
use crate::publisher::PublishRequest;

pub const BOOTSTRAP: &str = "bootstrap-test";

pub fn test_config() -> PackNodeConfig {
    PackNodeConfig {
        bootstrap_record: RecordId::from(BOOTSTRAP),
        container: "test.container".to_string(),
        ..PackNodeConfig::default()
    }
}

/// Create a PackNode over a fresh MemoryStore.
pub fn memory_node() -> (PackNode, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (PackNode::new(test_config(), store.clone()), store)
}

/// Create a PackNode over a FaultyStore wrapping a fresh MemoryStore.
pub fn faulty_node() -> (PackNode, Arc<FaultyStore>) {
    let inner: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
    let store = Arc::new(FaultyStore::new(inner).seed(7));
    (PackNode::new(test_config(), store.clone()), store)
}

/// Write `files` into a fresh temporary folder.
pub fn folder_with(files: &[(&str, &[u8])]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, data) in files {
        std::fs::write(dir.path().join(name), data).unwrap();
    }
    dir
}

/// Write one file into `dir` and return its path.
pub fn write_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).unwrap();
    path
}

/// Publish an empty pack at `version` and return its id.
pub async fn publish_empty(node: &PackNode, version: i64) -> RecordId {
    node.publish(PublishRequest::new(version))
        .await
        .unwrap()
        .pack_id
}
