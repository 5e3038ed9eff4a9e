//! Shared test harness for packpoint integration tests.
//!
//! Provides [`Harness`]: a [`PackNode`] over a chosen backend (memory or
//! fjall on disk, optionally wrapped in a [`FaultyStore`]) plus helpers to
//! build asset folders and check the pointer invariant.

use std::path::PathBuf;
use std::sync::Arc;

use packpoint_engine::{PackNode, PackNodeConfig, PackService, PublishRequest};
use packpoint_meta::FjallStore;
use packpoint_store::{FaultyStore, MemoryStore, RecordStore};
use packpoint_types::*;
use tempfile::TempDir;

/// Bootstrap record identity used by every harness.
pub const BOOTSTRAP: &str = "bootstrap-it";

/// Which backend a harness runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Memory,
    Fjall,
}

impl Backend {
    /// Both backends, for tests that must behave the same on each.
    pub const ALL: [Backend; 2] = [Backend::Memory, Backend::Fjall];
}

/// Engine configuration used by the harness.
pub fn harness_config() -> PackNodeConfig {
    PackNodeConfig {
        bootstrap_record: RecordId::from(BOOTSTRAP),
        container: "it.container".to_string(),
        ..PackNodeConfig::default()
    }
}

/// A node plus the store it runs on.
pub struct Harness {
    pub node: PackNode,
    pub store: Arc<dyn RecordStore>,
    /// Present when the harness was built with fault injection.
    pub faults: Option<Arc<FaultyStore>>,
    /// Directory of the fjall database, kept alive for reopening.
    data_dir: Option<TempDir>,
}

impl Harness {
    /// A harness over a fresh store of the given backend.
    pub fn new(backend: Backend) -> Self {
        Self::build(backend, harness_config(), None)
    }

    /// A harness whose store is wrapped in a [`FaultyStore`] with random
    /// latency up to `max_latency_ms` on every call.
    pub fn faulty(backend: Backend, max_latency_ms: u64) -> Self {
        Self::build(backend, harness_config(), Some(max_latency_ms))
    }

    /// A harness with a custom engine configuration.
    pub fn with_config(backend: Backend, config: PackNodeConfig) -> Self {
        Self::build(backend, config, None)
    }

    fn build(backend: Backend, config: PackNodeConfig, faulty: Option<u64>) -> Self {
        let (base, data_dir) = match backend {
            Backend::Memory => (Arc::new(MemoryStore::new()) as Arc<dyn RecordStore>, None),
            Backend::Fjall => {
                let dir = tempfile::tempdir().unwrap();
                let store = FjallStore::open(dir.path().join("records")).unwrap();
                (Arc::new(store) as Arc<dyn RecordStore>, Some(dir))
            }
        };

        let (store, faults) = match faulty {
            Some(max_ms) => {
                let faults = Arc::new(
                    FaultyStore::new(base)
                        .read_latency(0, max_ms)
                        .write_latency(0, max_ms)
                        .seed(0xC0FFEE),
                );
                (faults.clone() as Arc<dyn RecordStore>, Some(faults))
            }
            None => (base, None),
        };

        Self {
            node: PackNode::new(config, store.clone()),
            store,
            faults,
            data_dir,
        }
    }

    /// Path of the fjall database, for fjall harnesses.
    pub fn fjall_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|d| d.path().join("records"))
    }

    /// The fault injector. Panics for harnesses built without one.
    pub fn faults(&self) -> &FaultyStore {
        self.faults.as_deref().expect("harness built without faults")
    }

    /// Drop the node and store and open the same fjall database again.
    ///
    /// # Panics
    ///
    /// Panics for non-fjall harnesses.
    pub fn reopen(self) -> Self {
        let Self {
            node,
            store,
            data_dir,
            ..
        } = self;
        drop(node);
        drop(store);

        let dir = data_dir.expect("reopen needs a fjall harness");
        let store: Arc<dyn RecordStore> =
            Arc::new(FjallStore::open(dir.path().join("records")).unwrap());
        Self {
            node: PackNode::new(harness_config(), store.clone()),
            store,
            faults: None,
            data_dir: Some(dir),
        }
    }

    /// A second node over the same store, sharing no lock with the first.
    pub fn peer(&self) -> PackNode {
        PackNode::new(harness_config(), self.store.clone())
    }

    /// Publish `files` as a folder at `version`.
    pub async fn publish_files(&self, version: i64, files: &[(&str, &[u8])]) -> PublishReceipt {
        let dir = asset_folder(files);
        self.node
            .publish(PublishRequest::new(version).folder(dir.path()))
            .await
            .unwrap()
    }

    /// Check that the pointer names the highest surviving version, or is
    /// cleared when nothing is left.
    pub async fn assert_pointer_on_head(&self) {
        let history = self.node.list_packs(usize::MAX).await.unwrap();
        let state = self.node.pointer_state().await.unwrap();
        match history.first() {
            Some(head) => {
                assert_eq!(state.latest.as_ref(), Some(&head.id), "pointer off head");
                assert_eq!(state.version, head.version);
            }
            None => assert!(state.is_cleared(), "pointer should be cleared: {state:?}"),
        }
    }
}

/// Write `files` into a fresh temporary folder.
pub fn asset_folder(files: &[(&str, &[u8])]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, data) in files {
        std::fs::write(dir.path().join(name), data).unwrap();
    }
    dir
}

/// Generate deterministic, non-repeating test data.
pub fn test_data(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut state: u32 = 0xDEAD_BEEF;
    for _ in 0..size {
        state = state.wrapping_mul(1103515245).wrapping_add(12345);
        data.push((state >> 16) as u8);
    }
    data
}

/// Publish through any [`PackService`] without assets.
pub async fn publish_empty(service: &dyn PackService, version: i64) -> RecordId {
    service
        .publish(PublishRequest::new(version))
        .await
        .unwrap()
        .pack_id
}
