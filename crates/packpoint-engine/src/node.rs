//! [`PackNode`]: the orchestrator tying publisher, pointer, history and
//! deleter together over one record store.

use std::sync::Arc;

use packpoint_store::RecordStore;
use packpoint_types::*;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::assets;
use crate::deleter::{DeleteOutcome, PackDeleter};
use crate::engine::PackService;
use crate::error::EngineError;
use crate::history::{DEFAULT_HISTORY_LIMIT, HistoryLister};
use crate::link::{BootstrapLink, DEFAULT_LINK_SCHEME};
use crate::pointer::{BootstrapPointer, DEFAULT_MAX_ATTEMPTS};
use crate::publisher::{PackPublisher, PublishRequest};

/// Configuration for creating a [`PackNode`].
#[derive(Debug, Clone)]
pub struct PackNodeConfig {
    /// Fixed identity of the bootstrap record.
    pub bootstrap_record: RecordId,
    /// Store container name, used in bootstrap links.
    pub container: String,
    /// URL scheme of bootstrap links.
    pub link_scheme: String,
    /// Records per history query page.
    pub history_page_size: usize,
    /// History entries listed when recomputing the pointer.
    pub history_limit: usize,
    /// Save attempts per pointer mutation.
    pub pointer_max_attempts: u32,
}

impl Default for PackNodeConfig {
    fn default() -> Self {
        Self {
            bootstrap_record: RecordId::from("bootstrap-main"),
            container: "default".to_string(),
            link_scheme: DEFAULT_LINK_SCHEME.to_string(),
            history_page_size: packpoint_store::DEFAULT_PAGE_SIZE,
            history_limit: DEFAULT_HISTORY_LIMIT,
            pointer_max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Publishes, lists and deletes packs and keeps the bootstrap pointer on
/// the newest one.
pub struct PackNode {
    config: PackNodeConfig,
    store: Arc<dyn RecordStore>,
    publisher: PackPublisher,
    pointer: Arc<BootstrapPointer>,
    history: Arc<HistoryLister>,
    deleter: PackDeleter,
    /// Serializes pointer-mutating operations issued through this node.
    pointer_lock: Mutex<()>,
}

impl PackNode {
    /// Create a node over `store`.
    pub fn new(config: PackNodeConfig, store: Arc<dyn RecordStore>) -> Self {
        let pointer = Arc::new(
            BootstrapPointer::new(store.clone(), config.bootstrap_record.clone())
                .with_max_attempts(config.pointer_max_attempts),
        );
        let history =
            Arc::new(HistoryLister::new(store.clone()).with_page_size(config.history_page_size));
        let deleter = PackDeleter::new(
            store.clone(),
            history.clone(),
            pointer.clone(),
            config.history_limit,
        );
        Self {
            publisher: PackPublisher::new(store.clone()),
            pointer,
            history,
            deleter,
            store,
            config,
            pointer_lock: Mutex::new(()),
        }
    }

    /// Return the node configuration.
    pub fn config(&self) -> &PackNodeConfig {
        &self.config
    }

    /// Return a reference to the record store.
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Return the bootstrap pointer.
    pub fn pointer(&self) -> &BootstrapPointer {
        &self.pointer
    }

    /// Fetch a content pack, failing with [`EngineError::PackNotFound`]
    /// when the id is absent or names a different record type.
    async fn fetch_pack(&self, id: &RecordId) -> Result<Record, EngineError> {
        match self.store.fetch(id).await.map_err(EngineError::StoreRead)? {
            Some(record) if record.kind == RecordKind::ContentPack => Ok(record),
            _ => Err(EngineError::PackNotFound(id.clone())),
        }
    }

    // ------------------------------------------------------------------
    // Write path
    // ------------------------------------------------------------------

    /// Publish a pack, then move the pointer to it.
    ///
    /// The pack is created before the pointer lock is taken; only the
    /// pointer move is serialized.
    pub async fn publish(&self, request: PublishRequest) -> Result<PublishReceipt, EngineError> {
        let receipt = self.publisher.publish(&request).await?;

        let _guard = self.pointer_lock.lock().await;
        self.pointer
            .move_to(&receipt.pack_id, receipt.version)
            .await
            .map_err(|e| {
                warn!(pack = %receipt.pack_id, error = %e, "publish: pointer update failed");
                EngineError::PointerUpdate {
                    pack_id: receipt.pack_id.clone(),
                    source: Box::new(e),
                }
            })?;

        info!(
            pack = %receipt.pack_id,
            version = receipt.version,
            assets = receipt.asset_count,
            "publish: complete"
        );
        Ok(receipt)
    }

    /// Delete a pack and recompute the pointer.
    ///
    /// Only content packs can be deleted; any other id, the bootstrap record
    /// included, fails with [`EngineError::PackNotFound`] and nothing is
    /// removed.
    pub async fn delete_pack(&self, id: &RecordId) -> Result<DeleteOutcome, EngineError> {
        let _guard = self.pointer_lock.lock().await;
        self.fetch_pack(id).await?;
        self.deleter.delete(id).await
    }

    /// Recompute the pointer from the current history.
    pub async fn reconcile(&self) -> Result<DeleteOutcome, EngineError> {
        let _guard = self.pointer_lock.lock().await;
        let outcome = self.deleter.reconcile().await?;
        info!(
            version = outcome.pointer.version,
            cleared = outcome.pointer.is_cleared(),
            "reconcile: complete"
        );
        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // Read path
    // ------------------------------------------------------------------

    /// List at most `limit` packs, highest version first.
    pub async fn list_packs(&self, limit: usize) -> Result<Vec<PackSummary>, EngineError> {
        self.history.list(limit).await
    }

    /// The pack the pointer references.
    pub async fn resolve_latest(&self) -> Result<Option<RecordId>, EngineError> {
        self.pointer.resolve().await
    }

    /// Full pointer state.
    pub async fn pointer_state(&self) -> Result<PointerState, EngineError> {
        self.pointer.state().await
    }

    /// Asset detail of one pack.
    pub async fn pack_assets(&self, id: &RecordId) -> Result<Vec<AssetItem>, EngineError> {
        Ok(assets::pack_assets(&self.fetch_pack(id).await?))
    }

    /// Custom URLs of one pack.
    pub async fn custom_urls(&self, id: &RecordId) -> Result<Vec<String>, EngineError> {
        Ok(assets::custom_urls(&self.fetch_pack(id).await?))
    }

    /// Deep link to this node's bootstrap record.
    pub fn bootstrap_link(&self) -> BootstrapLink {
        BootstrapLink::new(
            self.config.container.clone(),
            self.config.bootstrap_record.to_string(),
        )
        .with_scheme(self.config.link_scheme.clone())
    }
}

#[async_trait::async_trait]
impl PackService for PackNode {
    async fn publish(&self, request: PublishRequest) -> Result<PublishReceipt, EngineError> {
        PackNode::publish(self, request).await
    }

    async fn list_packs(&self, limit: usize) -> Result<Vec<PackSummary>, EngineError> {
        PackNode::list_packs(self, limit).await
    }

    async fn delete_pack(&self, id: &RecordId) -> Result<DeleteOutcome, EngineError> {
        PackNode::delete_pack(self, id).await
    }

    async fn resolve_latest(&self) -> Result<Option<RecordId>, EngineError> {
        PackNode::resolve_latest(self).await
    }

    async fn pointer_state(&self) -> Result<PointerState, EngineError> {
        PackNode::pointer_state(self).await
    }

    async fn pack_assets(&self, id: &RecordId) -> Result<Vec<AssetItem>, EngineError> {
        PackNode::pack_assets(self, id).await
    }

    async fn custom_urls(&self, id: &RecordId) -> Result<Vec<String>, EngineError> {
        PackNode::custom_urls(self, id).await
    }

    async fn reconcile(&self) -> Result<DeleteOutcome, EngineError> {
        PackNode::reconcile(self).await
    }

    fn bootstrap_link(&self) -> BootstrapLink {
        PackNode::bootstrap_link(self)
    }
}
