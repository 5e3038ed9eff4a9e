//! [`PackService`]: the operations front ends depend on.
//!
//! The CLI (and any future admin surface) talks to this trait instead of
//! the concrete [`PackNode`](crate::PackNode) struct.

use packpoint_types::{AssetItem, PackSummary, PointerState, PublishReceipt, RecordId};

use crate::deleter::DeleteOutcome;
use crate::error::EngineError;
use crate::link::BootstrapLink;
use crate::publisher::PublishRequest;

/// The publish/resolve interface exposed to front ends.
///
/// Covers the operations a pack operator needs:
///
/// - **publish**: create a pack and point the bootstrap at it
/// - **list**: newest-first history
/// - **delete**: remove a pack and recompute the pointer
/// - **resolve**: read the pointer
/// - **reconcile**: repair the pointer after an interrupted delete
#[async_trait::async_trait]
pub trait PackService: Send + Sync {
    /// Publish a pack and move the pointer to it.
    async fn publish(&self, request: PublishRequest) -> Result<PublishReceipt, EngineError>;

    /// List at most `limit` packs, highest version first.
    async fn list_packs(&self, limit: usize) -> Result<Vec<PackSummary>, EngineError>;

    /// Delete a pack and point at whatever is now the newest one.
    async fn delete_pack(&self, id: &RecordId) -> Result<DeleteOutcome, EngineError>;

    /// The pack the pointer currently references.
    async fn resolve_latest(&self) -> Result<Option<RecordId>, EngineError>;

    /// Full pointer state (version + reference).
    async fn pointer_state(&self) -> Result<PointerState, EngineError>;

    /// Asset detail of one pack.
    async fn pack_assets(&self, id: &RecordId) -> Result<Vec<AssetItem>, EngineError>;

    /// Custom URLs stored on one pack.
    async fn custom_urls(&self, id: &RecordId) -> Result<Vec<String>, EngineError>;

    /// Recompute the pointer from the current history.
    async fn reconcile(&self) -> Result<DeleteOutcome, EngineError>;

    /// Deep link locating the bootstrap record.
    fn bootstrap_link(&self) -> BootstrapLink;
}
