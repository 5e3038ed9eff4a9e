//! Error types for the engine.

use std::path::PathBuf;

use packpoint_store::StoreError;
use packpoint_types::RecordId;

/// Why a publish failed. Nothing has been persisted when this is returned.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Pack versions must be non-negative.
    #[error("invalid version {0}: must be >= 0")]
    InvalidVersion(i64),

    /// The input folder or an extra file could not be listed or resolved.
    #[error("cannot enumerate {}: {source}", path.display())]
    Enumeration {
        /// Folder or file that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Hashing or manifest encoding failed.
    #[error(transparent)]
    Cas(#[from] packpoint_cas::CasError),

    /// The custom URL list could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A hashing task panicked or was cancelled.
    #[error("hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// The single create call was rejected by the store.
    #[error("store write failed: {0}")]
    StoreWrite(#[source] StoreError),
}

/// Errors that can occur during engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Publishing a pack failed before anything was written.
    #[error("publish failed: {0}")]
    Publish(#[from] PublishError),

    /// A fetch or query against the store failed.
    #[error("store read failed: {0}")]
    StoreRead(#[source] StoreError),

    /// A save against the store failed.
    #[error("store write failed: {0}")]
    StoreWrite(#[source] StoreError),

    /// Deleting a record failed.
    #[error("store delete failed: {0}")]
    StoreDelete(#[source] StoreError),

    /// The pointer kept losing compare-and-swap races.
    #[error("bootstrap pointer {record} still conflicting after {attempts} attempts")]
    PointerConflict {
        /// Identity of the bootstrap record.
        record: RecordId,
        /// Number of save attempts made.
        attempts: u32,
    },

    /// The pack was created but the pointer could not be moved to it.
    #[error("pack {pack_id} was published but the pointer update failed: {source}")]
    PointerUpdate {
        /// The newly created pack.
        pack_id: RecordId,
        /// What went wrong while moving the pointer.
        source: Box<EngineError>,
    },

    /// The pack was deleted but the pointer could not be recomputed.
    ///
    /// The pointer may still reference the deleted pack until
    /// [`PackService::reconcile`](crate::PackService::reconcile) succeeds.
    #[error("pack {deleted} was deleted but the pointer recompute failed: {source}")]
    PointerRecompute {
        /// The pack that was deleted.
        deleted: RecordId,
        /// What went wrong while recomputing.
        source: Box<EngineError>,
    },

    /// No content pack with this identity exists.
    #[error("pack not found: {0}")]
    PackNotFound(RecordId),

    /// A bootstrap deep link could not be parsed.
    #[error("invalid bootstrap link: {0}")]
    InvalidLink(String),
}
