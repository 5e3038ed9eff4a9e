//! Pack deletion with pointer recompute.
//!
//! Deleting a pack and fixing the pointer are two separate store
//! operations. Between them the pointer may still reference the deleted
//! pack; [`PackDeleter::reconcile`] repeats the second step on its own.

use std::sync::Arc;

use packpoint_store::RecordStore;
use packpoint_types::*;
use tracing::{info, warn};

use crate::error::EngineError;
use crate::history::HistoryLister;
use crate::pointer::BootstrapPointer;

/// Result of a delete or reconcile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// History as listed after the store change.
    pub history: Vec<PackSummary>,
    /// Pointer state as written by the recompute.
    pub pointer: PointerState,
}

/// Deletes packs and keeps the pointer on the highest surviving version.
pub struct PackDeleter {
    store: Arc<dyn RecordStore>,
    history: Arc<HistoryLister>,
    pointer: Arc<BootstrapPointer>,
    history_limit: usize,
}

impl PackDeleter {
    /// Create a deleter. `history_limit` bounds the history listed after
    /// each delete.
    pub fn new(
        store: Arc<dyn RecordStore>,
        history: Arc<HistoryLister>,
        pointer: Arc<BootstrapPointer>,
        history_limit: usize,
    ) -> Self {
        Self {
            store,
            history,
            pointer,
            history_limit: history_limit.max(1),
        }
    }

    /// Delete `pack`, then point at the new head or clear the pointer.
    ///
    /// If the delete itself fails the pointer is left untouched. If the
    /// delete succeeds but the recompute fails, the error is
    /// [`EngineError::PointerRecompute`].
    pub async fn delete(&self, pack: &RecordId) -> Result<DeleteOutcome, EngineError> {
        self.store
            .delete(pack)
            .await
            .map_err(EngineError::StoreDelete)?;
        info!(pack = %pack, "delete: pack removed");

        self.recompute().await.map_err(|e| {
            warn!(pack = %pack, error = %e, "delete: pointer recompute failed");
            EngineError::PointerRecompute {
                deleted: pack.clone(),
                source: Box::new(e),
            }
        })
    }

    /// Recompute the pointer from the current history without deleting
    /// anything.
    pub async fn reconcile(&self) -> Result<DeleteOutcome, EngineError> {
        self.recompute().await
    }

    async fn recompute(&self) -> Result<DeleteOutcome, EngineError> {
        let history = self.history.list(self.history_limit).await?;
        let pointer = match history.first() {
            Some(head) => {
                self.pointer.move_to(&head.id, head.version).await?;
                PointerState {
                    version: head.version,
                    latest: Some(head.id.clone()),
                }
            }
            None => {
                self.pointer.clear().await?;
                PointerState::default()
            }
        };
        Ok(DeleteOutcome { history, pointer })
    }
}
