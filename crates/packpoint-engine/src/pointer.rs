//! The bootstrap pointer: a singleton record naming the latest pack.
//!
//! Every mutation is a read-modify-write guarded by the store's
//! compare-and-swap on `change_tag`. A lost race re-reads and retries, up
//! to a bounded number of attempts.

use std::sync::Arc;

use packpoint_store::RecordStore;
use packpoint_types::*;
use tracing::{debug, info, warn};

use crate::error::EngineError;

/// Default number of save attempts before giving up on a contended pointer.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Reads and moves the bootstrap pointer record.
pub struct BootstrapPointer {
    store: Arc<dyn RecordStore>,
    record: RecordId,
    max_attempts: u32,
}

impl BootstrapPointer {
    /// A pointer stored under the fixed identity `record`.
    pub fn new(store: Arc<dyn RecordStore>, record: RecordId) -> Self {
        Self {
            store,
            record,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Override the number of save attempts (at least one is always made).
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Identity of the bootstrap record.
    pub fn record_id(&self) -> &RecordId {
        &self.record
    }

    /// Point at `pack` with `version`, creating the record if needed.
    pub async fn move_to(&self, pack: &RecordId, version: i64) -> Result<(), EngineError> {
        self.update(|record| {
            record.set(fields::LATEST_PACK, FieldValue::Reference(pack.clone()));
            record.set(fields::VERSION, FieldValue::Int(version));
        })
        .await?;
        info!(pack = %pack, version, "pointer: moved");
        Ok(())
    }

    /// Remove the reference and reset the version to `0`.
    pub async fn clear(&self) -> Result<(), EngineError> {
        self.update(|record| {
            record.remove(fields::LATEST_PACK);
            record.set(fields::VERSION, FieldValue::Int(0));
        })
        .await?;
        info!(record = %self.record, "pointer: cleared");
        Ok(())
    }

    /// The pack the pointer references, if any.
    ///
    /// A missing bootstrap record resolves to `None`; any other read
    /// failure is propagated.
    pub async fn resolve(&self) -> Result<Option<RecordId>, EngineError> {
        Ok(self.state().await?.latest)
    }

    /// Full observed state of the pointer.
    pub async fn state(&self) -> Result<PointerState, EngineError> {
        let record = self
            .store
            .fetch(&self.record)
            .await
            .map_err(EngineError::StoreRead)?;
        Ok(match record {
            Some(record) => PointerState {
                version: record.int(fields::VERSION).unwrap_or(0),
                latest: record.reference(fields::LATEST_PACK).cloned(),
            },
            None => PointerState::default(),
        })
    }

    /// Fetch the current record, treating a failed read as absent.
    ///
    /// A stale or fresh record is safe here: the save that follows is
    /// rejected unless its tag matches what is stored.
    async fn fetch_or_fresh(&self) -> Record {
        match self.store.fetch(&self.record).await {
            Ok(Some(record)) => record,
            Ok(None) => Record::new(self.record.clone(), RecordKind::Bootstrap),
            Err(e) => {
                debug!(record = %self.record, error = %e, "pointer: fetch failed, starting fresh");
                Record::new(self.record.clone(), RecordKind::Bootstrap)
            }
        }
    }

    async fn update<F>(&self, apply: F) -> Result<Record, EngineError>
    where
        F: Fn(&mut Record) + Send + Sync,
    {
        for attempt in 1..=self.max_attempts {
            let mut record = self.fetch_or_fresh().await;
            apply(&mut record);
            match self.store.save(record).await {
                Ok(saved) => return Ok(saved),
                Err(e) if e.is_conflict() => {
                    warn!(
                        record = %self.record,
                        attempt,
                        max_attempts = self.max_attempts,
                        "pointer: save conflicted, retrying"
                    );
                }
                Err(e) => return Err(EngineError::StoreWrite(e)),
            }
        }
        Err(EngineError::PointerConflict {
            record: self.record.clone(),
            attempts: self.max_attempts,
        })
    }
}
