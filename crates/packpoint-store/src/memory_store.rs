//! In-memory record store backend.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use packpoint_types::{FieldValue, Record, RecordId, RecordKind};
use tracing::debug;

use crate::error::StoreError;
use crate::query::{Cursor, Query, QueryPage, now_secs, stamp_save};
use crate::traits::RecordStore;

/// In-memory record store backed by a `RwLock<HashMap>`.
///
/// Useful for testing and for front ends configured to run without a
/// durable backend. Every write happens under one lock acquisition, which
/// gives the single-record atomicity the [`RecordStore`] contract requires.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<RecordId, Record>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.read().expect("lock poisoned").len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return a reference to the inner map (for testing purposes).
    #[cfg(test)]
    pub(crate) fn inner(&self) -> &RwLock<HashMap<RecordId, Record>> {
        &self.records
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryStore {
    async fn create(
        &self,
        kind: RecordKind,
        fields: BTreeMap<String, FieldValue>,
    ) -> Result<Record, StoreError> {
        let record = Record {
            id: RecordId::generate(),
            kind,
            fields,
            change_tag: 1,
            created_at: now_secs(),
        };
        let mut map = self.records.write().expect("lock poisoned");
        debug!(id = %record.id, %kind, fields = record.fields.len(), "creating record in memory");
        map.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn fetch(&self, id: &RecordId) -> Result<Option<Record>, StoreError> {
        let map = self.records.read().expect("lock poisoned");
        Ok(map.get(id).cloned())
    }

    async fn save(&self, record: Record) -> Result<Record, StoreError> {
        let mut map = self.records.write().expect("lock poisoned");
        let stored = stamp_save(map.get(&record.id), record)?;
        debug!(id = %stored.id, tag = stored.change_tag, "saved record in memory");
        map.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: &RecordId) -> Result<(), StoreError> {
        let mut map = self.records.write().expect("lock poisoned");
        match map.remove(id) {
            Some(_) => {
                debug!(%id, "deleted record from memory");
                Ok(())
            }
            None => Err(StoreError::NotFound(id.clone())),
        }
    }

    async fn query(
        &self,
        query: &Query,
        cursor: Option<&Cursor>,
    ) -> Result<QueryPage, StoreError> {
        let candidates: Vec<Record> = {
            let map = self.records.read().expect("lock poisoned");
            map.values().filter(|r| query.matches(r)).cloned().collect()
        };
        query.paginate(candidates, cursor)
    }
}
