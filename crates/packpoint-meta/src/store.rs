//! [`FjallStore`] implementation wrapping a Fjall keyspace.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use fjall::{Database, Keyspace, KeyspaceCreateOptions};
use packpoint_store::{Cursor, Query, QueryPage, RecordStore, StoreError, now_secs, stamp_save};
use packpoint_types::{FieldValue, Record, RecordId, RecordKind};
use tracing::debug;

use crate::MetaError;

type Result<T> = std::result::Result<T, MetaError>;

/// Record store backed by Fjall.
///
/// Each record is one key, so every create/save/delete is a single-key
/// write and therefore atomic. Writers serialize on `write_lock` so the
/// change-tag check and the insert of a save happen as one step.
pub struct FjallStore {
    /// The underlying Fjall database handle.
    #[allow(dead_code)]
    db: Database,
    /// RecordId → serialized Record.
    records: Keyspace,
    write_lock: Mutex<()>,
    /// Keeps the directory of a temporary store alive.
    _tmp: Option<tempfile::TempDir>,
}

impl FjallStore {
    /// Open a persistent store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Database::builder(path).open()?;
        Self::init_keyspaces(db, None)
    }

    /// Open a temporary store that is cleaned up on drop.
    ///
    /// Useful for tests.
    pub fn open_temporary() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let db = Database::builder(tmp.path()).temporary(true).open()?;
        Self::init_keyspaces(db, Some(tmp))
    }

    fn init_keyspaces(db: Database, tmp: Option<tempfile::TempDir>) -> Result<Self> {
        let records = db.keyspace("records", KeyspaceCreateOptions::default)?;
        Ok(Self {
            db,
            records,
            write_lock: Mutex::new(()),
            _tmp: tmp,
        })
    }

    /// Number of stored records.
    ///
    /// Note: this is an O(n) scan.
    pub fn len(&self) -> Result<usize> {
        let mut count = 0;
        for guard in self.records.iter() {
            let _ = guard.key()?;
            count += 1;
        }
        Ok(count)
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn get(&self, id: &RecordId) -> Result<Option<Record>> {
        match self.records.get(id.as_str().as_bytes())? {
            Some(bytes) => Ok(Some(postcard::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put(&self, record: &Record) -> Result<()> {
        let value = postcard::to_allocvec(record)?;
        self.records
            .insert(record.id.as_str().as_bytes(), value.as_slice())?;
        Ok(())
    }

    fn scan(&self, query: &Query) -> Result<Vec<Record>> {
        let mut out = Vec::new();
        for guard in self.records.iter() {
            let v = guard.value()?;
            let record: Record = postcard::from_bytes(&v)?;
            if query.matches(&record) {
                out.push(record);
            }
        }
        Ok(out)
    }
}

#[async_trait::async_trait]
impl RecordStore for FjallStore {
    async fn create(
        &self,
        kind: RecordKind,
        fields: BTreeMap<String, FieldValue>,
    ) -> std::result::Result<Record, StoreError> {
        let record = Record {
            id: RecordId::generate(),
            kind,
            fields,
            change_tag: 1,
            created_at: now_secs(),
        };
        let _guard = self.write_lock.lock().expect("write lock poisoned");
        self.put(&record)?;
        debug!(id = %record.id, %kind, "created record");
        Ok(record)
    }

    async fn fetch(&self, id: &RecordId) -> std::result::Result<Option<Record>, StoreError> {
        Ok(self.get(id)?)
    }

    async fn save(&self, record: Record) -> std::result::Result<Record, StoreError> {
        let _guard = self.write_lock.lock().expect("write lock poisoned");
        let existing = self.get(&record.id)?;
        let stored = stamp_save(existing.as_ref(), record)?;
        self.put(&stored)?;
        debug!(id = %stored.id, tag = stored.change_tag, "saved record");
        Ok(stored)
    }

    async fn delete(&self, id: &RecordId) -> std::result::Result<(), StoreError> {
        let _guard = self.write_lock.lock().expect("write lock poisoned");
        if self.get(id)?.is_none() {
            return Err(StoreError::NotFound(id.clone()));
        }
        self.records
            .remove(id.as_str().as_bytes())
            .map_err(MetaError::from)?;
        debug!(%id, "deleted record");
        Ok(())
    }

    async fn query(
        &self,
        query: &Query,
        cursor: Option<&Cursor>,
    ) -> std::result::Result<QueryPage, StoreError> {
        let candidates = self.scan(query)?;
        query.paginate(candidates, cursor)
    }
}
