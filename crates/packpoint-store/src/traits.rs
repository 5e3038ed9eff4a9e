//! Core trait for the remote record store.

use std::collections::BTreeMap;

use packpoint_types::{FieldValue, Record, RecordId, RecordKind};

use crate::error::StoreError;
use crate::query::{Cursor, Query, QueryPage};

/// A generic record store: create/read/update/delete by identity plus a
/// filtered, sorted, cursor-paginated query.
///
/// Every single-record write is atomic: after `create` or `save` returns,
/// either all of the record's fields are visible or none are. There is no
/// atomicity across calls.
///
/// All implementations must be `Send + Sync` for use across async tasks.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Create a record with a store-assigned identity.
    async fn create(
        &self,
        kind: RecordKind,
        fields: BTreeMap<String, FieldValue>,
    ) -> Result<Record, StoreError>;

    /// Fetch a record by identity. Returns `None` if not found.
    async fn fetch(&self, id: &RecordId) -> Result<Option<Record>, StoreError>;

    /// Save a record under its own identity (create or replace).
    ///
    /// Compare-and-swap on [`Record::change_tag`]: the save is rejected with
    /// [`StoreError::Conflict`] unless the tag equals the stored one, or is
    /// `0` and no record with that identity exists. Returns the record as
    /// stored, with its new tag.
    async fn save(&self, record: Record) -> Result<Record, StoreError>;

    /// Delete a record. Fails with [`StoreError::NotFound`] if it is absent.
    async fn delete(&self, id: &RecordId) -> Result<(), StoreError>;

    /// Run one page of a query, continuing from `cursor` when given.
    async fn query(&self, query: &Query, cursor: Option<&Cursor>)
    -> Result<QueryPage, StoreError>;
}
