//! Error types for record store operations.

use packpoint_types::RecordId;

/// Errors that can occur during record store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested record was not found.
    #[error("record not found: {0}")]
    NotFound(RecordId),

    /// A save carried a stale change tag.
    ///
    /// `expected` is the tag the caller read; `actual` is the tag currently
    /// stored (`0` if the record does not exist).
    #[error("change tag conflict on {id}: expected {expected}, store has {actual}")]
    Conflict {
        /// Record that was being saved.
        id: RecordId,
        /// Tag carried by the save.
        expected: u64,
        /// Tag held by the store.
        actual: u64,
    },

    /// A query cursor could not be decoded.
    #[error("invalid query cursor: {0}")]
    InvalidCursor(String),

    /// The store could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Backend-specific failure (database, serialization).
    #[error("backend error: {0}")]
    Backend(String),

    /// An I/O error occurred.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether this error is an optimistic-concurrency conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
