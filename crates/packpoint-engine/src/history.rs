//! Publish history: newest-first listing of content packs.

use std::sync::Arc;

use packpoint_cas::decode_manifest;
use packpoint_store::{DEFAULT_PAGE_SIZE, Filter, Query, RecordStore};
use packpoint_types::*;
use tracing::debug;

use crate::error::EngineError;

/// Default cap on the number of history entries returned.
pub const DEFAULT_HISTORY_LIMIT: usize = 200;

/// Lists content packs ordered by version, descending.
pub struct HistoryLister {
    store: Arc<dyn RecordStore>,
    page_size: usize,
}

impl HistoryLister {
    /// A lister querying `store` with the default page size.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Override the per-query page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Return at most `limit` packs, highest version first.
    ///
    /// Follows query cursors until `limit` entries are collected or the
    /// result set is exhausted. Packs with equal versions keep the store's
    /// tie order.
    pub async fn list(&self, limit: usize) -> Result<Vec<PackSummary>, EngineError> {
        let mut summaries = Vec::new();
        if limit == 0 {
            return Ok(summaries);
        }

        let query = Query::new(RecordKind::ContentPack)
            .filter(Filter::gte(fields::VERSION, 0))
            .sort_by(fields::VERSION, true)
            .page_size(self.page_size);

        let mut cursor = None;
        loop {
            let page = self
                .store
                .query(&query, cursor.as_ref())
                .await
                .map_err(EngineError::StoreRead)?;
            debug!(records = page.records.len(), "history: page");
            summaries.extend(page.records.iter().map(summarize));

            if summaries.len() >= limit {
                summaries.truncate(limit);
                break;
            }
            match page.cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        Ok(summaries)
    }
}

/// Summarize one pack record.
pub fn summarize(record: &Record) -> PackSummary {
    PackSummary {
        id: record.id.clone(),
        version: record.int(fields::VERSION).unwrap_or(0),
        created_at: record.created_at,
        asset_count: asset_count(record),
    }
}

/// Number of assets in a pack.
///
/// Counts asset-prefixed blob fields. A pack with none falls back to its
/// manifest's asset list, and to `0` when the manifest is missing or
/// cannot be decoded.
pub fn asset_count(record: &Record) -> usize {
    let fields_count = record.asset_keys().count();
    if fields_count > 0 {
        return fields_count;
    }
    record
        .blob(fields::MANIFEST)
        .and_then(|bytes| decode_manifest(bytes).ok())
        .map_or(0, |manifest| manifest.assets.len())
}
