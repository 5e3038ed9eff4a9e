//! Query model: comparison filter, sort key, and cursor pagination.
//!
//! Backends hand [`Query::paginate`] the candidate records and get back one
//! page plus a continuation [`Cursor`]. The cursor is a key-set position
//! (last sort value + last id), so records deleted between pages never make
//! the next page skip a survivor.

use std::cmp::Ordering;

use packpoint_types::{Record, RecordId, RecordKind};

use crate::error::StoreError;

/// Default number of records per query page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Comparison operator of a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `field == value`
    Eq,
    /// `field >= value`
    Gte,
    /// `field <= value`
    Lte,
}

/// A comparison on one integer field. Records lacking the field never match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    /// Field name.
    pub field: String,
    /// Operator.
    pub op: Comparison,
    /// Right-hand side.
    pub value: i64,
}

impl Filter {
    /// `field == value`
    pub fn eq(field: impl Into<String>, value: i64) -> Self {
        Self {
            field: field.into(),
            op: Comparison::Eq,
            value,
        }
    }

    /// `field >= value`
    pub fn gte(field: impl Into<String>, value: i64) -> Self {
        Self {
            field: field.into(),
            op: Comparison::Gte,
            value,
        }
    }

    /// `field <= value`
    pub fn lte(field: impl Into<String>, value: i64) -> Self {
        Self {
            field: field.into(),
            op: Comparison::Lte,
            value,
        }
    }

    fn matches(&self, record: &Record) -> bool {
        let Some(v) = record.int(&self.field) else {
            return false;
        };
        match self.op {
            Comparison::Eq => v == self.value,
            Comparison::Gte => v >= self.value,
            Comparison::Lte => v <= self.value,
        }
    }
}

/// Sort key of a query: one integer field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    /// Field name.
    pub field: String,
    /// Largest value first when set.
    pub descending: bool,
}

/// A filtered, sorted query over one record kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Record kind to scan.
    pub kind: RecordKind,
    /// Optional comparison filter.
    pub filter: Option<Filter>,
    /// Optional sort key. Ties (and unsorted queries) order by record id.
    pub sort: Option<Sort>,
    /// Maximum records per page (at least 1).
    pub page_size: usize,
}

/// Continuation token for the next page of a query.
///
/// Opaque to callers; only valid for the query that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    sort: Option<Sort>,
    last_value: Option<i64>,
    last_id: RecordId,
}

/// One page of query results.
#[derive(Debug, Clone, Default)]
pub struct QueryPage {
    /// Matched records, in query order.
    pub records: Vec<Record>,
    /// Cursor for the next page; `None` once the results are exhausted.
    pub cursor: Option<Cursor>,
}

impl Query {
    /// Match every record of `kind`, unsorted, default page size.
    pub fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            filter: None,
            sort: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Restrict to records passing `filter`.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Sort by an integer field.
    pub fn sort_by(mut self, field: impl Into<String>, descending: bool) -> Self {
        self.sort = Some(Sort {
            field: field.into(),
            descending,
        });
        self
    }

    /// Set the page size. Zero is treated as one.
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Whether `record` is part of this query's result set.
    pub fn matches(&self, record: &Record) -> bool {
        record.kind == self.kind && self.filter.as_ref().is_none_or(|f| f.matches(record))
    }

    /// Total order of the result set.
    pub fn order(&self, a: &Record, b: &Record) -> Ordering {
        self.compare_keys(self.sort_value(a), &a.id, self.sort_value(b), &b.id)
    }

    /// Cut one page out of `candidates`, starting after `cursor`.
    ///
    /// `candidates` may contain records of any kind; non-matching records
    /// are dropped here.
    pub fn paginate(
        &self,
        candidates: Vec<Record>,
        cursor: Option<&Cursor>,
    ) -> Result<QueryPage, StoreError> {
        if let Some(c) = cursor
            && c.sort != self.sort
        {
            return Err(StoreError::InvalidCursor(
                "cursor was produced by a query with a different sort".to_string(),
            ));
        }

        let mut matched: Vec<Record> = candidates
            .into_iter()
            .filter(|r| self.matches(r))
            .filter(|r| {
                cursor.is_none_or(|c| {
                    self.compare_keys(self.sort_value(r), &r.id, c.last_value, &c.last_id)
                        == Ordering::Greater
                })
            })
            .collect();
        matched.sort_by(|a, b| self.order(a, b));

        let has_more = matched.len() > self.page_size;
        matched.truncate(self.page_size);

        let cursor = if has_more {
            matched.last().map(|last| Cursor {
                sort: self.sort.clone(),
                last_value: self.sort_value(last),
                last_id: last.id.clone(),
            })
        } else {
            None
        };

        Ok(QueryPage {
            records: matched,
            cursor,
        })
    }

    fn sort_value(&self, record: &Record) -> Option<i64> {
        self.sort.as_ref().and_then(|s| record.int(&s.field))
    }

    fn compare_keys(
        &self,
        a_value: Option<i64>,
        a_id: &RecordId,
        b_value: Option<i64>,
        b_id: &RecordId,
    ) -> Ordering {
        let by_value = match (&self.sort, a_value, b_value) {
            (None, _, _) | (Some(_), None, None) => Ordering::Equal,
            // Records lacking the sort field go last in either direction.
            (Some(_), None, Some(_)) => Ordering::Greater,
            (Some(_), Some(_), None) => Ordering::Less,
            (Some(s), Some(x), Some(y)) if s.descending => y.cmp(&x),
            (Some(_), Some(x), Some(y)) => x.cmp(&y),
        };
        by_value.then_with(|| a_id.cmp(b_id))
    }
}

/// Validate a compare-and-swap save against the currently stored record and
/// return the record to store, with its new tag and creation time.
pub fn stamp_save(existing: Option<&Record>, mut record: Record) -> Result<Record, StoreError> {
    match existing {
        None if record.change_tag == 0 => {
            record.change_tag = 1;
            record.created_at = now_secs();
        }
        None => {
            return Err(StoreError::Conflict {
                id: record.id,
                expected: record.change_tag,
                actual: 0,
            });
        }
        Some(current) if current.change_tag == record.change_tag => {
            record.change_tag = current.change_tag + 1;
            record.created_at = current.created_at;
        }
        Some(current) => {
            return Err(StoreError::Conflict {
                id: record.id,
                expected: record.change_tag,
                actual: current.change_tag,
            });
        }
    }
    Ok(record)
}

/// Current Unix time in seconds.
pub fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
