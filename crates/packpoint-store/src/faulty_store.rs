//! A [`RecordStore`] wrapper that adds seeded random latency and
//! per-operation failure injection.
//!
//! # Example
//!
//! ```ignore
//! let faulty = FaultyStore::new(inner)
//!     .read_latency(5, 20)    // 5–20 ms per fetch/query
//!     .write_latency(10, 30)  // 10–30 ms per create/save/delete
//!     .seed(42);
//! faulty.fail_next(StoreOp::Save, 1);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex};

use packpoint_types::{FieldValue, Record, RecordId, RecordKind};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::error::StoreError;
use crate::query::{Cursor, Query, QueryPage};
use crate::traits::RecordStore;

/// The operations of a [`RecordStore`], for failure injection and call counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    /// [`RecordStore::create`]
    Create,
    /// [`RecordStore::fetch`]
    Fetch,
    /// [`RecordStore::save`]
    Save,
    /// [`RecordStore::delete`]
    Delete,
    /// [`RecordStore::query`]
    Query,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Fetch => "fetch",
            Self::Save => "save",
            Self::Delete => "delete",
            Self::Query => "query",
        };
        f.write_str(name)
    }
}

#[derive(Default)]
struct OpState {
    calls: u64,
    pending_failures: u32,
}

/// A [`RecordStore`] wrapper that injects latency and failures.
///
/// Failed calls never reach the inner store, so an injected write failure
/// leaves no trace, the same as a rejected single-record write.
pub struct FaultyStore {
    inner: Arc<dyn RecordStore>,
    read_latency_ms: (u64, u64),
    write_latency_ms: (u64, u64),
    rng: Mutex<StdRng>,
    ops: Mutex<HashMap<StoreOp, OpState>>,
}

impl FaultyStore {
    /// Wrap an existing store with no latency and no failures.
    pub fn new(inner: Arc<dyn RecordStore>) -> Self {
        Self {
            inner,
            read_latency_ms: (0, 0),
            write_latency_ms: (0, 0),
            rng: Mutex::new(StdRng::seed_from_u64(0)),
            ops: Mutex::new(HashMap::new()),
        }
    }

    /// Set the read latency range in milliseconds (uniform random).
    pub fn read_latency(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.read_latency_ms = (min_ms, max_ms);
        self
    }

    /// Set the write latency range in milliseconds (uniform random).
    pub fn write_latency(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.write_latency_ms = (min_ms, max_ms);
        self
    }

    /// Set the RNG seed for deterministic behaviour.
    pub fn seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    /// Make the next `count` calls of `op` fail with [`StoreError::Unavailable`].
    pub fn fail_next(&self, op: StoreOp, count: u32) {
        let mut ops = self.ops.lock().expect("ops lock poisoned");
        ops.entry(op).or_default().pending_failures += count;
    }

    /// Drop every injected failure that has not fired yet.
    pub fn disarm(&self) {
        let mut ops = self.ops.lock().expect("ops lock poisoned");
        for state in ops.values_mut() {
            state.pending_failures = 0;
        }
    }

    /// Number of calls of `op` seen so far, failed ones included.
    pub fn calls(&self, op: StoreOp) -> u64 {
        let ops = self.ops.lock().expect("ops lock poisoned");
        ops.get(&op).map_or(0, |s| s.calls)
    }

    /// Count the call and consume one injected failure if armed.
    fn enter(&self, op: StoreOp) -> Result<(), StoreError> {
        let mut ops = self.ops.lock().expect("ops lock poisoned");
        let state = ops.entry(op).or_default();
        state.calls += 1;
        if state.pending_failures > 0 {
            state.pending_failures -= 1;
            debug!(%op, "injecting store failure");
            return Err(StoreError::Unavailable(format!("injected {op} failure")));
        }
        Ok(())
    }

    /// Sleep for a random duration in `[min, max]` milliseconds.
    async fn delay(&self, range: (u64, u64)) {
        let (min, max) = range;

        if max == 0 {
            return;
        }

        let ms = if min == max {
            min
        } else {
            self.rng
                .lock()
                .expect("rng lock poisoned")
                .random_range(min..=max)
        };

        if ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(ms)).await;
        }
    }
}

#[async_trait::async_trait]
impl RecordStore for FaultyStore {
    async fn create(
        &self,
        kind: RecordKind,
        fields: BTreeMap<String, FieldValue>,
    ) -> Result<Record, StoreError> {
        self.delay(self.write_latency_ms).await;
        self.enter(StoreOp::Create)?;
        self.inner.create(kind, fields).await
    }

    async fn fetch(&self, id: &RecordId) -> Result<Option<Record>, StoreError> {
        self.delay(self.read_latency_ms).await;
        self.enter(StoreOp::Fetch)?;
        self.inner.fetch(id).await
    }

    async fn save(&self, record: Record) -> Result<Record, StoreError> {
        self.delay(self.write_latency_ms).await;
        self.enter(StoreOp::Save)?;
        self.inner.save(record).await
    }

    async fn delete(&self, id: &RecordId) -> Result<(), StoreError> {
        self.delay(self.write_latency_ms).await;
        self.enter(StoreOp::Delete)?;
        self.inner.delete(id).await
    }

    async fn query(
        &self,
        query: &Query,
        cursor: Option<&Cursor>,
    ) -> Result<QueryPage, StoreError> {
        self.delay(self.read_latency_ms).await;
        self.enter(StoreOp::Query)?;
        self.inner.query(query, cursor).await
    }
}
