//! Record store trait and backend implementations.
//!
//! This crate defines the [`RecordStore`] trait that the publish/resolve
//! core runs against, the [`Query`] model it pages through, and two
//! backends:
//!
//! - [`MemoryStore`]: in-memory storage backed by a `RwLock<HashMap>`.
//! - [`FaultyStore`]: wraps any store with seeded random latency and
//!   per-operation failure injection, for tests.
//!
//! A durable backend lives in `packpoint-meta`.

mod error;
mod faulty_store;
mod memory_store;
mod query;
mod traits;

pub use error::StoreError;
pub use faulty_store::{FaultyStore, StoreOp};
pub use memory_store::MemoryStore;
pub use query::{
    Comparison, Cursor, DEFAULT_PAGE_SIZE, Filter, Query, QueryPage, Sort, now_secs, stamp_save,
};
pub use traits::RecordStore;
