//! Durable local record store wrapping Fjall.
//!
//! [`FjallStore`] implements [`RecordStore`](packpoint_store::RecordStore)
//! over a single Fjall keyspace:
//!
//! - `records`: [`RecordId`](packpoint_types::RecordId) → postcard-serialized
//!   [`Record`](packpoint_types::Record), pack payloads included
//!
//! Queries scan the keyspace and hand the candidates to
//! [`Query::paginate`](packpoint_store::Query::paginate), so paging and
//! ordering behave exactly like the in-memory backend.

mod error;
mod store;

pub use error::MetaError;
pub use store::FjallStore;
