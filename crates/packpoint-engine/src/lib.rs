//! Publish/resolve core for content packs.
//!
//! The [`PackNode`] owns the components and exposes the full publish /
//! list / delete / resolve pipeline over any [`RecordStore`]:
//!
//! - [`PackPublisher`] hashes a file set and creates one pack record.
//! - [`BootstrapPointer`] moves the singleton "latest" pointer with
//!   compare-and-swap retries.
//! - [`HistoryLister`] pages through packs newest first.
//! - [`PackDeleter`] deletes a pack and recomputes the pointer.
//!
//! Front ends depend on the [`PackService`] trait rather than the concrete
//! node.
//!
//! [`RecordStore`]: packpoint_store::RecordStore

pub mod assets;
pub mod deleter;
pub mod engine;
pub mod error;
pub mod history;
pub mod link;
pub mod node;
pub mod pointer;
pub mod publisher;

pub use deleter::{DeleteOutcome, PackDeleter};
pub use engine::PackService;
pub use error::{EngineError, PublishError};
pub use history::{DEFAULT_HISTORY_LIMIT, HistoryLister};
pub use link::{BootstrapLink, DEFAULT_LINK_SCHEME};
pub use node::{PackNode, PackNodeConfig};
pub use pointer::{BootstrapPointer, DEFAULT_MAX_ATTEMPTS};
pub use publisher::{PackPublisher, PublishRequest, SourceFile, collect_files};

#[cfg(test)]
mod tests;
