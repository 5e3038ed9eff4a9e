//! Content hashing, asset key allocation, and manifest building.
//!
//! This crate provides:
//! - [`digest`] / [`digest_file`]: SHA-256 hex fingerprints of asset bytes.
//! - [`KeyAllocator`]: store-safe, per-pack unique field keys for filenames.
//! - [`build_manifest`]: the JSON manifest blob attached to every pack.
//!
//! The manifest is the fallback source of truth for a pack's asset list:
//! a pack whose assets cannot be enumerated from its fields is still fully
//! described by [`decode_manifest`].

mod error;
mod hasher;
mod keys;
mod manifest;

pub use error::CasError;
pub use hasher::{HashedFile, digest, digest_file};
pub use keys::{KeyAllocator, sanitize_key};
pub use manifest::{build_manifest, decode_manifest, encode_manifest};
