//! Manifest building and serialization.
//!
//! A [`Manifest`] is the JSON snapshot `{version, assets: [{key, filename,
//! sha256}]}` attached to every pack as an opaque blob. It survives any
//! schema variant that does not store assets as separately keyed fields, so
//! listing and asset detail fall back to it.

use bytes::Bytes;
use packpoint_types::{AssetEntry, Manifest};

use crate::error::CasError;

/// Build a [`Manifest`] from the ordered asset table of a pack.
pub fn build_manifest(version: i64, assets: &[AssetEntry]) -> Manifest {
    Manifest {
        version,
        assets: assets.to_vec(),
    }
}

/// Serialize a manifest to its JSON blob.
pub fn encode_manifest(manifest: &Manifest) -> Result<Bytes, CasError> {
    Ok(Bytes::from(serde_json::to_vec(manifest)?))
}

/// Decode a manifest blob.
pub fn decode_manifest(bytes: &[u8]) -> Result<Manifest, CasError> {
    Ok(serde_json::from_slice(bytes)?)
}
