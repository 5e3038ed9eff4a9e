//! Shared types and identifiers for packpoint.
//!
//! This crate defines the record model of the generic record store
//! ([`RecordId`], [`RecordKind`], [`FieldValue`], [`Record`]), the content
//! pack types layered on top of it ([`AssetEntry`], [`Manifest`],
//! [`PackSummary`], [`AssetItem`]), the bootstrap pointer view
//! ([`PointerState`]), and the field names of the store schema ([`fields`]).

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Schema constants
// ---------------------------------------------------------------------------

/// Prefix carried by every per-asset field key of a content pack.
pub const ASSET_KEY_PREFIX: &str = "asset_";

/// Maximum length of a field key accepted by the record store.
pub const MAX_FIELD_KEY_LEN: usize = 255;

/// Maximum number of custom URLs stored on one pack.
pub const MAX_CUSTOM_URLS: usize = 5;

/// Field names of the store schema.
pub mod fields {
    /// Integer pack version (queryable, sortable). Also present on the bootstrap record.
    pub const VERSION: &str = "version";
    /// Blob attachment holding the JSON manifest of a pack.
    pub const MANIFEST: &str = "manifest";
    /// Text field holding a JSON array of at most five URL strings.
    pub const CUSTOM_URLS: &str = "customURLs";
    /// Reference from the bootstrap record to the latest pack.
    pub const LATEST_PACK: &str = "latestPack";
}

// ---------------------------------------------------------------------------
// Record identity
// ---------------------------------------------------------------------------

/// Identity of a record in the store.
///
/// Store-assigned identities are random UUIDs; the bootstrap record uses a
/// fixed, caller-chosen name.
#[derive(Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap an existing record name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Generate a fresh random identity (UUIDv4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// The record name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for RecordId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

/// The two record types of the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// An immutable bundle of assets plus manifest.
    ContentPack,
    /// The singleton "latest version" pointer.
    Bootstrap,
}

impl RecordKind {
    /// Schema name of the record type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContentPack => "ContentPack",
            Self::Bootstrap => "Bootstrap",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A single field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Integer value.
    Int(i64),
    /// UTF-8 string value.
    Text(String),
    /// Opaque attachment payload.
    Blob(Bytes),
    /// Reference to another record. No cascading delete.
    Reference(RecordId),
}

/// A record as held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Identity of the record.
    pub id: RecordId,
    /// Record type.
    pub kind: RecordKind,
    /// Named field values.
    pub fields: BTreeMap<String, FieldValue>,
    /// Optimistic-concurrency token.
    ///
    /// `0` for a record that has never been saved; bumped by the store on
    /// every successful save.
    pub change_tag: u64,
    /// Unix timestamp (seconds) of the first save, assigned by the store.
    pub created_at: u64,
}

impl Record {
    /// Build an unsaved record with no fields.
    pub fn new(id: RecordId, kind: RecordKind) -> Self {
        Self {
            id,
            kind,
            fields: BTreeMap::new(),
            change_tag: 0,
            created_at: 0,
        }
    }

    /// Set a field, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    /// Remove a field. Returns the previous value, if any.
    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    /// Integer field value, if present and an `Int`.
    pub fn int(&self, name: &str) -> Option<i64> {
        match self.fields.get(name) {
            Some(FieldValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Text field value, if present and a `Text`.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(FieldValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Blob field value, if present and a `Blob`.
    pub fn blob(&self, name: &str) -> Option<&Bytes> {
        match self.fields.get(name) {
            Some(FieldValue::Blob(b)) => Some(b),
            _ => None,
        }
    }

    /// Reference field value, if present and a `Reference`.
    pub fn reference(&self, name: &str) -> Option<&RecordId> {
        match self.fields.get(name) {
            Some(FieldValue::Reference(id)) => Some(id),
            _ => None,
        }
    }

    /// Keys of all blob fields carrying the asset prefix, in key order.
    pub fn asset_keys(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|(k, v)| k.starts_with(ASSET_KEY_PREFIX) && matches!(v, FieldValue::Blob(_)))
            .map(|(k, _)| k.as_str())
    }
}

// ---------------------------------------------------------------------------
// Content packs
// ---------------------------------------------------------------------------

/// One asset of a content pack, as listed in its manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    /// Sanitized, store-safe field key (unique within the pack).
    pub key: String,
    /// Original display name of the file.
    pub filename: String,
    /// Hex-encoded SHA-256 of the file bytes.
    pub sha256: String,
}

/// Serialized snapshot of a pack's asset table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Pack version the manifest was built for.
    pub version: i64,
    /// Assets in publish order.
    pub assets: Vec<AssetEntry>,
}

/// One row of the publish history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackSummary {
    /// Identity of the pack record.
    pub id: RecordId,
    /// Caller-supplied version.
    pub version: i64,
    /// Unix timestamp (seconds) at which the store created the pack.
    pub created_at: u64,
    /// Number of assets in the pack.
    pub asset_count: usize,
}

/// Asset detail for one pack entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetItem {
    /// Field key of the asset.
    pub key: String,
    /// Display name.
    pub filename: String,
    /// Digest from the manifest; `None` when reconstructed from fields alone.
    pub sha256: Option<String>,
    /// Payload, when the pack carries a field under `key`.
    pub payload: Option<Bytes>,
}

/// Outcome of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishReceipt {
    /// Identity of the created pack.
    pub pack_id: RecordId,
    /// Version the pack was published with.
    pub version: i64,
    /// Number of assets attached to the pack.
    pub asset_count: usize,
}

/// Observed state of the bootstrap pointer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PointerState {
    /// Version of the referenced pack, `0` when cleared.
    pub version: i64,
    /// Referenced pack, `None` when cleared or never published.
    pub latest: Option<RecordId>,
}

impl PointerState {
    /// Whether the pointer is in the cleared state.
    pub fn is_cleared(&self) -> bool {
        self.latest.is_none()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
