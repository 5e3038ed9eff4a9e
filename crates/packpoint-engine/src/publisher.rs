//! Pack publishing: enumerate → hash → allocate keys → one `create`.
//!
//! Everything that can fail locally (enumeration, hashing, encoding) runs
//! before the store is touched, so a failed publish leaves no record
//! behind. The record itself is written with a single `create` call, which
//! the store applies atomically.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use packpoint_cas::{HashedFile, KeyAllocator, build_manifest, digest_file, encode_manifest};
use packpoint_store::RecordStore;
use packpoint_types::*;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::error::PublishError;

/// Inputs of one publish.
#[derive(Debug, Clone, Default)]
pub struct PublishRequest {
    /// Folder whose direct, non-hidden regular files become assets.
    pub folder: Option<PathBuf>,
    /// Additional individually chosen files.
    pub extra_files: Vec<PathBuf>,
    /// Caller-supplied version number.
    pub version: i64,
    /// Custom URLs; only the first [`MAX_CUSTOM_URLS`] are stored.
    pub custom_urls: Vec<String>,
}

impl PublishRequest {
    /// An empty request for `version`.
    pub fn new(version: i64) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    /// Set the input folder.
    pub fn folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    /// Add an extra file.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.extra_files.push(path.into());
        self
    }

    /// Add a custom URL.
    pub fn custom_url(mut self, url: impl Into<String>) -> Self {
        self.custom_urls.push(url.into());
        self
    }
}

/// A file selected for publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Canonical path, used for deduplication.
    pub path: PathBuf,
    /// Display name: last component of the path as given.
    pub filename: String,
}

/// Builds and creates content pack records.
pub struct PackPublisher {
    store: Arc<dyn RecordStore>,
}

impl PackPublisher {
    /// Create a publisher writing to `store`.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Publish one pack.
    ///
    /// Files are hashed concurrently but keys are allocated in the final
    /// sorted order, so key assignment is deterministic for a given input
    /// set. An empty input set still produces a pack with an empty manifest.
    /// A negative version is rejected before any file is read.
    pub async fn publish(&self, request: &PublishRequest) -> Result<PublishReceipt, PublishError> {
        if request.version < 0 {
            return Err(PublishError::InvalidVersion(request.version));
        }
        let files = collect_files(request.folder.as_deref(), &request.extra_files).await?;
        info!(
            version = request.version,
            files = files.len(),
            "publish: starting"
        );

        let hashed = hash_all(&files).await?;

        let mut allocator = KeyAllocator::new();
        let mut entries = Vec::with_capacity(files.len());
        let mut record_fields = BTreeMap::new();
        for (file, hashed) in files.iter().zip(hashed) {
            let key = allocator.allocate(&file.filename);
            debug!(key = %key, filename = %file.filename, sha256 = %hashed.sha256, "publish: asset");
            entries.push(AssetEntry {
                key: key.clone(),
                filename: file.filename.clone(),
                sha256: hashed.sha256,
            });
            record_fields.insert(key, FieldValue::Blob(hashed.data));
        }

        record_fields.insert(fields::VERSION.to_string(), FieldValue::Int(request.version));

        let urls: Vec<&str> = request
            .custom_urls
            .iter()
            .take(MAX_CUSTOM_URLS)
            .map(String::as_str)
            .collect();
        if !urls.is_empty() {
            record_fields.insert(
                fields::CUSTOM_URLS.to_string(),
                FieldValue::Text(serde_json::to_string(&urls)?),
            );
        }

        let manifest = build_manifest(request.version, &entries);
        record_fields.insert(
            fields::MANIFEST.to_string(),
            FieldValue::Blob(encode_manifest(&manifest)?),
        );

        let record = self
            .store
            .create(RecordKind::ContentPack, record_fields)
            .await
            .map_err(PublishError::StoreWrite)?;

        info!(
            pack = %record.id,
            version = request.version,
            assets = entries.len(),
            "publish: pack created"
        );

        Ok(PublishReceipt {
            pack_id: record.id,
            version: request.version,
            asset_count: entries.len(),
        })
    }
}

/// Collect the files of a publish.
///
/// Takes the direct children of `folder` that are regular files and whose
/// names do not start with `.`, plus every path in `extra`. Duplicates (by
/// canonical path) are dropped, keeping the first occurrence. The result is
/// sorted by display name, then by path.
pub async fn collect_files(
    folder: Option<&Path>,
    extra: &[PathBuf],
) -> Result<Vec<SourceFile>, PublishError> {
    let mut candidates = Vec::new();

    if let Some(folder) = folder {
        let enumeration = |source: std::io::Error| PublishError::Enumeration {
            path: folder.to_path_buf(),
            source,
        };
        let mut entries = tokio::fs::read_dir(folder).await.map_err(enumeration)?;
        while let Some(entry) = entries.next_entry().await.map_err(enumeration)? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            let path = entry.path();
            // Follows symlinks: a link to a regular file counts as one.
            match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => candidates.push(path),
                Ok(_) => {}
                Err(source) => return Err(PublishError::Enumeration { path, source }),
            }
        }
    }

    for path in extra {
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|source| PublishError::Enumeration {
                path: path.clone(),
                source,
            })?;
        if !meta.is_file() {
            return Err(PublishError::Enumeration {
                path: path.clone(),
                source: std::io::Error::other("not a regular file"),
            });
        }
        candidates.push(path.clone());
    }

    let mut seen = HashSet::new();
    let mut files = Vec::with_capacity(candidates.len());
    for given in candidates {
        let path = tokio::fs::canonicalize(&given)
            .await
            .map_err(|source| PublishError::Enumeration {
                path: given.clone(),
                source,
            })?;
        if !seen.insert(path.clone()) {
            continue;
        }
        let filename = given
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        files.push(SourceFile { path, filename });
    }

    files.sort_by(|a, b| a.filename.cmp(&b.filename).then_with(|| a.path.cmp(&b.path)));
    Ok(files)
}

/// Hash every file concurrently, returning results in input order.
///
/// The first failure drops the set, which aborts the remaining tasks.
async fn hash_all(files: &[SourceFile]) -> Result<Vec<HashedFile>, PublishError> {
    let mut tasks = JoinSet::new();
    for (i, file) in files.iter().enumerate() {
        let path = file.path.clone();
        tasks.spawn(async move { (i, digest_file(&path).await) });
    }

    let mut hashed: Vec<Option<HashedFile>> = vec![None; files.len()];
    while let Some(joined) = tasks.join_next().await {
        let (i, result) = joined?;
        hashed[i] = Some(result?);
    }
    Ok(hashed.into_iter().flatten().collect())
}
