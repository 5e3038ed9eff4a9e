//! Read-side views of a single pack: asset detail and custom URLs.

use packpoint_cas::decode_manifest;
use packpoint_types::*;
use tracing::warn;

/// Asset detail of a pack.
///
/// Manifest entries come first, in manifest order. When the manifest is
/// missing, undecodable or empty, every asset-prefixed field is listed in
/// key order instead, with the filename derived from the key and no digest.
pub fn pack_assets(record: &Record) -> Vec<AssetItem> {
    let manifest = match record.blob(fields::MANIFEST).map(|b| decode_manifest(b)) {
        Some(Ok(manifest)) => Some(manifest),
        Some(Err(e)) => {
            warn!(pack = %record.id, error = %e, "assets: manifest undecodable, using fields");
            None
        }
        None => None,
    };

    if let Some(manifest) = manifest
        && !manifest.assets.is_empty()
    {
        return manifest
            .assets
            .into_iter()
            .map(|entry| AssetItem {
                payload: record.blob(&entry.key).cloned(),
                key: entry.key,
                filename: entry.filename,
                sha256: Some(entry.sha256),
            })
            .collect();
    }

    record
        .asset_keys()
        .map(|key| AssetItem {
            key: key.to_string(),
            filename: key.strip_prefix(ASSET_KEY_PREFIX).unwrap_or(key).to_string(),
            sha256: None,
            payload: record.blob(key).cloned(),
        })
        .collect()
}

/// Decoded custom URLs of a pack. Missing or malformed → empty.
pub fn custom_urls(record: &Record) -> Vec<String> {
    let Some(text) = record.text(fields::CUSTOM_URLS) else {
        return Vec::new();
    };
    serde_json::from_str(text).unwrap_or_else(|e| {
        warn!(pack = %record.id, error = %e, "assets: customURLs malformed");
        Vec::new()
    })
}
