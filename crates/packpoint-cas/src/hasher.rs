//! SHA-256 content fingerprints for asset payloads.

use std::path::Path;

use bytes::Bytes;
use sha2::{Digest, Sha256};

use crate::error::CasError;

/// A file's bytes together with their hex digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedFile {
    /// Lowercase hex SHA-256 of `data`.
    pub sha256: String,
    /// The raw file contents.
    pub data: Bytes,
}

/// Compute the lowercase hex SHA-256 of `data`.
///
/// Identical input always yields an identical string. The digest is a
/// verifiable fingerprint only; no cross-pack comparison is done with it.
pub fn digest(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Read a file and digest its contents.
///
/// Returns [`CasError::Hash`] naming the path when the file cannot be read.
pub async fn digest_file(path: &Path) -> Result<HashedFile, CasError> {
    let data = tokio::fs::read(path).await.map_err(|source| CasError::Hash {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(HashedFile {
        sha256: digest(&data),
        data: Bytes::from(data),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_known_vector() {
        assert_eq!(
            digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_digest_empty_input() {
        assert_eq!(
            digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_digest_deterministic() {
        let data = b"deterministic asset content";
        assert_eq!(digest(data), digest(data));
    }

    #[test]
    fn test_digest_differs_with_content() {
        assert_ne!(digest(b"hello"), digest(b"hellp"));
    }

    #[tokio::test]
    async fn test_digest_file_matches_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.bin");
        std::fs::write(&path, b"file payload").unwrap();

        let hashed = digest_file(&path).await.unwrap();
        assert_eq!(hashed.sha256, digest(b"file payload"));
        assert_eq!(hashed.data, Bytes::from_static(b"file payload"));
    }

    #[tokio::test]
    async fn test_digest_file_missing_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.bin");

        let err = digest_file(&path).await.unwrap_err();
        assert!(matches!(err, CasError::Hash { .. }));
        assert!(err.to_string().contains("missing.bin"), "got: {err}");
    }
}
