//! Error types for content addressing operations.

use std::path::PathBuf;

/// Errors that can occur during CAS operations.
#[derive(Debug, thiserror::Error)]
pub enum CasError {
    /// A file could not be read for digesting.
    #[error("cannot hash {}: {source}", path.display())]
    Hash {
        /// The file that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Manifest encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
