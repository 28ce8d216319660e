//! Error types for the directory-index adapter.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading the directory index or extracting file payloads.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The directory volume on disk could not be parsed.
    #[error("corrupt directory volume at {path}: {source}")]
    CorruptIndex {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// No directory volume has been loaded yet.
    #[error("directory index not loaded")]
    IndexNotLoaded,

    /// The logical path is not present in the directory tree.
    #[error("file not found in archive: {0}")]
    FileNotFound(String),

    /// The owning volume has not been downloaded to the cache directory.
    /// Retryable once the in-flight sync pass completes.
    #[error("volume {index} not present locally at {path}")]
    VolumeMissingLocally { index: u16, path: PathBuf },

    /// Payload extraction from a local volume failed.
    #[error("failed to extract {path}: {source}")]
    Extract {
        path: String,
        #[source]
        source: anyhow::Error,
    },
}
