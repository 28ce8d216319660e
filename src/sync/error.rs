//! Error types for the sync engine.

use thiserror::Error;

use crate::archive::ArchiveError;
use crate::distribution::DistributionError;

/// Errors surfaced by a sync pass or by file access on the mirror.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Distribution(#[from] DistributionError),

    /// The manifest has no entry for a file the pass needs.
    #[error("manifest has no entry named {0}")]
    ManifestEntryMissing(String),

    /// A download could not be completed or failed post-transfer
    /// verification.
    #[error("download of {name} failed: {source}")]
    DownloadFailed {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// The mirror has not finished its first sync pass.
    #[error("mirror is not ready")]
    NotReady,
}
