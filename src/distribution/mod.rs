//! Distribution-service seam: the manifest data model, the client trait an
//! embedder implements, and latest-manifest resolution.

pub mod error;
pub mod manifest;

use std::path::Path;

pub use error::DistributionError;
pub use manifest::{ProductKey, RemoteFile, VersionManifest};

/// Progress callback invoked during a transfer with
/// `(bytes_downloaded, total_bytes)`. Invocation intervals are up to the
/// client implementation.
pub type ProgressCallback<'a> = &'a (dyn Fn(u64, u64) + Send + Sync);

/// Minimal async client for the remote distribution service.
///
/// Implementations own the wire protocol, session handling, and timeouts;
/// the sync engine only sees version manifests and whole-file downloads.
#[async_trait::async_trait]
pub trait DistributionClient: Send + Sync {
    /// Whether the upstream session is authenticated. Manifest resolution
    /// must not be attempted while this is `false`.
    fn is_authenticated(&self) -> bool;

    /// Latest version identifier and file manifest for one depot.
    async fn latest_manifest(&self, key: ProductKey)
        -> Result<VersionManifest, DistributionError>;

    /// Download `file` in full to `dest`, reporting progress as it goes.
    ///
    /// `dest` is a staging path chosen by the caller; promotion to the final
    /// location happens after the transfer has been verified.
    async fn download_file(
        &self,
        key: ProductKey,
        file: &RemoteFile,
        dest: &Path,
        on_progress: ProgressCallback<'_>,
    ) -> Result<(), DistributionError>;
}

/// Resolve the current version manifest for `key`.
///
/// Callers must hold an authenticated session; violating that is a
/// programming error, not a runtime failure. No retries happen here, the
/// caller decides whether to re-invoke.
pub async fn resolve_latest_manifest(
    client: &dyn DistributionClient,
    key: ProductKey,
) -> Result<VersionManifest, DistributionError> {
    debug_assert!(
        client.is_authenticated(),
        "manifest resolution requires an authenticated session"
    );

    tracing::debug!(%key, "Obtaining latest manifest");
    let manifest = client.latest_manifest(key).await?;
    tracing::debug!(
        version = %manifest.version_id,
        files = manifest.files.len(),
        "Obtained manifest"
    );
    Ok(manifest)
}
