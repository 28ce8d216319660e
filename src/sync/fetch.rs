//! Stale-aware file download with staged promotion.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::distribution::{DistributionClient, ProductKey, ProgressCallback, RemoteFile};

use super::error::SyncError;
use super::verify;

/// Download `file` to `dest` unless the local copy already matches its
/// content hash. Returns whether a transfer actually happened.
///
/// The transfer lands in a sibling `.part` file and is re-hashed before
/// being renamed into place, so an aborted or corrupted transfer never
/// masquerades as a completed file.
pub(crate) async fn fetch_if_stale(
    client: &dyn DistributionClient,
    key: ProductKey,
    file: &RemoteFile,
    dest: &Path,
    on_progress: ProgressCallback<'_>,
) -> Result<bool, SyncError> {
    if verify::is_current(dest, &file.content_hash).await {
        return Ok(false);
    }

    let part = staging_path(dest);
    // A leftover .part is from an aborted transfer; always start fresh.
    let _ = fs::remove_file(&part).await;

    client
        .download_file(key, file, &part, on_progress)
        .await
        .map_err(|source| SyncError::DownloadFailed {
            name: file.file_name().to_string(),
            source: source.into(),
        })?;

    if !verify::is_current(&part, &file.content_hash).await {
        let _ = fs::remove_file(&part).await;
        return Err(SyncError::DownloadFailed {
            name: file.file_name().to_string(),
            source: anyhow::anyhow!("content hash mismatch after transfer"),
        });
    }

    fs::rename(&part, dest)
        .await
        .map_err(|source| SyncError::DownloadFailed {
            name: file.file_name().to_string(),
            source: source.into(),
        })?;

    Ok(true)
}

fn staging_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

/// Megabytes (10^6 bytes) for operator-facing progress lines.
pub(crate) fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use sha1::{Digest, Sha1};

    use crate::distribution::{DistributionError, VersionManifest};

    /// Serves a fixed byte payload for every download, counting transfers.
    struct ByteClient {
        payload: Vec<u8>,
        downloads: AtomicUsize,
    }

    impl ByteClient {
        fn new(payload: &[u8]) -> Self {
            Self {
                payload: payload.to_vec(),
                downloads: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl DistributionClient for ByteClient {
        fn is_authenticated(&self) -> bool {
            true
        }

        async fn latest_manifest(
            &self,
            _key: ProductKey,
        ) -> Result<VersionManifest, DistributionError> {
            unreachable!("not exercised");
        }

        async fn download_file(
            &self,
            _key: ProductKey,
            file: &RemoteFile,
            dest: &Path,
            on_progress: ProgressCallback<'_>,
        ) -> Result<(), DistributionError> {
            self.downloads.fetch_add(1, Ordering::SeqCst);
            let half = self.payload.len() as u64 / 2;
            on_progress(half, file.size_bytes);
            fs::write(dest, &self.payload).await.map_err(|source| {
                DistributionError::Transport {
                    remote_path: file.remote_path.clone(),
                    source: source.into(),
                }
            })?;
            on_progress(self.payload.len() as u64, file.size_bytes);
            Ok(())
        }
    }

    const KEY: ProductKey = ProductKey {
        product_id: 730,
        depot_id: 2347770,
    };

    fn remote_file(payload: &[u8]) -> RemoteFile {
        RemoteFile {
            remote_path: r"game\core\pak01_002.vpk".to_string(),
            content_hash: hex::encode(Sha1::digest(payload)),
            size_bytes: payload.len() as u64,
        }
    }

    #[tokio::test]
    async fn downloads_when_local_copy_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("pak01_002.vpk");
        let client = ByteClient::new(b"volume two");
        let file = remote_file(b"volume two");

        let downloaded = fetch_if_stale(&client, KEY, &file, &dest, &|_, _| {})
            .await
            .unwrap();

        assert!(downloaded);
        assert_eq!(fs::read(&dest).await.unwrap(), b"volume two");
        assert!(!staging_path(&dest).exists());
    }

    #[tokio::test]
    async fn skips_when_local_copy_is_current() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("pak01_002.vpk");
        fs::write(&dest, b"volume two").await.unwrap();
        let client = ByteClient::new(b"volume two");
        let file = remote_file(b"volume two");

        let downloaded = fetch_if_stale(&client, KEY, &file, &dest, &|_, _| {})
            .await
            .unwrap();

        assert!(!downloaded);
        assert_eq!(client.downloads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn redownloads_a_stale_local_copy() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("pak01_002.vpk");
        fs::write(&dest, b"tampered").await.unwrap();
        let client = ByteClient::new(b"volume two");
        let file = remote_file(b"volume two");

        let downloaded = fetch_if_stale(&client, KEY, &file, &dest, &|_, _| {})
            .await
            .unwrap();

        assert!(downloaded);
        assert_eq!(fs::read(&dest).await.unwrap(), b"volume two");
    }

    #[tokio::test]
    async fn corrupt_transfer_fails_and_leaves_no_trace() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("pak01_002.vpk");
        // Client serves bytes that don't match the manifest hash.
        let client = ByteClient::new(b"garbage");
        let file = remote_file(b"volume two");

        let err = fetch_if_stale(&client, KEY, &file, &dest, &|_, _| {})
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::DownloadFailed { .. }));
        assert!(!dest.exists());
        assert!(!staging_path(&dest).exists());
    }

    #[tokio::test]
    async fn progress_callback_sees_the_transfer() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("pak01_002.vpk");
        let client = ByteClient::new(b"volume two");
        let file = remote_file(b"volume two");

        let reports: Mutex<Vec<(u64, u64)>> = Mutex::new(Vec::new());
        fetch_if_stale(&client, KEY, &file, &dest, &|done, total| {
            reports.lock().unwrap().push((done, total));
        })
        .await
        .unwrap();

        let reports = reports.into_inner().unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1], (10, 10));
    }

    #[test]
    fn staging_path_is_a_part_sibling() {
        assert_eq!(
            staging_path(Path::new("/cache/pak01_002.vpk")),
            Path::new("/cache/pak01_002.vpk.part")
        );
    }

    #[test]
    fn bytes_to_mb_uses_decimal_megabytes() {
        assert_eq!(bytes_to_mb(1_000_000), 1.0);
        assert_eq!(bytes_to_mb(29_300_000), 29.3);
        assert_eq!(bytes_to_mb(0), 0.0);
    }
}
