//! Local cache verification by content hash.

use std::path::Path;

use sha1::{Digest, Sha1};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

const READ_CHUNK: usize = 64 * 1024;

/// Whether the file at `path` already carries the expected content hash.
///
/// Never errors: a missing or unreadable file degrades to `false`, since
/// "never downloaded" and "stale" call for the same treatment. The
/// comparison is case-sensitive against the manifest's lowercase hex digest.
pub(crate) async fn is_current(path: &Path, expected_hash: &str) -> bool {
    match file_sha1_hex(path).await {
        Ok(actual) => actual == expected_hash,
        Err(_) => false,
    }
}

/// Lowercase hex SHA-1 of the file's bytes, hashed incrementally so large
/// volumes are never buffered whole.
async fn file_sha1_hex(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path).await?;
    let mut hasher = Sha1::new();
    let mut buf = vec![0u8; READ_CHUNK];

    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}
