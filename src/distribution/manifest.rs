use serde::{Deserialize, Serialize};

/// Identifies one depot of one product on the distribution service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductKey {
    pub product_id: u32,
    pub depot_id: u32,
}

impl std::fmt::Display for ProductKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.product_id, self.depot_id)
    }
}

/// One file entry from a depot manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Path as reported by the service, unique within one manifest.
    pub remote_path: String,
    /// Lowercase hex digest of the file's content.
    pub content_hash: String,
    pub size_bytes: u64,
}

impl RemoteFile {
    /// Trailing path component of `remote_path`.
    ///
    /// Manifests report Windows-style paths (`game\core\pak01_dir.vpk`), so
    /// both separators are honored.
    pub fn file_name(&self) -> &str {
        self.remote_path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
    }
}

/// The service's declaration of one version: its identifier and every file
/// belonging to it. Superseded wholesale by the next fetch, never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionManifest {
    pub version_id: String,
    pub files: Vec<RemoteFile>,
}

impl VersionManifest {
    /// First entry whose trailing path component equals `name`.
    pub fn find_by_file_name(&self, name: &str) -> Option<&RemoteFile> {
        self.files.iter().find(|f| f.file_name() == name)
    }
}
