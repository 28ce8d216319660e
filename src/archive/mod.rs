//! Directory-index adapter over the external archive-format parser.
//!
//! Wraps the parsed path → volume tree and answers "which volume holds this
//! path" and "give me the bytes for this path". Holds no synchronization
//! logic; the coordinator decides when to (re)load.

pub mod error;
pub mod paths;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

pub use error::ArchiveError;

/// Read-only mapping from logical archive path to owning volume index.
///
/// Replaced wholesale on every load, never patched in place. Backed by a
/// `BTreeMap` so iteration order is stable across loads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryTree {
    entries: BTreeMap<String, u16>,
}

impl DirectoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, volume: u16) {
        self.entries.insert(path.into(), volume);
    }

    /// Volume index owning `path`, if the path exists in the archive.
    pub fn volume_of(&self, path: &str) -> Option<u16> {
        self.entries.get(path).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u16)> {
        self.entries.iter().map(|(path, &volume)| (path.as_str(), volume))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, u16)> for DirectoryTree {
    fn from_iter<I: IntoIterator<Item = (String, u16)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// External archive-format parser.
///
/// Owns the binary volume layout; the index adapter only routes paths and
/// local volume files through it.
pub trait VolumeParser: Send + Sync {
    /// Parse a directory volume into its path → volume tree.
    fn parse_directory_volume(&self, path: &Path) -> Result<DirectoryTree, ArchiveError>;

    /// Extract one file's payload from the local volume that owns it.
    fn extract_file(
        &self,
        tree: &DirectoryTree,
        volume_path: &Path,
        logical_path: &str,
    ) -> Result<Vec<u8>, ArchiveError>;
}

/// The loaded directory index: tree plus the cache layout needed to route
/// extraction to the right local volume file.
pub struct DirectoryIndex {
    parser: Arc<dyn VolumeParser>,
    cache_directory: PathBuf,
    tree: RwLock<Option<DirectoryTree>>,
}

impl DirectoryIndex {
    pub fn new(parser: Arc<dyn VolumeParser>, cache_directory: impl Into<PathBuf>) -> Self {
        Self {
            parser,
            cache_directory: cache_directory.into(),
            tree: RwLock::new(None),
        }
    }

    /// Parse `dir_volume` and publish the resulting tree wholesale,
    /// replacing any previously loaded tree.
    pub fn load(&self, dir_volume: &Path) -> Result<DirectoryTree, ArchiveError> {
        let tree = self.parser.parse_directory_volume(dir_volume)?;
        tracing::debug!(entries = tree.len(), "Loaded directory index");
        *self.tree.write().expect("directory tree lock poisoned") = Some(tree.clone());
        Ok(tree)
    }

    /// Volume index owning `path`.
    pub fn lookup_volume(&self, path: &str) -> Result<u16, ArchiveError> {
        let guard = self.tree.read().expect("directory tree lock poisoned");
        let tree = guard.as_ref().ok_or(ArchiveError::IndexNotLoaded)?;
        tree.volume_of(path)
            .ok_or_else(|| ArchiveError::FileNotFound(path.to_string()))
    }

    /// Payload bytes for `logical_path`, read out of its owning local volume.
    pub fn extract(&self, logical_path: &str) -> Result<Vec<u8>, ArchiveError> {
        let guard = self.tree.read().expect("directory tree lock poisoned");
        let tree = guard.as_ref().ok_or(ArchiveError::IndexNotLoaded)?;
        let volume = tree
            .volume_of(logical_path)
            .ok_or_else(|| ArchiveError::FileNotFound(logical_path.to_string()))?;

        let volume_path = self.cache_directory.join(paths::volume_file_name(volume));
        if !volume_path.exists() {
            return Err(ArchiveError::VolumeMissingLocally {
                index: volume,
                path: volume_path,
            });
        }

        self.parser.extract_file(tree, &volume_path, logical_path)
    }
}
