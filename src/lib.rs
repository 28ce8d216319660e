//! pakmirror — selective incremental mirror of a remote versioned pak archive.
//!
//! Keeps a local cache of archive volumes fresh by resolving the latest
//! depot manifest, loading the archive's directory index, computing the
//! minimal volume set covering the configured directory prefixes, and
//! downloading only volumes whose content hash no longer matches upstream.
//! The wire protocol and the binary volume format stay behind the
//! [`DistributionClient`] and [`VolumeParser`] traits; this crate owns the
//! sync engine between them.
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use pakmirror::{Config, DistributionClient, Mirror, VolumeParser};
//! # async fn demo(
//! #     client: Arc<dyn DistributionClient>,
//! #     parser: Arc<dyn VolumeParser>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::new("data", vec!["scripts/items".into()], 730, 2347770);
//! let mirror = Mirror::new(client, parser, config)?;
//! let mut ready = mirror.subscribe_ready();
//! mirror.start();
//!
//! ready.changed().await?;
//! let bytes = mirror.file("scripts/items/example.txt")?;
//! # let _ = bytes;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

pub mod archive;
pub mod config;
pub mod distribution;
pub mod sync;

pub use archive::{ArchiveError, DirectoryIndex, DirectoryTree, VolumeParser};
pub use config::{Config, ConfigError};
pub use distribution::{
    DistributionClient, DistributionError, ProductKey, ProgressCallback, RemoteFile,
    VersionManifest,
};
pub use sync::{Mirror, SyncError, SyncState};
