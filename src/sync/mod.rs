//! Sync coordinator: the pass state machine and the public mirror handle.
//!
//! One pass resolves the latest manifest, refreshes the directory volume,
//! reloads the directory index, selects the volumes covering the configured
//! prefixes, and brings each one up to date. Passes never overlap; triggers
//! arriving mid-pass are held in a single slot and collapse into one
//! follow-up pass.

pub mod error;
pub(crate) mod fetch;
pub(crate) mod select;
pub(crate) mod verify;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, watch, Mutex, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::archive::paths::{volume_file_name, DIRECTORY_VOLUME_NAME};
use crate::archive::{DirectoryIndex, VolumeParser};
use crate::config::{Config, ConfigError};
use crate::distribution::{self, DistributionClient, ProductKey};

pub use error::SyncError;

/// Progress of the sync pass state machine.
///
/// Transitions are monotonic within one pass; a later trigger re-enters at
/// [`ResolvingManifest`](SyncState::ResolvingManifest), so
/// [`Ready`](SyncState::Ready) is re-enterable rather than terminal. A
/// failed pass falls back to [`NotStarted`](SyncState::NotStarted).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    NotStarted,
    ResolvingManifest,
    FetchingIndex,
    SelectingVolumes,
    FetchingVolumes,
    Ready,
}

/// Handle to the mirror. Cheap to clone; every clone shares the same
/// coordinator.
#[derive(Clone)]
pub struct Mirror {
    inner: Arc<Inner>,
}

struct Inner {
    client: Arc<dyn DistributionClient>,
    index: DirectoryIndex,
    config: Config,
    key: ProductKey,
    state: watch::Sender<SyncState>,
    ready: watch::Sender<bool>,
    errors: broadcast::Sender<Arc<SyncError>>,
    trigger: Notify,
    pass_guard: Mutex<()>,
    started: AtomicBool,
    shutdown: CancellationToken,
}

impl Mirror {
    /// Create a mirror over `client` and `parser`.
    ///
    /// Validates the prefix set and bootstraps the cache directory; nothing
    /// is synced until [`start`](Self::start).
    pub fn new(
        client: Arc<dyn DistributionClient>,
        parser: Arc<dyn VolumeParser>,
        config: Config,
    ) -> Result<Self, ConfigError> {
        config.ensure_valid()?;

        let (state, _) = watch::channel(SyncState::NotStarted);
        let (ready, _) = watch::channel(false);
        let (errors, _) = broadcast::channel(16);
        let index = DirectoryIndex::new(parser, config.cache_directory.clone());
        let key = config.key();

        Ok(Self {
            inner: Arc::new(Inner {
                client,
                index,
                config,
                key,
                state,
                ready,
                errors,
                trigger: Notify::new(),
                pass_guard: Mutex::new(()),
                started: AtomicBool::new(false),
                shutdown: CancellationToken::new(),
            }),
        })
    }

    /// Spawn the coordinator loop. The first pass runs immediately; later
    /// passes run on [`notify_content_updated`](Self::notify_content_updated).
    ///
    /// Only the first call spawns; repeated calls return `None`.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            tracing::warn!("Mirror already started");
            return None;
        }
        let inner = Arc::clone(&self.inner);
        Some(tokio::spawn(async move { inner.run().await }))
    }

    /// Signal that upstream content (or the upstream session) changed.
    ///
    /// Safe to call from any task at any time; a trigger arriving while a
    /// pass is running is held and collapses into one follow-up pass.
    pub fn notify_content_updated(&self) {
        self.inner.trigger.notify_one();
    }

    /// Stop the coordinator loop. Takes effect between passes.
    pub fn stop(&self) {
        self.inner.shutdown.cancel();
    }

    /// Whether the minimal volume set is present and the index is loaded.
    ///
    /// Latches true on the first successful pass and stays true across
    /// later resyncs.
    pub fn ready(&self) -> bool {
        *self.inner.ready.borrow()
    }

    /// Readiness channel: observes exactly one change per transition into
    /// ready from a non-ready mirror. A resync that starts and ends ready
    /// is silent.
    pub fn subscribe_ready(&self) -> watch::Receiver<bool> {
        self.inner.ready.subscribe()
    }

    /// Error channel: every failed pass publishes the error that aborted it.
    pub fn subscribe_errors(&self) -> broadcast::Receiver<Arc<SyncError>> {
        self.inner.errors.subscribe()
    }

    /// Current pass state.
    pub fn state(&self) -> SyncState {
        *self.inner.state.borrow()
    }

    /// Observe pass state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<SyncState> {
        self.inner.state.subscribe()
    }

    /// Payload bytes for a logical archive path.
    ///
    /// Fails [`SyncError::NotReady`] until the first successful pass;
    /// afterwards unknown paths and not-yet-downloaded volumes fail with
    /// their own typed errors, never with garbage bytes.
    pub fn file(&self, logical_path: &str) -> Result<Vec<u8>, SyncError> {
        if !self.ready() {
            return Err(SyncError::NotReady);
        }
        self.inner.index.extract(logical_path).map_err(SyncError::from)
    }
}

impl Inner {
    async fn run(self: Arc<Self>) {
        loop {
            self.sync_once().await;

            tokio::select! {
                _ = self.trigger.notified() => {}
                _ = self.shutdown.cancelled() => {
                    tracing::debug!("Coordinator stopped");
                    return;
                }
            }
        }
    }

    /// Run one guarded sync pass. Failures reset the state machine and go
    /// out on the error channel; nothing is retried here.
    async fn sync_once(&self) {
        let Ok(_guard) = self.pass_guard.try_lock() else {
            tracing::warn!("Sync pass already in flight, ignoring trigger");
            return;
        };

        if !self.client.is_authenticated() {
            tracing::warn!("Upstream session not authenticated, can't check for updates");
            return;
        }

        tracing::info!("Checking for content updates");

        if let Err(e) = self.run_pass().await {
            tracing::error!("Sync pass failed: {e}");
            self.set_state(SyncState::NotStarted);
            let _ = self.errors.send(Arc::new(e));
        }
    }

    async fn run_pass(&self) -> Result<(), SyncError> {
        self.set_state(SyncState::ResolvingManifest);
        let manifest =
            distribution::resolve_latest_manifest(self.client.as_ref(), self.key).await?;

        let dir_entry = manifest
            .find_by_file_name(DIRECTORY_VOLUME_NAME)
            .ok_or_else(|| SyncError::ManifestEntryMissing(DIRECTORY_VOLUME_NAME.to_string()))?;

        self.set_state(SyncState::FetchingIndex);
        tracing::debug!("Refreshing directory volume");
        let dir_local = self.config.cache_directory.join(DIRECTORY_VOLUME_NAME);
        fetch::fetch_if_stale(self.client.as_ref(), self.key, dir_entry, &dir_local, &|_, _| {})
            .await?;

        // Publish the fresh tree immediately; readers during the rest of the
        // pass may observe VolumeMissingLocally, which is retryable.
        let tree = self.index.load(&dir_local)?;

        self.set_state(SyncState::SelectingVolumes);
        let required = select::required_volumes(&tree, &self.config.required_prefixes);
        tracing::debug!(volumes = ?required, "Computed required volumes");

        self.set_state(SyncState::FetchingVolumes);
        let total = required.len();
        for (position, &volume) in required.iter().enumerate() {
            let name = volume_file_name(volume);
            let entry = manifest
                .find_by_file_name(&name)
                .ok_or_else(|| SyncError::ManifestEntryMissing(name.clone()))?;
            let dest = self.config.cache_directory.join(&name);

            let label = format!("[{} / {}]", position + 1, total);
            let progress_label = label.clone();
            let on_progress = move |done: u64, total_bytes: u64| {
                let pct = if total_bytes == 0 {
                    100.0
                } else {
                    done as f64 * 100.0 / total_bytes as f64
                };
                tracing::info!(
                    "{progress_label} {pct:.2}% - {:.2} / {:.2} MB",
                    fetch::bytes_to_mb(done),
                    fetch::bytes_to_mb(total_bytes),
                );
            };

            let downloaded =
                fetch::fetch_if_stale(self.client.as_ref(), self.key, entry, &dest, &on_progress)
                    .await?;
            if downloaded {
                tracing::info!(
                    "{label} Downloaded {name} - {:.2} MB",
                    fetch::bytes_to_mb(entry.size_bytes)
                );
            } else {
                tracing::info!("{label} Already downloaded {name}");
            }
        }

        self.mark_ready();
        Ok(())
    }

    fn set_state(&self, next: SyncState) {
        self.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            tracing::debug!(from = ?*current, to = ?next, "Sync state transition");
            *current = next;
            true
        });
    }

    /// Flip into ready. Observers are notified only on an actual
    /// false → true change, so a no-op resync stays silent.
    fn mark_ready(&self) {
        self.set_state(SyncState::Ready);
        let flipped = self.ready.send_if_modified(|ready| {
            if *ready {
                false
            } else {
                *ready = true;
                true
            }
        });
        if flipped {
            tracing::debug!("Ready");
        }
    }
}
