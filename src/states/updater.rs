//! Update Manager
//!
//! Self-update state machine:
//!
//! ```text
//!            check_for_updates()
//!   idle ───────────────────────► checking ──► available ──► downloading ──► installing ──► (relaunch)
//!     ▲                               │                          │               │
//!     │ reset()                       ├──► up-to-date            └───────────────┴──► error
//!     └───────── any state            └──► error
//! ```
//!
//! Every check and every reset starts a new generation. Results and download
//! events that belong to an older generation are dropped, so overlapping checks
//! always settle on the outcome of the latest one.

use crate::constants::{NO_UPDATE_MESSAGE, PROGRESS_COMPLETE};
use crate::domain::{DownloadEvent, UpdateInfo, UpdateStatus};
use crate::error::Error;
use crate::eventing::{AppEvent, EventBus};
use crate::services::{UpdateHandle, UpdateService, progress_channel};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Byte counters of one download
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadProgress {
    /// Announced size, 0 when unknown
    pub total: u64,
    pub downloaded: u64,
    /// 0..=100
    pub percent: u8,
}

impl DownloadProgress {
    /// Apply one download event; returns `true` once the download has finished
    ///
    /// With an unknown total the percentage stays at 0 until `Finished`.
    pub fn apply(&mut self, event: DownloadEvent) -> bool {
        match event {
            DownloadEvent::Started { content_length } => {
                *self = Self {
                    total: content_length.unwrap_or(0),
                    ..Self::default()
                };
                false
            }
            DownloadEvent::Progress { chunk_length } => {
                self.downloaded = self.downloaded.saturating_add(chunk_length);
                if self.total > 0 {
                    self.percent = percent_of(self.downloaded, self.total);
                }
                false
            }
            DownloadEvent::Finished => {
                self.percent = PROGRESS_COMPLETE;
                true
            }
        }
    }
}

/// `downloaded / total` as a rounded percentage, capped at 100
fn percent_of(downloaded: u64, total: u64) -> u8 {
    let total = u128::from(total);
    let scaled = (u128::from(downloaded) * 100 + total / 2) / total;
    u8::try_from(scaled.min(u128::from(PROGRESS_COMPLETE))).unwrap_or(PROGRESS_COMPLETE)
}

#[derive(Default)]
struct UpdaterState {
    status: UpdateStatus,
    error: Option<String>,
    info: Option<UpdateInfo>,
    progress: DownloadProgress,
    /// Retained between a successful check and the download
    handle: Option<Box<dyn UpdateHandle>>,
    generation: u64,
}

struct UpdateManagerInner {
    service: Arc<dyn UpdateService>,
    events: EventBus,
    state: RwLock<UpdaterState>,
}

/// Drives check, download, install and relaunch
#[derive(Clone)]
pub struct UpdateManager {
    inner: Arc<UpdateManagerInner>,
}

impl UpdateManager {
    pub fn new(service: Arc<dyn UpdateService>, events: EventBus) -> Self {
        Self {
            inner: Arc::new(UpdateManagerInner {
                service,
                events,
                state: RwLock::new(UpdaterState::default()),
            }),
        }
    }

    // ==================== Getters ====================

    pub fn status(&self) -> UpdateStatus {
        self.inner.state.read().status
    }

    pub fn error(&self) -> Option<String> {
        self.inner.state.read().error.clone()
    }

    pub fn update_info(&self) -> Option<UpdateInfo> {
        self.inner.state.read().info.clone()
    }

    /// Download progress in percent
    pub fn download_progress(&self) -> u8 {
        self.inner.state.read().progress.percent
    }

    /// Byte counters of the current download
    pub fn download_counters(&self) -> DownloadProgress {
        self.inner.state.read().progress
    }

    // ==================== Actions ====================

    /// Ask the update service for a newer release
    ///
    /// Returns `true` when the service reported a release. Allowed from any
    /// state; a download still in flight is detached and will not relaunch.
    /// A check superseded by a newer check or a reset leaves the state to the
    /// newer one but still reports what it found.
    pub async fn check_for_updates(&self) -> bool {
        let generation = {
            let mut state = self.inner.state.write();
            if matches!(state.status, UpdateStatus::Downloading | UpdateStatus::Installing) {
                debug!(status = %state.status, "Checking again; detaching current pipeline");
            }
            state.generation += 1;
            state.status = UpdateStatus::Checking;
            state.error = None;
            state.info = None;
            state.progress = DownloadProgress::default();
            state.handle = None;
            state.generation
        };
        self.emit_status(UpdateStatus::Checking);
        info!("Checking for updates");

        let checked = self.inner.service.check().await;

        let status = {
            let mut state = self.inner.state.write();
            if state.generation != generation {
                debug!(generation, "Discarding superseded update check");
                return matches!(checked, Ok(Some(_)));
            }
            match checked {
                Ok(Some(update)) => {
                    info!(version = %update.info.version, "Update available");
                    state.info = Some(update.info);
                    state.handle = Some(update.handle);
                    state.status = UpdateStatus::Available;
                }
                Ok(None) => {
                    info!("Application is up to date");
                    state.status = UpdateStatus::UpToDate;
                }
                Err(message) => {
                    let err = Error::Update { message };
                    error!(error = %err, "Update check failed");
                    state.status = UpdateStatus::Error;
                    state.error = Some(err.to_string());
                }
            }
            state.status
        };

        self.emit_status(status);
        status == UpdateStatus::Available
    }

    /// Download and install the release found by the last check, then relaunch
    ///
    /// The retained release is consumed whatever the outcome, so a failed
    /// attempt needs a fresh check. Ignored while a download is already running.
    pub async fn download_and_install(&self) {
        let (handle, generation) = {
            let mut state = self.inner.state.write();
            if matches!(state.status, UpdateStatus::Downloading | UpdateStatus::Installing) {
                warn!(status = %state.status, "Update already in progress");
                return;
            }
            let retained = state.handle.take();
            match retained {
                Some(handle) => {
                    state.status = UpdateStatus::Downloading;
                    state.error = None;
                    state.progress = DownloadProgress::default();
                    (handle, state.generation)
                }
                None => {
                    state.status = UpdateStatus::Error;
                    state.error = Some(NO_UPDATE_MESSAGE.to_string());
                    drop(state);
                    warn!("{NO_UPDATE_MESSAGE}");
                    self.emit_status(UpdateStatus::Error);
                    return;
                }
            }
        };
        self.emit_status(UpdateStatus::Downloading);
        info!("Downloading update");

        let (progress, mut events) = progress_channel();
        let outcome = {
            let download = handle.download_and_install(progress);
            tokio::pin!(download);
            loop {
                tokio::select! {
                    biased;
                    Some(event) = events.recv() => self.on_download_event(generation, event),
                    result = &mut download => break result,
                }
            }
        };
        while let Ok(event) = events.try_recv() {
            self.on_download_event(generation, event);
        }

        if !self.is_current(generation) {
            info!("Update pipeline was reset during download; skipping relaunch");
            return;
        }

        match outcome {
            Ok(()) => {
                info!("Update installed; relaunching");
                if let Err(message) = self.inner.service.relaunch().await {
                    self.fail(generation, Error::Update { message });
                }
            }
            Err(message) => self.fail(generation, Error::Update { message }),
        }
    }

    /// Return to `idle` from any state, forgetting the retained release
    pub fn reset(&self) {
        {
            let mut state = self.inner.state.write();
            let generation = state.generation + 1;
            *state = UpdaterState {
                generation,
                ..UpdaterState::default()
            };
        }
        debug!("Update state reset");
        self.emit_status(UpdateStatus::Idle);
    }

    fn on_download_event(&self, generation: u64, event: DownloadEvent) {
        let (finished, percent, changed) = {
            let mut state = self.inner.state.write();
            if state.generation != generation {
                return;
            }
            let before = state.progress.percent;
            let finished = state.progress.apply(event);
            if finished {
                state.status = UpdateStatus::Installing;
            }
            (finished, state.progress.percent, state.progress.percent != before)
        };

        if changed {
            self.inner.events.emit(AppEvent::UpdateProgress { percent });
        }
        if finished {
            info!("Download finished; installing");
            self.emit_status(UpdateStatus::Installing);
        }
    }

    fn fail(&self, generation: u64, err: Error) {
        {
            let mut state = self.inner.state.write();
            if state.generation != generation {
                return;
            }
            state.status = UpdateStatus::Error;
            state.error = Some(err.to_string());
        }
        error!(error = %err, "Update failed");
        self.emit_status(UpdateStatus::Error);
    }

    fn is_current(&self, generation: u64) -> bool {
        self.inner.state.read().generation == generation
    }

    fn emit_status(&self, status: UpdateStatus) {
        self.inner.events.emit(AppEvent::update_status(status));
    }
}

impl std::fmt::Debug for UpdateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("UpdateManager")
            .field("status", &state.status)
            .field("error", &state.error)
            .field("info", &state.info)
            .field("progress", &state.progress)
            .field("has_handle", &state.handle.is_some())
            .finish()
    }
}
