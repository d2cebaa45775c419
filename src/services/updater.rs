//! Update Service
//!
//! Abstraction over the application's self-update provider.
//!
//! ## Pattern
//!
//! ```text
//! UpdateService::check()
//!       │
//!       ▼
//! AvailableUpdate { info, handle }
//!       │
//!       ▼
//! handle.download_and_install(ProgressSender) ──► DownloadEvent stream
//!       │                                              │
//!       ▼                                              ▼
//! UpdateService::relaunch()                 UpdateManager transitions
//! ```
//!
//! Progress travels over a channel instead of an inline callback so the
//! consumer side can be driven by synthetic event sequences in tests.

use crate::domain::{DownloadEvent, UpdateInfo};
use futures::future::BoxFuture;
use tokio::sync::mpsc;

/// Provider of update checks and the process relaunch primitive
pub trait UpdateService: Send + Sync + 'static {
    /// Look for a newer release
    fn check(&self) -> BoxFuture<'_, Result<Option<AvailableUpdate>, String>>;

    /// Restart the application after an install
    fn relaunch(&self) -> BoxFuture<'_, Result<(), String>>;
}

/// Opaque handle to one downloadable release
pub trait UpdateHandle: Send + Sync + 'static {
    /// Download and install, reporting progress through `progress`
    fn download_and_install(&self, progress: ProgressSender) -> BoxFuture<'_, Result<(), String>>;
}

/// Result of a successful check that found a release
pub struct AvailableUpdate {
    pub info: UpdateInfo,
    pub handle: Box<dyn UpdateHandle>,
}

impl std::fmt::Debug for AvailableUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvailableUpdate")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

/// Producer side of the download progress channel
///
/// Every send returns `false` once the consumer is gone; producers may treat
/// that as cancellation and stop early.
#[derive(Clone, Debug)]
pub struct ProgressSender {
    tx: mpsc::UnboundedSender<DownloadEvent>,
}

/// Consumer side of the download progress channel
pub type ProgressReceiver = mpsc::UnboundedReceiver<DownloadEvent>;

/// Create a connected progress sender/receiver pair
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ProgressSender { tx }, rx)
}

impl ProgressSender {
    pub fn send(&self, event: DownloadEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn started(&self, content_length: Option<u64>) -> bool {
        self.send(DownloadEvent::Started { content_length })
    }

    pub fn progress(&self, chunk_length: u64) -> bool {
        self.send(DownloadEvent::Progress { chunk_length })
    }

    pub fn finished(&self) -> bool {
        self.send(DownloadEvent::Finished)
    }

    /// Whether the consumer has stopped listening
    pub fn is_cancelled(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sends_fail_after_consumer_drops() {
        let (tx, mut rx) = progress_channel();
        assert!(tx.started(Some(10)));
        assert_eq!(
            rx.try_recv().ok(),
            Some(DownloadEvent::Started {
                content_length: Some(10)
            })
        );

        drop(rx);
        assert!(tx.is_cancelled());
        assert!(!tx.progress(5));
    }
}
