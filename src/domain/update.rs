//! Update - Self-Update Metadata, Status and Progress Events

use serde::{Deserialize, Serialize};

/// Metadata of an available update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateInfo {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Release notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Self-update state machine status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateStatus {
    #[default]
    Idle,
    Checking,
    Available,
    Downloading,
    Installing,
    UpToDate,
    Error,
}

impl UpdateStatus {
    /// Whether a download/install pipeline is running
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Checking | Self::Downloading | Self::Installing)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Checking => "checking",
            Self::Available => "available",
            Self::Downloading => "downloading",
            Self::Installing => "installing",
            Self::UpToDate => "up-to-date",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Event emitted by a streamed download-and-install
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadEvent {
    /// Download began; total size in bytes when the server reports it
    Started { content_length: Option<u64> },
    /// A chunk of `chunk_length` bytes arrived
    Progress { chunk_length: u64 },
    /// Download complete, installation begins
    Finished,
}
