//! Load State
//!
//! Shared loading status for components that fetch from the backend.

use std::sync::Arc;

/// Loading state of a fetched resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing requested yet
    #[default]
    Idle,
    /// A fetch is in flight
    Loading,
    /// The last fetch succeeded
    Loaded,
    /// The last fetch failed
    Error(Arc<str>),
}

impl LoadState {
    /// Check if currently loading
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Check if loaded successfully
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded)
    }

    /// Error message of the last failed fetch
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}
