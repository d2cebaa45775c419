//! Config - Profiles, Sources and the Root Configuration Snapshot
//!
//! Mirrors the configuration persisted by the backend. The client only ever
//! holds these as immutable snapshots.

use serde::{Deserialize, Serialize};

/// Root configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Schema version
    pub version: u32,
    /// Profiles in display order
    pub profiles: Vec<Profile>,
    /// Persisted active profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_profile_id: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            profiles: Vec::new(),
            active_profile_id: None,
        }
    }
}

impl AppConfig {
    /// Find a profile by ID
    pub fn profile(&self, profile_id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == profile_id)
    }

    /// ID of the first profile, if any
    pub fn first_profile_id(&self) -> Option<&str> {
        self.profiles.first().map(|p| p.id.as_str())
    }
}

/// A named collection of sources sharing a base installation path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    /// Default target directory for sources without their own target
    pub base_path: String,
    pub sources: Vec<Source>,
}

impl Profile {
    /// Find a source by ID
    pub fn source(&self, source_id: &str) -> Option<&Source> {
        self.sources.iter().find(|s| s.id == source_id)
    }
}

/// A directory of optional items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub id: String,
    pub name: String,
    pub source_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_path: Option<String>,
    /// Names of the items that should be linked into the target
    #[serde(default)]
    pub enabled_items: Vec<String>,
}

impl Source {
    /// Target directory for this source: its own, or the profile default
    pub fn effective_target_path<'a>(&'a self, profile_base_path: &'a str) -> &'a str {
        self.target_path.as_deref().unwrap_or(profile_base_path)
    }

    /// Whether an item is persisted as enabled
    pub fn is_enabled(&self, item_name: &str) -> bool {
        self.enabled_items.iter().any(|name| name == item_name)
    }
}
