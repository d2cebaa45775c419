//! Item - Runtime Item Status and Command Results

use serde::{Deserialize, Serialize};

/// Link status of an item, computed by the backend from the filesystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Linked into the target and pointing at this source
    Active,
    /// Not linked
    Inactive,
    /// Link exists but its target is missing or wrong
    Broken,
    /// Another source or an unrelated file occupies the name
    Conflict,
}

impl ItemStatus {
    /// Status implied by the enabled flag alone
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            ItemStatus::Active
        } else {
            ItemStatus::Inactive
        }
    }
}

/// One installable file or directory inside a source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub name: String,
    pub is_directory: bool,
    pub source_path: String,
    pub status: ItemStatus,
    pub enabled: bool,
    /// Who holds the conflicting name (another source, "External", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict_source: Option<String>,
}

/// Host capability snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionStatus {
    pub can_create_symlinks: bool,
    pub requires_elevation: bool,
    pub is_developer_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Outcome of a single toggle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymlinkResult {
    pub success: bool,
    pub item_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SymlinkResult {
    /// Build a failed result
    pub fn failure(item_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            item_name: item_name.into(),
            error: Some(error.into()),
        }
    }
}
